use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{SubmissionService, load_owned};
use crate::errors::CourseHubError;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::files::remove_stored_file;
use crate::services::{current_user, error_response};
use crate::utils::deadline;

pub async fn delete_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let submission = match load_owned(&storage, &user, submission_id).await {
        Ok(submission) => submission,
        Err(e) => return Ok(error_response(&e)),
    };

    // 学生在截止后不能撤回，管理员不受限制
    if !user.is_admin() {
        let assignment = match storage.get_assignment_by_id(submission.assignment_id).await {
            Ok(Some(assignment)) => assignment,
            Ok(None) => {
                return Ok(error_response(&CourseHubError::not_found("作业不存在")));
            }
            Err(e) => return Ok(error_response(&e)),
        };
        if let Err(e) = deadline::ensure_open(assignment.deadline, chrono::Utc::now()) {
            return Ok(error_response(&e));
        }
    }

    match storage.delete_submission_by_id(submission.id).await {
        Ok(Some(deleted)) => {
            if let Some(path) = &deleted.file_path {
                remove_stored_file(path).await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("提交已删除")))
        }
        Ok(None) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::SubmissionNotFound, "提交不存在"))),
        Err(e) => Ok(error_response(&e)),
    }
}
