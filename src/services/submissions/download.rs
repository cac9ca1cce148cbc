use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{SubmissionService, load_owned};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::files::stream_file;
use crate::services::{current_user, error_response};

pub async fn download_attachment(
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

    let Some(path) = submission.file_path.as_deref() else {
        return Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::FileNotFound, "该提交没有附件")));
    };
    let file_name = submission.file_name.as_deref().unwrap_or("attachment");

    match stream_file(path, file_name, false).await {
        Ok(response) => Ok(response),
        Err(e) => Ok(error_response(&e)),
    }
}
