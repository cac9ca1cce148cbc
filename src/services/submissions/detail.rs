use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{SubmissionService, load_owned};
use crate::models::ApiResponse;
use crate::models::submissions::responses::SubmissionResponse;
use crate::services::{current_user, error_response};

pub async fn get_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match load_owned(&storage, &user, submission_id).await {
        Ok(submission) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SubmissionResponse::from(submission),
            "查询成功",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
