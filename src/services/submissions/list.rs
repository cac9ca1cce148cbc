use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::models::submissions::{
    requests::SubmissionListParams,
    responses::{SubmissionListResponse, SubmissionResponse},
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub async fn list_submissions(
    service: &SubmissionService,
    request: &HttpRequest,
    assignment_id: i64,
    params: SubmissionListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_assignment_by_id(assignment_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AssignmentNotFound,
                "Assignment not found",
            )));
        }
        Err(e) => return Ok(error_response(&e)),
    }

    match storage
        .list_submissions_by_assignment(
            assignment_id,
            Some(params.pagination.page),
            Some(params.pagination.size),
        )
        .await
    {
        Ok((submissions, pagination)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SubmissionListResponse {
                assignment_id,
                items: submissions.into_iter().map(SubmissionResponse::from).collect(),
                pagination,
            },
            "查询成功",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
