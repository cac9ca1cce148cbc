use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssignmentService, current_student};
use crate::models::ApiResponse;
use crate::models::assignments::{
    requests::AssignmentListQuery,
    responses::{AssignmentListItem, AssignmentListResponse},
};
use crate::services::error_response;

pub async fn list_assignments(
    service: &AssignmentService,
    request: &HttpRequest,
    query: AssignmentListQuery,
) -> ActixResult<HttpResponse> {
    let (_, student_id) = match current_student(request) {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let (assignments, pagination) = match storage.list_assignments_with_pagination(query).await {
        Ok(page) => page,
        Err(e) => return Ok(error_response(&e)),
    };

    let ids: Vec<i64> = assignments.iter().map(|a| a.id).collect();
    let submitted = match storage.list_submitted_assignment_ids(&student_id, &ids).await {
        Ok(submitted) => submitted,
        Err(e) => return Ok(error_response(&e)),
    };

    let now = chrono::Utc::now();
    let items = assignments
        .into_iter()
        .map(|assignment| AssignmentListItem {
            is_deadline: assignment.is_deadline(now),
            submitted: submitted.contains(&assignment.id),
            assignment,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AssignmentListResponse { items, pagination },
        "Assignments retrieved successfully",
    )))
}
