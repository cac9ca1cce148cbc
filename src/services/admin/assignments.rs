use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AdminService, remove_assignment_files};
use crate::models::assignments::{
    requests::{AssignmentListQuery, CreateAssignmentRequest, UpdateAssignmentRequest},
    responses::{AdminAssignmentListItem, AdminAssignmentListResponse},
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;
use crate::storage::Storage;
use crate::utils::validate::validate_length;

pub const ASSIGNMENT_NAME_MAX_CHARS: usize = 100;

fn invalid(msg: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::AssignmentInvalid, msg))
}

async fn course_exists(storage: &dyn Storage, course_id: Option<i64>) -> Result<(), HttpResponse> {
    let Some(course_id) = course_id else {
        return Ok(());
    };
    match storage.get_course_by_id(course_id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::CourseNotFound, "课程不存在"))),
        Err(e) => Err(error_response(&e)),
    }
}

/// 作业列表，附带每个作业的提交数
pub async fn list_assignments(
    service: &AdminService,
    request: &HttpRequest,
    query: AssignmentListQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let (assignments, pagination) = match storage.list_assignments_with_pagination(query).await {
        Ok(page) => page,
        Err(e) => return Ok(error_response(&e)),
    };
    let ids: Vec<i64> = assignments.iter().map(|a| a.id).collect();
    let counts = match storage.count_submissions_by_assignment(&ids).await {
        Ok(counts) => counts,
        Err(e) => return Ok(error_response(&e)),
    };

    let items = assignments
        .into_iter()
        .map(|assignment| AdminAssignmentListItem {
            submission_count: counts.get(&assignment.id).copied().unwrap_or(0),
            assignment,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AdminAssignmentListResponse { items, pagination },
        "查询成功",
    )))
}

pub async fn create_assignment(
    service: &AdminService,
    request: &HttpRequest,
    mut req: CreateAssignmentRequest,
) -> ActixResult<HttpResponse> {
    req.name = req.name.trim().to_string();
    if let Err(msg) = validate_length("name", &req.name, 1, ASSIGNMENT_NAME_MAX_CHARS) {
        return Ok(invalid(msg));
    }

    let storage = service.get_storage(request);
    if let Err(resp) = course_exists(storage.as_ref(), req.course_id).await {
        return Ok(resp);
    }

    match storage.create_assignment(req).await {
        Ok(assignment) => {
            tracing::info!("Created assignment {} ({})", assignment.id, assignment.name);
            Ok(HttpResponse::Created().json(ApiResponse::success(assignment, "作业创建成功")))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn update_assignment(
    service: &AdminService,
    request: &HttpRequest,
    assignment_id: i64,
    mut req: UpdateAssignmentRequest,
) -> ActixResult<HttpResponse> {
    if let Some(name) = req.name.as_mut() {
        *name = name.trim().to_string();
        if let Err(msg) = validate_length("name", name, 1, ASSIGNMENT_NAME_MAX_CHARS) {
            return Ok(invalid(msg));
        }
    }

    let storage = service.get_storage(request);
    if let Err(resp) = course_exists(storage.as_ref(), req.course_id).await {
        return Ok(resp);
    }

    match storage.update_assignment(assignment_id, req).await {
        Ok(Some(assignment)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(assignment, "作业更新成功")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AssignmentNotFound,
            "作业不存在",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// 删除作业，提交记录级联删除，附件目录一并清理
pub async fn delete_assignment(
    service: &AdminService,
    request: &HttpRequest,
    assignment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_assignment(assignment_id).await {
        Ok(true) => {
            remove_assignment_files(assignment_id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("作业已删除")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AssignmentNotFound,
            "作业不存在",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
