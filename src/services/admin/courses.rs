use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AdminService, remove_assignment_files};
use crate::models::courses::requests::{CreateCourseRequest, UpdateCourseRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;
use crate::utils::validate::validate_length;

pub const COURSE_NAME_MAX_CHARS: usize = 30;

pub async fn create_course(
    service: &AdminService,
    request: &HttpRequest,
    mut req: CreateCourseRequest,
) -> ActixResult<HttpResponse> {
    req.name = req.name.trim().to_string();
    if let Err(msg) = validate_length("name", &req.name, 1, COURSE_NAME_MAX_CHARS) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::CourseInvalid, msg)));
    }

    let storage = service.get_storage(request);
    match storage.create_course(req).await {
        Ok(course) => {
            tracing::info!("Created course {} ({})", course.id, course.name);
            Ok(HttpResponse::Created().json(ApiResponse::success(course, "课程创建成功")))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn update_course(
    service: &AdminService,
    request: &HttpRequest,
    course_id: i64,
    mut req: UpdateCourseRequest,
) -> ActixResult<HttpResponse> {
    if let Some(name) = req.name.as_mut() {
        *name = name.trim().to_string();
        if let Err(msg) = validate_length("name", name, 1, COURSE_NAME_MAX_CHARS) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::CourseInvalid, msg)));
        }
    }

    let storage = service.get_storage(request);
    match storage.update_course(course_id, req).await {
        Ok(Some(course)) => Ok(HttpResponse::Ok().json(ApiResponse::success(course, "课程更新成功"))),
        Ok(None) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::CourseNotFound, "课程不存在"))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// 删除课程，其下作业与提交随之删除
pub async fn delete_course(
    service: &AdminService,
    request: &HttpRequest,
    course_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    // 先记下作业，删除后用于清理附件目录
    let assignments = match storage.list_course_assignments(course_id).await {
        Ok(assignments) => assignments,
        Err(e) => return Ok(error_response(&e)),
    };

    match storage.delete_course(course_id).await {
        Ok(true) => {
            for assignment in &assignments {
                remove_assignment_files(assignment.id).await;
            }
            tracing::info!(
                "Deleted course {} with {} assignment(s)",
                course_id,
                assignments.len()
            );
            Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("课程已删除")))
        }
        Ok(false) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::CourseNotFound, "课程不存在"))),
        Err(e) => Ok(error_response(&e)),
    }
}
