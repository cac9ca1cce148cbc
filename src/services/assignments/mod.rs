pub mod delete;
pub mod detail;
pub mod list;
pub mod submit;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::assignments::{entities::Assignment, requests::AssignmentListQuery};
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, error_response};
use crate::storage::Storage;
use crate::utils::identity::resolve_student_id;

pub use submit::SubmissionPayload;

pub struct AssignmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssignmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    /// 作业列表，附带当前学生的提交状态
    pub async fn list_assignments(
        &self,
        request: &HttpRequest,
        query: AssignmentListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_assignments(self, request, query).await
    }

    /// 作业详情与当前学生的提交
    pub async fn get_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_assignment(self, request, assignment_id).await
    }

    /// 当前学生在该作业下的提交，不存在时 404
    pub async fn get_own_submission(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_own_submission(self, request, assignment_id).await
    }

    /// 新建或覆盖提交
    pub async fn submit(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        payload: SubmissionPayload,
    ) -> ActixResult<HttpResponse> {
        submit::submit(self, request, assignment_id, payload, false).await
    }

    /// 修改已有提交，没有提交时 404
    pub async fn update_submission(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        payload: SubmissionPayload,
    ) -> ActixResult<HttpResponse> {
        submit::submit(self, request, assignment_id, payload, true).await
    }

    pub async fn delete_submission(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_submission(self, request, assignment_id).await
    }
}

/// 当前用户及其学号
pub(crate) fn current_student(request: &HttpRequest) -> Result<(User, String), HttpResponse> {
    let user = current_user(request)?;
    match resolve_student_id(&user.username) {
        Ok(student_id) => Ok((user, student_id)),
        Err(e) => Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::StudentIdInvalid,
            e.message(),
        ))),
    }
}

/// 查询作业，不存在时给出 404 响应
pub(crate) async fn find_assignment(
    storage: &Arc<dyn Storage>,
    assignment_id: i64,
) -> Result<Assignment, HttpResponse> {
    match storage.get_assignment_by_id(assignment_id).await {
        Ok(Some(assignment)) => Ok(assignment),
        Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AssignmentNotFound,
            "Assignment not found",
        ))),
        Err(e) => Err(error_response(&e)),
    }
}
