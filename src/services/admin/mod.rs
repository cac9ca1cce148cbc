//! 管理端：课程、作业、影片与第三方登录配置
//!
//! 路由层已通过 RequireRole 限定为管理员，这里不再重复检查角色。

pub mod assignments;
pub mod courses;
pub mod oauth;
pub mod videos;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::assignments::requests::{
    AssignmentListQuery, CreateAssignmentRequest, UpdateAssignmentRequest,
};
use crate::models::courses::requests::{CreateCourseRequest, UpdateCourseRequest};
use crate::models::oauth::requests::{
    CreateOAuthConfigRequest, OAuthUserListParams, UpdateOAuthConfigRequest,
};
use crate::oauth::OAuthRegistry;
use crate::storage::Storage;

pub struct AdminService {
    storage: Option<Arc<dyn Storage>>,
}

impl AdminService {
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

    pub(crate) fn get_registry(&self, request: &HttpRequest) -> OAuthRegistry {
        request
            .app_data::<actix_web::web::Data<OAuthRegistry>>()
            .expect("OAuthRegistry not found in app data")
            .get_ref()
            .clone()
    }

    // 课程
    pub async fn create_course(
        &self,
        request: &HttpRequest,
        req: CreateCourseRequest,
    ) -> ActixResult<HttpResponse> {
        courses::create_course(self, request, req).await
    }

    pub async fn update_course(
        &self,
        request: &HttpRequest,
        course_id: i64,
        req: UpdateCourseRequest,
    ) -> ActixResult<HttpResponse> {
        courses::update_course(self, request, course_id, req).await
    }

    pub async fn delete_course(
        &self,
        request: &HttpRequest,
        course_id: i64,
    ) -> ActixResult<HttpResponse> {
        courses::delete_course(self, request, course_id).await
    }

    // 作业
    pub async fn list_assignments(
        &self,
        request: &HttpRequest,
        query: AssignmentListQuery,
    ) -> ActixResult<HttpResponse> {
        assignments::list_assignments(self, request, query).await
    }

    pub async fn create_assignment(
        &self,
        request: &HttpRequest,
        req: CreateAssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        assignments::create_assignment(self, request, req).await
    }

    pub async fn update_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        req: UpdateAssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        assignments::update_assignment(self, request, assignment_id, req).await
    }

    pub async fn delete_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        assignments::delete_assignment(self, request, assignment_id).await
    }

    // 影片
    pub async fn upload_video(
        &self,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        videos::upload_video(self, request, payload).await
    }

    pub async fn delete_video(
        &self,
        request: &HttpRequest,
        video_id: i64,
    ) -> ActixResult<HttpResponse> {
        videos::delete_video(self, request, video_id).await
    }

    // 第三方登录
    pub async fn list_oauth_configs(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        oauth::list_configs(self, request).await
    }

    pub async fn get_oauth_config(
        &self,
        request: &HttpRequest,
        config_id: i64,
    ) -> ActixResult<HttpResponse> {
        oauth::get_config(self, request, config_id).await
    }

    pub async fn create_oauth_config(
        &self,
        request: &HttpRequest,
        req: CreateOAuthConfigRequest,
    ) -> ActixResult<HttpResponse> {
        oauth::create_config(self, request, req).await
    }

    pub async fn update_oauth_config(
        &self,
        request: &HttpRequest,
        config_id: i64,
        req: UpdateOAuthConfigRequest,
    ) -> ActixResult<HttpResponse> {
        oauth::update_config(self, request, config_id, req).await
    }

    pub async fn delete_oauth_config(
        &self,
        request: &HttpRequest,
        config_id: i64,
    ) -> ActixResult<HttpResponse> {
        oauth::delete_config(self, request, config_id).await
    }

    pub async fn list_oauth_users(
        &self,
        request: &HttpRequest,
        params: OAuthUserListParams,
    ) -> ActixResult<HttpResponse> {
        oauth::list_users(self, request, params).await
    }
}

/// 删除作业的附件目录
pub(crate) async fn remove_assignment_files(assignment_id: i64) {
    let dir = crate::services::files::resolve_path(&format!("assignment/{assignment_id}"));
    if let Err(e) = tokio::fs::remove_dir_all(&dir).await
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!("Failed to remove {}: {}", dir.display(), e);
    }
}
