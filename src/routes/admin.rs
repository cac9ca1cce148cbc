use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RateLimit};
use crate::models::assignments::requests::{
    AssignmentListParams, CreateAssignmentRequest, UpdateAssignmentRequest,
};
use crate::models::courses::requests::{CreateCourseRequest, UpdateCourseRequest};
use crate::models::oauth::requests::{
    CreateOAuthConfigRequest, OAuthUserListParams, UpdateOAuthConfigRequest,
};
use crate::models::submissions::requests::SubmissionListParams;
use crate::models::users::entities::UserRole;
use crate::services::{AdminService, SubmissionService};
use crate::utils::SafeIDI64;

// 懒加载的全局 AdminService 实例
static ADMIN_SERVICE: Lazy<AdminService> = Lazy::new(AdminService::new_lazy);
static SUBMISSION_SERVICE: Lazy<SubmissionService> = Lazy::new(SubmissionService::new_lazy);

// 课程
pub async fn create_course(
    req: HttpRequest,
    body: web::Json<CreateCourseRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.create_course(&req, body.into_inner()).await
}

pub async fn update_course(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateCourseRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .update_course(&req, path.0, body.into_inner())
        .await
}

pub async fn delete_course(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.delete_course(&req, path.0).await
}

// 作业
pub async fn list_assignments(
    req: HttpRequest,
    query: web::Query<AssignmentListParams>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .list_assignments(&req, query.into_inner().into())
        .await
}

pub async fn create_assignment(
    req: HttpRequest,
    body: web::Json<CreateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.create_assignment(&req, body.into_inner()).await
}

pub async fn update_assignment(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .update_assignment(&req, path.0, body.into_inner())
        .await
}

pub async fn delete_assignment(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.delete_assignment(&req, path.0).await
}

// 作业的全部提交
pub async fn list_submissions(
    req: HttpRequest,
    path: SafeIDI64,
    query: web::Query<SubmissionListParams>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .list_submissions(&req, path.0, query.into_inner())
        .await
}

// 影片
pub async fn upload_video(req: HttpRequest, payload: Multipart) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.upload_video(&req, payload).await
}

pub async fn delete_video(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.delete_video(&req, path.0).await
}

// 第三方登录
pub async fn list_oauth_configs(req: HttpRequest) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.list_oauth_configs(&req).await
}

pub async fn create_oauth_config(
    req: HttpRequest,
    body: web::Json<CreateOAuthConfigRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .create_oauth_config(&req, body.into_inner())
        .await
}

pub async fn get_oauth_config(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.get_oauth_config(&req, path.0).await
}

pub async fn update_oauth_config(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateOAuthConfigRequest>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE
        .update_oauth_config(&req, path.0, body.into_inner())
        .await
}

pub async fn delete_oauth_config(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.delete_oauth_config(&req, path.0).await
}

pub async fn list_oauth_users(
    req: HttpRequest,
    query: web::Query<OAuthUserListParams>,
) -> ActixResult<HttpResponse> {
    ADMIN_SERVICE.list_oauth_users(&req, query.into_inner()).await
}

// 配置路由
pub fn configure_admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/admin")
            // 先认证再校验角色：wrap 的顺序与执行顺序相反
            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
            .wrap(middlewares::RequireJWT)
            .route("/courses", web::post().to(create_course))
            .service(
                web::resource("/courses/{id}")
                    .route(web::put().to(update_course))
                    .route(web::delete().to(delete_course)),
            )
            .service(
                web::resource("/assignments")
                    .route(web::get().to(list_assignments))
                    .route(web::post().to(create_assignment)),
            )
            .service(
                web::resource("/assignments/{id}")
                    .route(web::put().to(update_assignment))
                    .route(web::delete().to(delete_assignment)),
            )
            .route(
                "/assignments/{id}/submissions",
                web::get().to(list_submissions),
            )
            .service(
                web::resource("/videos")
                    .wrap(RateLimit::file_upload())
                    .route(web::post().to(upload_video)),
            )
            .route("/videos/{id}", web::delete().to(delete_video))
            .service(
                web::resource("/oauth/configs")
                    .route(web::get().to(list_oauth_configs))
                    .route(web::post().to(create_oauth_config)),
            )
            .service(
                web::resource("/oauth/configs/{id}")
                    .route(web::get().to(get_oauth_config))
                    .route(web::put().to(update_oauth_config))
                    .route(web::delete().to(delete_oauth_config)),
            )
            .route("/oauth/users", web::get().to(list_oauth_users)),
    );
}
