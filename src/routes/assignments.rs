use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, guard, web};
use once_cell::sync::Lazy;

use super::is_multipart;
use crate::middlewares::{self, RateLimit};
use crate::models::assignments::requests::AssignmentListParams;
use crate::models::submissions::requests::SubmissionContentRequest;
use crate::services::AssignmentService;
use crate::services::assignments::SubmissionPayload;
use crate::utils::SafeIDI64;

// 懒加载的全局 AssignmentService 实例
static ASSIGNMENT_SERVICE: Lazy<AssignmentService> = Lazy::new(AssignmentService::new_lazy);

// 列出作业，附带当前学生的提交状态
pub async fn list_assignments(
    req: HttpRequest,
    query: web::Query<AssignmentListParams>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .list_assignments(&req, query.into_inner().into())
        .await
}

// 作业详情
pub async fn get_assignment(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.get_assignment(&req, path.0).await
}

// 当前学生在该作业下的提交
pub async fn get_own_submission(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.get_own_submission(&req, path.0).await
}

// 表单提交（可带附件）
pub async fn submit_form(
    req: HttpRequest,
    path: SafeIDI64,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .submit(&req, path.0, SubmissionPayload::Form(payload))
        .await
}

// JSON 提交
pub async fn submit_json(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<SubmissionContentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .submit(&req, path.0, SubmissionPayload::Json(body.into_inner()))
        .await
}

// 修改已有提交（表单）
pub async fn update_form(
    req: HttpRequest,
    path: SafeIDI64,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .update_submission(&req, path.0, SubmissionPayload::Form(payload))
        .await
}

// 修改已有提交（JSON）
pub async fn update_json(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<SubmissionContentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .update_submission(&req, path.0, SubmissionPayload::Json(body.into_inner()))
        .await
}

// 删除自己的提交
pub async fn delete_submission(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.delete_submission(&req, path.0).await
}

// 配置路由
pub fn configure_assignment_routes(cfg: &mut web::ServiceConfig) {
    // 页面路径：GET 取视图数据，POST 提交表单
    cfg.service(
        web::scope("/assignment")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_assignments))
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_assignment))
                    .route(web::post().to(submit_form).wrap(RateLimit::file_upload())),
            )
            .service(
                web::resource("/upload/{id}")
                    .route(web::get().to(get_assignment))
                    .route(web::post().to(submit_form).wrap(RateLimit::file_upload())),
            )
            .service(
                web::resource("/update/{id}")
                    .route(web::get().to(get_own_submission))
                    .route(web::post().to(update_form).wrap(RateLimit::file_upload())),
            )
            .service(
                web::resource("/delete/{id}")
                    // 删除确认页
                    .route(web::get().to(get_own_submission))
                    .route(web::post().to(delete_submission)),
            ),
    );

    cfg.service(
        web::scope("/api/v1/assignments")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_assignments))
            .route("/{id}", web::get().to(get_assignment))
            .service(
                web::resource("/{id}/submission")
                    .route(web::get().to(get_own_submission))
                    .route(
                        web::post()
                            .guard(guard::fn_guard(is_multipart))
                            .to(submit_form)
                            .wrap(RateLimit::file_upload()),
                    )
                    .route(web::post().to(submit_json))
                    .route(
                        web::put()
                            .guard(guard::fn_guard(is_multipart))
                            .to(update_form)
                            .wrap(RateLimit::file_upload()),
                    )
                    .route(web::put().to(update_json))
                    .route(web::delete().to(delete_submission)),
            ),
    );
}
