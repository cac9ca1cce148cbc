use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::services::VideoService;
use crate::utils::SafeIDI64;

// 懒加载的全局 VideoService 实例
static VIDEO_SERVICE: Lazy<VideoService> = Lazy::new(VideoService::new_lazy);

pub async fn list_videos(req: HttpRequest) -> ActixResult<HttpResponse> {
    VIDEO_SERVICE.list_videos(&req).await
}

// 影片详情，过期后跳转首页
pub async fn get_video(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    VIDEO_SERVICE.get_video(&req, path.0).await
}

pub async fn stream_video(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    VIDEO_SERVICE.stream_video(&req, path.0).await
}

// 配置路由
pub fn configure_video_routes(cfg: &mut web::ServiceConfig) {
    // 页面路径
    cfg.service(
        web::scope("/videos")
            .wrap(middlewares::RequireJWT)
            .route("/", web::get().to(list_videos))
            .route("/{id}", web::get().to(get_video)),
    );
    cfg.service(
        web::scope("/api/v1/videos")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_videos))
            .route("/{id}", web::get().to(get_video))
            .route("/{id}/stream", web::get().to(stream_video)),
    );
}
