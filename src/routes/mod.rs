pub mod admin;

pub mod assignments;

pub mod auth;

pub mod courses;

pub mod oauth;

pub mod submissions;

pub mod videos;

pub use admin::configure_admin_routes;
pub use assignments::configure_assignment_routes;
pub use auth::configure_auth_routes;
pub use courses::configure_course_routes;
pub use oauth::configure_oauth_routes;
pub use submissions::configure_submission_routes;
pub use videos::configure_video_routes;

use actix_web::{guard::GuardContext, http::header::CONTENT_TYPE, web};

/// 表单上传（multipart/form-data）的请求
pub(crate) fn is_multipart(ctx: &GuardContext) -> bool {
    ctx.head()
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

/// 注册全部路由
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_auth_routes)
        .configure(configure_oauth_routes)
        .configure(configure_admin_routes)
        .configure(configure_course_routes)
        .configure(configure_assignment_routes)
        .configure(configure_submission_routes)
        .configure(configure_video_routes);
}
