use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::RateLimit;
use crate::models::oauth::requests::{AuthorizeQuery, CallbackQuery};
use crate::services::OAuthService;
use crate::utils::SafeProviderType;

// 懒加载的全局 OAuthService 实例
static OAUTH_SERVICE: Lazy<OAuthService> = Lazy::new(OAuthService::new_lazy);

// 登录页可用的第三方登录方式
pub async fn list_providers(req: HttpRequest) -> ActixResult<HttpResponse> {
    OAUTH_SERVICE.list_providers(&req).await
}

pub async fn authorize(
    req: HttpRequest,
    provider: SafeProviderType,
    query: web::Query<AuthorizeQuery>,
) -> ActixResult<HttpResponse> {
    OAUTH_SERVICE
        .authorize(&req, provider.0, query.into_inner())
        .await
}

pub async fn callback(
    req: HttpRequest,
    provider: SafeProviderType,
    query: web::Query<CallbackQuery>,
) -> ActixResult<HttpResponse> {
    OAUTH_SERVICE
        .callback(&req, provider.0, query.into_inner())
        .await
}

// 配置路由
pub fn configure_oauth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/oauth")
            .route("/providers", web::get().to(list_providers))
            .route("/{provider}/authorize", web::get().to(authorize))
            .service(
                web::resource("/{provider}/callback")
                    .wrap(RateLimit::oauth_callback())
                    .route(web::get().to(callback)),
            ),
    );
}
