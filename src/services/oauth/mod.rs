pub mod authorize;
pub mod callback;
pub mod providers;

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;

use crate::models::oauth::{
    entities::OAuthProviderType,
    requests::{AuthorizeQuery, CallbackQuery},
};
use crate::oauth::OAuthRegistry;
use crate::storage::Storage;

pub struct OAuthService {
    storage: Option<Arc<dyn Storage>>,
}

impl OAuthService {
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

    /// 已启用的登录方式
    pub async fn list_providers(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        providers::list_providers(self, request).await
    }

    /// 跳转到提供方授权页
    pub async fn authorize(
        &self,
        request: &HttpRequest,
        provider_type: OAuthProviderType,
        query: AuthorizeQuery,
    ) -> ActixResult<HttpResponse> {
        authorize::authorize(self, request, provider_type, query).await
    }

    /// 提供方回调：换取令牌、写入第三方用户并登录
    pub async fn callback(
        &self,
        request: &HttpRequest,
        provider_type: OAuthProviderType,
        query: CallbackQuery,
    ) -> ActixResult<HttpResponse> {
        callback::callback(self, request, provider_type, query).await
    }
}

/// 把登录 state 绑定到发起登录的浏览器
pub const LOGIN_STATE_COOKIE: &str = "oauth_state";
const LOGIN_STATE_COOKIE_PATH: &str = "/api/v1/oauth";

/// `max_age` 为 0 时删除 Cookie
pub(crate) fn login_state_cookie(state: &str, max_age: i64) -> Cookie<'static> {
    Cookie::build(LOGIN_STATE_COOKIE, state.to_string())
        .path(LOGIN_STATE_COOKIE_PATH)
        .max_age(Duration::seconds(max_age))
        .same_site(SameSite::Lax)
        .http_only(true)
        .secure(AppConfig::get().is_production())
        .finish()
}

/// 登录后的跳转地址只允许站内相对路径
pub fn safe_next_url(next_url: Option<&str>) -> String {
    match next_url.map(str::trim) {
        Some(next)
            if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') =>
        {
            next.to_string()
        }
        _ => "/".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next_url() {
        assert_eq!(safe_next_url(Some("/assignment/3")), "/assignment/3");
        assert_eq!(safe_next_url(None), "/");
        assert_eq!(safe_next_url(Some("")), "/");
        assert_eq!(safe_next_url(Some("https://evil.example")), "/");
        assert_eq!(safe_next_url(Some("//evil.example")), "/");
        assert_eq!(safe_next_url(Some("/\\evil.example")), "/");
    }
}
