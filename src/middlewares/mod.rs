pub mod rate_limit;
pub mod require_jwt;
pub mod require_role;

pub use rate_limit::RateLimit;
pub use require_jwt::RequireJWT;
pub use require_role::RequireRole;

use actix_web::{
    HttpResponse,
    dev::ServiceRequest,
    http::{
        StatusCode,
        header::{ACCEPT, CONTENT_TYPE, LOCATION},
    },
};

use crate::config::AppConfig;
use crate::models::{ApiResponse, ErrorCode};

// 辅助函数：创建错误响应
pub(crate) fn create_error_response(
    status: StatusCode,
    code: ErrorCode,
    message: &str,
) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .json(ApiResponse::<()>::error_empty(code, message))
}

/// 请求方是否期望 HTML（浏览器页面跳转）
pub(crate) fn wants_html(req: &actix_web::HttpRequest) -> bool {
    req.headers()
        .get(ACCEPT)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// 登录页地址，附带原始路径
pub(crate) fn login_redirect_location(next: &str) -> String {
    let auth = &AppConfig::get().auth;
    let Ok(mut url) = reqwest::Url::parse("http://localhost/").and_then(|u| u.join(&auth.login_path))
    else {
        return auth.login_path.clone();
    };
    url.query_pairs_mut().append_pair(&auth.redirect_field, next);
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

// 未登录：浏览器跳转登录页，接口返回 401
pub(crate) fn unauthenticated_response(req: &ServiceRequest, message: &str) -> HttpResponse {
    if wants_html(req.request()) {
        let next = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        HttpResponse::Found()
            .insert_header((LOCATION, login_redirect_location(next)))
            .finish()
    } else {
        create_error_response(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_encodes_next() {
        assert_eq!(
            login_redirect_location("/assignment/5?tab=files"),
            "/login?next=%2Fassignment%2F5%3Ftab%3Dfiles"
        );
    }

    #[test]
    fn test_wants_html() {
        let req = actix_web::test::TestRequest::default()
            .insert_header((ACCEPT, "text/html,application/xhtml+xml"))
            .to_http_request();
        assert!(wants_html(&req));

        let req = actix_web::test::TestRequest::default()
            .insert_header((ACCEPT, "application/json"))
            .to_http_request();
        assert!(!wants_html(&req));
    }
}
