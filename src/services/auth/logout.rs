use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::RequireJWT;
use crate::models::ApiResponse;
use crate::utils::jwt::JwtUtils;

use super::AuthService;

/// 处理用户登出
///
/// 清除会话 cookie，并丢弃该 access token 对应的用户缓存。
pub async fn handle_logout(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let token = JwtUtils::extract_access_token(request);

    if let (Some(token), Some(cache)) = (token, service.get_cache(request)) {
        RequireJWT::forget_token(&cache, &token).await;
    }

    // max_age=0 会让浏览器删除 cookie
    let [access_cookie, refresh_cookie] = JwtUtils::create_empty_session_cookies();

    Ok(HttpResponse::Ok()
        .cookie(access_cookie)
        .cookie(refresh_cookie)
        .json(ApiResponse::<()>::success_empty("登出成功")))
}
