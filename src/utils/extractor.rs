//! 路径参数提取器
//!
//! 在进入处理函数之前校验路径参数，非法值直接返回 400。

use actix_web::{
    Error, FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError,
};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode, oauth::entities::OAuthProviderType};

fn bad_path(message: String) -> Error {
    let response =
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, &message));
    InternalError::from_response(message, response).into()
}

/// 路径中的 `{id}`，必须为正整数
#[derive(Debug, Clone, Copy)]
pub struct SafeIDI64(pub i64);

impl FromRequest for SafeIDI64 {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let raw = req.match_info().get("id").unwrap_or_default();
        ready(match raw.parse::<i64>() {
            Ok(id) if id > 0 => Ok(SafeIDI64(id)),
            _ => Err(bad_path(format!("无效的 ID: '{raw}'"))),
        })
    }
}

/// 路径中的 `{provider}`，必须是已实现的 OAuth 提供方
#[derive(Debug, Clone)]
pub struct SafeProviderType(pub OAuthProviderType);

impl FromRequest for SafeProviderType {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let raw = req.match_info().get("provider").unwrap_or_default();
        ready(
            raw.parse::<OAuthProviderType>()
                .map(SafeProviderType)
                .map_err(|_| bad_path(format!("未知的登录方式: '{raw}'"))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_safe_id_accepts_positive() {
        let req = TestRequest::default().param("id", "42").to_http_request();
        let id = SafeIDI64::extract(&req).await.expect("valid id");
        assert_eq!(id.0, 42);
    }

    #[actix_web::test]
    async fn test_safe_id_rejects_garbage() {
        for raw in ["0", "-1", "abc", ""] {
            let req = TestRequest::default().param("id", raw).to_http_request();
            assert!(SafeIDI64::extract(&req).await.is_err(), "{raw} should be rejected");
        }
    }

    #[actix_web::test]
    async fn test_safe_provider_type() {
        let req = TestRequest::default()
            .param("provider", "google")
            .to_http_request();
        let provider = SafeProviderType::extract(&req).await.expect("google");
        assert_eq!(provider.0, OAuthProviderType::Google);

        let req = TestRequest::default()
            .param("provider", "myspace")
            .to_http_request();
        assert!(SafeProviderType::extract(&req).await.is_err());
    }
}
