pub mod admin;
pub mod assignments;
pub mod auth;
pub mod courses;
pub mod files;
pub mod oauth;
pub mod submissions;
pub mod videos;

pub use admin::AdminService;
pub use assignments::AssignmentService;
pub use auth::AuthService;
pub use courses::CourseService;
pub use oauth::OAuthService;
pub use submissions::SubmissionService;
pub use videos::VideoService;

use actix_web::{HttpRequest, HttpResponse};

use crate::errors::CourseHubError;
use crate::middlewares::RequireJWT;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};

/// 业务错误到 HTTP 响应的统一映射
pub(crate) fn error_response(err: &CourseHubError) -> HttpResponse {
    match err {
        CourseHubError::Validation(msg) => {
            HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, msg))
        }
        CourseHubError::NotFound(msg) => {
            HttpResponse::NotFound().json(ApiResponse::error_empty(ErrorCode::NotFound, msg))
        }
        CourseHubError::Authentication(msg) => HttpResponse::Unauthorized()
            .json(ApiResponse::error_empty(ErrorCode::Unauthorized, msg)),
        CourseHubError::Authorization(msg) => {
            HttpResponse::Forbidden().json(ApiResponse::error_empty(ErrorCode::Forbidden, msg))
        }
        CourseHubError::DeadlinePassed(msg) => HttpResponse::Forbidden().json(
            ApiResponse::error_empty(ErrorCode::AssignmentDeadlinePassed, msg),
        ),
        CourseHubError::DuplicateSubmission(msg) => HttpResponse::Conflict()
            .json(ApiResponse::error_empty(ErrorCode::SubmissionConflict, msg)),
        CourseHubError::OauthAccessToken(_) | CourseHubError::OauthTransport(_) => {
            tracing::warn!("OAuth login failed: {}", err);
            HttpResponse::BadGateway().json(ApiResponse::error_empty(
                ErrorCode::OAuthLoginFailed,
                "登录失败，请重试",
            ))
        }
        CourseHubError::OauthTimeout(_) => {
            tracing::warn!("OAuth provider timed out: {}", err);
            HttpResponse::GatewayTimeout().json(ApiResponse::error_empty(
                ErrorCode::OAuthTimeout,
                "第三方登录服务响应超时，请稍后重试",
            ))
        }
        CourseHubError::ExternalIdentityUnavailable(_) => {
            tracing::warn!("External identity unavailable: {}", err);
            HttpResponse::BadGateway().json(ApiResponse::error_empty(
                ErrorCode::OAuthIdentityUnavailable,
                "无法获取第三方账号信息，请重新登录",
            ))
        }
        CourseHubError::OauthProviderNotConfigured(msg) => HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::OAuthProviderNotFound, msg)),
        _ => {
            tracing::error!("{}", err);
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                "服务器内部错误",
            ))
        }
    }
}

/// 取出 RequireJWT 放入的当前用户，缺失时给出 401 响应
pub(crate) fn current_user(request: &HttpRequest) -> Result<User, HttpResponse> {
    RequireJWT::extract_user_claims(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "无法获取用户信息",
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (CourseHubError::validation("x"), StatusCode::BAD_REQUEST),
            (CourseHubError::not_found("x"), StatusCode::NOT_FOUND),
            (CourseHubError::authorization("x"), StatusCode::FORBIDDEN),
            (CourseHubError::deadline_passed("x"), StatusCode::FORBIDDEN),
            (CourseHubError::duplicate_submission("x"), StatusCode::CONFLICT),
            (CourseHubError::oauth_access_token("{}"), StatusCode::BAD_GATEWAY),
            (CourseHubError::oauth_timeout("x"), StatusCode::GATEWAY_TIMEOUT),
            (
                CourseHubError::external_identity_unavailable("x"),
                StatusCode::BAD_GATEWAY,
            ),
            (
                CourseHubError::oauth_provider_not_configured("x"),
                StatusCode::NOT_FOUND,
            ),
            (
                CourseHubError::database_operation("x"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(error_response(&err).status(), status, "{err}");
        }
    }
}
