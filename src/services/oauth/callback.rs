use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};
use std::sync::Arc;

use super::{LOGIN_STATE_COOKIE, OAuthService, login_state_cookie, safe_next_url};
use crate::errors::{CourseHubError, Result};
use crate::models::oauth::{entities::OAuthProviderType, requests::CallbackQuery};
use crate::models::users::{
    entities::{User, UserRole},
    requests::{CreateUserRequest, UpdateUserRequest},
};
use crate::models::{ApiResponse, ErrorCode};
use crate::oauth::OAuthProvider;
use crate::services::auth::session::start_session;
use crate::services::error_response;
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use crate::utils::password::unusable_password_hash;

pub async fn callback(
    service: &OAuthService,
    request: &HttpRequest,
    provider_type: OAuthProviderType,
    query: CallbackQuery,
) -> ActixResult<HttpResponse> {
    if let Some(error) = query.error.as_deref() {
        tracing::info!("{} authorization was not granted: {}", provider_type, error);
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::OAuthLoginFailed,
            "授权未完成，请重新登录",
        )));
    }
    let Some(code) = query.code.as_deref().filter(|c| !c.is_empty()) else {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "缺少授权码",
        )));
    };

    let registry = service.get_registry(request);

    // state 必须由本站签发、未被使用，并且来自发起登录的同一个浏览器
    let state = query.state.as_deref().unwrap_or_default();
    let same_browser = request
        .cookie(LOGIN_STATE_COOKIE)
        .is_some_and(|cookie| !state.is_empty() && cookie.value() == state);
    let next_url = if same_browser {
        registry.take_login(provider_type, state).await
    } else {
        None
    };
    let Some(next_url) = next_url else {
        tracing::info!("{} callback rejected: unknown login state", provider_type);
        return Ok(HttpResponse::BadRequest()
            .cookie(login_state_cookie("", 0))
            .json(ApiResponse::error_empty(
                ErrorCode::OAuthStateInvalid,
                "登录已过期，请重新登录",
            )));
    };

    let provider = match registry.get_provider(provider_type).await {
        Ok(Some(provider)) => provider,
        Ok(None) => {
            return Ok(error_response(
                &CourseHubError::oauth_provider_not_configured(format!(
                    "{provider_type} 登录未启用"
                )),
            ));
        }
        Err(e) => return Ok(error_response(&e)),
    };

    let storage = service.get_storage(request);
    let user = match complete_login(&storage, provider, code).await {
        Ok(user) => user,
        Err(e) => {
            if e.is_external() {
                tracing::warn!("{} login failed: {}", provider_type, e.format_simple());
            }
            return Ok(error_response(&e));
        }
    };

    let token_pair = match start_session(&storage, &user).await {
        Ok(pair) => pair,
        Err(resp) => return Ok(resp),
    };

    tracing::info!("User {} logged in via {}", user.username, provider_type);

    // 前端从片段中读取 access token，片段不会发回服务器
    let next_url = safe_next_url(Some(&next_url));
    let location = format!("{next_url}#access_token={}", token_pair.access_token);

    Ok(HttpResponse::Found()
        .cookie(login_state_cookie("", 0))
        .cookie(JwtUtils::create_access_token_cookie(&token_pair.access_token))
        .cookie(JwtUtils::create_refresh_token_cookie(&token_pair.refresh_token))
        .insert_header((header::LOCATION, location))
        .finish())
}

/// 用授权码完成登录，返回绑定的本地用户
///
/// 第三方用户按 (provider_type, open_id) 写入；尚未绑定时按邮箱查找本地账号，
/// 找不到则新建一个无法用密码登录的账号。只有提供方验证过的邮箱才参与关联。
pub(crate) async fn complete_login(
    storage: &Arc<dyn Storage>,
    mut provider: Box<dyn OAuthProvider>,
    code: &str,
) -> Result<User> {
    provider.exchange_code(code).await?;
    let identity = provider
        .fetch_user_info()
        .await?
        .ok_or_else(|| CourseHubError::external_identity_unavailable("无法解析用户信息"))?;

    let email = identity.email.clone();
    let email_verified = identity.email_verified;
    let nickname = identity.nickname.clone();
    let oauth_user = storage.upsert_oauth_user(identity.into_upsert()).await?;

    if let Some(user_id) = oauth_user.user_id
        && let Some(user) = storage.get_user_by_id(user_id).await?
    {
        return Ok(user);
    }

    let email = match (email, email_verified) {
        (Some(email), true) => email,
        (Some(_), false) => {
            return Err(CourseHubError::external_identity_unavailable(
                "第三方账号的邮箱尚未验证",
            ));
        }
        (None, _) => {
            return Err(CourseHubError::external_identity_unavailable(
                "第三方账号没有提供邮箱",
            ));
        }
    };

    let user = match storage.get_user_by_username_or_email(&email).await? {
        Some(user) if user.display_name.is_none() => storage
            .update_user(
                user.id,
                UpdateUserRequest {
                    display_name: Some(nickname),
                    ..Default::default()
                },
            )
            .await?
            .unwrap_or(user),
        Some(user) => user,
        None => {
            storage
                .create_user(CreateUserRequest {
                    username: email.clone(),
                    email,
                    password: unusable_password_hash()?,
                    role: UserRole::User,
                    display_name: Some(nickname),
                })
                .await?
        }
    };

    storage.link_oauth_user(oauth_user.id, user.id).await?;
    Ok(user)
}
