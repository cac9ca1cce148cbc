use actix_web::HttpResponse;
use std::sync::Arc;

use crate::models::users::entities::{User, UserStatus};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;
use crate::utils::jwt::TokenPair;

/// 为已验证身份的用户开启会话：检查状态、记录登录时间并签发令牌对
///
/// 密码登录与第三方登录共用。
pub(crate) async fn start_session(
    storage: &Arc<dyn Storage>,
    user: &User,
) -> Result<TokenPair, HttpResponse> {
    if user.status != UserStatus::Active {
        return Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::UserInactive,
            "Account is not active",
        )));
    }

    // 登录时间只用于展示，写入失败不影响登录
    if let Err(e) = storage.update_last_login(user.id).await {
        tracing::warn!("Failed to update last login for {}: {}", user.id, e);
    }

    user.generate_token_pair().map_err(|e| {
        tracing::error!("Failed to generate JWT token for {}: {}", user.id, e);
        HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::InternalServerError,
            "Login failed, unable to generate token",
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::requests::UpdateUserRequest;
    use crate::storage::sea_orm_storage::{SeaOrmStorage, users::tests::new_user};
    use actix_web::http::StatusCode;

    #[tokio::test]
    async fn test_active_user_gets_tokens_and_last_login() {
        let storage: Arc<dyn Storage> =
            Arc::new(SeaOrmStorage::in_memory().await.expect("storage"));
        let user = storage
            .create_user(new_user("b0912345@school.edu"))
            .await
            .expect("user");

        let pair = start_session(&storage, &user).await.expect("session");
        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());

        let reloaded = storage
            .get_user_by_id(user.id)
            .await
            .expect("query")
            .expect("exists");
        assert!(reloaded.last_login.is_some());
    }

    #[tokio::test]
    async fn test_inactive_user_is_forbidden() {
        let storage: Arc<dyn Storage> =
            Arc::new(SeaOrmStorage::in_memory().await.expect("storage"));
        let user = storage
            .create_user(new_user("b0912345@school.edu"))
            .await
            .expect("user");
        let user = storage
            .update_user(
                user.id,
                UpdateUserRequest {
                    status: Some(UserStatus::Suspended),
                    ..Default::default()
                },
            )
            .await
            .expect("update")
            .expect("exists");

        let resp = start_session(&storage, &user).await.expect_err("inactive");
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
