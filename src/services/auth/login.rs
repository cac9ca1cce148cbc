use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::users::entities::User;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::{LoginRequest, LoginResponse},
};
use crate::storage::Storage;
use crate::utils::identity::student_id_from_login;
use crate::utils::jwt::JwtUtils;
use crate::utils::password::verify_password;

use super::AuthService;
use super::session::start_session;

fn invalid_credentials() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(
        ErrorCode::AuthFailed,
        "Username or password is incorrect",
    ))
}

/// 按登录名或邮箱查找用户并校验密码；用户不存在与密码错误返回同样的响应
async fn authenticate(
    storage: &Arc<dyn Storage>,
    login_request: &LoginRequest,
) -> Result<User, HttpResponse> {
    let user = storage
        .get_user_by_username_or_email(login_request.username.trim())
        .await
        .map_err(|e| {
            tracing::error!("Login lookup failed: {}", e);
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                "Login failed",
            ))
        })?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(&login_request.password, &user.password_hash) {
        return Err(invalid_credentials());
    }
    Ok(user)
}

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let config = service.get_config();

    let user = match authenticate(&storage, &login_request).await {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let token_pair = match start_session(&storage, &user).await {
        Ok(pair) => pair,
        Err(resp) => return Ok(resp),
    };

    tracing::info!("User {} logged in successfully", user.username);

    let student_id =
        student_id_from_login(&user.username, &config.auth.student_id_separator).to_string();
    let access_cookie = JwtUtils::create_access_token_cookie(&token_pair.access_token);
    let refresh_cookie = JwtUtils::create_refresh_token_cookie(&token_pair.refresh_token);
    let response = LoginResponse {
        access_token: token_pair.access_token,
        // 配置以分钟计，响应以秒计
        expires_in: config.jwt.access_token_expiry * 60,
        user,
        student_id,
        created_at: chrono::Utc::now(),
    };

    Ok(HttpResponse::Ok()
        .cookie(access_cookie)
        .cookie(refresh_cookie)
        .json(ApiResponse::success(response, "Login successful")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::{entities::UserRole, requests::CreateUserRequest};
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::utils::password::hash_password;
    use actix_web::{App, http::StatusCode, test, web};

    async fn login(req: HttpRequest, body: web::Json<LoginRequest>) -> ActixResult<HttpResponse> {
        AuthService::new_lazy().login(body.into_inner(), &req).await
    }

    async fn storage_with_user() -> Arc<dyn Storage> {
        let storage: Arc<dyn Storage> =
            Arc::new(SeaOrmStorage::in_memory().await.expect("storage"));
        storage
            .create_user(CreateUserRequest {
                username: "b0912345@school.edu".to_string(),
                email: "b0912345@school.edu".to_string(),
                password: hash_password("Secret123").expect("hash"),
                role: UserRole::User,
                display_name: None,
            })
            .await
            .expect("user");
        storage
    }

    #[actix_web::test]
    async fn test_login_returns_token_and_student_id() {
        let storage = storage_with_user().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage))
                .route("/login", web::post().to(login)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(serde_json::json!({
                "username": "b0912345@school.edu",
                "password": "Secret123"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        for name in [
            crate::utils::jwt::ACCESS_TOKEN_COOKIE,
            crate::utils::jwt::REFRESH_TOKEN_COOKIE,
        ] {
            assert!(
                resp.response()
                    .cookies()
                    .any(|c| c.name() == name && c.http_only() == Some(true))
            );
        }
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["student_id"], "b0912345");
        assert!(body["data"]["access_token"].as_str().is_some());
    }

    #[actix_web::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let storage = storage_with_user().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage))
                .route("/login", web::post().to(login)),
        )
        .await;

        for (username, password) in [
            ("b0912345@school.edu", "wrong"),
            ("nobody@school.edu", "Secret123"),
        ] {
            let req = test::TestRequest::post()
                .uri("/login")
                .set_json(serde_json::json!({ "username": username, "password": password }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body["code"], ErrorCode::AuthFailed as i32);
        }
    }
}
