use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AdminService;
use crate::models::oauth::{
    requests::{CreateOAuthConfigRequest, OAuthUserListParams, UpdateOAuthConfigRequest},
    responses::OAuthConfigListResponse,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

fn invalid(msg: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::OAuthConfigInvalid, msg))
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::OAuthConfigNotFound,
        "登录配置不存在",
    ))
}

pub async fn list_configs(
    service: &AdminService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    match storage.list_oauth_configs().await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            OAuthConfigListResponse { items },
            "查询成功",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn get_config(
    service: &AdminService,
    request: &HttpRequest,
    config_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    match storage.get_oauth_config_by_id(config_id).await {
        Ok(Some(config)) => Ok(HttpResponse::Ok().json(ApiResponse::success(config, "查询成功"))),
        Ok(None) => Ok(not_found()),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn create_config(
    service: &AdminService,
    request: &HttpRequest,
    req: CreateOAuthConfigRequest,
) -> ActixResult<HttpResponse> {
    if req.app_key.trim().is_empty() || req.app_secret.trim().is_empty() {
        return Ok(invalid("app_key and app_secret must not be empty"));
    }

    let storage = service.get_storage(request);
    match storage.create_oauth_config(req).await {
        Ok(config) => {
            // 配置变更后下一次登录重新读取
            service.get_registry(request).invalidate().await;
            tracing::info!("Created {} login config {}", config.provider_type, config.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(config, "登录配置已创建")))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn update_config(
    service: &AdminService,
    request: &HttpRequest,
    config_id: i64,
    req: UpdateOAuthConfigRequest,
) -> ActixResult<HttpResponse> {
    let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
    if blank(&req.app_key) || blank(&req.app_secret) {
        return Ok(invalid("app_key and app_secret must not be empty"));
    }

    let storage = service.get_storage(request);
    match storage.update_oauth_config(config_id, req).await {
        Ok(Some(config)) => {
            service.get_registry(request).invalidate().await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(config, "登录配置已更新")))
        }
        Ok(None) => Ok(not_found()),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn delete_config(
    service: &AdminService,
    request: &HttpRequest,
    config_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    match storage.delete_oauth_config(config_id).await {
        Ok(true) => {
            service.get_registry(request).invalidate().await;
            Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("登录配置已删除")))
        }
        Ok(false) => Ok(not_found()),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn list_users(
    service: &AdminService,
    request: &HttpRequest,
    params: OAuthUserListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    match storage.list_oauth_users(params).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response, "查询成功"))),
        Err(e) => Ok(error_response(&e)),
    }
}
