use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::OAuthService;
use crate::models::ApiResponse;
use crate::models::oauth::responses::{OAuthProviderInfo, OAuthProviderListResponse};
use crate::services::error_response;

pub async fn list_providers(
    service: &OAuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let registry = service.get_registry(request);

    match registry.enabled_providers().await {
        Ok(types) => {
            let items = types
                .into_iter()
                .map(|t| OAuthProviderInfo {
                    provider_type: t.as_str().to_string(),
                    name: t.label().to_string(),
                    authorize_url: format!("/api/v1/oauth/{}/authorize", t.as_str()),
                })
                .collect();
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                OAuthProviderListResponse { items },
                "查询成功",
            )))
        }
        Err(e) => Ok(error_response(&e)),
    }
}
