use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};

use super::{OAuthService, login_state_cookie, safe_next_url};
use crate::errors::CourseHubError;
use crate::models::oauth::{entities::OAuthProviderType, requests::AuthorizeQuery};
use crate::oauth::registry::LOGIN_STATE_TTL_SECS;
use crate::services::error_response;

pub async fn authorize(
    service: &OAuthService,
    request: &HttpRequest,
    provider_type: OAuthProviderType,
    query: AuthorizeQuery,
) -> ActixResult<HttpResponse> {
    let registry = service.get_registry(request);
    let next_url = safe_next_url(query.next_url.as_deref());

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

    let state = registry.begin_login(provider_type, &next_url).await;

    match provider.authorization_url(&state) {
        Ok(url) => Ok(HttpResponse::Found()
            .cookie(login_state_cookie(&state, LOGIN_STATE_TTL_SECS as i64))
            .insert_header((header::LOCATION, url))
            .finish()),
        Err(e) => Ok(error_response(&e)),
    }
}
