//! Google 登录

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use super::{ExternalIdentity, HttpTransport, OAuthProvider, ProviderCredentials};
use crate::errors::{CourseHubError, Result};
use crate::models::oauth::entities::OAuthProviderType;

pub const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const TOKEN_URL: &str = "https://www.googleapis.com/oauth2/v4/token";
pub const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

const SCOPE: &str = "openid email";
const NICKNAME_MAX_CHARS: usize = 50;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    name: Option<String>,
}

pub struct GoogleProvider {
    credentials: ProviderCredentials,
    transport: Arc<dyn HttpTransport>,
    access_token: Option<String>,
    openid: Option<String>,
}

impl GoogleProvider {
    pub fn new(credentials: ProviderCredentials, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            credentials,
            transport,
            access_token: None,
            openid: None,
        }
    }

    pub fn boxed(
        credentials: ProviderCredentials,
        transport: Arc<dyn HttpTransport>,
    ) -> Box<dyn OAuthProvider> {
        Box::new(Self::new(credentials, transport))
    }

    fn nickname(info: &UserInfo) -> String {
        let raw = info
            .name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| info.email.as_deref().and_then(|e| e.split('@').next()))
            .unwrap_or(&info.sub);
        raw.trim().chars().take(NICKNAME_MAX_CHARS).collect()
    }
}

#[async_trait]
impl OAuthProvider for GoogleProvider {
    fn provider_type(&self) -> OAuthProviderType {
        OAuthProviderType::Google
    }

    fn authorization_url(&self, state: &str) -> Result<String> {
        let url = reqwest::Url::parse_with_params(
            AUTH_URL,
            &[
                ("client_id", self.credentials.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.credentials.callback_url.as_str()),
                ("scope", SCOPE),
                ("state", state),
            ],
        )
        .map_err(|e| CourseHubError::oauth_transport(format!("构造授权地址失败: {e}")))?;
        Ok(url.into())
    }

    async fn exchange_code(&mut self, code: &str) -> Result<String> {
        let body = self
            .transport
            .post_form(
                TOKEN_URL,
                &[
                    ("client_id", self.credentials.client_id.as_str()),
                    ("client_secret", self.credentials.client_secret.as_str()),
                    ("grant_type", "authorization_code"),
                    ("code", code),
                    ("redirect_uri", self.credentials.callback_url.as_str()),
                ],
            )
            .await?;

        match serde_json::from_str::<TokenResponse>(&body) {
            Ok(token) => {
                info!("google oauth token exchanged");
                self.access_token = Some(token.access_token.clone());
                self.openid = token.id_token;
                Ok(token.access_token)
            }
            Err(_) => Err(CourseHubError::oauth_access_token(body)),
        }
    }

    async fn fetch_user_info(&self) -> Result<Option<ExternalIdentity>> {
        let Some(access_token) = self.access_token.as_deref().filter(|_| self.is_authorized())
        else {
            return Ok(None);
        };

        let body = self
            .transport
            .get(USERINFO_URL, &[("access_token", access_token)])
            .await?;

        match serde_json::from_str::<UserInfo>(&body) {
            Ok(info) => Ok(Some(ExternalIdentity {
                nickname: Self::nickname(&info),
                open_id: info.sub,
                token: access_token.to_string(),
                provider_type: OAuthProviderType::Google,
                email: info.email.filter(|e| !e.is_empty()),
                email_verified: info.email_verified,
                metadata: body,
            })),
            Err(e) => {
                error!("google oauth userinfo parse failed: {e}, rsp: {body}");
                Ok(None)
            }
        }
    }

    fn is_authorized(&self) -> bool {
        self.access_token.is_some() && self.openid.is_some()
    }
}
