//! 第三方登录
//!
//! 每个提供方实现 [`OAuthProvider`]，由 [`registry::OAuthRegistry`] 依据已启用的
//! 配置按类型实例化。出站 HTTP 请求经过 [`transport::HttpTransport`]。

pub mod google;
pub mod registry;
pub mod transport;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::models::oauth::{
    entities::{OAuthConfig, OAuthProviderType},
    requests::UpsertOAuthUser,
};

pub use registry::OAuthRegistry;
pub use transport::{HttpTransport, ReqwestTransport};

/// 实例化提供方所需的应用凭据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

impl From<&OAuthConfig> for ProviderCredentials {
    fn from(config: &OAuthConfig) -> Self {
        Self {
            client_id: config.app_key.clone(),
            client_secret: config.app_secret.clone(),
            callback_url: config.callback_url.clone(),
        }
    }
}

/// 提供方返回并归一化后的外部身份
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalIdentity {
    pub open_id: String,
    pub token: String,
    pub provider_type: OAuthProviderType,
    pub email: Option<String>,
    /// 提供方确认过邮箱归属；未确认的邮箱不能用来关联本地账号
    pub email_verified: bool,
    pub nickname: String,
    /// 原始用户信息 JSON
    pub metadata: String,
}

impl ExternalIdentity {
    pub fn into_upsert(self) -> UpsertOAuthUser {
        UpsertOAuthUser {
            open_id: self.open_id,
            nickname: self.nickname,
            token: Some(self.token),
            provider_type: self.provider_type.as_str().to_string(),
            email: self.email,
            metadata: Some(self.metadata),
        }
    }
}

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    fn provider_type(&self) -> OAuthProviderType;

    /// 授权页地址，`state` 由提供方原样带回回调
    fn authorization_url(&self, state: &str) -> Result<String>;

    /// 用授权码换取访问令牌
    ///
    /// 响应缺少 `access_token` 时返回 `OauthAccessToken`，携带原始响应体。
    async fn exchange_code(&mut self, code: &str) -> Result<String>;

    /// 获取用户信息
    ///
    /// 未授权或响应无法解析时返回 `Ok(None)`；传输失败与超时仍作为错误返回。
    async fn fetch_user_info(&self) -> Result<Option<ExternalIdentity>>;

    fn is_authorized(&self) -> bool;
}
