use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 已实现的第三方登录提供方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProviderType {
    Google,
}

impl OAuthProviderType {
    pub const fn all() -> &'static [OAuthProviderType] {
        &[OAuthProviderType::Google]
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            OAuthProviderType::Google => "google",
        }
    }

    /// 展示名
    pub const fn label(&self) -> &'static str {
        match self {
            OAuthProviderType::Google => "Google",
        }
    }
}

impl fmt::Display for OAuthProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuthProviderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(OAuthProviderType::Google),
            _ => Err(format!("Unknown OAuth provider: {s}")),
        }
    }
}

/// 第三方登录应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub id: i64,
    pub provider_type: OAuthProviderType,
    pub app_key: String,
    #[serde(skip_serializing)]
    pub app_secret: String,
    pub callback_url: String,
    pub is_enabled: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 第三方身份与本地账号的绑定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthUser {
    pub id: i64,
    pub user_id: Option<i64>,
    pub open_id: String,
    pub nickname: String,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub provider_type: String,
    pub email: Option<String>,
    pub metadata: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
