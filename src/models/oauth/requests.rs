use super::entities::OAuthProviderType;
use crate::models::common::pagination::deserialize_string_to_i64;
use serde::Deserialize;

fn default_callback_url() -> String {
    "http://www.google.com".to_string()
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOAuthConfigRequest {
    pub provider_type: OAuthProviderType,
    pub app_key: String,
    pub app_secret: String,
    #[serde(default = "default_callback_url")]
    pub callback_url: String,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOAuthConfigRequest {
    pub app_key: Option<String>,
    pub app_secret: Option<String>,
    pub callback_url: Option<String>,
    pub is_enabled: Option<bool>,
}

fn default_user_page_size() -> i64 {
    20
}

fn default_user_page() -> i64 {
    1
}

// 第三方用户列表查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthUserListParams {
    #[serde(
        default = "default_user_page",
        deserialize_with = "deserialize_string_to_i64"
    )]
    pub page: i64,
    #[serde(
        default = "default_user_page_size",
        deserialize_with = "deserialize_string_to_i64"
    )]
    pub size: i64,
    /// 按昵称、邮箱或 open_id 模糊搜索
    pub search: Option<String>,
}

/// 发起授权时携带的登录后跳转地址
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizeQuery {
    #[serde(alias = "next")]
    pub next_url: Option<String>,
}

/// 提供方回调参数
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// 写入第三方用户（按 provider_type + open_id 去重）
#[derive(Debug, Clone)]
pub struct UpsertOAuthUser {
    pub open_id: String,
    pub nickname: String,
    pub token: Option<String>,
    pub provider_type: String,
    pub email: Option<String>,
    pub metadata: Option<String>,
}
