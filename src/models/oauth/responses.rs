use super::entities::{OAuthConfig, OAuthUser};
use crate::models::PaginationInfo;
use serde::Serialize;

/// 登录页可用的第三方登录入口
#[derive(Debug, Serialize)]
pub struct OAuthProviderInfo {
    pub provider_type: String,
    pub name: String,
    pub authorize_url: String,
}

#[derive(Debug, Serialize)]
pub struct OAuthProviderListResponse {
    pub items: Vec<OAuthProviderInfo>,
}

#[derive(Debug, Serialize)]
pub struct OAuthConfigListResponse {
    pub items: Vec<OAuthConfig>,
}

#[derive(Debug, Serialize)]
pub struct OAuthUserListResponse {
    pub items: Vec<OAuthUser>,
    pub pagination: PaginationInfo,
}
