//! 第三方登录配置实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "oauth_configs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub provider_type: String,
    pub app_key: String,
    pub app_secret: String,
    pub callback_url: String,
    pub is_enabled: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 转换为业务模型；提供方类型未知的行返回 None
    pub fn into_oauth_config(self) -> Option<crate::models::oauth::entities::OAuthConfig> {
        use crate::models::oauth::entities::{OAuthConfig, OAuthProviderType};

        let provider_type = self.provider_type.parse::<OAuthProviderType>().ok()?;
        Some(OAuthConfig {
            id: self.id,
            provider_type,
            app_key: self.app_key,
            app_secret: self.app_secret,
            callback_url: self.callback_url,
            is_enabled: self.is_enabled,
            created_at: super::from_timestamp(self.created_at),
            updated_at: super::from_timestamp(self.updated_at),
        })
    }
}
