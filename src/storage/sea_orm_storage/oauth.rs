//! 第三方登录配置与用户存储操作

use super::SeaOrmStorage;
use crate::entity::{oauth_configs, oauth_users};
use crate::errors::{CourseHubError, Result};
use crate::models::{
    PaginationInfo,
    common::pagination::normalize_page,
    oauth::{
        entities::{OAuthConfig, OAuthProviderType, OAuthUser},
        requests::{
            CreateOAuthConfigRequest, OAuthUserListParams, UpdateOAuthConfigRequest,
            UpsertOAuthUser,
        },
        responses::OAuthUserListResponse,
    },
};
use crate::utils::contains_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, sea_query::OnConflict,
};

impl SeaOrmStorage {
    /// 列出配置；`enabled_only` 为 true 时只返回启用的
    pub async fn list_oauth_configs_impl(&self, enabled_only: bool) -> Result<Vec<OAuthConfig>> {
        let mut select = oauth_configs::Entity::find();
        if enabled_only {
            select = select.filter(oauth_configs::Column::IsEnabled.eq(true));
        }

        let configs = select
            .order_by_asc(oauth_configs::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                CourseHubError::database_operation(format!("查询第三方登录配置失败: {e}"))
            })?;

        Ok(configs
            .into_iter()
            .filter_map(|m| m.into_oauth_config())
            .collect())
    }

    pub async fn get_oauth_config_by_id_impl(&self, id: i64) -> Result<Option<OAuthConfig>> {
        let result = oauth_configs::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| {
                CourseHubError::database_operation(format!("查询第三方登录配置失败: {e}"))
            })?;

        Ok(result.and_then(|m| m.into_oauth_config()))
    }

    /// 同一类型只允许存在一条启用的配置
    async fn ensure_single_enabled(
        &self,
        provider_type: OAuthProviderType,
        exclude_id: Option<i64>,
    ) -> Result<()> {
        let mut select = oauth_configs::Entity::find()
            .filter(oauth_configs::Column::ProviderType.eq(provider_type.as_str()))
            .filter(oauth_configs::Column::IsEnabled.eq(true));
        if let Some(id) = exclude_id {
            select = select.filter(oauth_configs::Column::Id.ne(id));
        }

        let count = select.count(&self.db).await.map_err(|e| {
            CourseHubError::database_operation(format!("查询第三方登录配置失败: {e}"))
        })?;

        if count > 0 {
            return Err(CourseHubError::validation(format!(
                "{} 已存在启用的登录配置",
                provider_type.label()
            )));
        }
        Ok(())
    }

    pub async fn create_oauth_config_impl(
        &self,
        req: CreateOAuthConfigRequest,
    ) -> Result<OAuthConfig> {
        if req.is_enabled {
            self.ensure_single_enabled(req.provider_type, None).await?;
        }

        let now = chrono::Utc::now().timestamp();
        let model = oauth_configs::ActiveModel {
            provider_type: Set(req.provider_type.as_str().to_string()),
            app_key: Set(req.app_key),
            app_secret: Set(req.app_secret),
            callback_url: Set(req.callback_url),
            is_enabled: Set(req.is_enabled),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            CourseHubError::database_operation(format!("创建第三方登录配置失败: {e}"))
        })?;

        result
            .into_oauth_config()
            .ok_or_else(|| CourseHubError::database_operation("第三方登录配置类型无效"))
    }

    pub async fn update_oauth_config_impl(
        &self,
        id: i64,
        update: UpdateOAuthConfigRequest,
    ) -> Result<Option<OAuthConfig>> {
        let Some(existing) = self.get_oauth_config_by_id_impl(id).await? else {
            return Ok(None);
        };

        if update.is_enabled == Some(true) && !existing.is_enabled {
            self.ensure_single_enabled(existing.provider_type, Some(id))
                .await?;
        }

        let mut model = oauth_configs::ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(app_key) = update.app_key {
            model.app_key = Set(app_key);
        }

        if let Some(app_secret) = update.app_secret {
            model.app_secret = Set(app_secret);
        }

        if let Some(callback_url) = update.callback_url {
            model.callback_url = Set(callback_url);
        }

        if let Some(is_enabled) = update.is_enabled {
            model.is_enabled = Set(is_enabled);
        }

        model.update(&self.db).await.map_err(|e| {
            CourseHubError::database_operation(format!("更新第三方登录配置失败: {e}"))
        })?;

        self.get_oauth_config_by_id_impl(id).await
    }

    pub async fn delete_oauth_config_impl(&self, id: i64) -> Result<bool> {
        let result = oauth_configs::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| {
                CourseHubError::database_operation(format!("删除第三方登录配置失败: {e}"))
            })?;

        Ok(result.rows_affected > 0)
    }

    /// 按 (provider_type, open_id) 写入第三方用户，重复登录刷新令牌与资料
    pub async fn upsert_oauth_user_impl(&self, input: UpsertOAuthUser) -> Result<OAuthUser> {
        let now = chrono::Utc::now().timestamp();

        let model = oauth_users::ActiveModel {
            user_id: Set(None),
            open_id: Set(input.open_id.clone()),
            nickname: Set(input.nickname),
            token: Set(input.token),
            provider_type: Set(input.provider_type.clone()),
            email: Set(input.email),
            metadata: Set(input.metadata),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        oauth_users::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    oauth_users::Column::ProviderType,
                    oauth_users::Column::OpenId,
                ])
                .update_columns([
                    oauth_users::Column::Nickname,
                    oauth_users::Column::Token,
                    oauth_users::Column::Email,
                    oauth_users::Column::Metadata,
                    oauth_users::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| CourseHubError::database_operation(format!("写入第三方用户失败: {e}")))?;

        let row = oauth_users::Entity::find()
            .filter(oauth_users::Column::ProviderType.eq(input.provider_type))
            .filter(oauth_users::Column::OpenId.eq(input.open_id))
            .one(&self.db)
            .await
            .map_err(|e| CourseHubError::database_operation(format!("查询第三方用户失败: {e}")))?
            .ok_or_else(|| CourseHubError::database_operation("写入第三方用户后未能读回记录"))?;

        Ok(row.into_oauth_user())
    }

    /// 绑定本地账号
    pub async fn link_oauth_user_impl(&self, id: i64, user_id: i64) -> Result<bool> {
        let result = oauth_users::Entity::update_many()
            .col_expr(
                oauth_users::Column::UserId,
                sea_orm::sea_query::Expr::value(user_id),
            )
            .filter(oauth_users::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| CourseHubError::database_operation(format!("绑定第三方用户失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 分页列出第三方用户
    pub async fn list_oauth_users_impl(
        &self,
        params: OAuthUserListParams,
    ) -> Result<OAuthUserListResponse> {
        let (page, size) = normalize_page(Some(params.page), Some(params.size), 20, 100);

        let mut select = oauth_users::Entity::find();

        if let Some(ref search) = params.search
            && !search.trim().is_empty()
        {
            let search = search.trim();
            select = select.filter(
                Condition::any()
                    .add(oauth_users::Column::Nickname.like(contains_pattern(search)))
                    .add(oauth_users::Column::Email.like(contains_pattern(search)))
                    .add(oauth_users::Column::OpenId.like(contains_pattern(search))),
            );
        }

        let paginator = select
            .order_by_desc(oauth_users::Column::UpdatedAt)
            .paginate(&self.db, size);

        let total = paginator.num_items().await.map_err(|e| {
            CourseHubError::database_operation(format!("查询第三方用户总数失败: {e}"))
        })?;

        let users = paginator.fetch_page(page - 1).await.map_err(|e| {
            CourseHubError::database_operation(format!("查询第三方用户列表失败: {e}"))
        })?;

        Ok(OAuthUserListResponse {
            items: users.into_iter().map(|m| m.into_oauth_user()).collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn google_config(enabled: bool) -> CreateOAuthConfigRequest {
        CreateOAuthConfigRequest {
            provider_type: OAuthProviderType::Google,
            app_key: "client-id".to_string(),
            app_secret: "client-secret".to_string(),
            callback_url: "http://localhost/api/v1/oauth/google/callback".to_string(),
            is_enabled: enabled,
        }
    }

    fn identity(open_id: &str, nickname: &str) -> UpsertOAuthUser {
        UpsertOAuthUser {
            open_id: open_id.to_string(),
            nickname: nickname.to_string(),
            token: Some("token".to_string()),
            provider_type: "google".to_string(),
            email: Some(format!("{nickname}@gmail.com")),
            metadata: Some("{}".to_string()),
        }
    }

    #[tokio::test]
    async fn test_second_enabled_config_rejected() {
        let storage = SeaOrmStorage::in_memory().await.expect("storage");
        storage
            .create_oauth_config_impl(google_config(true))
            .await
            .expect("first");

        let err = storage
            .create_oauth_config_impl(google_config(true))
            .await
            .unwrap_err();
        assert!(matches!(err, CourseHubError::Validation(_)));

        // 停用的配置可以并存，但不能再启用
        let disabled = storage
            .create_oauth_config_impl(google_config(false))
            .await
            .expect("disabled");
        let err = storage
            .update_oauth_config_impl(
                disabled.id,
                UpdateOAuthConfigRequest {
                    is_enabled: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CourseHubError::Validation(_)));

        assert_eq!(
            storage.list_oauth_configs_impl(true).await.expect("list").len(),
            1
        );
        assert_eq!(
            storage.list_oauth_configs_impl(false).await.expect("list").len(),
            2
        );
    }

    #[tokio::test]
    async fn test_repeated_login_refreshes_oauth_user() {
        let storage = SeaOrmStorage::in_memory().await.expect("storage");
        let first = storage
            .upsert_oauth_user_impl(identity("sub-1", "alice"))
            .await
            .expect("first");
        let second = storage
            .upsert_oauth_user_impl(UpsertOAuthUser {
                token: Some("fresh".to_string()),
                ..identity("sub-1", "alice")
            })
            .await
            .expect("second");
        assert_eq!(first.id, second.id);
        assert_eq!(second.token.as_deref(), Some("fresh"));

        let listed = storage
            .list_oauth_users_impl(OAuthUserListParams {
                page: 1,
                size: 20,
                search: Some("alice".to_string()),
            })
            .await
            .expect("list");
        assert_eq!(listed.pagination.total, 1);
    }

    #[tokio::test]
    async fn test_link_oauth_user() {
        let storage = SeaOrmStorage::in_memory().await.expect("storage");
        let user = storage
            .create_user_impl(super::super::users::tests::new_user("alice@gmail.com"))
            .await
            .expect("user");
        let oauth_user = storage
            .upsert_oauth_user_impl(identity("sub-2", "alice"))
            .await
            .expect("oauth user");

        assert!(
            storage
                .link_oauth_user_impl(oauth_user.id, user.id)
                .await
                .expect("link")
        );
        let refreshed = storage
            .upsert_oauth_user_impl(identity("sub-2", "alice"))
            .await
            .expect("refresh");
        assert_eq!(refreshed.user_id, Some(user.id));
    }
}
