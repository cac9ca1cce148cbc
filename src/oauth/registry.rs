//! 提供方注册表
//!
//! 提供方类型到构造函数的映射在编译期确定；运行期只根据已启用的配置
//! 决定哪些提供方可用。已启用配置的快照缓存在 `ObjectCache` 中，
//! 配置变更时由调用方显式失效。
//!
//! 发起登录时生成随机 state 并连同跳转地址写入缓存，回调时一次性取出，
//! 未知或过期的 state 不能完成登录。

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::{HttpTransport, OAuthProvider, ProviderCredentials, google::GoogleProvider};
use crate::cache::{CacheResult, ObjectCache};
use crate::errors::Result;
use crate::models::oauth::entities::OAuthProviderType;
use crate::storage::Storage;
use crate::utils::password::random_string;

pub const ENABLED_CONFIGS_CACHE_KEY: &str = "oauth:enabled_configs";

/// 登录 state 的有效期（秒）
pub const LOGIN_STATE_TTL_SECS: u64 = 600;
const LOGIN_STATE_LEN: usize = 32;

fn login_state_key(state: &str) -> String {
    format!("oauth:state:{state}")
}

pub type ProviderConstructor =
    fn(ProviderCredentials, Arc<dyn HttpTransport>) -> Box<dyn OAuthProvider>;

/// 每个已实现的提供方类型对应的构造函数
pub fn constructor_for(provider_type: OAuthProviderType) -> ProviderConstructor {
    match provider_type {
        OAuthProviderType::Google => GoogleProvider::boxed,
    }
}

// 缓存的快照需要保留密钥，不能直接序列化 OAuthConfig
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EnabledProvider {
    provider_type: OAuthProviderType,
    credentials: ProviderCredentials,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PendingLogin {
    provider_type: OAuthProviderType,
    next_url: String,
}

#[derive(Clone)]
pub struct OAuthRegistry {
    storage: Arc<dyn Storage>,
    cache: Arc<dyn ObjectCache>,
    transport: Arc<dyn HttpTransport>,
    snapshot_ttl: u64,
}

impl OAuthRegistry {
    pub fn new(
        storage: Arc<dyn Storage>,
        cache: Arc<dyn ObjectCache>,
        transport: Arc<dyn HttpTransport>,
        snapshot_ttl: u64,
    ) -> Self {
        Self {
            storage,
            cache,
            transport,
            snapshot_ttl,
        }
    }

    async fn snapshot(&self) -> Result<Vec<EnabledProvider>> {
        if let CacheResult::Found(snapshot) = self
            .cache
            .get_json::<Vec<EnabledProvider>>(ENABLED_CONFIGS_CACHE_KEY)
            .await
        {
            return Ok(snapshot);
        }

        let snapshot: Vec<EnabledProvider> = self
            .storage
            .list_enabled_oauth_configs()
            .await?
            .iter()
            .map(|config| EnabledProvider {
                provider_type: config.provider_type,
                credentials: ProviderCredentials::from(config),
            })
            .collect();

        debug!("Loaded {} enabled OAuth provider(s)", snapshot.len());
        self.cache
            .insert_json(
                ENABLED_CONFIGS_CACHE_KEY.to_string(),
                &snapshot,
                self.snapshot_ttl,
            )
            .await;
        Ok(snapshot)
    }

    /// 已实现且已启用的提供方
    pub async fn enabled_providers(&self) -> Result<Vec<OAuthProviderType>> {
        let snapshot = self.snapshot().await?;
        Ok(OAuthProviderType::all()
            .iter()
            .copied()
            .filter(|t| snapshot.iter().any(|p| p.provider_type == *t))
            .collect())
    }

    /// 实例化指定类型的提供方；没有启用的配置时返回 None
    pub async fn get_provider(
        &self,
        provider_type: OAuthProviderType,
    ) -> Result<Option<Box<dyn OAuthProvider>>> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot
            .into_iter()
            .find(|p| p.provider_type == provider_type)
            .map(|p| constructor_for(provider_type)(p.credentials, self.transport.clone())))
    }

    /// 丢弃已启用配置的快照
    pub async fn invalidate(&self) {
        self.cache.remove(ENABLED_CONFIGS_CACHE_KEY).await;
    }

    /// 记录一次待完成的登录，返回作为 state 发给提供方的随机串
    pub async fn begin_login(&self, provider_type: OAuthProviderType, next_url: &str) -> String {
        let state = random_string(LOGIN_STATE_LEN);
        let pending = PendingLogin {
            provider_type,
            next_url: next_url.to_string(),
        };
        self.cache
            .insert_json(login_state_key(&state), &pending, LOGIN_STATE_TTL_SECS)
            .await;
        state
    }

    /// 取出并作废 state，返回登录后的跳转地址
    ///
    /// state 不存在、已过期或属于其他提供方时返回 None。
    pub async fn take_login(
        &self,
        provider_type: OAuthProviderType,
        state: &str,
    ) -> Option<String> {
        if state.is_empty() {
            return None;
        }
        let key = login_state_key(state);
        let CacheResult::Found(pending) = self.cache.get_json::<PendingLogin>(&key).await else {
            return None;
        };
        self.cache.remove(&key).await;
        (pending.provider_type == provider_type).then_some(pending.next_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::object_cache::moka::MokaCacheWrapper;
    use crate::models::oauth::requests::{CreateOAuthConfigRequest, UpdateOAuthConfigRequest};
    use crate::oauth::transport::fake::FakeTransport;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    async fn registry() -> (OAuthRegistry, Arc<dyn Storage>) {
        let storage: Arc<dyn Storage> =
            Arc::new(SeaOrmStorage::in_memory().await.expect("storage"));
        let cache: Arc<dyn ObjectCache> =
            Arc::new(MokaCacheWrapper::with_settings(100, 60).expect("cache"));
        let registry = OAuthRegistry::new(
            storage.clone(),
            cache,
            Arc::new(FakeTransport::default()),
            6000,
        );
        (registry, storage)
    }

    fn google(enabled: bool) -> CreateOAuthConfigRequest {
        CreateOAuthConfigRequest {
            provider_type: OAuthProviderType::Google,
            app_key: "key".to_string(),
            app_secret: "secret".to_string(),
            callback_url: "http://localhost/cb".to_string(),
            is_enabled: enabled,
        }
    }

    #[tokio::test]
    async fn test_no_enabled_config_means_no_provider() {
        let (registry, storage) = registry().await;
        storage
            .create_oauth_config(google(false))
            .await
            .expect("config");

        assert!(
            registry
                .get_provider(OAuthProviderType::Google)
                .await
                .expect("lookup")
                .is_none()
        );
        assert!(registry.enabled_providers().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_enabled_config_builds_provider_with_credentials() {
        let (registry, storage) = registry().await;
        storage.create_oauth_config(google(true)).await.expect("config");

        let provider = registry
            .get_provider(OAuthProviderType::Google)
            .await
            .expect("lookup")
            .expect("provider");
        assert_eq!(provider.provider_type(), OAuthProviderType::Google);
        let url = provider.authorization_url("/").expect("url");
        assert!(url.contains("client_id=key"));
    }

    #[tokio::test]
    async fn test_snapshot_cached_until_invalidated() {
        let (registry, storage) = registry().await;
        let config = storage.create_oauth_config(google(true)).await.expect("config");
        assert_eq!(registry.enabled_providers().await.expect("list").len(), 1);

        storage
            .update_oauth_config(
                config.id,
                UpdateOAuthConfigRequest {
                    is_enabled: Some(false),
                    ..Default::default()
                },
            )
            .await
            .expect("disable");

        // 快照未失效前仍是旧结果
        assert_eq!(registry.enabled_providers().await.expect("list").len(), 1);

        registry.invalidate().await;
        assert!(registry.enabled_providers().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_login_state_is_single_use() {
        let (registry, _) = registry().await;
        let state = registry
            .begin_login(OAuthProviderType::Google, "/assignment/3")
            .await;
        assert_eq!(state.len(), LOGIN_STATE_LEN);

        assert_eq!(
            registry
                .take_login(OAuthProviderType::Google, &state)
                .await
                .as_deref(),
            Some("/assignment/3")
        );
        assert_eq!(registry.take_login(OAuthProviderType::Google, &state).await, None);
    }

    #[tokio::test]
    async fn test_unknown_login_state_rejected() {
        let (registry, _) = registry().await;
        assert_eq!(registry.take_login(OAuthProviderType::Google, "forged").await, None);
        assert_eq!(registry.take_login(OAuthProviderType::Google, "").await, None);
    }
}
