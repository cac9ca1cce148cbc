use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub argon2: Argon2Config,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub cors: CorsConfig,
    pub upload: UploadConfig,
    pub auth: AuthConfig,
    pub oauth: OAuthClientConfig,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub system_name: String,
    pub environment: String,
    pub log_level: String,
    /// 站点根地址，用于拼接内容实体的完整链接
    pub site_url: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            system_name: "CourseHub".to_string(),
            environment: "development".to_string(),
            log_level: "info".to_string(),
            site_url: "http://127.0.0.1:8080".to_string(),
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub unix_socket_path: String,
    pub workers: usize,
    pub max_workers: usize,
    pub timeouts: TimeoutConfig,
    pub limits: LimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            unix_socket_path: String::new(),
            workers: 0,
            max_workers: 16,
            timeouts: TimeoutConfig::default(),
            limits: LimitConfig::default(),
        }
    }
}

/// 超时配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub client_request: u64,
    pub client_disconnect: u64,
    pub keep_alive: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            client_request: 5000,
            client_disconnect: 1000,
            keep_alive: 30,
        }
    }
}

/// 限制配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitConfig {
    pub max_payload_size: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_payload_size: 10 * 1024 * 1024,
        }
    }
}

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    #[serde(skip_serializing)] // 不序列化到JSON响应中
    pub secret: String,
    /// 访问令牌有效期（分钟）
    pub access_token_expiry: i64,
    /// 刷新令牌有效期（天）
    pub refresh_token_expiry: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "coursehub-development-secret".to_string(),
            access_token_expiry: 15,
            refresh_token_expiry: 7,
        }
    }
}

/// Argon2 参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Argon2Config {
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost: 19456,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,    // 数据库连接 URL（从 scheme 自动推断类型）
    pub pool_size: u32, // 连接池大小
    pub timeout: u64,   // 连接超时 (秒)
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "coursehub.db".to_string(),
            pool_size: 8,
            timeout: 30,
        }
    }
}

/// 缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    #[serde(rename = "type")]
    pub cache_type: String,
    pub default_ttl: u64,
    /// 已启用 OAuth 提供方快照的缓存时长（秒）
    pub oauth_registry_ttl: u64,
    pub memory: MemoryConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: "moka".to_string(),
            default_ttl: 3600,
            oauth_registry_ttl: 100 * 60,
            memory: MemoryConfig::default(),
        }
    }
}

/// 内存缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub max_capacity: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub max_age: usize,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            max_age: 3600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub dir: String,                      // 上传目录
    pub max_size: usize,                  // 作业附件最大字节数
    pub allowed_types: Vec<String>,       // 作业附件允许的扩展名
    pub video_max_size: usize,            // 影片最大字节数
    pub video_allowed_types: Vec<String>, // 影片允许的扩展名
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: "uploads".to_string(),
            max_size: 10 * 1024 * 1024,
            allowed_types: [
                ".pdf", ".doc", ".docx", ".zip", ".txt", ".md", ".png", ".jpg", ".jpeg",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            video_max_size: 512 * 1024 * 1024,
            video_allowed_types: [".mp4", ".webm", ".mov", ".mkv"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// 登录相关配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// 未登录的浏览器请求被重定向到的路径
    pub login_path: String,
    /// 重定向时携带原始路径的查询参数名
    pub redirect_field: String,
    /// 从登录名推导学号时使用的分隔符
    pub student_id_separator: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            redirect_field: "next".to_string(),
            student_id_separator: "@".to_string(),
        }
    }
}

/// OAuth 出站请求配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthClientConfig {
    /// 令牌交换与用户信息请求的超时（秒）
    pub http_timeout: u64,
}

impl Default for OAuthClientConfig {
    fn default() -> Self {
        Self { http_timeout: 10 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_boot_without_file() {
        let config = AppConfig::default();
        assert_eq!(config.cache.cache_type, "moka");
        assert_eq!(config.cache.oauth_registry_ttl, 6000);
        assert_eq!(config.auth.login_path, "/login");
        assert_eq!(config.auth.student_id_separator, "@");
        assert!(config.upload.allowed_types.contains(&".pdf".to_string()));
        assert!(config.upload.video_allowed_types.contains(&".mp4".to_string()));
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"server":{"port":9000},"oauth":{"http_timeout":3}}"#)
                .expect("partial config should deserialize");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.oauth.http_timeout, 3);
        assert_eq!(config.jwt.access_token_expiry, 15);
    }
}
