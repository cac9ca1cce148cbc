//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_coursehub_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum CourseHubError {
            $($variant(String),)*
        }

        impl CourseHubError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(CourseHubError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(CourseHubError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(CourseHubError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl CourseHubError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        CourseHubError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_coursehub_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    FileOperation("E006", "File Operation Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Serialization("E009", "Serialization Error"),
    DateParse("E010", "Date Parse Error"),
    Authentication("E011", "Authentication Error"),
    Authorization("E012", "Authorization Error"),
    DuplicateSubmission("E013", "Duplicate Submission"),
    DeadlinePassed("E014", "Deadline Passed"),
    OauthAccessToken("E015", "OAuth Access Token Error"),
    OauthTimeout("E016", "OAuth Timeout"),
    OauthTransport("E017", "OAuth Transport Error"),
    ExternalIdentityUnavailable("E018", "External Identity Unavailable"),
    OauthProviderNotConfigured("E019", "OAuth Provider Not Configured"),
}

impl CourseHubError {
    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 是否来自外部 OAuth 依赖（令牌交换、超时、网络、身份解析）
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            CourseHubError::OauthAccessToken(_)
                | CourseHubError::OauthTimeout(_)
                | CourseHubError::OauthTransport(_)
                | CourseHubError::ExternalIdentityUnavailable(_)
        )
    }
}

impl fmt::Display for CourseHubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CourseHubError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for CourseHubError {
    fn from(err: sea_orm::DbErr) -> Self {
        CourseHubError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for CourseHubError {
    fn from(err: std::io::Error) -> Self {
        CourseHubError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for CourseHubError {
    fn from(err: serde_json::Error) -> Self {
        CourseHubError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for CourseHubError {
    fn from(err: chrono::ParseError) -> Self {
        CourseHubError::DateParse(err.to_string())
    }
}

// 出站请求超时需要与其他网络错误区分开
impl From<reqwest::Error> for CourseHubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CourseHubError::OauthTimeout(err.to_string())
        } else {
            CourseHubError::OauthTransport(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, CourseHubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(CourseHubError::cache_connection("test").code(), "E001");
        assert_eq!(CourseHubError::database_config("test").code(), "E003");
        assert_eq!(CourseHubError::validation("test").code(), "E007");
        assert_eq!(CourseHubError::authorization("test").code(), "E012");
        assert_eq!(CourseHubError::deadline_passed("test").code(), "E014");
        assert_eq!(CourseHubError::oauth_access_token("test").code(), "E015");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            CourseHubError::cache_connection("test").error_type(),
            "Cache Connection Error"
        );
        assert_eq!(
            CourseHubError::external_identity_unavailable("test").error_type(),
            "External Identity Unavailable"
        );
    }

    #[test]
    fn test_error_message() {
        let err = CourseHubError::oauth_access_token(r#"{"error":"invalid_grant"}"#);
        assert_eq!(err.message(), r#"{"error":"invalid_grant"}"#);
    }

    #[test]
    fn test_external_classification() {
        assert!(CourseHubError::oauth_timeout("slow").is_external());
        assert!(CourseHubError::external_identity_unavailable("x").is_external());
        assert!(!CourseHubError::not_found("x").is_external());
        assert!(!CourseHubError::authorization("x").is_external());
    }

    #[test]
    fn test_format_simple() {
        let err = CourseHubError::validation("content is required");
        let formatted = err.format_simple();
        assert!(formatted.contains("Validation Error"));
        assert!(formatted.contains("content is required"));
    }
}
