//! 提供方 HTTP 传输

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::config::AppConfig;
use crate::errors::Result;

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// 以表单方式 POST，返回原始响应体
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<String>;
    /// 带查询参数 GET，返回原始响应体
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<String>;
}

const SECRET_FIELDS: &[&str] = &["access_token", "id_token", "refresh_token"];

/// 日志用：隐去响应中的令牌字段，非 JSON 原样返回
pub(crate) fn redact_tokens(body: &str) -> String {
    let Ok(serde_json::Value::Object(mut fields)) = serde_json::from_str(body) else {
        return body.to_string();
    };
    for key in SECRET_FIELDS {
        if let Some(value) = fields.get_mut(*key) {
            *value = serde_json::Value::String("***".to_string());
        }
    }
    serde_json::Value::Object(fields).to_string()
}

/// 基于 reqwest 的传输，所有请求都带超时
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    pub fn from_config() -> Result<Self> {
        Self::new(Duration::from_secs(AppConfig::get().oauth.http_timeout.max(1)))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<String> {
        let body = self.client.post(url).form(form).send().await?.text().await?;
        debug!("OAuth POST {} -> {}", url, redact_tokens(&body));
        Ok(body)
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
        let body = self.client.get(url).query(query).send().await?.text().await?;
        debug!("OAuth GET {} -> {}", url, redact_tokens(&body));
        Ok(body)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use crate::errors::CourseHubError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// 按 URL 返回预置响应，并记录收到的参数
    #[derive(Default)]
    pub(crate) struct FakeTransport {
        responses: Mutex<HashMap<String, std::result::Result<String, CourseHubError>>>,
        pub(crate) calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl FakeTransport {
        pub(crate) fn respond(self, url: &str, body: &str) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), Ok(body.to_string()));
            self
        }

        pub(crate) fn fail(self, url: &str, err: CourseHubError) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), Err(err));
            self
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn record(&self, url: &str, params: &[(&str, &str)]) -> Result<String> {
            self.calls.lock().unwrap().push((
                url.to_string(),
                params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ));
            self.responses
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .unwrap_or_else(|| Err(CourseHubError::oauth_transport(format!("no route: {url}"))))
        }
    }

    #[async_trait]
    impl HttpTransport for FakeTransport {
        async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<String> {
            self.record(url, form)
        }

        async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
            self.record(url, query)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_tokens() {
        let body = r#"{"access_token":"ya29.secret","id_token":"eyJ.secret","expires_in":3599}"#;
        let redacted = redact_tokens(body);
        assert!(!redacted.contains("secret"));
        assert!(redacted.contains("3599"));

        assert_eq!(redact_tokens("<html>oops</html>"), "<html>oops</html>");
        let error = r#"{"error":"invalid_grant"}"#;
        assert!(redact_tokens(error).contains("invalid_grant"));
    }
}
