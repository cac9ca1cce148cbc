use serde::Deserialize;

// 用户登录请求（来自HTTP请求）
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// 登录名或邮箱
    pub username: String,
    /// 密码
    pub password: String,
}

// 用户注册请求
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// 邮箱形式的登录名，@ 之前的部分即学号
    pub username: String,
    pub password: String,
    pub display_name: Option<String>,
}
