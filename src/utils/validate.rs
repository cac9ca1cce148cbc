use once_cell::sync::Lazy;
use regex::Regex;

static LOGIN_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid login name regex")
});

/// 校验邮箱形式的登录名
pub fn validate_login_name(login: &str) -> Result<(), &'static str> {
    if login.len() > 254 {
        return Err("Login name is too long");
    }
    if !LOGIN_NAME_RE.is_match(login) {
        return Err("Login name must be an email address");
    }
    Ok(())
}

/// 校验文本字段长度（按字符计），`min` 为 0 时允许空值
pub fn validate_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), String> {
    let len = value.trim().chars().count();
    if len < min {
        return Err(if min == 1 {
            format!("{field} must not be empty")
        } else {
            format!("{field} must be at least {min} characters")
        });
    }
    if value.chars().count() > max {
        return Err(format!("{field} must be at most {max} characters"));
    }
    Ok(())
}

/// 过于常见的密码，忽略大小写比较
const COMMON_PASSWORDS: &[&str] = &[
    "password1",
    "qwerty123",
    "admin123",
    "abcd1234",
    "12345678",
    "123456789",
];

/// 密码规则：(是否满足, 不满足时的提示)
const PASSWORD_RULES: &[(fn(&str) -> bool, &str)] = &[
    (|p| p.chars().count() >= 8, "Password must be at least 8 characters long"),
    (
        |p| p.chars().any(|c| c.is_ascii_uppercase()),
        "Password must contain at least one uppercase letter",
    ),
    (
        |p| p.chars().any(|c| c.is_ascii_lowercase()),
        "Password must contain at least one lowercase letter",
    ),
    (
        |p| p.chars().any(|c| c.is_ascii_digit()),
        "Password must contain at least one digit",
    ),
    (
        |p| !COMMON_PASSWORDS.iter().any(|w| p.eq_ignore_ascii_case(w)),
        "Password is too common, please choose a stronger password",
    ),
];

/// 返回密码违反的全部规则，为空表示通过
pub fn password_violations(password: &str) -> Vec<&'static str> {
    PASSWORD_RULES
        .iter()
        .filter(|(ok, _)| !ok(password))
        .map(|(_, message)| *message)
        .collect()
}

/// 注册时使用的密码校验，错误信息以分号连接
pub fn validate_password_simple(password: &str) -> Result<(), String> {
    let violations = password_violations(password);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations.join("; "))
    }
}
