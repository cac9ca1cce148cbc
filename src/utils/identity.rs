//! 学号推导
//!
//! 学号取自邮箱形式登录名中第一个分隔符之前的部分，是提交记录的归属键。
//! 登录名创建后不可修改，因此学号对同一账号保持稳定。

use crate::config::AppConfig;
use crate::errors::{CourseHubError, Result};

/// 学号最大长度（字符数）
pub const STUDENT_ID_MAX_LEN: usize = 10;

/// 取第一个分隔符之前的部分；没有分隔符时原样返回
pub fn student_id_from_login<'a>(login: &'a str, separator: &str) -> &'a str {
    if separator.is_empty() {
        return login;
    }
    match login.find(separator) {
        Some(idx) => &login[..idx],
        None => login,
    }
}

/// 推导并校验学号
pub fn resolve_student_id_with(login: &str, separator: &str) -> Result<String> {
    let student_id = student_id_from_login(login, separator);
    if student_id.is_empty() {
        return Err(CourseHubError::validation(format!(
            "无法从登录名 '{login}' 推导学号"
        )));
    }
    if student_id.chars().count() > STUDENT_ID_MAX_LEN {
        return Err(CourseHubError::validation(format!(
            "学号 '{student_id}' 超过 {STUDENT_ID_MAX_LEN} 个字符"
        )));
    }
    Ok(student_id.to_string())
}

/// 使用配置中的分隔符推导学号
pub fn resolve_student_id(login: &str) -> Result<String> {
    resolve_student_id_with(login, &AppConfig::get().auth.student_id_separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_domain_suffix() {
        assert_eq!(student_id_from_login("b0912345@school.edu", "@"), "b0912345");
    }

    #[test]
    fn test_first_separator_wins() {
        assert_eq!(student_id_from_login("a@b@c", "@"), "a");
    }

    #[test]
    fn test_without_separator_returns_whole_string() {
        assert_eq!(student_id_from_login("alice", "@"), "alice");
        assert_eq!(student_id_from_login("", "@"), "");
    }

    #[test]
    fn test_resolve_rejects_empty_and_long_ids() {
        assert!(resolve_student_id_with("@school.edu", "@").is_err());
        let err = resolve_student_id_with("averyverylongname@school.edu", "@").unwrap_err();
        assert_eq!(err.code(), "E007");
        assert_eq!(
            resolve_student_id_with("alice@school.edu", "@").expect("valid id"),
            "alice"
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 10 个中文字符，按字节计算会超长
        let login = "一二三四五六七八九十@school.edu";
        assert_eq!(
            resolve_student_id_with(login, "@").expect("ten characters"),
            "一二三四五六七八九十"
        );
    }
}
