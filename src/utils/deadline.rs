//! 截止时间判断
//!
//! 作业提交与影片播放共用同一规则：当前时间严格晚于截止时间才算过期。

use chrono::{DateTime, Utc};

use crate::errors::{CourseHubError, Result};

/// `now > deadline` 时为真；恰好等于截止时间仍视为未过期
pub fn is_past(deadline: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now > deadline
}

/// 已过期时返回 `DeadlinePassed`
pub fn ensure_open(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
    if is_past(deadline, now) {
        Err(CourseHubError::deadline_passed(format!(
            "已超过截止时间 {}",
            deadline.to_rfc3339()
        )))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn hw1_deadline() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_before_deadline_is_open() {
        let now = Utc.with_ymd_and_hms(2024, 1, 9, 23, 59, 59).unwrap();
        assert!(!is_past(hw1_deadline(), now));
        assert!(ensure_open(hw1_deadline(), now).is_ok());
    }

    #[test]
    fn test_boundary_is_not_past() {
        assert!(!is_past(hw1_deadline(), hw1_deadline()));
    }

    #[test]
    fn test_after_deadline_is_past() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 1).unwrap();
        assert!(is_past(hw1_deadline(), now));
        let err = ensure_open(hw1_deadline(), now).unwrap_err();
        assert_eq!(err.code(), "E014");
    }
}
