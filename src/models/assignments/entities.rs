use serde::{Deserialize, Serialize};

use crate::models::ContentEntity;
use crate::utils::deadline::is_past;

// 作业
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub course_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub deadline: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Assignment {
    /// 当前时间是否已过截止时间
    pub fn is_deadline(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        is_past(self.deadline, now)
    }
}

impl ContentEntity for Assignment {
    fn absolute_url(&self) -> String {
        format!("/assignment/{}", self.id)
    }
}
