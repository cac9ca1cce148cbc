use serde::{Deserialize, Serialize};

use crate::models::ContentEntity;

// 课程
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub deadline: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl ContentEntity for Course {
    fn absolute_url(&self) -> String {
        format!("/course/{}", self.id)
    }
}
