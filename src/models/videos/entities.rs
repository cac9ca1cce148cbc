use serde::{Deserialize, Serialize};

use crate::models::ContentEntity;
use crate::utils::deadline::is_past;

// 影片教材
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMaterial {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub deadline: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing)]
    pub video_path: String,
    pub file_name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl VideoMaterial {
    pub fn is_deadline(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        is_past(self.deadline, now)
    }
}

impl ContentEntity for VideoMaterial {
    fn absolute_url(&self) -> String {
        format!("/videos/{}", self.id)
    }
}
