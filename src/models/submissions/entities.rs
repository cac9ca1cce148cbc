use serde::{Deserialize, Serialize};

// 学生作业提交，每个 (学号, 作业) 至多一条
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub student_id: String,
    pub assignment_id: i64,
    pub content: String,
    #[serde(skip_serializing)]
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Submission {
    pub fn has_attachment(&self) -> bool {
        self.file_path.is_some()
    }
}
