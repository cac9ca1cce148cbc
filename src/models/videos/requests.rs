/// 新建影片教材（文件已落盘）
#[derive(Debug, Clone)]
pub struct CreateVideoInput {
    pub title: String,
    pub description: Option<String>,
    pub deadline: chrono::DateTime<chrono::Utc>,
    pub video_path: String,
    pub file_name: String,
}
