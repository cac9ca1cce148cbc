use super::entities::VideoMaterial;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct VideoResponse {
    #[serde(flatten)]
    pub video: VideoMaterial,
    pub url: String,
    pub stream_url: String,
    pub is_deadline: bool,
}

impl VideoResponse {
    pub fn new(video: VideoMaterial, now: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            url: format!("/videos/{}", video.id),
            stream_url: format!("/api/v1/videos/{}/stream", video.id),
            is_deadline: video.is_deadline(now),
            video,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VideoListResponse {
    pub items: Vec<VideoResponse>,
}
