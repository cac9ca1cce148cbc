pub mod detail;
pub mod list;
pub mod stream;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::videos::entities::VideoMaterial;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;
use crate::storage::Storage;

/// 过期影片的跳转目标
pub const EXPIRED_REDIRECT: &str = "/";

pub struct VideoService {
    storage: Option<Arc<dyn Storage>>,
}

impl VideoService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub async fn list_videos(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_videos(self, request).await
    }

    /// 影片详情，过期时跳转到首页
    pub async fn get_video(&self, request: &HttpRequest, video_id: i64) -> ActixResult<HttpResponse> {
        detail::get_video(self, request, video_id).await
    }

    /// 播放影片文件，过期时拒绝
    pub async fn stream_video(
        &self,
        request: &HttpRequest,
        video_id: i64,
    ) -> ActixResult<HttpResponse> {
        stream::stream_video(self, request, video_id).await
    }
}

pub(crate) async fn find_video(
    storage: &Arc<dyn Storage>,
    video_id: i64,
) -> Result<VideoMaterial, HttpResponse> {
    match storage.get_video_by_id(video_id).await {
        Ok(Some(video)) => Ok(video),
        Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::VideoNotFound,
            "Video not found",
        ))),
        Err(e) => Err(error_response(&e)),
    }
}
