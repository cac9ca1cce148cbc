use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::VideoService;
use crate::models::ApiResponse;
use crate::models::videos::responses::{VideoListResponse, VideoResponse};
use crate::services::error_response;

pub async fn list_videos(
    service: &VideoService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_videos().await {
        Ok(videos) => {
            let now = chrono::Utc::now();
            let items = videos
                .into_iter()
                .map(|video| VideoResponse::new(video, now))
                .collect();
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                VideoListResponse { items },
                "Videos retrieved successfully",
            )))
        }
        Err(e) => Ok(error_response(&e)),
    }
}
