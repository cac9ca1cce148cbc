use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};

use super::{EXPIRED_REDIRECT, VideoService, find_video};
use crate::models::ApiResponse;
use crate::models::videos::responses::VideoResponse;

pub async fn get_video(
    service: &VideoService,
    request: &HttpRequest,
    video_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let video = match find_video(&storage, video_id).await {
        Ok(video) => video,
        Err(resp) => return Ok(resp),
    };

    let now = chrono::Utc::now();
    if video.is_deadline(now) {
        tracing::debug!("Video {} is past its deadline, redirecting", video.id);
        return Ok(HttpResponse::Found()
            .insert_header((header::LOCATION, EXPIRED_REDIRECT))
            .finish());
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        VideoResponse::new(video, now),
        "Video retrieved successfully",
    )))
}
