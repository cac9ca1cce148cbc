use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{VideoService, find_video};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;
use crate::services::files::stream_file;

pub async fn stream_video(
    service: &VideoService,
    request: &HttpRequest,
    video_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let video = match find_video(&storage, video_id).await {
        Ok(video) => video,
        Err(resp) => return Ok(resp),
    };

    if video.is_deadline(chrono::Utc::now()) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "影片已过观看期限",
        )));
    }

    match stream_file(&video.video_path, &video.file_name, true).await {
        Ok(response) => Ok(response),
        Err(e) => Ok(error_response(&e)),
    }
}
