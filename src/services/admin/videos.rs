use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AdminService;
use crate::config::AppConfig;
use crate::models::videos::{requests::CreateVideoInput, responses::VideoResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;
use crate::services::files::{
    MultipartForm, UploadRules, read_multipart_form, remove_stored_file,
};
use crate::utils::validate::validate_length;

pub const VIDEO_TITLE_MAX_CHARS: usize = 30;

fn invalid(msg: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::VideoInvalid, msg))
}

/// 从表单字段组装影片记录，失败时返回错误信息
fn video_input(form: &MultipartForm) -> Result<CreateVideoInput, String> {
    let Some(file) = &form.file else {
        return Err("video file is required".to_string());
    };

    let title = form.field("title").unwrap_or_default().trim().to_string();
    validate_length("title", &title, 1, VIDEO_TITLE_MAX_CHARS)?;

    let deadline = form
        .field("deadline")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "deadline must not be empty".to_string())?;
    let deadline = chrono::DateTime::parse_from_rfc3339(deadline)
        .map_err(|e| format!("deadline is not a valid RFC 3339 time: {e}"))?
        .with_timezone(&chrono::Utc);

    let description = form
        .field("description")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(CreateVideoInput {
        title,
        description,
        deadline,
        video_path: file.path.clone(),
        file_name: file.file_name.clone(),
    })
}

pub async fn upload_video(
    service: &AdminService,
    request: &HttpRequest,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    let upload = &AppConfig::get().upload;
    let rules = UploadRules {
        allowed_types: &upload.video_allowed_types,
        max_size: upload.video_max_size,
        subdir: "video".to_string(),
    };
    let form = match read_multipart_form(payload, &rules).await {
        Ok(form) => form,
        Err(resp) => return Ok(resp),
    };

    let input = match video_input(&form) {
        Ok(input) => input,
        Err(msg) => {
            if let Some(file) = &form.file {
                remove_stored_file(&file.path).await;
            }
            return Ok(invalid(msg));
        }
    };

    let storage = service.get_storage(request);
    let video_path = input.video_path.clone();
    match storage.create_video(input).await {
        Ok(video) => {
            tracing::info!("Uploaded video {} ({})", video.id, video.title);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                VideoResponse::new(video, chrono::Utc::now()),
                "影片上传成功",
            )))
        }
        Err(e) => {
            remove_stored_file(&video_path).await;
            Ok(error_response(&e))
        }
    }
}

pub async fn delete_video(
    service: &AdminService,
    request: &HttpRequest,
    video_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_video(video_id).await {
        Ok(Some(video)) => {
            remove_stored_file(&video.video_path).await;
            Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_empty("影片已删除")))
        }
        Ok(None) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::VideoNotFound, "影片不存在"))),
        Err(e) => Ok(error_response(&e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::files::SavedFile;
    use std::collections::HashMap;

    fn form(fields: &[(&str, &str)], with_file: bool) -> MultipartForm {
        MultipartForm {
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
            file: with_file.then(|| SavedFile {
                path: "video/abc.mp4".to_string(),
                file_name: "lecture.mp4".to_string(),
                size: 10,
            }),
        }
    }

    #[test]
    fn test_video_input_from_form() {
        let input = video_input(&form(
            &[
                ("title", " Week 1 "),
                ("deadline", "2030-01-01T00:00:00+08:00"),
                ("description", ""),
            ],
            true,
        ))
        .expect("input");
        assert_eq!(input.title, "Week 1");
        assert_eq!(input.description, None);
        assert_eq!(input.deadline.to_rfc3339(), "2029-12-31T16:00:00+00:00");
        assert_eq!(input.video_path, "video/abc.mp4");
    }

    #[test]
    fn test_video_input_requires_file() {
        let err = video_input(&form(
            &[("title", "Week 1"), ("deadline", "2030-01-01T00:00:00Z")],
            false,
        ))
        .expect_err("no file");
        assert!(err.contains("required"));
    }

    #[test]
    fn test_video_input_rejects_bad_fields() {
        assert!(video_input(&form(&[("deadline", "2030-01-01T00:00:00Z")], true)).is_err());
        assert!(
            video_input(&form(
                &[("title", "x".repeat(31).as_str()), ("deadline", "2030-01-01T00:00:00Z")],
                true
            ))
            .is_err()
        );
        assert!(video_input(&form(&[("title", "t"), ("deadline", "tomorrow")], true)).is_err());
    }
}
