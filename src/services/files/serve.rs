use actix_web::{
    HttpResponse,
    body::SizedStream,
    http::header::{self, ContentDisposition, DispositionParam, DispositionType},
    web::Bytes,
};
use futures_util::stream;
use tokio::io::AsyncReadExt;

use super::resolve_path;
use crate::errors::{CourseHubError, Result};

const CHUNK_SIZE: usize = 64 * 1024;

/// 按扩展名推断 Content-Type
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "txt" | "md" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// 以分块流的方式返回已落盘的文件
///
/// `inline` 为真时浏览器直接播放或展示，否则作为附件下载。
pub async fn stream_file(relative: &str, file_name: &str, inline: bool) -> Result<HttpResponse> {
    let path = resolve_path(relative);
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CourseHubError::not_found("文件不存在"));
        }
        Err(e) => return Err(e.into()),
    };
    let length = file.metadata().await?.len();

    let body = stream::try_unfold(file, |mut file| async move {
        let mut buf = vec![0u8; CHUNK_SIZE];
        let read = file.read(&mut buf).await?;
        if read == 0 {
            return Ok::<_, std::io::Error>(None);
        }
        buf.truncate(read);
        Ok(Some((Bytes::from(buf), file)))
    });

    let disposition = ContentDisposition {
        disposition: if inline {
            DispositionType::Inline
        } else {
            DispositionType::Attachment
        },
        parameters: vec![DispositionParam::Filename(file_name.to_string())],
    };

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, content_type_for(file_name)))
        .insert_header(disposition)
        .body(SizedStream::new(length, body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("lecture1.MP4"), "video/mp4");
        assert_eq!(content_type_for("hw.pdf"), "application/pdf");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[actix_web::test]
    async fn test_missing_file_is_not_found() {
        let err = stream_file("test/does-not-exist.bin", "x.bin", false)
            .await
            .expect_err("missing");
        assert_eq!(err.code(), "E008");
    }

    #[actix_web::test]
    async fn test_streams_whole_file() {
        let relative = format!("test/{}.txt", uuid::Uuid::new_v4());
        let path = resolve_path(&relative);
        tokio::fs::create_dir_all(path.parent().expect("parent"))
            .await
            .expect("dir");
        let data = "chunk".repeat(30_000);
        tokio::fs::write(&path, &data).await.expect("write");

        let response = stream_file(&relative, "notes.txt", false)
            .await
            .expect("response");
        assert!(
            response
                .headers()
                .get(header::CONTENT_DISPOSITION)
                .and_then(|h| h.to_str().ok())
                .is_some_and(|h| h.starts_with("attachment"))
        );
        let body = to_bytes(response.into_body()).await.expect("body");
        assert_eq!(body.len(), data.len());

        let _ = tokio::fs::remove_file(&path).await;
    }
}
