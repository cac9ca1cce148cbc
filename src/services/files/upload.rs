use actix_multipart::{Field, Multipart};
use actix_web::HttpResponse;
use futures_util::TryStreamExt;
use std::collections::HashMap;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::{remove_stored_file, resolve_path};
use crate::errors::CourseHubError;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::{allowed_extension, validate_magic_bytes};

/// 文件字段名
pub const FILE_FIELD: &str = "file";

/// 单个文本字段的最大字节数
const MAX_TEXT_FIELD_BYTES: usize = 1024 * 1024;

/// 魔术字节校验所需的前缀长度
const MAGIC_PREFIX_LEN: usize = 16;

/// 上传约束
pub struct UploadRules<'a> {
    pub allowed_types: &'a [String],
    pub max_size: usize,
    /// 相对上传目录的子目录
    pub subdir: String,
}

/// 已落盘的上传文件
#[derive(Debug, Clone)]
pub struct SavedFile {
    /// 相对上传目录的路径
    pub path: String,
    pub file_name: String,
    pub size: usize,
}

#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub file: Option<SavedFile>,
}

impl MultipartForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

fn reject(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message))
}

fn file_error(e: std::io::Error) -> HttpResponse {
    tracing::error!("{}", CourseHubError::file_operation(format!("{e}")));
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::FileUploadFailed,
        "文件保存失败",
    ))
}

/// 读取整个表单：文本字段收集到 `fields`，至多一个 `file` 字段写入磁盘
///
/// 出错时已写入的文件会被删除。
pub async fn read_multipart_form(
    payload: Multipart,
    rules: &UploadRules<'_>,
) -> Result<MultipartForm, HttpResponse> {
    let mut form = MultipartForm::default();
    match read_fields(payload, rules, &mut form).await {
        Ok(()) => Ok(form),
        Err(response) => {
            if let Some(saved) = &form.file {
                remove_stored_file(&saved.path).await;
            }
            Err(response)
        }
    }
}

async fn read_fields(
    mut payload: Multipart,
    rules: &UploadRules<'_>,
    form: &mut MultipartForm,
) -> Result<(), HttpResponse> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| reject(ErrorCode::BadRequest, format!("Invalid multipart payload: {e}")))?
    {
        let content_disposition = field.content_disposition();
        let name = content_disposition
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();
        let original_name = content_disposition
            .and_then(|cd| cd.get_filename())
            .map(|s| s.to_string())
            .unwrap_or_default();

        if name == FILE_FIELD {
            // 浏览器在未选择文件时仍会发送一个空文件名的字段
            if original_name.is_empty() {
                drain(&mut field).await?;
                continue;
            }
            if form.file.is_some() {
                return Err(reject(
                    ErrorCode::MultifileUploadNotAllowed,
                    "Only one file can be uploaded at a time",
                ));
            }
            form.file = Some(save_file_field(field, &original_name, rules).await?);
        } else {
            let value = read_text_field(&mut field).await?;
            form.fields.insert(name, value);
        }
    }
    Ok(())
}

async fn drain(field: &mut Field) -> Result<(), HttpResponse> {
    while field
        .try_next()
        .await
        .map_err(|e| reject(ErrorCode::BadRequest, e.to_string()))?
        .is_some()
    {}
    Ok(())
}

async fn read_text_field(field: &mut Field) -> Result<String, HttpResponse> {
    let mut buf = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| reject(ErrorCode::BadRequest, e.to_string()))?
    {
        if buf.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
            return Err(reject(ErrorCode::BadRequest, "Form field is too large"));
        }
        buf.extend_from_slice(&chunk);
    }
    String::from_utf8(buf).map_err(|_| reject(ErrorCode::BadRequest, "Form field is not UTF-8"))
}

async fn save_file_field(
    mut field: Field,
    original_name: &str,
    rules: &UploadRules<'_>,
) -> Result<SavedFile, HttpResponse> {
    let extension = allowed_extension(original_name, rules.allowed_types)
        .ok_or_else(|| reject(ErrorCode::FileTypeNotAllowed, "File type not allowed"))?;

    let dir = resolve_path(&rules.subdir);
    tokio::fs::create_dir_all(&dir).await.map_err(file_error)?;

    let stored_name = format!("{}{}", Uuid::new_v4(), extension);
    let relative = format!("{}/{}", rules.subdir, stored_name);
    let mut file = tokio::fs::File::create(dir.join(&stored_name))
        .await
        .map_err(file_error)?;

    let written = write_chunks(&mut field, &mut file, &extension, rules.max_size).await;
    drop(file);

    match written {
        Ok(size) => Ok(SavedFile {
            path: relative,
            file_name: original_name.to_string(),
            size,
        }),
        Err(response) => {
            remove_stored_file(&relative).await;
            Err(response)
        }
    }
}

async fn write_chunks(
    field: &mut Field,
    file: &mut tokio::fs::File,
    extension: &str,
    max_size: usize,
) -> Result<usize, HttpResponse> {
    let mut total_size: usize = 0;
    let mut head: Vec<u8> = Vec::with_capacity(MAGIC_PREFIX_LEN);
    let mut checked = false;

    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| reject(ErrorCode::BadRequest, e.to_string()))?
    {
        total_size += chunk.len();
        if total_size > max_size {
            return Err(reject(
                ErrorCode::FileSizeExceeded,
                "File size exceeds the limit",
            ));
        }

        if !checked {
            head.extend_from_slice(&chunk[..chunk.len().min(MAGIC_PREFIX_LEN - head.len())]);
            if head.len() >= MAGIC_PREFIX_LEN {
                checked = true;
                if !validate_magic_bytes(&head, extension) {
                    return Err(reject(ErrorCode::FileTypeNotAllowed, "文件内容与扩展名不匹配"));
                }
            }
        }

        file.write_all(&chunk).await.map_err(file_error)?;
    }

    // 短文件在读完后再校验
    if !checked && !validate_magic_bytes(&head, extension) {
        return Err(reject(ErrorCode::FileTypeNotAllowed, "文件内容与扩展名不匹配"));
    }

    file.flush().await.map_err(file_error)?;
    Ok(total_size)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use actix_web::http::{StatusCode, header};
    use actix_web::test::TestRequest;

    const BOUNDARY: &str = "XCOURSEHUBBOUNDARY";

    /// (字段名, 文件名, 内容)
    pub(crate) fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, file_name, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(file_name) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    pub(crate) fn multipart_content_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    fn multipart(parts: &[(&str, Option<&str>, &[u8])]) -> Multipart {
        let (req, payload) = TestRequest::post()
            .insert_header((header::CONTENT_TYPE, multipart_content_type()))
            .set_payload(multipart_body(parts))
            .to_http_parts();
        Multipart::new(req.headers(), payload)
    }

    fn rules(allowed: &[String], max_size: usize) -> UploadRules<'_> {
        UploadRules {
            allowed_types: allowed,
            max_size,
            subdir: format!("test/{}", Uuid::new_v4()),
        }
    }

    fn pdf_types() -> Vec<String> {
        vec![".pdf".to_string(), ".txt".to_string()]
    }

    #[actix_web::test]
    async fn test_reads_fields_and_saves_file() {
        let allowed = pdf_types();
        let rules = rules(&allowed, 1024);
        let form = read_multipart_form(
            multipart(&[
                ("content", None, "我的作业".as_bytes()),
                ("file", Some("hw1.pdf"), b"%PDF-1.7 sample document body"),
            ]),
            &rules,
        )
        .await
        .expect("form");

        assert_eq!(form.field("content"), Some("我的作业"));
        let saved = form.file.expect("file saved");
        assert_eq!(saved.file_name, "hw1.pdf");
        assert!(saved.path.starts_with(&rules.subdir));
        assert!(saved.path.ends_with(".pdf"));
        let on_disk = tokio::fs::read(resolve_path(&saved.path)).await.expect("read");
        assert_eq!(on_disk, b"%PDF-1.7 sample document body");

        let _ = tokio::fs::remove_dir_all(resolve_path(&rules.subdir)).await;
    }

    #[actix_web::test]
    async fn test_empty_file_field_is_ignored() {
        let allowed = pdf_types();
        let rules = rules(&allowed, 1024);
        let form = read_multipart_form(
            multipart(&[("content", None, b"text"), ("file", Some(""), b"")]),
            &rules,
        )
        .await
        .expect("form");
        assert!(form.file.is_none());
        assert_eq!(form.field("content"), Some("text"));
    }

    #[actix_web::test]
    async fn test_rejects_disallowed_extension() {
        let allowed = pdf_types();
        let rules = rules(&allowed, 1024);
        let response = read_multipart_form(
            multipart(&[("file", Some("virus.exe"), b"MZ\x90\x00")]),
            &rules,
        )
        .await
        .expect_err("rejected");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_rejects_mismatched_content() {
        let allowed = pdf_types();
        let rules = rules(&allowed, 1024);
        let response = read_multipart_form(
            multipart(&[("file", Some("fake.pdf"), b"this is not really a pdf file")]),
            &rules,
        )
        .await
        .expect_err("rejected");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // 被拒绝的文件不会留在磁盘上
        let mut entries = tokio::fs::read_dir(resolve_path(&rules.subdir))
            .await
            .expect("dir");
        assert!(entries.next_entry().await.expect("entry").is_none());
        let _ = tokio::fs::remove_dir_all(resolve_path(&rules.subdir)).await;
    }

    #[actix_web::test]
    async fn test_rejects_oversized_and_second_file() {
        let allowed = pdf_types();
        let rules = rules(&allowed, 8);
        let response = read_multipart_form(
            multipart(&[("file", Some("big.txt"), b"0123456789abcdef")]),
            &rules,
        )
        .await
        .expect_err("too big");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let rules = UploadRules {
            max_size: 1024,
            ..rules
        };
        let response = read_multipart_form(
            multipart(&[
                ("file", Some("a.txt"), b"first"),
                ("file", Some("b.txt"), b"second"),
            ]),
            &rules,
        )
        .await
        .expect_err("two files");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let _ = tokio::fs::remove_dir_all(resolve_path(&rules.subdir)).await;
    }
}
