//! 上传文件的落盘、读取与删除
//!
//! 数据库中只保存相对上传目录的路径，落盘文件名为随机 UUID 加扩展名，
//! 原始文件名单独保存，用于下载时回显。

pub mod serve;
pub mod upload;

pub use serve::stream_file;
pub use upload::{MultipartForm, SavedFile, UploadRules, read_multipart_form};

use std::path::PathBuf;

use crate::config::AppConfig;

/// 相对路径对应的磁盘路径
pub(crate) fn resolve_path(relative: &str) -> PathBuf {
    PathBuf::from(&AppConfig::get().upload.dir).join(relative)
}

/// 删除已落盘的文件，失败只记录日志
pub async fn remove_stored_file(relative: &str) {
    let path = resolve_path(relative);
    if let Err(e) = tokio::fs::remove_file(&path).await
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!("Failed to remove {}: {}", path.display(), e);
    }
}
