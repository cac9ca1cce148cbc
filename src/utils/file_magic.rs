//! 按扩展名校验文件头，防止改名上传

/// 文件头特征
enum Signature {
    /// 以给定字节开头，可有多个候选
    Prefix(&'static [&'static [u8]]),
    /// 在固定偏移处出现给定字节
    At(usize, &'static [u8]),
    /// 纯文本：不含 NUL 字节
    Text,
}

const ZIP: &[u8] = &[0x50, 0x4B, 0x03, 0x04];
const OLE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const EBML: &[u8] = &[0x1A, 0x45, 0xDF, 0xA3];

fn signature_for(extension: &str) -> Option<Signature> {
    let signature = match extension {
        ".png" => Signature::Prefix(&[&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]]),
        ".jpg" | ".jpeg" => Signature::Prefix(&[&[0xFF, 0xD8, 0xFF]]),
        ".gif" => Signature::Prefix(&[b"GIF87a", b"GIF89a"]),
        ".pdf" => Signature::Prefix(&[b"%PDF"]),
        ".doc" | ".xls" | ".ppt" => Signature::Prefix(&[OLE]),
        // OOXML 文档本身是 zip
        ".docx" | ".xlsx" | ".pptx" | ".zip" => Signature::Prefix(&[ZIP]),
        ".rar" => Signature::Prefix(&[b"Rar!"]),
        ".7z" => Signature::Prefix(&[&[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C]]),
        ".gz" => Signature::Prefix(&[&[0x1F, 0x8B]]),
        ".mp4" | ".m4v" | ".mov" => Signature::At(4, b"ftyp"),
        ".webm" | ".mkv" => Signature::Prefix(&[EBML]),
        ".txt" | ".md" | ".csv" | ".json" | ".py" | ".rs" | ".c" | ".cpp" | ".java" => {
            Signature::Text
        }
        _ => return None,
    };
    Some(signature)
}

/// 校验文件开头的字节是否与扩展名（含点号）相符；未知扩展名一律拒绝
pub fn validate_magic_bytes(data: &[u8], extension: &str) -> bool {
    if data.is_empty() {
        return false;
    }
    match signature_for(&extension.to_lowercase()) {
        Some(Signature::Prefix(candidates)) => candidates.iter().any(|p| data.starts_with(p)),
        Some(Signature::At(offset, bytes)) => data
            .get(offset..offset + bytes.len())
            .is_some_and(|window| window == bytes),
        Some(Signature::Text) => !data.contains(&0),
        None => false,
    }
}

/// 提取小写扩展名（带点号），不在允许列表中时返回 None
pub fn allowed_extension(file_name: &str, allowed: &[String]) -> Option<String> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))?;
    allowed
        .iter()
        .any(|t| t.to_lowercase() == extension)
        .then_some(extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_magic() {
        let mp4 = [0x00, 0x00, 0x00, 0x18, b'f', b't', b'y', b'p', b'm', b'p', b'4', b'2'];
        assert!(validate_magic_bytes(&mp4, ".mp4"));
        assert!(validate_magic_bytes(&mp4, ".MOV"));
        assert!(!validate_magic_bytes(&mp4, ".webm"));
        assert!(!validate_magic_bytes(&mp4[..6], ".mp4"));
        let webm = [0x1A, 0x45, 0xDF, 0xA3, 0x01];
        assert!(validate_magic_bytes(&webm, ".webm"));
    }

    #[test]
    fn test_allowed_extension() {
        let allowed = vec![".pdf".to_string(), ".ZIP".to_string()];
        assert_eq!(allowed_extension("report.PDF", &allowed), Some(".pdf".to_string()));
        assert_eq!(allowed_extension("code.zip", &allowed), Some(".zip".to_string()));
        assert_eq!(allowed_extension("virus.exe", &allowed), None);
        assert_eq!(allowed_extension("noext", &allowed), None);
    }

    #[test]
    fn test_documents() {
        assert!(validate_magic_bytes(b"%PDF-1.7", ".pdf"));
        assert!(!validate_magic_bytes(b"%PDF-1.7", ".docx"));
        assert!(validate_magic_bytes(&[0x50, 0x4B, 0x03, 0x04, 0x14], ".docx"));
        assert!(validate_magic_bytes(b"GIF89a..", ".gif"));
    }

    #[test]
    fn test_text_and_unknown() {
        assert!(validate_magic_bytes("作业答案".as_bytes(), ".md"));
        assert!(!validate_magic_bytes(b"MZ\x00\x90", ".txt"));
        assert!(!validate_magic_bytes(b"MZ\x90", ".exe"));
        assert!(!validate_magic_bytes(b"", ".txt"));
    }
}
