use sha2::{Digest, Sha256};

use crate::detection::MediaFile;

/// 上传文件的 SHA-256 指纹 (64 位小写十六进制)
///
/// 只用于日志追踪：日志里记录指纹和大小，不记录文件内容本身。
pub fn media_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// 日志里用的简短摘要：文件名、大小、指纹前 12 位
pub fn describe_media(file: &MediaFile) -> String {
    let digest = media_digest(&file.bytes);
    format!(
        "{} ({} bytes, sha256:{})",
        file.file_name,
        file.len(),
        &digest[..12]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_of_empty_input() {
        assert_eq!(
            media_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn description_never_contains_payload() {
        let file = MediaFile::new("face.png", "image/png", b"secret-pixels".to_vec());
        let text = describe_media(&file);
        assert!(text.starts_with("face.png (13 bytes, sha256:"));
        assert!(!text.contains("secret-pixels"));
    }
}
