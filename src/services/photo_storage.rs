use std::io::ErrorKind;
use std::path::Path;

use tracing::warn;

use crate::error::ApiError;

/// Photo files on local disk, served back under `/uploads`.
pub struct PhotoStorage<'a> {
    dir: &'a Path,
    public_url: &'a str,
}

impl<'a> PhotoStorage<'a> {
    pub fn new(dir: &'a Path, public_url: &'a str) -> Self {
        Self { dir, public_url }
    }

    /// Writes the file and returns its public URL.
    pub async fn save(&self, photo_id: &str, extension: &str, bytes: &[u8]) -> Result<String, ApiError> {
        let file_name = format!("{}.{}", photo_id, extension);
        tokio::fs::create_dir_all(self.dir)
            .await
            .map_err(|e| ApiError::Internal(e.into()))?;
        tokio::fs::write(self.dir.join(&file_name), bytes)
            .await
            .map_err(|e| ApiError::Internal(e.into()))?;
        Ok(format!(
            "{}/uploads/{}",
            self.public_url.trim_end_matches('/'),
            file_name
        ))
    }

    pub async fn remove(&self, url: &str) {
        let Some(file_name) = url.rsplit('/').next().filter(|n| !n.is_empty()) else {
            return;
        };
        match tokio::fs::remove_file(self.dir.join(file_name)).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(file = %file_name, error = %e, "failed to remove photo file"),
        }
    }
}

pub fn extension_for(file_name: Option<&str>, content_type: Option<&str>) -> Result<&'static str, ApiError> {
    if let Some(ct) = content_type {
        match ct {
            "image/jpeg" | "image/jpg" => return Ok("jpg"),
            "image/png" => return Ok("png"),
            "image/gif" => return Ok("gif"),
            "image/webp" => return Ok("webp"),
            other if !other.starts_with("image/") && other != "application/octet-stream" => {
                return Err(ApiError::field("file", "Only image uploads are allowed"));
            }
            _ => {}
        }
    }
    let ext = file_name
        .and_then(|n| n.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase());
    Ok(match ext.as_deref() {
        Some("png") => "png",
        Some("gif") => "gif",
        Some("webp") => "webp",
        _ => "jpg",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_prefers_content_type() {
        assert_eq!(extension_for(Some("a.gif"), Some("image/png")).unwrap(), "png");
        assert_eq!(extension_for(Some("a.WEBP"), None).unwrap(), "webp");
        assert_eq!(extension_for(None, Some("application/octet-stream")).unwrap(), "jpg");
        assert!(extension_for(Some("a.txt"), Some("text/plain")).is_err());
    }

    #[tokio::test]
    async fn save_then_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = PhotoStorage::new(dir.path(), "http://localhost:5000/");
        let url = storage.save("p1", "png", b"png-bytes").await.unwrap();
        assert_eq!(url, "http://localhost:5000/uploads/p1.png");
        assert!(dir.path().join("p1.png").exists());
        storage.remove(&url).await;
        assert!(!dir.path().join("p1.png").exists());
        // second removal is a no-op
        storage.remove(&url).await;
    }
}
