//! Transient local storage for uploaded images.
//!
//! The only resource with an explicit lifecycle in this service: the image
//! is written to a uniquely-named file for the duration of the provider
//! call, then removed on both success and failure paths.

use crate::error::AppError;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// A uniquely-named temp file holding one uploaded image.
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    /// Write `data` to a fresh file under `dir`, keeping the original
    /// filename's extension.
    pub async fn write(dir: &str, filename: &str, data: &[u8]) -> Result<Self, AppError> {
        let dir = PathBuf::from(dir);
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
        }

        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("bin");
        let path = dir.join(format!("upload-{}.{}", Uuid::new_v4(), extension));

        fs::write(&path, data).await?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file. Missing-file errors are ignored.
    pub async fn remove(self) {
        if let Err(e) = fs::remove_file(&self.path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), "Failed to remove temp upload: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_and_remove_roundtrip() {
        let dir = format!("target/test-uploads-{}", Uuid::new_v4());

        let upload = TempUpload::write(&dir, "frame.png", b"bytes").await.unwrap();
        let path = upload.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "png");

        upload.remove().await;
        assert!(!path.exists());

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn unknown_extension_falls_back_to_bin() {
        let dir = format!("target/test-uploads-{}", Uuid::new_v4());

        let upload = TempUpload::write(&dir, "frame", b"bytes").await.unwrap();
        assert_eq!(upload.path().extension().unwrap(), "bin");

        upload.remove().await;
        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
