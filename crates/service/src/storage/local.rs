use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use super::{unique_filename, ImageStorage, ImageUpload};
use crate::errors::ServiceError;

/// Images under `<static_dir>/uploads`, served at `/static/uploads/...`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    upload_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self { upload_dir: upload_dir.into() }
    }

    pub fn from_config(cfg: &configs::StorageConfig) -> Self {
        Self::new(cfg.upload_dir())
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    fn path_for(&self, image_path: &str) -> Option<PathBuf> {
        let name = Path::new(image_path).file_name()?;
        Some(self.upload_dir.join(name))
    }
}

#[async_trait]
impl ImageStorage for LocalStorage {
    async fn save(&self, image: &ImageUpload) -> Result<String, ServiceError> {
        fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let filename = unique_filename(&image.filename);
        fs::write(self.upload_dir.join(&filename), &image.bytes)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        debug!(%filename, size = image.bytes.len(), "image stored");
        Ok(format!("uploads/{filename}"))
    }

    fn url_for(&self, image_path: &str) -> String {
        if image_path.is_empty() {
            return String::new();
        }
        format!("/static/{image_path}")
    }

    async fn delete(&self, image_path: &str) -> Result<(), ServiceError> {
        if image_path.is_empty() {
            return Ok(());
        }
        let Some(path) = self.path_for(image_path) else {
            warn!(%image_path, "image path has no file name; nothing to delete");
            return Ok(());
        };
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ServiceError::Storage(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_storage() -> LocalStorage {
        LocalStorage::new(std::env::temp_dir().join(format!("ecomm_uploads_{}", uuid::Uuid::new_v4())))
    }

    #[test]
    fn url_for_empty_path_is_empty() {
        let s = tmp_storage();
        assert_eq!(s.url_for(""), "");
        assert_eq!(s.url_for("uploads/abc.jpg"), "/static/uploads/abc.jpg");
    }

    #[tokio::test]
    async fn save_then_delete() {
        let s = tmp_storage();
        let upload = ImageUpload { filename: "shot.webp".into(), content_type: None, bytes: b"img".to_vec() };
        let rel = s.save(&upload).await.unwrap();
        assert!(rel.starts_with("uploads/") && rel.ends_with(".webp"));
        let on_disk = s.upload_dir().join(rel.trim_start_matches("uploads/"));
        assert_eq!(fs::read(&on_disk).await.unwrap(), b"img");

        s.delete(&rel).await.unwrap();
        assert!(!on_disk.exists());
        // second delete is a no-op
        s.delete(&rel).await.unwrap();
        let _ = fs::remove_dir_all(s.upload_dir()).await;
    }
}
