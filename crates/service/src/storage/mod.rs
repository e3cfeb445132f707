//! Product image storage.
//!
//! Products only keep a relative `image_path`; a storage backend turns that
//! into stored bytes and a public URL.

pub mod local;
pub mod s3;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;

pub use local::LocalStorage;
pub use s3::S3Storage;

pub const DEFAULT_EXTENSION: &str = ".jpg";
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// An uploaded image file as received from a form.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Persist an uploaded file and return its relative path.
    async fn save(&self, image: &ImageUpload) -> Result<String, ServiceError>;

    /// Public URL for a stored path; empty when the path is empty.
    fn url_for(&self, image_path: &str) -> String;

    /// Remove a stored image. Missing files are not an error.
    async fn delete(&self, image_path: &str) -> Result<(), ServiceError>;
}

/// Fresh `<uuid-hex><ext>` name; `ext` is taken from `original` or defaults
/// to `.jpg`.
pub fn unique_filename(original: &str) -> String {
    let ext = Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| format!(".{e}"))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    format!("{}{}", Uuid::new_v4().simple(), ext)
}

/// Content type from a file extension, for uploads that did not declare one.
pub fn guess_content_type(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        "ico" => "image/vnd.microsoft.icon",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// S3 when `cfg` names a bucket, local disk under the upload dir otherwise.
pub async fn from_config(cfg: &configs::StorageConfig) -> Arc<dyn ImageStorage> {
    let storage: Arc<dyn ImageStorage> = match cfg.object_store_bucket() {
        Some(bucket) => {
            info!(%bucket, "product images go to S3");
            Arc::new(S3Storage::from_env(bucket).await)
        }
        None => {
            info!(dir = %cfg.upload_dir(), "product images go to local disk");
            Arc::new(LocalStorage::from_config(cfg))
        }
    };
    storage
}
