use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use async_trait::async_trait;
use tracing::debug;

use super::{unique_filename, ImageStorage, ImageUpload, DEFAULT_CONTENT_TYPE};
use crate::errors::ServiceError;

/// Images as `uploads/<uuid-hex><ext>` objects in one bucket, linked by
/// their public virtual-hosted URL.
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self { client, bucket: bucket.into() }
    }

    pub async fn from_env(bucket: impl Into<String>) -> Self {
        Self::new(Client::new(&crate::aws::sdk_config().await), bucket)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

pub fn object_key(filename: &str) -> String {
    format!("uploads/{filename}")
}

pub fn storage_error(e: impl std::error::Error) -> ServiceError {
    ServiceError::Storage(DisplayErrorContext(e).to_string())
}

#[async_trait]
impl ImageStorage for S3Storage {
    async fn save(&self, image: &ImageUpload) -> Result<String, ServiceError> {
        let key = object_key(&unique_filename(&image.filename));
        let content_type = image.content_type.as_deref().filter(|c| !c.is_empty()).unwrap_or(DEFAULT_CONTENT_TYPE);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(image.bytes.clone()))
            .send()
            .await
            .map_err(storage_error)?;
        debug!(bucket = %self.bucket, %key, size = image.bytes.len(), "image uploaded");
        Ok(key)
    }

    fn url_for(&self, image_path: &str) -> String {
        if image_path.is_empty() {
            return String::new();
        }
        format!("https://{}.s3.amazonaws.com/{}", self.bucket, image_path)
    }

    async fn delete(&self, image_path: &str) -> Result<(), ServiceError> {
        if image_path.is_empty() {
            return Ok(());
        }
        // S3 deletes of absent keys succeed
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(image_path)
            .send()
            .await
            .map_err(storage_error)?;
        debug!(bucket = %self.bucket, key = %image_path, "image deleted");
        Ok(())
    }
}
