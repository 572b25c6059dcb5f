//! Object store uploads.

use std::path::Path;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::debug;

use crate::config::S3Config;
use crate::error::{Result, StorageError};

/// Destination for finished or in-progress storage files.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload the file at `path` under `key`, replacing any previous object.
    async fn put_file(&self, key: &str, path: &Path) -> Result<()>;
}

/// [`ObjectStore`] backed by Amazon S3.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a client for the configured region. Credentials come from the
    /// default provider chain.
    pub async fn from_config(config: &S3Config) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;
        Self::new(Client::new(&shared), config.bucket.clone())
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_file(&self, key: &str, path: &Path) -> Result<()> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::ReadForUpload {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        debug!(bucket = %self.bucket, key, "Uploaded file");
        Ok(())
    }
}
