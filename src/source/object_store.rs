//! Object-store source: objects under a key prefix, ETags as content hashes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use opendal::Operator;

use crate::config::S3Credentials;
use crate::object_store;
use crate::record::MediaRecord;
use crate::source::MediaSource;

pub struct ObjectStoreSource {
    operator: Operator,
    prefix: String,
}

impl ObjectStoreSource {
    pub fn new(
        bucket: &str,
        region: &str,
        prefix: String,
        credentials: &S3Credentials,
    ) -> Result<Self> {
        Ok(Self {
            operator: object_store::operator(bucket, region, credentials)?,
            prefix: object_store::normalize_prefix(&prefix),
        })
    }
}

#[async_trait]
impl MediaSource for ObjectStoreSource {
    async fn enumerate(&self) -> Result<Vec<MediaRecord>> {
        object_store::enumerate_objects(&self.operator, &self.prefix).await
    }

    /// Retrieve the object body, fully drained into one contiguous buffer.
    async fn fetch(&self, record: &MediaRecord) -> Result<Vec<u8>> {
        let body = self
            .operator
            .read(&record.locator)
            .await
            .with_context(|| format!("Failed to read object: {}", record.locator))?;
        Ok(body.to_vec())
    }
}
