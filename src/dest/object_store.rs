//! Object-store destination: archived media under a bucket key prefix.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use opendal::Operator;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::config::S3Credentials;
use crate::dest::{naming, MediaDestination, Payload};
use crate::object_store;
use crate::record::MediaRecord;

pub struct ObjectStoreDestination {
    operator: Operator,
    prefix: String,
    /// ETag-derived hashes of everything under the prefix. Same lifecycle as
    /// the filesystem destination's index: one listing scan per run,
    /// append-after-successful-write.
    index: Option<HashSet<String>>,
}

impl ObjectStoreDestination {
    pub fn new(
        bucket: &str,
        region: &str,
        prefix: String,
        credentials: &S3Credentials,
    ) -> Result<Self> {
        Ok(Self {
            operator: object_store::operator(bucket, region, credentials)?,
            prefix: object_store::normalize_prefix(&prefix),
            index: None,
        })
    }

    async fn ensure_index(&mut self) -> Result<&mut HashSet<String>> {
        if self.index.is_none() {
            let records = object_store::enumerate_objects(&self.operator, &self.prefix).await?;
            self.index = Some(records.into_iter().map(|r| r.content_hash).collect());
        }
        Ok(self.index.as_mut().unwrap())
    }
}

/// Content type for an extension. The destination refuses to guess: an
/// unrecognized extension is a hard failure raised before any network write.
fn content_type_for(record: &MediaRecord) -> Result<&'static str> {
    match record.extension.as_str() {
        ".webm" => Ok("video/webm"),
        ".mp4" => Ok("video/mp4"),
        ".gif" => Ok("image/gif"),
        ".jpg" | ".jpeg" => Ok("image/jpeg"),
        ".png" => Ok("image/png"),
        _ => bail!(
            "Unsupported extension {} for object store destination, refusing to save: {}",
            record.extension,
            record.display_name
        ),
    }
}

#[async_trait]
impl MediaDestination for ObjectStoreDestination {
    async fn enumerate(&mut self) -> Result<Vec<MediaRecord>> {
        let records = object_store::enumerate_objects(&self.operator, &self.prefix).await?;
        self.index = Some(records.iter().map(|r| r.content_hash.clone()).collect());
        Ok(records)
    }

    async fn save<'a>(&mut self, record: &MediaRecord, payload: Payload<'a>) -> Result<()> {
        let index = self.ensure_index().await?;
        if index.contains(&record.content_hash) {
            debug!(name = %record.display_name, "content already in destination bucket, skipping");
            return Ok(());
        }

        // Classify before resolving the payload so an unsupported extension
        // fails without any bytes fetched or written.
        let content_type = content_type_for(record)?;
        let stored_name = naming::unique_name(&record.display_name);
        let key = format!("{}{stored_name}", self.prefix);

        let bytes = payload
            .await
            .with_context(|| format!("Failed to resolve payload for {}", record.display_name))?;
        self.operator
            .write_with(&key, bytes)
            .content_type(content_type)
            .await
            .with_context(|| format!("Failed to write object: {key}"))?;

        info!(name = %record.display_name, key = %key, "archived to object store");
        self.ensure_index().await?.insert(record.content_hash.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for_known_extensions() {
        let record = |ext: &str| MediaRecord::new(format!("clip{ext}"), "loc", ext, "hash");
        assert_eq!(content_type_for(&record(".webm")).unwrap(), "video/webm");
        assert_eq!(content_type_for(&record(".mp4")).unwrap(), "video/mp4");
        assert_eq!(content_type_for(&record(".jpeg")).unwrap(), "image/jpeg");
    }

    #[test]
    fn test_unrecognized_extension_is_rejected_with_name() {
        let record = MediaRecord::new("mystery.xyz", "loc", ".xyz", "hash");
        let err = content_type_for(&record).unwrap_err();
        assert!(err.to_string().contains("mystery.xyz"));
    }
}
