//! Filesystem destination: a directory of previously archived media.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::dest::{naming, MediaDestination, Payload};
use crate::identity;
use crate::record::MediaRecord;

pub struct FsDestination {
    root: PathBuf,
    /// Content hashes known to exist under the root. `None` until the first
    /// existence check or enumeration; filled exactly once per run and then
    /// only appended to after successful writes.
    index: Option<HashSet<String>>,
}

impl FsDestination {
    /// The root directory must already exist; it is never created here.
    pub fn new(root: PathBuf) -> Self {
        Self { root, index: None }
    }

    /// Fill the hash index from a one-time directory scan.
    async fn ensure_index(&mut self) -> Result<&mut HashSet<String>> {
        if self.index.is_none() {
            let records = self.scan().await?;
            self.index = Some(records.into_iter().map(|r| r.content_hash).collect());
        }
        Ok(self.index.as_mut().unwrap())
    }

    async fn scan(&self) -> Result<Vec<MediaRecord>> {
        let mut records = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await.with_context(|| {
            format!("Failed to read destination directory: {}", self.root.display())
        })?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let path = entry.path();
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read destination file: {}", path.display()))?;
            let extension = name
                .rsplit_once('.')
                .map(|(_, ext)| format!(".{}", ext.to_ascii_lowercase()))
                .unwrap_or_default();

            records.push(MediaRecord::new(
                name,
                path.to_string_lossy().to_string(),
                extension,
                identity::digest(&bytes),
            ));
        }
        Ok(records)
    }
}

#[async_trait]
impl MediaDestination for FsDestination {
    async fn enumerate(&mut self) -> Result<Vec<MediaRecord>> {
        let records = self.scan().await?;
        self.index = Some(records.iter().map(|r| r.content_hash.clone()).collect());
        Ok(records)
    }

    async fn save<'a>(&mut self, record: &MediaRecord, payload: Payload<'a>) -> Result<()> {
        let index = self.ensure_index().await?;
        if index.contains(&record.content_hash) {
            debug!(name = %record.display_name, "content already archived, skipping");
            return Ok(());
        }

        let stored_name = naming::unique_name(&record.display_name);
        let path = self.root.join(&stored_name);
        let bytes = payload
            .await
            .with_context(|| format!("Failed to resolve payload for {}", record.display_name))?;
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("Failed to write destination file: {}", path.display()))?;

        info!(name = %record.display_name, stored = %stored_name, "archived to filesystem");
        // Index update happens only after the write succeeded.
        self.ensure_index().await?.insert(record.content_hash.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn payload_of(bytes: &'static [u8]) -> Payload<'static> {
        Box::pin(async move { Ok(bytes.to_vec()) })
    }

    #[tokio::test]
    async fn test_save_writes_under_unique_name() {
        let dir = TempDir::new().unwrap();
        let mut dest = FsDestination::new(dir.path().to_path_buf());

        let record = MediaRecord::new("clip.webm", "src", ".webm", identity::digest(b"bytes"));
        dest.save(&record, payload_of(b"bytes")).await.unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with(".webm"));
        assert_ne!(names[0], "clip.webm");
    }

    #[tokio::test]
    async fn test_save_same_hash_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut dest = FsDestination::new(dir.path().to_path_buf());

        let hash = identity::digest(b"bytes");
        let first = MediaRecord::new("a.webm", "src", ".webm", hash.clone());
        let second = MediaRecord::new("b.webm", "src", ".webm", hash);

        dest.save(&first, payload_of(b"bytes")).await.unwrap();
        // Duplicate payload would panic if awaited; it must be dropped.
        dest.save(
            &second,
            Box::pin(async { panic!("payload resolved for a duplicate") }),
        )
        .await
        .unwrap();

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_enumerate_hashes_existing_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("old_1.webm"), b"old content").unwrap();

        let mut dest = FsDestination::new(dir.path().to_path_buf());
        let records = dest.enumerate().await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content_hash, identity::digest(b"old content"));
    }

    #[tokio::test]
    async fn test_failed_payload_does_not_touch_index() {
        let dir = TempDir::new().unwrap();
        let mut dest = FsDestination::new(dir.path().to_path_buf());

        let record = MediaRecord::new("clip.webm", "src", ".webm", identity::digest(b"bytes"));
        let failing: Payload<'static> =
            Box::pin(async { anyhow::bail!("source went away") });
        assert!(dest.save(&record, failing).await.is_err());

        // A retry with a working payload must still write.
        dest.save(&record, payload_of(b"bytes")).await.unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
