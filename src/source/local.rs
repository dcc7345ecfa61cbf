//! Filesystem source: media files directly under a configured root.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

use crate::identity;
use crate::record::MediaRecord;
use crate::source::MediaSource;

pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl MediaSource for FsSource {
    /// Enumerate regular files under the root that carry an extension.
    ///
    /// Hashing reads each file in full; that cost is part of the scan, so
    /// `fetch` stays a plain re-read by absolute path.
    async fn enumerate(&self) -> Result<Vec<MediaRecord>> {
        let mut records = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .with_context(|| format!("Failed to read source directory: {}", self.root.display()))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("Failed to read source directory: {}", self.root.display()))?
        {
            let file_type = entry.file_type().await?;
            if !file_type.is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            // Files with no extension are not media this tool handles.
            let Some((_, ext)) = name.rsplit_once('.') else {
                continue;
            };

            let path = entry.path();
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read source file: {}", path.display()))?;

            records.push(MediaRecord::new(
                name.clone(),
                path.to_string_lossy().to_string(),
                format!(".{}", ext.to_ascii_lowercase()),
                identity::digest(&bytes),
            ));
        }

        Ok(records)
    }

    async fn fetch(&self, record: &MediaRecord) -> Result<Vec<u8>> {
        tokio::fs::read(&record.locator)
            .await
            .with_context(|| format!("Failed to read source file: {}", record.locator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_enumerate_skips_extensionless_files_and_dirs() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("clip.webm"), b"webm bytes").unwrap();
        fs::write(dir.path().join("README"), b"no extension").unwrap();
        fs::create_dir(dir.path().join("nested.d")).unwrap();

        let source = FsSource::new(dir.path().to_path_buf());
        let records = source.enumerate().await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].display_name, "clip.webm");
        assert_eq!(records[0].extension, ".webm");
        assert_eq!(records[0].content_hash, identity::digest(b"webm bytes"));
    }

    #[tokio::test]
    async fn test_fetch_rereads_by_locator() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("clip.mp4"), b"mp4 bytes").unwrap();

        let source = FsSource::new(dir.path().to_path_buf());
        let records = source.enumerate().await.unwrap();
        let bytes = source.fetch(&records[0]).await.unwrap();

        assert_eq!(bytes, b"mp4 bytes");
    }

    #[tokio::test]
    async fn test_enumerate_missing_root_fails() {
        let source = FsSource::new(PathBuf::from("/does/not/exist"));
        assert!(source.enumerate().await.is_err());
    }
}
