//! Shared OpenDAL plumbing for the object-store source and destination.

use anyhow::{bail, Context, Result};
use futures::TryStreamExt;
use opendal::{services::S3, Operator};

use crate::config::S3Credentials;
use crate::identity;
use crate::record::MediaRecord;

/// Build an S3 operator with explicit credentials.
///
/// Credentials are always passed in; the operator never falls back to the
/// ambient AWS credential chain.
pub fn operator(bucket: &str, region: &str, credentials: &S3Credentials) -> Result<Operator> {
    let builder = S3::default()
        .bucket(bucket)
        .region(region)
        .access_key_id(&credentials.access_key_id)
        .secret_access_key(&credentials.secret_access_key);

    let operator = Operator::new(builder)
        .with_context(|| format!("Failed to configure object store client for bucket {bucket}"))?
        .finish();
    Ok(operator)
}

/// Normalize a key prefix so listing and writes agree on the directory form.
pub fn normalize_prefix(prefix: &str) -> String {
    let prefix = prefix.trim_start_matches('/');
    if prefix.is_empty() || prefix.ends_with('/') {
        prefix.to_string()
    } else {
        format!("{prefix}/")
    }
}

/// Enumerate every object under `prefix` into one flat record list.
///
/// The lister follows continuation pages until exhaustion, so the result is
/// never partial. The store-provided ETag serves as the content hash; an
/// object without one cannot participate in deduplication and aborts the
/// scan with its key named.
pub async fn enumerate_objects(operator: &Operator, prefix: &str) -> Result<Vec<MediaRecord>> {
    let mut lister = operator
        .lister_with(prefix)
        .recursive(true)
        .await
        .with_context(|| format!("Failed to list object store prefix: {prefix}"))?;

    let mut records = Vec::new();
    while let Some(entry) = lister
        .try_next()
        .await
        .with_context(|| format!("Failed to list object store prefix: {prefix}"))?
    {
        if entry.metadata().mode().is_dir() {
            continue;
        }

        let key = entry.path().to_string();
        let filename = key.rsplit('/').next().unwrap_or(key.as_str()).to_string();
        let extension = match filename.rsplit_once('.') {
            Some((_, ext)) => format!(".{}", ext.to_ascii_lowercase()),
            None => continue,
        };

        let Some(etag) = entry.metadata().etag() else {
            bail!("Object store returned no integrity tag for key: {key}");
        };

        records.push(MediaRecord::new(
            filename,
            key,
            extension,
            identity::normalize_etag(etag),
        ));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_prefix_forms() {
        assert_eq!(normalize_prefix("media"), "media/");
        assert_eq!(normalize_prefix("media/"), "media/");
        assert_eq!(normalize_prefix("/media/clips"), "media/clips/");
        assert_eq!(normalize_prefix(""), "");
    }
}
