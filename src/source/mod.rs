//! Media sources: where records are discovered and bytes are read from.

pub mod feed;
pub mod local;
pub mod object_store;

pub use feed::FeedSource;
pub use local::FsSource;
pub use object_store::ObjectStoreSource;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::SourceSpec;
use crate::record::MediaRecord;

/// Capability contract every source variant satisfies.
#[async_trait]
pub trait MediaSource: Send {
    /// List everything currently available, as one flat sequence.
    ///
    /// Backends with paginated listings follow continuation pages to
    /// exhaustion before returning; there are no partial results on success.
    async fn enumerate(&self) -> Result<Vec<MediaRecord>>;

    /// Retrieve the raw bytes for one record. Only invoked on demand, never
    /// during enumeration, so scanning a large source stays cheap.
    async fn fetch(&self, record: &MediaRecord) -> Result<Vec<u8>>;
}

/// The closed set of source backends, dispatched by tag.
pub enum Source {
    Filesystem(FsSource),
    ObjectStore(ObjectStoreSource),
    Feed(FeedSource),
}

impl Source {
    pub fn from_spec(spec: SourceSpec) -> Result<Self> {
        Ok(match spec {
            SourceSpec::Filesystem { root } => Source::Filesystem(FsSource::new(root)),
            SourceSpec::ObjectStore { bucket, region, prefix, credentials } => {
                Source::ObjectStore(ObjectStoreSource::new(&bucket, &region, prefix, &credentials)?)
            }
            SourceSpec::Feed { board, search } => Source::Feed(FeedSource::new(board, search)),
        })
    }
}

#[async_trait]
impl MediaSource for Source {
    async fn enumerate(&self) -> Result<Vec<MediaRecord>> {
        match self {
            Source::Filesystem(inner) => inner.enumerate().await,
            Source::ObjectStore(inner) => inner.enumerate().await,
            Source::Feed(inner) => inner.enumerate().await,
        }
    }

    async fn fetch(&self, record: &MediaRecord) -> Result<Vec<u8>> {
        match self {
            Source::Filesystem(inner) => inner.fetch(record).await,
            Source::ObjectStore(inner) => inner.fetch(record).await,
            Source::Feed(inner) => inner.fetch(record).await,
        }
    }
}
