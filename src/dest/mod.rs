//! Media destinations: where unique content gets persisted.

pub mod local;
pub mod naming;
pub mod object_store;

pub use local::FsDestination;
pub use object_store::ObjectStoreDestination;

use anyhow::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::config::DestinationSpec;
use crate::record::MediaRecord;

/// A lazily-resolved byte payload. Destinations only await it when the bytes
/// will actually be written; a duplicate save drops it unresolved, so no
/// fetch happens for content that is already present.
pub type Payload<'a> = BoxFuture<'a, Result<Vec<u8>>>;

/// Capability contract every destination variant satisfies.
#[async_trait]
pub trait MediaDestination: Send {
    /// List everything already stored. Also primes the hash index.
    async fn enumerate(&mut self) -> Result<Vec<MediaRecord>>;

    /// Persist the payload under a freshly generated unique name, unless a
    /// record with the same content hash already exists, in which case this
    /// is a successful no-op.
    async fn save<'a>(&mut self, record: &MediaRecord, payload: Payload<'a>) -> Result<()>;
}

/// The closed set of destination backends, dispatched by tag.
pub enum Destination {
    Filesystem(FsDestination),
    ObjectStore(ObjectStoreDestination),
}

impl Destination {
    pub fn from_spec(spec: DestinationSpec) -> Result<Self> {
        Ok(match spec {
            DestinationSpec::Filesystem { root } => {
                Destination::Filesystem(FsDestination::new(root))
            }
            DestinationSpec::ObjectStore { bucket, region, prefix, credentials } => {
                Destination::ObjectStore(ObjectStoreDestination::new(
                    &bucket,
                    &region,
                    prefix,
                    &credentials,
                )?)
            }
        })
    }
}

#[async_trait]
impl MediaDestination for Destination {
    async fn enumerate(&mut self) -> Result<Vec<MediaRecord>> {
        match self {
            Destination::Filesystem(inner) => inner.enumerate().await,
            Destination::ObjectStore(inner) => inner.enumerate().await,
        }
    }

    async fn save<'a>(&mut self, record: &MediaRecord, payload: Payload<'a>) -> Result<()> {
        match self {
            Destination::Filesystem(inner) => inner.save(record, payload).await,
            Destination::ObjectStore(inner) => inner.save(record, payload).await,
        }
    }
}
