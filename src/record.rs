//! Media record value type shared by all sources and destinations.

/// One discovered media file.
///
/// Identity for deduplication is `content_hash` alone: two records with equal
/// hashes are the same content no matter what `display_name` or `locator`
/// say. A record is never mutated after construction; saved/unsaved status is
/// tracked by the destination's hash index, not by a field here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRecord {
    /// Human-readable filename, used for renaming-on-write and logging.
    pub display_name: String,
    /// Opaque string meaningful only to the backend that produced it
    /// (absolute path, object key, or remote URL). Never parsed by the core.
    pub locator: String,
    /// Lowercase file extension including the leading dot.
    pub extension: String,
    /// Lowercase hex digest of the file's raw bytes.
    pub content_hash: String,
    /// Numeric key the feed source needs to fetch bytes (a timestamp-derived
    /// asset id). Left at 0 by filesystem and object-store sources.
    pub retrieval_key: u64,
}

impl MediaRecord {
    pub fn new(
        display_name: impl Into<String>,
        locator: impl Into<String>,
        extension: impl Into<String>,
        content_hash: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            locator: locator.into(),
            extension: extension.into(),
            content_hash: content_hash.into(),
            retrieval_key: 0,
        }
    }

    /// Same as [`MediaRecord::new`] but with the feed's retrieval key set.
    pub fn with_retrieval_key(mut self, key: u64) -> Self {
        self.retrieval_key = key;
        self
    }
}
