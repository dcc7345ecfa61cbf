//! Throttled feed source: an imageboard-style JSON API.
//!
//! Enumeration is two-stage: the board catalog lists threads, then every
//! thread whose title matches the search term is fetched for its posts. The
//! API's operator imposes a hard one-request-per-second ceiling, so every
//! outbound call goes through the [`RateLimiter`].

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::identity;
use crate::limit::RateLimiter;
use crate::record::MediaRecord;
use crate::source::MediaSource;

const DATA_DOMAIN: &str = "https://a.4cdn.org";
const CONTENT_DOMAIN: &str = "https://i.4cdn.org";

/// Extensions kept when scanning threads. Everything else is skipped.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[".webm", ".mp4"];

/// One page of the board catalog.
#[derive(Debug, Deserialize)]
struct CatalogPage {
    threads: Vec<CatalogThread>,
}

#[derive(Debug, Deserialize)]
struct CatalogThread {
    no: u64,
    /// Thread subject; absent on untitled threads.
    #[serde(default)]
    sub: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ThreadDetail {
    posts: Vec<Post>,
}

/// A post in a thread. Media fields are all optional; text-only posts carry
/// none of them.
#[derive(Debug, Deserialize)]
struct Post {
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    ext: Option<String>,
    /// Timestamp-derived asset id, required to fetch the media bytes.
    #[serde(default)]
    tim: Option<u64>,
    /// MD5 of the media, base64-encoded by the feed.
    #[serde(default)]
    md5: Option<String>,
}

pub struct FeedSource {
    client: reqwest::Client,
    limiter: RateLimiter,
    board: String,
    search: String,
    allowed_extensions: Vec<String>,
}

impl FeedSource {
    pub fn new(board: String, search: String) -> Self {
        Self::with_allowed_extensions(
            board,
            search,
            DEFAULT_ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        )
    }

    pub fn with_allowed_extensions(
        board: String,
        search: String,
        allowed_extensions: Vec<String>,
    ) -> Self {
        info!(board = %board, search = %search, "feed source throttled to one request per second");
        Self {
            client: reqwest::Client::new(),
            limiter: RateLimiter::per_second(),
            board: board.to_lowercase(),
            search,
            allowed_extensions,
        }
    }

    async fn board_catalog(&self) -> Result<Vec<CatalogPage>> {
        let url = format!("{DATA_DOMAIN}/{}/catalog.json", self.board);
        self.limiter
            .schedule(async {
                self.client
                    .get(&url)
                    .send()
                    .await?
                    .error_for_status()?
                    .json::<Vec<CatalogPage>>()
                    .await
                    .map_err(anyhow::Error::from)
            })
            .await
            .with_context(|| format!("Failed to fetch board catalog: {}", self.board))
    }

    async fn thread_detail(&self, thread_no: u64) -> Result<ThreadDetail> {
        debug!(board = %self.board, thread = thread_no, "fetching thread detail");
        let url = format!("{DATA_DOMAIN}/{}/thread/{thread_no}.json", self.board);
        self.limiter
            .schedule(async {
                self.client
                    .get(&url)
                    .send()
                    .await?
                    .error_for_status()?
                    .json::<ThreadDetail>()
                    .await
                    .map_err(anyhow::Error::from)
            })
            .await
            .with_context(|| format!("Failed to fetch thread detail: {}/{thread_no}", self.board))
    }

    /// Thread numbers whose subject contains the search term,
    /// case-insensitively.
    fn matching_threads(&self, pages: &[CatalogPage]) -> Vec<u64> {
        let needle = self.search.to_lowercase();
        pages
            .iter()
            .flat_map(|page| &page.threads)
            .filter(|thread| {
                thread
                    .sub
                    .as_deref()
                    .is_some_and(|sub| sub.to_lowercase().contains(&needle))
            })
            .map(|thread| thread.no)
            .collect()
    }

    /// Convert a thread's posts into records.
    ///
    /// Posts missing any media field are plain text and skipped; a present
    /// but malformed digest is a data error and aborts the scan.
    fn records_from_posts(&self, posts: &[Post]) -> Result<Vec<MediaRecord>> {
        let mut records = Vec::new();
        for post in posts {
            let (Some(filename), Some(ext), Some(tim), Some(md5)) =
                (&post.filename, &post.ext, post.tim, &post.md5)
            else {
                continue;
            };

            let ext = ext.to_lowercase();
            if !self.allowed_extensions.iter().any(|allowed| *allowed == ext) {
                continue;
            }

            let display_name = format!("{filename}{ext}");
            let content_hash = identity::base64_digest_to_hex(md5)
                .with_context(|| format!("Malformed digest on feed entry: {display_name}"))?;

            records.push(
                MediaRecord::new(
                    display_name,
                    format!("{CONTENT_DOMAIN}/{}/{tim}{ext}", self.board),
                    ext,
                    content_hash,
                )
                .with_retrieval_key(tim),
            );
        }
        Ok(records)
    }
}

#[async_trait]
impl MediaSource for FeedSource {
    async fn enumerate(&self) -> Result<Vec<MediaRecord>> {
        info!(board = %self.board, "loading board catalog");
        let pages = self.board_catalog().await?;

        let total: usize = pages.iter().map(|page| page.threads.len()).sum();
        let targets = self.matching_threads(&pages);
        info!(
            matched = targets.len(),
            total, search = %self.search,
            "applied search filter to catalog threads"
        );

        let mut records = Vec::new();
        for thread_no in targets {
            let detail = self.thread_detail(thread_no).await?;
            records.extend(self.records_from_posts(&detail.posts)?);
        }

        info!(records = records.len(), "feed enumeration complete");
        Ok(records)
    }

    async fn fetch(&self, record: &MediaRecord) -> Result<Vec<u8>> {
        if record.retrieval_key == 0 {
            bail!(
                "Record has no retrieval key, it did not originate from this source: {}",
                record.display_name
            );
        }
        let bytes = self
            .limiter
            .schedule(async {
                self.client
                    .get(&record.locator)
                    .send()
                    .await?
                    .error_for_status()?
                    .bytes()
                    .await
                    .map_err(anyhow::Error::from)
            })
            .await
            .with_context(|| format!("Failed to fetch feed media: {}", record.locator))?;
        Ok(bytes.to_vec())
    }
}
