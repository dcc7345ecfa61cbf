//! Content identity for deduplication.
//!
//! Every backend must report the same lowercase hex digest for the same
//! bytes. Object stores already return an MD5 ETag, and the feed API reports
//! MD5 in base64, so local hashing uses MD5 too and the other encodings are
//! normalized to its hex form.

use anyhow::{bail, Context, Result};
use base64::Engine;
use md5::{Digest, Md5};

/// Hex-encode the MD5 digest of a byte buffer.
///
/// Deterministic; repeated calls on the same bytes yield identical output.
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Normalize a store-provided integrity tag to the common digest format.
///
/// Object stores wrap the hex digest in quotes; strip them and lowercase.
pub fn normalize_etag(tag: &str) -> String {
    tag.trim_matches('"').to_ascii_lowercase()
}

/// Re-encode a base64 MD5 digest (as the feed API reports it) to hex.
///
/// A 16-byte MD5 digest in standard base64 always ends in `==`; anything else
/// is a malformed hash, not content this tool should guess about.
pub fn base64_digest_to_hex(hash: &str) -> Result<String> {
    if !hash.ends_with("==") {
        bail!("cannot convert hash to hex, incorrect encoding: {hash}");
    }
    let raw = base64::engine::general_purpose::STANDARD
        .decode(hash)
        .with_context(|| format!("invalid base64 in hash: {hash}"))?;
    if raw.len() != 16 {
        bail!("decoded hash is not a 16-byte digest: {hash}");
    }
    Ok(hex::encode(raw))
}
