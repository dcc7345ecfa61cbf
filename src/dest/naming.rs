//! Stored-name generation for destination writes.

use std::sync::atomic::{AtomicI64, Ordering};

static LAST_STAMP: AtomicI64 = AtomicI64::new(0);

/// Millisecond epoch stamp, clamped to be strictly increasing process-wide
/// so two saves in the same millisecond cannot produce the same name.
fn next_stamp() -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    loop {
        let last = LAST_STAMP.load(Ordering::SeqCst);
        let candidate = now.max(last + 1);
        if LAST_STAMP
            .compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            return candidate;
        }
    }
}

/// Strip everything outside a safe alphanumeric/hyphen/underscore set, to
/// avoid encoding trouble on the target storage.
fn sanitize(base: &str) -> String {
    base.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

/// Generate a fresh unique stored name from a record's display name:
/// `<sanitized-base>_<millisecond-epoch>.<original-extension>`.
pub fn unique_name(display_name: &str) -> String {
    let stamp = next_stamp();
    match display_name.rsplit_once('.') {
        Some((base, ext)) => format!("{}_{stamp}.{ext}", sanitize(base)),
        None => format!("{}_{stamp}", sanitize(display_name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_extension_and_differs_from_original() {
        let name = unique_name("clip.webm");
        assert!(name.ends_with(".webm"));
        assert_ne!(name, "clip.webm");
        assert!(name.starts_with("clip_"));
    }

    #[test]
    fn test_consecutive_names_never_collide() {
        let first = unique_name("clip.webm");
        let second = unique_name("clip.webm");
        assert_ne!(first, second);
    }

    #[test]
    fn test_sanitizes_unsafe_characters() {
        let name = unique_name("my clip! (final).webm");
        let base = name.rsplit_once('.').unwrap().0;
        assert!(base.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert!(base.starts_with("myclipfinal_"));
    }
}
