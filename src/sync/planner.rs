//! Transfer planning: which source records the destination lacks.

use std::collections::HashSet;

use crate::record::MediaRecord;

/// Source records whose content hash is absent at the destination, in source
/// enumeration order.
///
/// Comparison is by hash only; names and locators are irrelevant. The source
/// list itself is not deduplicated: if the source yields two records with the
/// same hash, both are planned, and the destination's in-run index update
/// after the first save turns the second into a write-time no-op rather than
/// silently dropping it here.
pub fn plan(source: &[MediaRecord], destination: &[MediaRecord]) -> Vec<MediaRecord> {
    let existing: HashSet<&str> = destination
        .iter()
        .map(|record| record.content_hash.as_str())
        .collect();

    source
        .iter()
        .filter(|record| !existing.contains(record.content_hash.as_str()))
        .cloned()
        .collect()
}
