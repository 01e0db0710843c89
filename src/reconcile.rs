//! Provenance-ordered reconciliation of domain collections.
//!
//! Every read surface merges up to three lists of the same entity type:
//! server-fetched items, locally-created items, and bundled sample data.
//! The union is deduplicated by identifier; the first occurrence wins, so
//! callers pass sources in authority order (server, local, sample).

use std::collections::HashSet;

use crate::types::Record;

/// Merge provenance lists into one deduplicated view.
///
/// Input order is preserved both across and within sources.
pub fn merge_by_id<T, I>(sources: I) -> Vec<T>
where
    T: Record,
    I: IntoIterator<Item = Vec<T>>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged: Vec<T> = Vec::new();
    for source in sources {
        for item in source {
            if seen.insert(item.id().to_string()) {
                merged.push(item);
            }
        }
    }
    merged
}
