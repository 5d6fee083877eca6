//! Source catalog merging.

use std::collections::HashSet;

use super::types::Source;

/// Merge `incoming` into `existing` by source `id`.
///
/// Existing entries keep their position and content, so user edits are never
/// overwritten. Incoming entries whose id is not yet present are appended in
/// their original order; an id repeated within `incoming` is added once.
pub fn merge_sources(existing: Vec<Source>, incoming: Vec<Source>) -> Vec<Source> {
    let mut seen: HashSet<String> = existing.iter().map(|s| s.id.clone()).collect();
    let mut merged = existing;

    for source in incoming {
        if seen.insert(source.id.clone()) {
            merged.push(source);
        }
    }

    merged
}
