//! Folds partial indexes into the final index.
//!
//! Only one partial file is resident at a time, but the accumulator grows to
//! the size of the full index. Corpora whose final index does not fit in
//! memory need a k-way merge over term-sorted partials instead.

use crate::spill::SpillHandle;
use crate::InvertedIndex;
use anyhow::Result;

/// Sum in-memory partial indexes. The result does not depend on their order.
pub fn merge_indexes<I: IntoIterator<Item = InvertedIndex>>(parts: I) -> InvertedIndex {
    let mut merged = InvertedIndex::new();
    for part in parts {
        merged.absorb(part);
    }
    merged
}

/// Stream every spilled part from disk, then fold in an optional unspilled remainder.
pub fn merge_partials(handles: &[SpillHandle], remainder: Option<InvertedIndex>) -> Result<InvertedIndex> {
    let mut merged = InvertedIndex::new();
    for handle in handles {
        let part = handle.load()?;
        tracing::debug!(part_num = handle.part_num, num_terms = part.num_terms(), "merging partial index");
        merged.absorb(part);
    }
    if let Some(rest) = remainder {
        merged.absorb(rest);
    }
    tracing::info!(parts = handles.len(), num_terms = merged.num_terms(), num_postings = merged.num_postings(), "merged partial indexes");
    Ok(merged)
}
