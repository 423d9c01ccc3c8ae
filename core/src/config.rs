//! Build and query defaults.
//!
//! Runtime overrides come from CLI flags in the `indexer` and `server` binaries.

use anyhow::{bail, Result};

/// Maximum number of documents held in memory before the partial index is spilled.
pub const DEFAULT_TEMP_MEM: usize = 15_000;

/// Number of ranked documents returned per query.
pub const DEFAULT_TOP_K: usize = 5;

/// Weight of an ordinary occurrence.
pub const BASE_WEIGHT: u32 = 1;

/// Weight of an occurrence whose term also appears in a heading or bold region.
pub const IMPORTANT_WEIGHT: u32 = 2;

/// Elements whose text counts as important.
pub const IMPORTANT_SELECTORS: &[&str] = &["h1", "h2", "h3", "b", "strong"];

/// Rendered in place of a url when the document map has no entry.
pub const MISSING_URL_PLACEHOLDER: &str = "[Missing URL]";

/// Bumped whenever the on-disk layout of the index directory changes.
pub const INDEX_VERSION: u32 = 1;

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub temp_mem: usize,
    /// Leave `parts/index_part_*.bin` in the published index instead of deleting them.
    pub keep_parts: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { temp_mem: DEFAULT_TEMP_MEM, keep_parts: false }
    }
}

impl BuildOptions {
    pub fn validate(&self) -> Result<()> {
        if self.temp_mem == 0 {
            bail!("temp_mem must be at least 1 document");
        }
        Ok(())
    }
}
