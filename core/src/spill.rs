use crate::persist::{load_partial, save_partial, IndexPaths};
use crate::InvertedIndex;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// One partial index written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpillHandle {
    pub part_num: u32,
    pub path: PathBuf,
    pub num_terms: usize,
    pub num_postings: usize,
}

impl SpillHandle {
    pub fn load(&self) -> Result<InvertedIndex> { load_partial(&self.path) }
}

/// Partial index files of a single build, in creation order.
pub struct SpillStore {
    paths: IndexPaths,
    handles: Vec<SpillHandle>,
}

impl SpillStore {
    pub fn new(paths: IndexPaths) -> Self {
        Self { paths, handles: Vec::new() }
    }

    /// Persist a snapshot as the next `index_part_{n}.bin`.
    pub fn spill(&mut self, index: &InvertedIndex) -> Result<SpillHandle> {
        let part_num = self.handles.len() as u32;
        let path = self.paths.part(part_num);
        save_partial(&path, index)?;
        let handle = SpillHandle {
            part_num,
            path,
            num_terms: index.num_terms(),
            num_postings: index.num_postings(),
        };
        tracing::info!(part_num, num_terms = handle.num_terms, num_postings = handle.num_postings, "spilled partial index");
        self.handles.push(handle.clone());
        Ok(handle)
    }

    pub fn handles(&self) -> &[SpillHandle] { &self.handles }

    pub fn len(&self) -> usize { self.handles.len() }

    pub fn is_empty(&self) -> bool { self.handles.is_empty() }

    /// Delete every part file and the parts directory once it is empty.
    pub fn remove_all(self) -> Result<()> {
        for h in &self.handles {
            fs::remove_file(&h.path).with_context(|| format!("removing {}", h.path.display()))?;
        }
        let dir = self.paths.parts_dir();
        if dir.exists() && fs::read_dir(&dir)?.next().is_none() {
            fs::remove_dir(&dir)?;
        }
        Ok(())
    }
}
