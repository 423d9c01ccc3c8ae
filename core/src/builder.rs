use crate::config::{BASE_WEIGHT, IMPORTANT_WEIGHT};
use crate::spill::SpillStore;
use crate::tokenizer::{term_set, tokenize};
use crate::{DocId, DocMap, InvertedIndex};
use anyhow::Result;

/// Folds documents into an in-memory index and spills it every `temp_mem` documents.
pub struct PartialIndexBuilder {
    index: InvertedIndex,
    store: SpillStore,
    doc_map: DocMap,
    next_doc_id: DocId,
    temp_mem: usize,
}

/// Output of a finished build pass: every partial file plus the doc_id -> url map.
pub struct BuiltPartials {
    pub store: SpillStore,
    pub doc_map: DocMap,
    pub num_docs: u32,
}

impl PartialIndexBuilder {
    pub fn new(store: SpillStore, temp_mem: usize) -> Self {
        Self { index: InvertedIndex::new(), store, doc_map: DocMap::new(), next_doc_id: 0, temp_mem: temp_mem.max(1) }
    }

    /// Index one document and return its doc_id. A document whose text yields
    /// no terms still takes an id and counts toward the document total.
    pub fn add_document<S: AsRef<str>>(&mut self, url: &str, text: &str, important: &[S]) -> Result<DocId> {
        let terms = tokenize(text);
        let important = term_set(important);

        let doc_id = self.next_doc_id;
        self.next_doc_id += 1;
        self.doc_map.insert(doc_id, url.to_string());

        for term in &terms {
            let weight = if important.contains(term) { IMPORTANT_WEIGHT } else { BASE_WEIGHT };
            self.index.add(term, doc_id, weight);
        }

        if self.next_doc_id as usize % self.temp_mem == 0 {
            self.spill()?;
        }
        Ok(doc_id)
    }

    fn spill(&mut self) -> Result<()> {
        let snapshot = self.index.take();
        if snapshot.is_empty() {
            tracing::debug!(doc_count = self.next_doc_id, "batch produced no postings, nothing to spill");
            return Ok(());
        }
        self.store.spill(&snapshot)?;
        Ok(())
    }

    pub fn doc_count(&self) -> u32 { self.next_doc_id }

    /// Postings accumulated since the last spill.
    pub fn in_memory(&self) -> &InvertedIndex { &self.index }

    pub fn spill_store(&self) -> &SpillStore { &self.store }

    /// Spill whatever is left in memory and hand back the finished partials.
    pub fn finish(mut self) -> Result<BuiltPartials> {
        if !self.index.is_empty() {
            self.spill()?;
        }
        Ok(BuiltPartials { store: self.store, doc_map: self.doc_map, num_docs: self.next_doc_id })
    }
}
