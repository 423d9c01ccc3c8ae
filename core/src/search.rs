use crate::config::{DEFAULT_TOP_K, MISSING_URL_PLACEHOLDER};
use crate::idf::IdfTable;
use crate::persist::{load_index, IndexPaths, LoadedIndex};
use crate::tokenizer::tokenize;
use crate::{DocId, DocMap, InvertedIndex};
use anyhow::Result;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub rank: usize,
    pub doc_id: DocId,
    pub score: f64,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    /// Documents matching every query term, before truncation.
    pub total_hits: usize,
    pub hits: Vec<SearchHit>,
}

/// Read-only view over a finished index. Queries borrow it immutably, so any
/// number of them can run concurrently.
pub struct SearchEngine {
    index: InvertedIndex,
    idf: IdfTable,
    doc_map: DocMap,
    num_docs: u32,
}

impl SearchEngine {
    pub fn new(index: InvertedIndex, idf: IdfTable, doc_map: DocMap) -> Self {
        let num_docs = doc_map.len() as u32;
        Self { index, idf, doc_map, num_docs }
    }

    pub fn open(paths: &IndexPaths) -> Result<Self> {
        Ok(Self::from(load_index(paths)?))
    }

    pub fn num_docs(&self) -> u32 { self.num_docs }

    pub fn num_terms(&self) -> usize { self.index.num_terms() }

    pub fn url(&self, doc_id: DocId) -> Option<&str> { self.doc_map.get(&doc_id).map(String::as_str) }

    /// Top `DEFAULT_TOP_K` documents for `query` with urls resolved.
    pub fn search(&self, query: &str) -> SearchResults {
        let (ranked, total_hits) = self.rank(query, DEFAULT_TOP_K);
        let hits = ranked
            .into_iter()
            .enumerate()
            .map(|(i, d)| SearchHit { rank: i + 1, doc_id: d.doc_id, score: d.score, url: self.resolve(d.doc_id) })
            .collect();
        SearchResults { total_hits, hits }
    }

    /// Score every document containing all query terms and keep the best `k`,
    /// highest score first and lower doc_id first among equal scores.
    /// Also returns how many candidates there were before truncation.
    pub fn rank(&self, query: &str, k: usize) -> (Vec<ScoredDoc>, usize) {
        let terms = tokenize(query);
        if terms.is_empty() {
            return (Vec::new(), 0);
        }
        let candidates = self.candidates(&terms);
        let total = candidates.len();
        let mut scored: Vec<ScoredDoc> =
            candidates.into_iter().map(|doc_id| ScoredDoc { doc_id, score: self.score(&terms, doc_id) }).collect();
        scored.sort_by(|a, b| match b.score.total_cmp(&a.score) {
            Ordering::Equal => a.doc_id.cmp(&b.doc_id),
            other => other,
        });
        scored.truncate(k);
        (scored, total)
    }

    /// Documents with a posting for every distinct term.
    fn candidates(&self, terms: &[String]) -> Vec<DocId> {
        let mut distinct: Vec<&str> = Vec::with_capacity(terms.len());
        for t in terms {
            if !distinct.contains(&t.as_str()) {
                distinct.push(t.as_str());
            }
        }
        let mut lists = Vec::with_capacity(distinct.len());
        for t in distinct {
            match self.index.postings(t) {
                Some(p) => lists.push(p),
                None => return Vec::new(),
            }
        }
        // walk the shortest list and look up the others
        lists.sort_by_key(|p| p.len());
        let Some((first, rest)) = lists.split_first() else { return Vec::new() };
        first.keys().copied().filter(|d| rest.iter().all(|p| p.contains_key(d))).collect()
    }

    /// Sum of tf-idf weights over the query terms, divided by their euclidean norm.
    fn score(&self, terms: &[String], doc_id: DocId) -> f64 {
        let mut total = 0.0;
        let mut sum_sq = 0.0;
        for t in terms {
            let freq = self.index.frequency(t, doc_id).unwrap_or(0);
            if freq == 0 {
                continue;
            }
            let tf = 1.0 + (freq as f64).ln();
            let weighted = tf * self.idf.get(t).unwrap_or(0.0);
            total += weighted;
            sum_sq += weighted * weighted;
        }
        if sum_sq == 0.0 {
            return 0.0;
        }
        total / sum_sq.sqrt()
    }

    fn resolve(&self, doc_id: DocId) -> String {
        match self.url(doc_id) {
            Some(url) => url.to_string(),
            None => {
                tracing::warn!(doc_id, "document has no url in the document map");
                MISSING_URL_PLACEHOLDER.to_string()
            }
        }
    }
}

impl From<LoadedIndex> for SearchEngine {
    fn from(loaded: LoadedIndex) -> Self {
        let mut engine = SearchEngine::new(loaded.index, loaded.idf, loaded.doc_map);
        engine.num_docs = loaded.meta.num_docs;
        engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::PartialIndexBuilder;
    use crate::merge::merge_partials;
    use crate::spill::SpillStore;

    fn engine(docs: &[&str]) -> SearchEngine {
        let dir = tempfile::tempdir().unwrap();
        let mut b = PartialIndexBuilder::new(SpillStore::new(IndexPaths::new(dir.path())), 100);
        for (i, text) in docs.iter().enumerate() {
            b.add_document::<&str>(&format!("https://example.com/{i}"), text, &[]).unwrap();
        }
        let out = b.finish().unwrap();
        let index = merge_partials(out.store.handles(), None).unwrap();
        let idf = IdfTable::compute(&index, out.num_docs);
        SearchEngine::new(index, idf, out.doc_map)
    }

    #[test]
    fn empty_and_unknown_queries_return_nothing() {
        let e = engine(&["alpha beta", "beta"]);
        assert!(e.search("").hits.is_empty());
        assert!(e.search("   !!  ").hits.is_empty());
        assert!(e.search("alpha zzzunknown").hits.is_empty());
    }

    #[test]
    fn and_semantics_require_every_term() {
        let e = engine(&["alpha beta", "alpha", "beta gamma", "alpha gamma beta"]);
        let res = e.search("alpha beta");
        let ids: Vec<DocId> = res.hits.iter().map(|h| h.doc_id).collect();
        assert_eq!(res.total_hits, 2);
        assert!(ids.contains(&0) && ids.contains(&3));
    }

    #[test]
    fn hand_computed_score() {
        let e = engine(&["alpha beta", "alpha alpha gamma", "beta gamma"]);
        let (ranked, total) = e.rank("alpha gamma", 5);
        assert_eq!(total, 1);
        assert_eq!(ranked[0].doc_id, 1);
        let idf = (3.0f64 / 2.0).ln();
        let a = (1.0 + 2.0f64.ln()) * idf;
        let g = idf;
        let expected = (a + g) / (a * a + g * g).sqrt();
        assert!((ranked[0].score - expected).abs() < 1e-12);
    }

    #[test]
    fn balanced_documents_rank_higher() {
        let e = engine(&["x y", "x x x y", "z"]);
        let (ranked, _) = e.rank("x y", 5);
        assert_eq!(ranked.iter().map(|d| d.doc_id).collect::<Vec<_>>(), vec![0, 1]);
        assert!((ranked[0].score - 2.0f64.sqrt()).abs() < 1e-12);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn ties_break_on_ascending_doc_id_and_cap_at_five() {
        let mut docs = vec!["common rare"; 8];
        docs.push("other");
        let e = engine(&docs);
        let res = e.search("common");
        assert_eq!(res.total_hits, 8);
        assert_eq!(res.hits.len(), 5);
        let ids: Vec<DocId> = res.hits.iter().map(|h| h.doc_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert_eq!(res.hits[0].rank, 1);
        assert_eq!(res.hits[0].url, "https://example.com/0");
    }

    #[test]
    fn term_in_every_document_scores_zero() {
        let e = engine(&["same words", "same"]);
        let (ranked, _) = e.rank("same", 5);
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|d| d.score == 0.0));
    }

    #[test]
    fn missing_url_renders_placeholder() {
        let mut index = InvertedIndex::new();
        index.add("orphan", 3, 1);
        index.add("other", 4, 1);
        let idf = IdfTable::compute(&index, 2);
        let e = SearchEngine::new(index, idf, DocMap::new());
        let res = e.search("orphan");
        assert_eq!(res.hits.len(), 1);
        assert_eq!(res.hits[0].url, MISSING_URL_PLACEHOLDER);
    }
}
