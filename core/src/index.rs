use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

pub type DocId = u32;

/// doc_id -> weighted occurrence count of a term in that document.
pub type Postings = HashMap<DocId, u32>;

/// doc_id -> url for every indexed document.
pub type DocMap = HashMap<DocId, String>;

/// term -> (doc_id -> frequency). Every stored posting has frequency >= 1 and
/// a term is only present while it has at least one posting.
/// Serializes with terms and doc_ids in ascending order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct InvertedIndex {
    terms: HashMap<String, Postings>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Adds `weight` to `index[term][doc_id]`, creating both levels on first use.
    /// A zero weight is ignored so absent postings never show up as zero.
    pub fn add(&mut self, term: &str, doc_id: DocId, weight: u32) {
        if weight == 0 {
            return;
        }
        if !self.terms.contains_key(term) {
            self.terms.insert(term.to_string(), Postings::new());
        }
        if let Some(postings) = self.terms.get_mut(term) {
            *postings.entry(doc_id).or_insert(0) += weight;
        }
    }

    /// Sums every posting of `other` into `self`.
    pub fn absorb(&mut self, other: InvertedIndex) {
        for (term, postings) in other.terms {
            match self.terms.get_mut(&term) {
                Some(existing) => {
                    for (doc_id, freq) in postings.into_iter().filter(|(_, f)| *f > 0) {
                        *existing.entry(doc_id).or_insert(0) += freq;
                    }
                }
                None => {
                    let postings: Postings = postings.into_iter().filter(|(_, f)| *f > 0).collect();
                    if !postings.is_empty() {
                        self.terms.insert(term, postings);
                    }
                }
            }
        }
    }

    pub fn postings(&self, term: &str) -> Option<&Postings> { self.terms.get(term) }

    pub fn frequency(&self, term: &str, doc_id: DocId) -> Option<u32> {
        self.terms.get(term).and_then(|p| p.get(&doc_id).copied())
    }

    /// Number of distinct documents posting `term`.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.terms.get(term).map_or(0, |p| p.len())
    }

    pub fn num_terms(&self) -> usize { self.terms.len() }

    pub fn num_postings(&self) -> usize { self.terms.values().map(|p| p.len()).sum() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Postings)> { self.terms.iter() }

    /// Moves the current contents out, leaving an empty index behind.
    pub fn take(&mut self) -> InvertedIndex { std::mem::take(self) }
}

impl Serialize for InvertedIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let sorted: BTreeMap<&String, BTreeMap<&DocId, &u32>> =
            self.terms.iter().map(|(term, postings)| (term, postings.iter().collect())).collect();
        sorted.serialize(serializer)
    }
}
