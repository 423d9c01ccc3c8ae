use crate::InvertedIndex;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

/// term -> ln(N / df), one entry for every term of the final index.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct IdfTable {
    weights: HashMap<String, f64>,
}

impl IdfTable {
    pub fn compute(index: &InvertedIndex, num_docs: u32) -> Self {
        let n = num_docs as f64;
        let weights = index
            .iter()
            .map(|(term, postings)| (term.clone(), idf(n, postings.len())))
            .collect();
        Self { weights }
    }

    pub fn get(&self, term: &str) -> Option<f64> { self.weights.get(term).copied() }

    pub fn len(&self) -> usize { self.weights.len() }

    pub fn is_empty(&self) -> bool { self.weights.is_empty() }
}

impl Serialize for IdfTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.weights.iter().collect::<BTreeMap<_, _>>().serialize(serializer)
    }
}

fn idf(n: f64, df: usize) -> f64 {
    if df == 0 {
        return 0.0;
    }
    (n / df as f64).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idf_follows_document_frequency() {
        let mut idx = InvertedIndex::new();
        idx.add("alpha", 0, 5);
        idx.add("alpha", 1, 1);
        idx.add("beta", 0, 1);
        idx.add("beta", 1, 1);
        idx.add("beta", 2, 1);
        idx.add("gamma", 2, 9);
        let table = IdfTable::compute(&idx, 3);
        assert_eq!(table.len(), 3);
        assert!((table.get("alpha").unwrap() - (3.0f64 / 2.0).ln()).abs() < 1e-12);
        assert_eq!(table.get("beta"), Some(0.0));
        assert!((table.get("gamma").unwrap() - 3.0f64.ln()).abs() < 1e-12);
        assert!(table.get("gamma").unwrap() > table.get("alpha").unwrap());
        assert_eq!(table.get("delta"), None);
    }

    #[test]
    fn serializes_in_term_order() {
        let mut idx = InvertedIndex::new();
        for t in ["delta", "alpha", "charlie", "bravo"] {
            idx.add(t, 0, 1);
        }
        idx.add("alpha", 1, 1);
        let json = serde_json::to_string(&IdfTable::compute(&idx, 2)).unwrap();
        let ln2 = serde_json::to_string(&2.0f64.ln()).unwrap();
        assert_eq!(json, format!(r#"{{"alpha":0.0,"bravo":{ln2},"charlie":{ln2},"delta":{ln2}}}"#));
    }

    #[test]
    fn zero_document_frequency_falls_back_to_zero() {
        assert_eq!(idf(10.0, 0), 0.0);
    }
}
