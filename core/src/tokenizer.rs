use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[a-z0-9]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Split text into lowercase alphanumeric runs. Every other character is a separator.
pub fn raw_tokens(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&normalized).map(|m| m.as_str().to_string()).collect()
}

pub fn stem(token: &str) -> String { STEMMER.stem(token).into_owned() }

/// Tokenize and stem text into index terms, in order and with repeats.
/// Documents and queries both go through here so their terms stay comparable.
pub fn tokenize(text: &str) -> Vec<String> {
    raw_tokens(text).iter().map(|t| stem(t)).collect()
}

/// Distinct terms of the given important-region fragments.
pub fn term_set<S: AsRef<str>>(fragments: &[S]) -> HashSet<String> {
    fragments.iter().flat_map(|f| tokenize(f.as_ref())).collect()
}
