pub mod builder;
pub mod config;
pub mod extract;
pub mod idf;
pub mod index;
pub mod merge;
pub mod persist;
pub mod pipeline;
pub mod search;
pub mod spill;
pub mod tokenizer;

pub use index::{DocId, DocMap, InvertedIndex, Postings};
