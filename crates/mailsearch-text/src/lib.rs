//! mailsearch-text
//!
//! Lexical ranking: BM25 over an in-memory snapshot of the documents, using a
//! tantivy analyzer chain for tokenization.

pub mod tantivy_utils;
pub mod bm25;

pub use bm25::{rank_by_keywords, Bm25Params, Bm25Ranker};
pub use tantivy_utils::Analyzer;
