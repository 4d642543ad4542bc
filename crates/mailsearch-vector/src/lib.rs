//! mailsearch-vector
//!
//! Semantic side of the engine: the fingerprint-keyed embedding cache, the
//! chunked bulk embedder that fills it, and cosine ranking.

pub mod batch;
pub mod cache;
pub mod search;

pub use batch::{BatchStats, Embedded, EmbeddingBatcher, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_IN_FLIGHT};
pub use cache::EmbeddingCache;
pub use search::{cosine_similarity, rank_by_similarity};
