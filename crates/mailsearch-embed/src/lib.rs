//! Embedding providers.
//!
//! The production provider is a remote API client owned by the embedding
//! service integration. This crate ships the deterministic hashing provider
//! used for development, the CLI and tests: same text, same vector, no network.

use anyhow::Result;
use async_trait::async_trait;
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use mailsearch_core::traits::EmbedProvider;
use mailsearch_core::types::Embedding;

pub const DEFAULT_DIM: usize = 1024;

/// Bag-of-tokens hashing embedder. Each lowercase whitespace token adds a
/// hashed weight into one bucket; the result is L2-normalized.
pub struct HashingEmbedder {
    dim: usize,
    id: String,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        let dim = dim.max(1);
        Self { dim, id: format!("hash:xxh64:d{dim}") }
    }

    pub fn embed_text(&self, text: &str) -> Embedding {
        let mut v = vec![0f32; self.dim];
        for token in text.split_whitespace() {
            let token = token.to_lowercase();
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = usize::try_from(h % self.dim as u64).unwrap_or(0);
            let val = ((h >> 32) as u32) as f32 / u32::MAX as f32;
            v[idx] += 0.5 + val * 0.5;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIM)
    }
}

#[async_trait]
impl EmbedProvider for HashingEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        tracing::trace!(count = texts.len(), "hashing embed batch");
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

pub fn get_default_provider(dim: usize) -> Box<dyn EmbedProvider> {
    Box::new(HashingEmbedder::new(dim))
}
