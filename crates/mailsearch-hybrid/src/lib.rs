//! Hybrid retrieval: semantic ranking over cached embeddings, BM25 keyword
//! ranking, and reciprocal rank fusion of the two.
//!
//! The engine is stateless between calls apart from the on-disk embedding
//! cache; each search ranks the document snapshot it is handed.

pub mod fusion;
pub mod tool;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use mailsearch_core::config::SearchSettings;
use mailsearch_core::error::{Error, Result};
use mailsearch_core::traits::{EmbedProvider, Record};
use mailsearch_core::types::{RankedItem, SearchQuery};
use mailsearch_text::{Bm25Params, Bm25Ranker};
use mailsearch_vector::{rank_by_similarity, EmbeddingBatcher, EmbeddingCache};
use tracing::{debug, info, instrument};

pub use fusion::{fuse, FusedItem, DEFAULT_RRF_K};
pub use tool::{SearchEmailsInput, SearchEmailsTool};

pub struct HybridSearchEngine {
    batcher: EmbeddingBatcher,
    bm25: Bm25Params,
    rrf_k: f32,
}

impl HybridSearchEngine {
    /// Engine with default tunables, caching under `cache_root/<embedder id>/`.
    pub fn new(provider: Arc<dyn EmbedProvider>, cache_root: impl AsRef<Path>) -> Self {
        let cache = EmbeddingCache::new(cache_root, provider.embedder_id());
        Self { batcher: EmbeddingBatcher::new(provider, cache), bm25: Bm25Params::default(), rrf_k: DEFAULT_RRF_K }
    }

    /// Engine configured from `[search]` settings; a relative `cache_dir`
    /// resolves against `base`.
    pub fn from_settings(provider: Arc<dyn EmbedProvider>, settings: &SearchSettings, base: &Path) -> Result<Self> {
        settings.validate()?;
        let cache = EmbeddingCache::new(settings.cache_path(base), provider.embedder_id());
        let batcher = EmbeddingBatcher::new(provider, cache)
            .with_chunk_size(settings.chunk_size)
            .with_max_in_flight(settings.max_in_flight);
        Ok(Self {
            batcher,
            bm25: Bm25Params { k1: settings.bm25_k1, b: settings.bm25_b },
            rrf_k: settings.rrf_k,
        })
    }

    pub fn with_rrf_k(mut self, k: f32) -> Self {
        self.rrf_k = k;
        self
    }

    pub fn with_bm25_params(mut self, params: Bm25Params) -> Self {
        self.bm25 = params;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.batcher = self.batcher.with_chunk_size(chunk_size);
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.batcher = self.batcher.with_max_in_flight(max_in_flight);
        self
    }

    pub fn batcher(&self) -> &EmbeddingBatcher {
        &self.batcher
    }

    /// Validate raw inputs, then [`search`](Self::search).
    ///
    /// Fails with [`Error::Validation`] before touching the cache or the
    /// provider when neither a query nor a keyword is supplied.
    pub async fn search_raw<'a, D, F>(
        &self,
        query: Option<String>,
        keywords: Option<Vec<String>>,
        documents: &'a [D],
        to_text: F,
        limit: usize,
    ) -> Result<Vec<RankedItem<&'a D>>>
    where
        D: Record,
        F: Fn(&D) -> String,
    {
        let query = SearchQuery::new(query, keywords)?;
        self.search(&query, documents, to_text, limit).await
    }

    /// Rank `documents` for `query`, best first, keeping at most `limit`.
    ///
    /// - query only: cosine similarity of the query embedding to each document
    /// - keywords only: BM25 over the keywords
    /// - both: RRF over the two complete rankings
    ///
    /// Document ids must be unique within `documents`.
    #[instrument(skip_all, fields(mode = ?query.mode(), documents = documents.len(), limit = limit))]
    pub async fn search<'a, D, F>(
        &self,
        query: &SearchQuery,
        documents: &'a [D],
        to_text: F,
        limit: usize,
    ) -> Result<Vec<RankedItem<&'a D>>>
    where
        D: Record,
        F: Fn(&D) -> String,
    {
        let mut ranked = match (query.query(), query.keyword_list()) {
            (Some(text), []) => self.semantic(text, documents, &to_text).await?,
            (None, keywords) => self.lexical(keywords, documents, &to_text),
            (Some(text), keywords) => {
                let semantic = self.semantic(text, documents, &to_text).await?;
                let lexical = self.lexical(keywords, documents, &to_text);
                self.fuse(documents, &semantic, &lexical)
            }
        };
        ranked.truncate(limit);
        info!(results = ranked.len(), "search complete");
        Ok(ranked)
    }

    async fn semantic<'a, D, F>(&self, text: &str, documents: &'a [D], to_text: &F) -> Result<Vec<RankedItem<&'a D>>>
    where
        F: Fn(&D) -> String,
    {
        let provider = self.batcher.provider();
        let (query_vec, mut embedded) = futures::try_join!(
            async { provider.embed_query(text).await.map_err(Error::Provider) },
            self.batcher.embed_all(documents, to_text),
        )?;
        if query_vec.len() != provider.dim() {
            return Err(Error::Provider(anyhow::anyhow!(
                "query embedding has dim {}, expected {}",
                query_vec.len(),
                provider.dim()
            )));
        }

        // Batch output arrives in completion order; put it back in input order
        // so equal similarities keep the caller's order.
        let position: HashMap<*const D, usize> =
            documents.iter().enumerate().map(|(i, d)| (d as *const D, i)).collect();
        embedded.sort_by_key(|e| position.get(&(e.item as *const D)).copied().unwrap_or(usize::MAX));

        let pairs = embedded.into_iter().map(|e| (e.item, e.embedding)).collect();
        let ranked = rank_by_similarity(&query_vec, pairs);
        debug!(ranked = ranked.len(), "semantic ranking");
        Ok(ranked)
    }

    fn lexical<'a, D, F>(&self, keywords: &[String], documents: &'a [D], to_text: &F) -> Vec<RankedItem<&'a D>>
    where
        F: Fn(&D) -> String,
    {
        let ranked = Bm25Ranker::new(self.bm25).rank(keywords, documents, to_text);
        debug!(ranked = ranked.len(), "lexical ranking");
        ranked
    }

    fn fuse<'a, D: Record>(
        &self,
        documents: &'a [D],
        semantic: &[RankedItem<&'a D>],
        lexical: &[RankedItem<&'a D>],
    ) -> Vec<RankedItem<&'a D>> {
        let ids = |ranking: &[RankedItem<&'a D>]| -> Vec<&'a str> { ranking.iter().map(|r| r.item.id()).collect() };
        let fused = fuse(&[ids(semantic), ids(lexical)], self.rrf_k);

        let by_id: HashMap<&str, &'a D> = documents.iter().map(|d| (d.id(), d)).collect();
        fused
            .into_iter()
            .filter_map(|f| by_id.get(f.id.as_str()).map(|&d| RankedItem::new(d, f.score)))
            .collect()
    }
}
