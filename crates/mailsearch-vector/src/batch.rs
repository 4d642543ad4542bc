//! Cache-aware bulk embedding.
//!
//! Items whose text already has a cached vector are served from the cache.
//! Misses are embedded in fixed-size chunks with a bounded number of chunk
//! requests in flight; each finished chunk is written through to the cache
//! before its slot is released.

use std::sync::Arc;

use anyhow::anyhow;
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use mailsearch_core::error::{Error, Result};
use mailsearch_core::fingerprint::{fingerprint, Fingerprint};
use mailsearch_core::traits::EmbedProvider;
use mailsearch_core::types::Embedding;

use crate::cache::EmbeddingCache;

/// Texts per provider request; stays under typical provider batch limits.
pub const DEFAULT_CHUNK_SIZE: usize = 99;
/// Provider requests allowed in flight at once.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 10;
const CACHE_READ_CONCURRENCY: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct Embedded<T> {
    pub item: T,
    pub embedding: Embedding,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    /// Items served from the cache.
    pub cached: usize,
    /// Items embedded by the provider.
    pub generated: usize,
    /// Provider requests issued.
    pub requests: usize,
}

pub struct EmbeddingBatcher {
    provider: Arc<dyn EmbedProvider>,
    cache: EmbeddingCache,
    chunk_size: usize,
    max_in_flight: usize,
}

impl EmbeddingBatcher {
    pub fn new(provider: Arc<dyn EmbedProvider>, cache: EmbeddingCache) -> Self {
        Self { provider, cache, chunk_size: DEFAULT_CHUNK_SIZE, max_in_flight: DEFAULT_MAX_IN_FLIGHT }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    pub fn provider(&self) -> &dyn EmbedProvider {
        self.provider.as_ref()
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    /// One embedding per item. Output order is unspecified; pair results by
    /// `Embedded::item`.
    pub async fn embed_all<'a, D, F>(&self, items: &'a [D], to_text: F) -> Result<Vec<Embedded<&'a D>>>
    where
        F: Fn(&D) -> String,
    {
        self.embed_all_with_stats(items, to_text).await.map(|(embedded, _)| embedded)
    }

    /// Like [`embed_all`](Self::embed_all), also reporting cache and provider
    /// traffic. A failed chunk fails the whole call; entries written by earlier
    /// chunks stay cached.
    pub async fn embed_all_with_stats<'a, D, F>(
        &self,
        items: &'a [D],
        to_text: F,
    ) -> Result<(Vec<Embedded<&'a D>>, BatchStats)>
    where
        F: Fn(&D) -> String,
    {
        let texts: Vec<String> = items.iter().map(&to_text).collect();
        let fingerprints: Vec<Fingerprint> = texts.iter().map(|t| fingerprint(t)).collect();

        let lookups: Vec<Option<Embedding>> = stream::iter(fingerprints.iter())
            .map(|fp| self.lookup(fp))
            .buffered(CACHE_READ_CONCURRENCY)
            .collect()
            .await;

        let mut embedded = Vec::with_capacity(items.len());
        let mut misses = Vec::new();
        for (i, hit) in lookups.into_iter().enumerate() {
            match hit {
                Some(embedding) => embedded.push(Embedded { item: &items[i], embedding }),
                None => misses.push(i),
            }
        }

        let mut stats = BatchStats { cached: embedded.len(), generated: misses.len(), requests: 0 };
        if misses.is_empty() {
            debug!(cached = stats.cached, "all embeddings served from cache");
            return Ok((embedded, stats));
        }

        let chunks: Vec<&[usize]> = misses.chunks(self.chunk_size).collect();
        stats.requests = chunks.len();
        info!(
            cached = stats.cached,
            uncached = stats.generated,
            requests = stats.requests,
            max_in_flight = self.max_in_flight,
            "embedding cache misses"
        );

        let mut pending = stream::iter(chunks.into_iter().enumerate())
            .map(|(n, chunk)| self.embed_chunk(n, chunk, &texts, &fingerprints))
            .buffer_unordered(self.max_in_flight);
        while let Some(done) = pending.next().await {
            for (i, embedding) in done? {
                embedded.push(Embedded { item: &items[i], embedding });
            }
        }

        Ok((embedded, stats))
    }

    async fn lookup(&self, fp: &Fingerprint) -> Option<Embedding> {
        match self.cache.get(fp).await {
            Ok(Some(v)) if v.len() != self.provider.dim() => {
                warn!(
                    fingerprint = %fp,
                    len = v.len(),
                    expected = self.provider.dim(),
                    "cached embedding has wrong dimension, regenerating"
                );
                None
            }
            Ok(hit) => hit,
            Err(e) => {
                warn!(fingerprint = %fp, error = %e, "unreadable cache entry, regenerating");
                None
            }
        }
    }

    /// Embed one chunk of item indices and write the results to the cache.
    async fn embed_chunk(
        &self,
        n: usize,
        indices: &[usize],
        texts: &[String],
        fingerprints: &[Fingerprint],
    ) -> Result<Vec<(usize, Embedding)>> {
        let batch: Vec<String> = indices.iter().map(|&i| texts[i].clone()).collect();
        debug!(chunk = n, size = batch.len(), "requesting embeddings");
        let vectors = self.provider.embed_batch(&batch).await.map_err(Error::Provider)?;
        if vectors.len() != batch.len() {
            return Err(Error::Provider(anyhow!(
                "provider returned {} embeddings for {} texts",
                vectors.len(),
                batch.len()
            )));
        }
        let dim = self.provider.dim();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
            return Err(Error::Provider(anyhow!("dim mismatch: got {} expected {}", bad.len(), dim)));
        }

        // Provider output is positional within the chunk.
        let writes = indices.iter().zip(&vectors).map(|(&i, v)| self.cache.put(&fingerprints[i], v));
        for (result, &i) in join_all(writes).await.into_iter().zip(indices) {
            if let Err(e) = result {
                warn!(fingerprint = %fingerprints[i], error = %e, "cache write failed, continuing");
            }
        }

        Ok(indices.iter().copied().zip(vectors).collect())
    }
}
