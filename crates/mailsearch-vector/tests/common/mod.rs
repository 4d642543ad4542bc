#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use mailsearch_core::traits::{EmbedProvider, Record};
use mailsearch_core::types::Embedding;
use mailsearch_embed::HashingEmbedder;

pub const DIM: usize = 32;

#[derive(Debug, Clone)]
pub struct Doc {
    pub id: String,
    pub text: String,
}

impl Record for Doc {
    fn id(&self) -> &str { &self.id }
}

pub fn doc_text(d: &Doc) -> String { d.text.clone() }

pub fn docs(n: usize) -> Vec<Doc> {
    (0..n).map(|i| Doc { id: format!("doc:{i}"), text: format!("hello world {i}") }).collect()
}

/// Records provider traffic and delegates to the hashing embedder.
pub struct CountingProvider {
    inner: HashingEmbedder,
    delay: Duration,
    fail_on_call: Option<usize>,
    short_by: usize,
    pub calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub batch_sizes: Mutex<Vec<usize>>,
}

impl CountingProvider {
    pub fn new() -> Self {
        Self {
            inner: HashingEmbedder::new(DIM),
            delay: Duration::ZERO,
            fail_on_call: None,
            short_by: 0,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            batch_sizes: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self { self.delay = delay; self }

    /// Fail the n-th request (1-based).
    pub fn failing_on(mut self, call: usize) -> Self { self.fail_on_call = Some(call); self }

    /// Return `n` fewer vectors than requested.
    pub fn short_by(mut self, n: usize) -> Self { self.short_by = n; self }

    pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }

    pub fn expected(&self, text: &str) -> Embedding { self.inner.embed_text(text) }
}

#[async_trait]
impl EmbedProvider for CountingProvider {
    fn embedder_id(&self) -> &str { "counting:d32" }
    fn dim(&self) -> usize { DIM }

    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Embedding>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.batch_sizes.lock().unwrap().push(texts.len());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.fail_on_call == Some(call) {
            anyhow::bail!("quota exceeded");
        }
        let mut out = self.inner.embed_batch(texts).await?;
        out.truncate(out.len().saturating_sub(self.short_by));
        Ok(out)
    }
}
