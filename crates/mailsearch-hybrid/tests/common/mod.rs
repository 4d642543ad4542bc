#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use mailsearch_core::email::Email;
use mailsearch_core::traits::{EmbedProvider, Record};
use mailsearch_core::types::Embedding;

#[derive(Debug, Clone)]
pub struct Doc {
    pub id: String,
    pub text: String,
}

impl Record for Doc {
    fn id(&self) -> &str { &self.id }
}

pub fn doc(id: &str, text: &str) -> Doc {
    Doc { id: id.to_string(), text: text.to_string() }
}

pub fn doc_text(d: &Doc) -> String { d.text.clone() }

pub fn budget_docs() -> Vec<Doc> {
    vec![
        doc("a", "quarterly budget report"),
        doc("b", "lunch plans"),
        doc("c", "budget overrun alert"),
    ]
}

pub fn email(id: &str, subject: &str, body: &str) -> Email {
    Email {
        id: id.to_string(),
        from: "alice@example.com".to_string(),
        to: "bob@example.com".to_string(),
        subject: subject.to_string(),
        body: body.to_string(),
    }
}

pub fn ids<T: Record>(ranked: &[mailsearch_core::types::RankedItem<T>]) -> Vec<String> {
    ranked.iter().map(|r| r.item.id().to_string()).collect()
}

/// Bag-of-words over a fixed vocabulary: one dimension per word, so cosine
/// similarity is plain word overlap. Records every request it serves.
pub struct VocabProvider {
    vocab: Vec<String>,
    fail: bool,
    query_dim: Option<usize>,
    pub calls: AtomicUsize,
    pub batch_sizes: Mutex<Vec<usize>>,
}

impl VocabProvider {
    pub fn new(vocab: &[&str]) -> Self {
        Self {
            vocab: vocab.iter().map(|w| w.to_string()).collect(),
            fail: false,
            query_dim: None,
            calls: AtomicUsize::new(0),
            batch_sizes: Mutex::new(Vec::new()),
        }
    }

    pub fn budget() -> Self {
        Self::new(&["budget", "quarterly", "report", "lunch", "plans", "overrun", "alert"])
    }

    pub fn failing(mut self) -> Self { self.fail = true; self }

    /// Answer single queries with a vector of `dim` values.
    pub fn with_query_dim(mut self, dim: usize) -> Self { self.query_dim = Some(dim); self }

    pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }

    pub fn batch_sizes(&self) -> Vec<usize> { self.batch_sizes.lock().unwrap().clone() }

    fn embed(&self, text: &str) -> Embedding {
        let mut v = vec![0.0; self.vocab.len()];
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let word = word.to_lowercase();
            if let Some(i) = self.vocab.iter().position(|w| *w == word) {
                v[i] += 1.0;
            }
        }
        v
    }
}

#[async_trait]
impl EmbedProvider for VocabProvider {
    fn embedder_id(&self) -> &str { "vocab" }
    fn dim(&self) -> usize { self.vocab.len() }

    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Embedding>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batch_sizes.lock().unwrap().push(texts.len());
        tokio::task::yield_now().await;
        if self.fail {
            anyhow::bail!("service unavailable");
        }
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> anyhow::Result<Embedding> {
        let mut v = self.embed_batch(&[text.to_string()]).await?.remove(0);
        if let Some(dim) = self.query_dim {
            v.resize(dim, 0.0);
        }
        Ok(v)
    }
}
