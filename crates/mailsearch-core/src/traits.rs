use async_trait::async_trait;

use crate::types::Embedding;

/// Anything the engine can rank: it only needs a stable identifier. The
/// searchable text is supplied separately as a projection closure.
pub trait Record {
    fn id(&self) -> &str;
}

impl<T: Record + ?Sized> Record for &T {
    fn id(&self) -> &str {
        (**self).id()
    }
}

#[async_trait]
pub trait EmbedProvider: Send + Sync {
    /// Stable identifier for the provider/model (e.g., `hash:xxh64:d1024`).
    fn embedder_id(&self) -> &str;
    /// Embedding dimensionality (D).
    fn dim(&self) -> usize;
    /// Compute embeddings for a batch of input texts, one per text, in order.
    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Embedding>>;

    async fn embed_query(&self, text: &str) -> anyhow::Result<Embedding> {
        let mut out = self.embed_batch(&[text.to_string()]).await?;
        if out.len() != 1 {
            anyhow::bail!("provider returned {} embeddings for a single query", out.len());
        }
        Ok(out.remove(0))
    }
}
