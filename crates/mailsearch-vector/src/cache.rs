//! File-backed embedding cache keyed by `(embedder_id, fingerprint)`.
//!
//! Each entry is its own JSON file `<root>/<embedder>/<fingerprint>.json`, so
//! writers for different fingerprints never share a file and a crash loses at
//! most the entries being written. The cache is consulted before calling a
//! provider and written through on misses.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::OnceCell;

use mailsearch_core::error::{Error, Result};
use mailsearch_core::fingerprint::Fingerprint;
use mailsearch_core::types::Embedding;

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug)]
pub struct EmbeddingCache {
    dir: PathBuf,
    ready: OnceCell<()>,
}

impl EmbeddingCache {
    /// Cache rooted at `root`, namespaced by the provider's `embedder_id` so
    /// vectors from different models never mix. Nothing touches the disk until
    /// the first write.
    pub fn new(root: impl AsRef<Path>, embedder_id: &str) -> Self {
        Self { dir: root.as_ref().join(namespace(embedder_id)), ready: OnceCell::new() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.dir.join(format!("{fingerprint}.json"))
    }

    /// `Ok(None)` on a miss. A present but undecodable entry is
    /// `Error::CacheCorrupt`; callers regenerate it like a miss.
    pub async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<Embedding>> {
        let path = self.entry_path(fingerprint);
        match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|source| Error::CacheCorrupt { path, source }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::CacheIo { path, source }),
        }
    }

    /// Write an entry atomically: temp file in the same directory, then rename.
    /// Concurrent writes of the same fingerprint are last-write-wins.
    pub async fn put(&self, fingerprint: &Fingerprint, embedding: &[f32]) -> Result<()> {
        self.ensure_dir().await?;
        let path = self.entry_path(fingerprint);
        // JSON has no NaN/inf; such an entry could never be read back.
        if embedding.iter().any(|x| !x.is_finite()) {
            return Err(Error::Operation(format!("non-finite embedding for {fingerprint}")));
        }
        let json = serde_json::to_vec(embedding)
            .map_err(|e| Error::Operation(format!("encoding cache entry {}: {e}", path.display())))?;
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = self.dir.join(format!(".{fingerprint}.{}.{seq}.tmp", std::process::id()));
        if let Err(source) = tokio::fs::write(&tmp, &json).await {
            return Err(Error::CacheIo { path: tmp, source });
        }
        if let Err(source) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(Error::CacheIo { path, source });
        }
        Ok(())
    }

    pub async fn contains(&self, fingerprint: &Fingerprint) -> bool {
        tokio::fs::try_exists(self.entry_path(fingerprint)).await.unwrap_or(false)
    }

    /// Number of stored entries; zero before the first write.
    pub async fn len(&self) -> Result<usize> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(source) => return Err(Error::CacheIo { path: self.dir.clone(), source }),
        };
        let mut count = 0usize;
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    if entry.path().extension().and_then(|s| s.to_str()) == Some("json") {
                        count += 1;
                    }
                }
                Ok(None) => break,
                Err(source) => return Err(Error::CacheIo { path: self.dir.clone(), source }),
            }
        }
        Ok(count)
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    async fn ensure_dir(&self) -> Result<()> {
        self.ready
            .get_or_try_init(|| async {
                tokio::fs::create_dir_all(&self.dir)
                    .await
                    .map_err(|source| Error::CacheIo { path: self.dir.clone(), source })
            })
            .await
            .map(|_| ())
    }
}

fn namespace(embedder_id: &str) -> String {
    let name: String = embedder_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect();
    if name.is_empty() || name.chars().all(|c| c == '.') { "default".to_string() } else { name }
}
