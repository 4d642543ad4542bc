use std::cmp::Ordering;

use mailsearch_core::types::{Embedding, RankedItem};

/// Cosine similarity in `[-1, 1]`. Zero-norm or mismatched-length vectors
/// score `0.0`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut na, mut nb) = (0f64, 0f64, 0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    (dot / (na.sqrt() * nb.sqrt())).clamp(-1.0, 1.0) as f32
}

/// Score every item against the query vector, best first. Ties keep input
/// order; nothing is filtered or truncated.
pub fn rank_by_similarity<T>(query: &[f32], items: Vec<(T, Embedding)>) -> Vec<RankedItem<T>> {
    let mut ranked: Vec<RankedItem<T>> = items
        .into_iter()
        .map(|(item, embedding)| {
            let score = cosine_similarity(query, &embedding);
            RankedItem::new(item, score)
        })
        .collect();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked
}
