// Reciprocal Rank Fusion (RRF)

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

/// Smoothing constant from Cormack et al. (2009). Larger values flatten the
/// gap between top and lower ranks.
pub const DEFAULT_RRF_K: f32 = 60.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusedItem {
    pub id: String,
    pub score: f32,
    /// Lowest 1-based rank the item reached in any input ranking.
    pub best_rank: usize,
}

/// Combine rankings of item ids into one.
///
/// `score(d) = Σ_r 1 / (k + rank_r(d))` with 1-based ranks. An item missing
/// from a ranking gets nothing from it; an item in no ranking is not emitted.
/// Order: score descending, then best rank, then id, so output is fully
/// deterministic. Only the first occurrence of an id within a ranking counts.
pub fn fuse<S: AsRef<str>>(rankings: &[Vec<S>], k: f32) -> Vec<FusedItem> {
    let k = if k.is_finite() && k >= 0.0 { k } else { DEFAULT_RRF_K };
    let mut acc: HashMap<&str, (f32, usize)> = HashMap::new();

    for ranking in rankings {
        let mut seen = std::collections::HashSet::new();
        for (pos, id) in ranking.iter().enumerate() {
            let id = id.as_ref();
            if !seen.insert(id) {
                continue;
            }
            let rank = pos + 1;
            let contribution = 1.0 / (k + rank as f32);
            let entry = acc.entry(id).or_insert((0.0, rank));
            entry.0 += contribution;
            entry.1 = entry.1.min(rank);
        }
    }

    let mut fused: Vec<FusedItem> = acc
        .into_iter()
        .map(|(id, (score, best_rank))| FusedItem { id: id.to_string(), score, best_rank })
        .collect();
    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.best_rank.cmp(&b.best_rank))
            .then_with(|| a.id.cmp(&b.id))
    });

    debug!(rankings = rankings.len(), fused = fused.len(), k, "rrf fusion complete");
    fused
}
