//! BM25 keyword ranking over an in-memory document snapshot.
//!
//! Statistics (document frequency, average length) are computed over the full
//! collection on every call. Every item is returned, including the ones that
//! match no keyword (score 0), so fusion sees the complete item universe.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use mailsearch_core::types::RankedItem;
use tracing::debug;

use crate::tantivy_utils::Analyzer;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f32,
    /// Length normalization strength, within `[0, 1]`.
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

pub struct Bm25Ranker {
    params: Bm25Params,
    analyzer: Analyzer,
}

impl Bm25Ranker {
    pub fn new(params: Bm25Params) -> Self {
        Self { params, analyzer: Analyzer::new() }
    }

    /// Score `items` against `keywords`, best first. Ties keep input order.
    ///
    /// Returns an empty ranking when the keywords yield no terms: BM25 has
    /// nothing to score against.
    pub fn rank<'a, D, F>(&mut self, keywords: &[String], items: &'a [D], to_text: F) -> Vec<RankedItem<&'a D>>
    where
        F: Fn(&D) -> String,
    {
        let terms = self.query_terms(keywords);
        if terms.is_empty() || items.is_empty() {
            return Vec::new();
        }
        let wanted: HashSet<&str> = terms.iter().map(String::as_str).collect();

        // Per item: length in tokens and frequencies of the query terms only.
        let mut stats: Vec<(usize, HashMap<String, u32>)> = Vec::with_capacity(items.len());
        let mut total_len = 0usize;
        for item in items {
            let tokens = self.analyzer.tokenize(&to_text(item));
            total_len += tokens.len();
            let mut tf: HashMap<String, u32> = HashMap::new();
            let len = tokens.len();
            for token in tokens {
                if wanted.contains(token.as_str()) {
                    *tf.entry(token).or_insert(0) += 1;
                }
            }
            stats.push((len, tf));
        }

        let n = items.len() as f32;
        let avg_len = total_len as f32 / n;
        let idf: Vec<f32> = terms
            .iter()
            .map(|term| {
                let df = stats.iter().filter(|(_, tf)| tf.contains_key(term)).count() as f32;
                (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
            })
            .collect();

        let Bm25Params { k1, b } = self.params;
        let mut ranked: Vec<RankedItem<&'a D>> = items
            .iter()
            .zip(&stats)
            .map(|(item, (len, tf))| {
                let len_ratio = if avg_len > 0.0 { *len as f32 / avg_len } else { 0.0 };
                let norm = k1 * (1.0 - b + b * len_ratio);
                let score = terms
                    .iter()
                    .zip(&idf)
                    .map(|(term, idf)| {
                        let f = tf.get(term).copied().unwrap_or(0) as f32;
                        if f == 0.0 { 0.0 } else { idf * (f * (k1 + 1.0)) / (f + norm) }
                    })
                    .sum();
                RankedItem::new(item, score)
            })
            .collect();

        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        debug!(terms = terms.len(), items = ranked.len(), "bm25 ranking complete");
        ranked
    }

    fn query_terms(&mut self, keywords: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut terms = Vec::new();
        for keyword in keywords {
            for term in self.analyzer.tokenize(keyword) {
                if seen.insert(term.clone()) {
                    terms.push(term);
                }
            }
        }
        terms
    }
}

impl Default for Bm25Ranker {
    fn default() -> Self {
        Self::new(Bm25Params::default())
    }
}

/// [`Bm25Ranker::rank`] with default parameters.
pub fn rank_by_keywords<'a, D, F>(keywords: &[String], items: &'a [D], to_text: F) -> Vec<RankedItem<&'a D>>
where
    F: Fn(&D) -> String,
{
    Bm25Ranker::default().rank(keywords, items, to_text)
}
