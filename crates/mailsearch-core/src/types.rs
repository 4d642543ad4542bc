//! Domain types used by the rankers and the orchestrator.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub type Embedding = Vec<f32>;

/// An item paired with the score of the ranker that produced it.
///
/// Scores are ranker specific (cosine in `[-1, 1]`, BM25 `>= 0`, or an RRF
/// sum) and must not be compared across rankers. Higher is always better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem<T> {
    pub item: T,
    pub score: f32,
}

impl<T> RankedItem<T> {
    pub fn new(item: T, score: f32) -> Self {
        Self { item, score }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RankedItem<U> {
        RankedItem { item: f(self.item), score: self.score }
    }
}

/// Which ranking path a query runs through, and so how to read its scores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Semantic,
    Lexical,
    Hybrid,
}

pub const MISSING_QUERY_MESSAGE: &str = "You must provide either keywords or query or both.";

/// A validated search request: a free-text query, keywords, or both.
///
/// Blank queries and empty keyword lists count as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    query: Option<String>,
    keywords: Vec<String>,
}

impl SearchQuery {
    pub fn new(query: Option<String>, keywords: Option<Vec<String>>) -> Result<Self> {
        let query = query.filter(|q| !q.trim().is_empty());
        let keywords: Vec<String> = keywords
            .unwrap_or_default()
            .into_iter()
            .filter(|k| !k.trim().is_empty())
            .collect();
        if query.is_none() && keywords.is_empty() {
            return Err(Error::Validation(MISSING_QUERY_MESSAGE.to_string()));
        }
        Ok(Self { query, keywords })
    }

    pub fn text(query: impl Into<String>) -> Result<Self> {
        Self::new(Some(query.into()), None)
    }

    pub fn keywords<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(None, Some(keywords.into_iter().map(Into::into).collect()))
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn keyword_list(&self) -> &[String] {
        &self.keywords
    }

    pub fn mode(&self) -> SearchMode {
        match (self.query.is_some(), self.keywords.is_empty()) {
            (true, true) => SearchMode::Semantic,
            (false, _) => SearchMode::Lexical,
            (true, false) => SearchMode::Hybrid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_query_and_keywords() {
        let err = SearchQuery::new(None, None).unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m == MISSING_QUERY_MESSAGE));
        assert!(SearchQuery::new(None, Some(vec![])).is_err());
    }

    #[test]
    fn blank_inputs_count_as_absent() {
        assert!(SearchQuery::new(Some("   ".into()), Some(vec![" ".into()])).is_err());
        let q = SearchQuery::new(Some(" ".into()), Some(vec!["budget".into()])).unwrap();
        assert_eq!(q.query(), None);
        assert_eq!(q.mode(), SearchMode::Lexical);
    }

    #[test]
    fn mode_follows_supplied_parts() {
        assert_eq!(SearchQuery::text("budget").unwrap().mode(), SearchMode::Semantic);
        assert_eq!(SearchQuery::keywords(["budget"]).unwrap().mode(), SearchMode::Lexical);
        let both = SearchQuery::new(Some("budget".into()), Some(vec!["budget".into()])).unwrap();
        assert_eq!(both.mode(), SearchMode::Hybrid);
        assert_eq!(both.keyword_list(), ["budget".to_string()]);
    }
}
