//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (`__` separates nested keys, e.g. `APP_SEARCH__LIMIT=5`). Provides helpers to
//! expand `~` and `${VAR}` and to resolve relative paths against a known base
//! directory.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Ok(Self { figment })
    }

    /// The `[search]` table, with defaults for anything left unset.
    pub fn search_settings(&self) -> Result<SearchSettings> {
        let settings: SearchSettings = if self.figment.contains("search") {
            self.figment
                .extract_inner("search")
                .map_err(|e| Error::InvalidConfig(e.to_string()))?
        } else {
            SearchSettings::default()
        };
        settings.validate()?;
        Ok(settings)
    }
}

/// Engine tunables. Defaults reproduce the observed production behaviour:
/// provider chunks of 99 texts, at most 10 chunk requests in flight, RRF k=60
/// and a top-10 result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub cache_dir: String,
    pub chunk_size: usize,
    pub max_in_flight: usize,
    pub rrf_k: f32,
    pub limit: usize,
    pub bm25_k1: f32,
    pub bm25_b: f32,
    pub embedding_dim: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            cache_dir: "data/embeddings".to_string(),
            chunk_size: 99,
            max_in_flight: 10,
            rrf_k: 60.0,
            limit: 10,
            bm25_k1: 1.2,
            bm25_b: 0.75,
            embedding_dim: 1024,
        }
    }
}

impl SearchSettings {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("search.chunk_size must be > 0".into()));
        }
        if self.max_in_flight == 0 {
            return Err(Error::InvalidConfig("search.max_in_flight must be > 0".into()));
        }
        if !(self.rrf_k.is_finite() && self.rrf_k >= 0.0) {
            return Err(Error::InvalidConfig("search.rrf_k must be finite and >= 0".into()));
        }
        if !(0.0..=1.0).contains(&self.bm25_b) {
            return Err(Error::InvalidConfig("search.bm25_b must be within [0, 1]".into()));
        }
        if !(self.bm25_k1.is_finite() && self.bm25_k1 >= 0.0) {
            return Err(Error::InvalidConfig("search.bm25_k1 must be finite and >= 0".into()));
        }
        if self.embedding_dim == 0 {
            return Err(Error::InvalidConfig("search.embedding_dim must be > 0".into()));
        }
        Ok(())
    }

    /// Cache directory after `~`/env expansion, relative to `base`.
    pub fn cache_path(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.cache_dir)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
