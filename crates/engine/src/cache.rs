//! Explicit cache of opened lookup engines
//!
//! Keyed by a fingerprint of the corpus contents and the configuration, so
//! the same corpus opened with the same settings is built or loaded once.
//! The cache is an ordinary value the caller owns and passes around; there is
//! no process-wide instance.

use std::sync::Arc;

use dashmap::DashMap;
use xxhash_rust::xxh3::{xxh3_64, Xxh3};

use gramdex_core::Result;

use crate::config::NgramConfig;
use crate::lookup::NgramLookup;

/// Identity of one opened engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// xxh3 of the corpus documents (0 when opened without a corpus)
    pub corpus: u64,
    /// xxh3 of the configuration
    pub config: u64,
}

impl CacheKey {
    /// Fingerprint `corpus` and `config`.
    pub fn new<S: AsRef<str>>(config: &NgramConfig, corpus: Option<&[S]>) -> Self {
        CacheKey {
            corpus: corpus.map_or(0, corpus_fingerprint),
            config: config_fingerprint(config),
        }
    }
}

/// xxh3 over every document, length-prefixed so boundaries matter.
pub fn corpus_fingerprint<S: AsRef<str>>(documents: &[S]) -> u64 {
    let mut hasher = Xxh3::new();
    hasher.update(&(documents.len() as u64).to_le_bytes());
    for doc in documents {
        let bytes = doc.as_ref().as_bytes();
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    hasher.digest()
}

fn config_fingerprint(config: &NgramConfig) -> u64 {
    let encoded = format!(
        "{}\0{}\0{}\0{}\0{}\0{}\0{}",
        config.min_order,
        config.max_order,
        config.max_vocab_size,
        config.vocab_path,
        config.ngram_path,
        config.save,
        config.load_only,
    );
    xxh3_64(encoded.as_bytes())
}

/// Shared engines by [`CacheKey`].
#[derive(Default)]
pub struct LookupCache {
    entries: DashMap<CacheKey, Arc<NgramLookup>>,
}

impl LookupCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached engine for `(config, corpus)` or open and cache one.
    ///
    /// Two racing callers may both open; the first insert wins and both get it.
    pub fn get_or_open<S>(
        &self,
        config: &NgramConfig,
        corpus: Option<&[S]>,
    ) -> Result<Arc<NgramLookup>>
    where
        S: AsRef<str> + Sync,
    {
        let key = CacheKey::new(config, corpus);
        if let Some(hit) = self.entries.get(&key) {
            tracing::debug!(target: "gramdex::engine", ?key, "Lookup cache hit");
            return Ok(Arc::clone(hit.value()));
        }

        let opened = Arc::new(NgramLookup::open(config, corpus)?);
        let entry = self.entries.entry(key).or_insert(opened);
        tracing::debug!(target: "gramdex::engine", ?key, "Lookup cache fill");
        Ok(Arc::clone(entry.value()))
    }

    /// Cached engine for `key`, if any
    pub fn get(&self, key: &CacheKey) -> Option<Arc<NgramLookup>> {
        self.entries.get(key).map(|e| Arc::clone(e.value()))
    }

    /// Drop one entry. Returns whether it was present.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of cached engines
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
