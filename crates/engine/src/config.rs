//! Engine configuration via `gramdex.toml`
//!
//! Every field has a default, so an empty file is a valid configuration.
//! Relative artifact paths are resolved against the current directory unless
//! [`NgramConfig::resolve_paths`] is called with another base.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use gramdex_core::{Error, GramOrder, OrderRange, Result};
use gramdex_index::{KeyCodec, PathTemplate};

/// Config file name
pub const CONFIG_FILE_NAME: &str = "gramdex.toml";

/// Build, persistence and loading settings for an [`NgramLookup`](crate::NgramLookup).
///
/// # Example
///
/// ```toml
/// min_order = 1
/// max_order = 4
/// max_vocab_size = 10000
/// vocab_path = "cache/vocabs"
/// ngram_path = "cache/ngram_dict_%d"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NgramConfig {
    /// Smallest gram order to build
    #[serde(default = "default_min_order")]
    pub min_order: GramOrder,
    /// Largest gram order to build
    #[serde(default = "default_max_order")]
    pub max_order: GramOrder,
    /// Vocabulary cap including `<unk>`; 0 keeps every word
    #[serde(default = "default_max_vocab_size")]
    pub max_vocab_size: usize,
    /// Vocabulary file
    #[serde(default = "default_vocab_path")]
    pub vocab_path: String,
    /// Per-order index file template with one `%d`
    #[serde(default = "default_ngram_path")]
    pub ngram_path: String,
    /// Persist freshly built artifacts
    #[serde(default = "default_true")]
    pub save: bool,
    /// Require every artifact to exist; never build
    #[serde(default)]
    pub load_only: bool,
    /// Normalize documents and build orders on the rayon pool
    #[serde(default = "default_true")]
    pub parallel: bool,
}

fn default_min_order() -> GramOrder {
    1
}

fn default_max_order() -> GramOrder {
    4
}

fn default_max_vocab_size() -> usize {
    10_000
}

fn default_vocab_path() -> String {
    "cache/vocabs".to_string()
}

fn default_ngram_path() -> String {
    "cache/ngram_dict_%d".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for NgramConfig {
    fn default() -> Self {
        Self {
            min_order: default_min_order(),
            max_order: default_max_order(),
            max_vocab_size: default_max_vocab_size(),
            vocab_path: default_vocab_path(),
            ngram_path: default_ngram_path(),
            save: true,
            load_only: false,
            parallel: true,
        }
    }
}

impl NgramConfig {
    /// Check ranges, the path template and the packed key budget.
    pub fn validate(&self) -> Result<()> {
        let orders = self.orders()?;
        self.ngram_template()?;
        if self.vocab_path.is_empty() {
            return Err(Error::invalid_config("vocab_path must not be empty"));
        }
        if let Some(cap) = self.vocab_cap() {
            KeyCodec::new(cap, orders.max()).map_err(|_| {
                Error::invalid_config(format!(
                    "max_vocab_size {} is too large to pack {}-grams into 128-bit keys",
                    cap,
                    orders.max()
                ))
            })?;
        }
        Ok(())
    }

    /// Configured orders as a validated range
    pub fn orders(&self) -> Result<OrderRange> {
        OrderRange::new(self.min_order, self.max_order)
    }

    /// Vocabulary cap, if any
    pub fn vocab_cap(&self) -> Option<usize> {
        match self.max_vocab_size {
            0 => None,
            n => Some(n),
        }
    }

    /// Parsed per-order index path template
    pub fn ngram_template(&self) -> Result<PathTemplate> {
        PathTemplate::new(self.ngram_path.clone())
    }

    /// Vocabulary file path
    pub fn vocab_file(&self) -> PathBuf {
        PathBuf::from(&self.vocab_path)
    }

    /// Make relative artifact paths relative to `base`.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        if Path::new(&self.vocab_path).is_relative() {
            self.vocab_path = base.join(&self.vocab_path).to_string_lossy().into_owned();
        }
        if Path::new(&self.ngram_path).is_relative() {
            self.ngram_path = base.join(&self.ngram_path).to_string_lossy().into_owned();
        }
        self
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# gramdex configuration
#
# Gram orders to index (inclusive). Queries longer than max_order are rejected.
min_order = 1
max_order = 4

# Vocabulary cap, counting <unk>. Rarer words collapse into <unk>
# and n-grams containing them are not indexed. Set to 0 to keep every word.
# N-grams pack into 128-bit keys in base 10^k, where 10^k is the first power
# of ten at or above the vocabulary size. That allows (10^k)^max_order up to
# about 3.4e38: 8-grams up to 10,000 words, 6-grams up to 1,000,000 words.
# An uncapped vocabulary past that limit fails to open with an error naming
# its size.
max_vocab_size = 10000

# Artifact locations. ngram_path must contain exactly one %d (the order).
vocab_path = "cache/vocabs"
ngram_path = "cache/ngram_dict_%d"

# Persist freshly built artifacts (default: true)
save = true

# Refuse to build: every artifact must already exist (default: false)
load_only = false

# Use all cores for normalization and per-order builds (default: true)
parallel = true
"#
    }

    /// Read, parse and validate config from a file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: NgramConfig = toml::from_str(&content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::invalid_config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
