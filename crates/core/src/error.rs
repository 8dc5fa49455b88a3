//! Error types for gramdex
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Query classification outcomes (no query, unknown word, no match) are NOT
//! errors; they are returned as [`LookupCase`](crate::LookupCase) values.

use crate::types::GramOrder;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for gramdex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for gramdex
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (corpus unreadable, artifact cannot be written, etc.)
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// A persisted artifact required for loading does not exist
    #[error("Missing artifact: {}", path.display())]
    MissingArtifact {
        /// Path that was expected to exist
        path: PathBuf,
    },

    /// A query needs a gram order for which no index was built or loaded
    #[error("No {order}-gram index (built orders: {min}..={max})")]
    OrderNotBuilt {
        /// Order requested by the query
        order: GramOrder,
        /// Smallest built order
        min: GramOrder,
        /// Largest built order
        max: GramOrder,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A persisted index was built against a different vocabulary
    #[error("Vocabulary mismatch: index expects {expected}, vocabulary has {actual}")]
    VocabularyMismatch {
        /// Description of what the artifact expects
        expected: String,
        /// Description of the live vocabulary
        actual: String,
    },

    /// Malformed vocabulary file
    #[error("Vocabulary format error at line {line}: {reason}")]
    VocabularyFormat {
        /// 1-based line number, 0 for whole-file problems
        line: usize,
        /// What is wrong with the line
        reason: String,
    },

    /// Data corruption detected in a persisted index
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// The packed key space cannot hold the requested n-grams
    #[error("Packed key overflow: radix {radix} cannot encode {order}-grams in 128 bits")]
    KeyOverflow {
        /// Positional radix used for packing
        radix: u64,
        /// Gram order being packed
        order: GramOrder,
    },

    /// Two n-gram entries share one packed key
    #[error("Packed key collision on key {key}")]
    KeyCollision {
        /// The colliding key
        key: u128,
    },
}

impl Error {
    /// Create an invalid-configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// Create a corruption error
    pub fn corruption(msg: impl Into<String>) -> Self {
        Error::Corruption(msg.into())
    }

    /// Create a missing-artifact error
    pub fn missing_artifact(path: impl Into<PathBuf>) -> Self {
        Error::MissingArtifact { path: path.into() }
    }

    /// True for setup mistakes: missing artifacts, unbuilt orders, bad config.
    ///
    /// These are fatal and never worth retrying.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::MissingArtifact { .. }
                | Error::OrderNotBuilt { .. }
                | Error::InvalidConfig(_)
                | Error::VocabularyMismatch { .. }
        )
    }
}
