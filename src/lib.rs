//! gramdex - exact-match n-gram phrase lookup over a document corpus
//!
//! Documents are normalized into words, words are mapped to integer ids by a
//! (optionally capped) vocabulary, and for every configured gram order an
//! inverted index maps each n-gram to the documents containing it. A phrase
//! query is classified into one of four [`LookupCase`]s and, when it matches,
//! answered with the indices of the documents containing it.
//!
//! # Quick Start
//!
//! ```no_run
//! use gramdex::{NgramConfig, NgramLookup, LookupCase};
//!
//! let corpus = ["The cat sat.", "The dog ran."];
//! let config = NgramConfig::from_file("gramdex.toml".as_ref())?;
//!
//! // Loads persisted artifacts, building (and saving) whatever is missing.
//! let lookup = NgramLookup::open(&config, Some(&corpus[..]))?;
//!
//! let result = lookup.lookup("the cat")?;
//! assert_eq!(result.case, LookupCase::MatchFound);
//! # Ok::<(), gramdex::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `gramdex-core`: shared types, errors and lookup results
//! - `gramdex-index`: tokenizer, vocabulary, packed keys, index build and `.ngx` files
//! - `gramdex-engine`: configuration, build-or-load orchestration, lookup, cache
//!
//! Only the engine API is re-exported here; the lower layers remain
//! reachable through the [`index`] module.

pub use gramdex_engine::*;

/// Lower-level building blocks: tokenizer, vocabulary, keys and index files.
pub mod index {
    pub use gramdex_index::*;
}
