//! Lookup engine for gramdex
//!
//! Ties the vocabulary and per-order indices together:
//! - config: `gramdex.toml` settings (orders, cap, artifact paths, modes)
//! - open: build-or-load orchestration and artifact discarding
//! - lookup: phrase lookup, per-window scans and document-local counts
//! - cache: explicit, caller-owned cache of opened engines
//!
//! # Example
//!
//! ```
//! use gramdex_core::{LookupCase, OrderRange};
//! use gramdex_engine::NgramLookup;
//!
//! let corpus = ["The cat sat.", "The dog ran."];
//! let lookup = NgramLookup::build(&corpus, OrderRange::new(1, 2).unwrap(), None, false).unwrap();
//!
//! let result = lookup.lookup("the cat").unwrap();
//! assert_eq!(result.case, LookupCase::MatchFound);
//! assert_eq!(result.matches, vec![0]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod config;
pub mod lookup;
pub mod open;

pub use cache::{corpus_fingerprint, CacheKey, LookupCache};
pub use config::{NgramConfig, CONFIG_FILE_NAME};
pub use lookup::NgramLookup;
pub use open::discard_order;

pub use gramdex_core::{
    DocIdx, DocumentNgramCount, Error, GramOrder, LookupCase, LookupResult, NgramMatch,
    OrderRange, Result, TokenId, MAX_GRAM_ORDER,
};
pub use gramdex_index::{IndexStats, Vocabulary, UNKNOWN_WORD};
