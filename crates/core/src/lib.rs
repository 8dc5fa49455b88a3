//! Core types for gramdex
//!
//! This crate defines the foundational types used throughout the system:
//! - TokenId / DocIdx / GramOrder: integer handles for words, documents and n-gram orders
//! - OrderRange: the configured `[min, max]` gram orders
//! - Error: error hierarchy (configuration, I/O, corruption, key encoding)
//! - LookupCase / LookupResult: query classification returned by every lookup

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod lookup_types;
pub mod types;

pub use error::{Error, Result};
pub use lookup_types::{DocumentNgramCount, LookupCase, LookupResult, NgramMatch};
pub use types::{DocIdx, GramOrder, OrderRange, TokenId, MAX_GRAM_ORDER};
