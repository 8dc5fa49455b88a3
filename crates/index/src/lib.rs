//! N-gram indexing for gramdex
//!
//! This crate turns a corpus into per-order n-gram indices:
//! - tokenizer: the shared text normalizer for documents and queries
//! - vocabulary: word ↔ id mapping with frequencies and capping
//! - key: positional-radix packing of n-grams into `u128` keys
//! - builder: rolling-window index construction per gram order
//! - segment: the sealed, mmap-able `.ngx` file format
//! - store: per-order artifact paths, save/load/discard

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod key;
pub mod segment;
pub mod store;
pub mod tokenizer;
pub mod vocabulary;

pub use builder::{build_ngram_index, encode_documents, IndexStats, NgramPostings};
pub use key::{KeyCodec, NgramKey};
pub use segment::{PostingIter, SealedNgramIndex};
pub use store::{IndexStore, PathTemplate};
pub use tokenizer::{normalize, normalize_corpus, normalize_text};
pub use vocabulary::{Vocabulary, UNKNOWN_WORD};
