//! Shared test utilities for the integration test suites.
//!
//! Import via `mod common;` from any test file.

#![allow(dead_code)]

use std::path::Path;

pub use gramdex::{LookupCase, NgramConfig, NgramLookup, OrderRange};
use tempfile::TempDir;

/// The two-document corpus used throughout the examples.
pub const CAT_DOG: [&str; 2] = ["The cat sat.", "The dog ran."];

/// A larger corpus with repeated phrases and punctuation.
pub const STORIES: [&str; 6] = [
    "The quick brown fox jumps over the lazy dog.",
    "A lazy dog sleeps in the sun.",
    "The fox, the dog and the cat!",
    "Quick thinking saves the day.",
    "",
    "the QUICK brown fox",
];

/// A config whose artifacts live under `dir`.
pub fn config_in(dir: &Path, max_order: usize) -> NgramConfig {
    NgramConfig {
        max_order,
        max_vocab_size: 0,
        ..NgramConfig::default()
    }
    .resolve_paths(dir)
}

/// Temporary artifact directory plus its config.
pub struct TestDir {
    pub dir: TempDir,
    pub config: NgramConfig,
}

impl TestDir {
    pub fn new(max_order: usize) -> Self {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path(), max_order);
        TestDir { dir, config }
    }

    pub fn open(&self, corpus: &[&str]) -> NgramLookup {
        NgramLookup::open(&self.config, Some(corpus)).unwrap()
    }

    pub fn reopen(&self) -> NgramLookup {
        NgramLookup::open::<&str>(&self.config, None).unwrap()
    }

    pub fn artifact_bytes(&self, order: usize) -> Vec<u8> {
        let path = self.config.ngram_template().unwrap().path_for(order);
        std::fs::read(path).unwrap()
    }
}
