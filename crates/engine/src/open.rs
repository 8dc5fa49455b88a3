//! Build-or-load orchestration
//!
//! Opening an engine decides, per artifact, whether to load it from disk or
//! build it from the corpus:
//!
//! 1. vocabulary: load, or build → cap → save
//! 2. every order in `[min_order, max_order]`: load, or build → seal → save
//!
//! The vocabulary is final before any order is built, so capping can never
//! invalidate an index. A vocabulary built in this open assigns fresh ids, so
//! every order is rebuilt with it even if an older index file exists. Orders
//! share only the immutable vocabulary and are built in parallel when
//! `parallel` is set.

use rayon::prelude::*;

use gramdex_core::{Error, GramOrder, OrderRange, Result, TokenId};
use gramdex_index::{
    build_ngram_index, encode_documents, normalize_corpus, IndexStore, KeyCodec,
    SealedNgramIndex, Vocabulary,
};

use crate::config::NgramConfig;
use crate::lookup::NgramLookup;

impl NgramLookup {
    /// Load every artifact named by `config`, building the missing ones from `corpus`.
    ///
    /// With `load_only`, any missing artifact is a `MissingArtifact` error and
    /// `corpus` is ignored. Otherwise a missing artifact with no corpus is also
    /// `MissingArtifact`.
    pub fn open<S>(config: &NgramConfig, corpus: Option<&[S]>) -> Result<Self>
    where
        S: AsRef<str> + Sync,
    {
        config.validate()?;
        let orders = config.orders()?;
        let store = IndexStore::new(config.ngram_template()?);
        let vocab_path = config.vocab_file();

        let vocab_exists = vocab_path.exists();
        let missing: Vec<GramOrder> = orders
            .iter()
            .filter(|&n| !vocab_exists || !store.exists(n))
            .collect();

        if config.load_only {
            if !vocab_exists {
                return Err(Error::missing_artifact(vocab_path));
            }
            if let Some(&order) = missing.first() {
                return Err(Error::missing_artifact(store.path_for(order)));
            }
        }

        let tokens = if vocab_exists && missing.is_empty() {
            None
        } else {
            let corpus = match corpus {
                Some(corpus) => corpus,
                None if !vocab_exists => return Err(Error::missing_artifact(vocab_path)),
                None => {
                    let order = missing.first().copied().unwrap_or(orders.min());
                    return Err(Error::missing_artifact(store.path_for(order)));
                }
            };
            Some(normalize_corpus(corpus, config.parallel))
        };

        let vocab = match tokens.as_deref() {
            Some(tokens) if !vocab_exists => {
                let stale: Vec<GramOrder> = orders.iter().filter(|&n| store.exists(n)).collect();
                if !stale.is_empty() {
                    tracing::warn!(
                        target: "gramdex::engine",
                        orders = ?stale,
                        "Vocabulary missing; rebuilding existing n-gram indices against the new one"
                    );
                }
                let mut vocab = Vocabulary::build_from_tokens(tokens);
                if let Some(cap) = config.vocab_cap() {
                    vocab.cap(cap)?;
                }
                if config.save {
                    vocab.save(&vocab_path)?;
                }
                vocab
            }
            _ => {
                let vocab = Vocabulary::load(&vocab_path)?;
                if let Some(cap) = config.vocab_cap() {
                    if vocab.size() > cap {
                        tracing::warn!(
                            target: "gramdex::engine",
                            words = vocab.size(),
                            cap,
                            "Loaded vocabulary exceeds max_vocab_size; delete it to rebuild every artifact"
                        );
                    }
                }
                vocab
            }
        };

        let encoded: Vec<Vec<TokenId>> = match &tokens {
            Some(tokens) if !missing.is_empty() => {
                check_key_budget(&vocab, orders)?;
                encode_documents(&vocab, tokens, config.parallel)
            }
            _ => Vec::new(),
        };
        let corpus_len = tokens.as_ref().map(Vec::len);

        let load_or_build = |order: GramOrder| -> Result<SealedNgramIndex> {
            if missing.contains(&order) {
                let built = build_ngram_index(order, &vocab, &encoded)?;
                let index = SealedNgramIndex::from_postings(&built)?;
                if config.save {
                    store.save(&index)?;
                }
                return Ok(index);
            }
            let index = store.load(order, &vocab)?;
            if let Some(len) = corpus_len {
                if index.doc_count() as usize != len {
                    tracing::warn!(
                        target: "gramdex::engine",
                        order,
                        indexed = index.doc_count(),
                        corpus = len,
                        "Persisted index was built over a different corpus size"
                    );
                }
            }
            Ok(index)
        };

        let order_list: Vec<GramOrder> = orders.iter().collect();
        let indices: Vec<SealedNgramIndex> = if config.parallel {
            order_list
                .par_iter()
                .map(|&n| load_or_build(n))
                .collect::<Result<Vec<_>>>()?
        } else {
            order_list
                .iter()
                .map(|&n| load_or_build(n))
                .collect::<Result<Vec<_>>>()?
        };

        tracing::info!(
            target: "gramdex::engine",
            words = vocab.size(),
            min_order = orders.min(),
            max_order = orders.max(),
            built = missing.len(),
            loaded = orders.len() - missing.len(),
            "Opened n-gram lookup"
        );
        NgramLookup::from_parts(vocab, orders, indices)
    }

    /// Build everything in memory, touching no files.
    pub fn build<S>(
        documents: &[S],
        orders: OrderRange,
        vocab_cap: Option<usize>,
        parallel: bool,
    ) -> Result<Self>
    where
        S: AsRef<str> + Sync,
    {
        let tokens = normalize_corpus(documents, parallel);
        let mut vocab = Vocabulary::build_from_tokens(&tokens);
        if let Some(cap) = vocab_cap {
            vocab.cap(cap)?;
        }
        check_key_budget(&vocab, orders)?;
        let encoded = encode_documents(&vocab, &tokens, parallel);
        let build_one = |n: GramOrder| -> Result<SealedNgramIndex> {
            SealedNgramIndex::from_postings(&build_ngram_index(n, &vocab, &encoded)?)
        };
        let order_list: Vec<GramOrder> = orders.iter().collect();
        let indices = if parallel {
            order_list
                .par_iter()
                .map(|&n| build_one(n))
                .collect::<Result<Vec<_>>>()?
        } else {
            order_list
                .iter()
                .map(|&n| build_one(n))
                .collect::<Result<Vec<_>>>()?
        };
        NgramLookup::from_parts(vocab, orders, indices)
    }
}

/// Fail with `InvalidConfig` if `vocab` is too large to pack the largest order.
fn check_key_budget(vocab: &Vocabulary, orders: OrderRange) -> Result<()> {
    KeyCodec::new(vocab.size(), orders.max()).map_err(|_| {
        Error::invalid_config(format!(
            "vocabulary of {} words is too large to pack {}-grams into 128-bit keys; \
             set max_vocab_size or lower max_order",
            vocab.size(),
            orders.max()
        ))
    })?;
    Ok(())
}

/// Delete the persisted `order` index so the next open rebuilds it.
///
/// Returns whether a file was removed.
pub fn discard_order(config: &NgramConfig, order: GramOrder) -> Result<bool> {
    let store = IndexStore::new(config.ngram_template()?);
    let removed = store.discard(order)?;
    if removed {
        tracing::warn!(
            target: "gramdex::engine",
            order,
            "Discarded persisted index; it will be rebuilt on next open"
        );
    }
    Ok(removed)
}
