//! Phrase lookup over a vocabulary and its per-order indices
//!
//! A lookup normalizes the query with the same pipeline used at build time,
//! maps words to ids and binary-searches the index of the matching order.
//! Classification outcomes are returned as [`LookupCase`]; only a query
//! whose length has no index is an error.

use std::collections::BTreeMap;

use gramdex_core::{
    DocumentNgramCount, Error, GramOrder, LookupCase, LookupResult, NgramMatch, OrderRange,
    Result, TokenId,
};
use gramdex_index::{normalize, IndexStats, SealedNgramIndex, Vocabulary};
use rustc_hash::FxHashMap;

/// Occurrences of every `n`-id window of `ids`.
fn count_windows(ids: &[TokenId], n: GramOrder) -> FxHashMap<&[TokenId], usize> {
    let mut counts = FxHashMap::default();
    for window in ids.windows(n) {
        *counts.entry(window).or_insert(0) += 1;
    }
    counts
}

/// Read-only lookup engine.
///
/// Owns the vocabulary and one sealed index per configured order. Nothing is
/// mutated after construction, so `&NgramLookup` can be shared across threads.
#[derive(Debug)]
pub struct NgramLookup {
    vocab: Vocabulary,
    orders: OrderRange,
    indices: BTreeMap<GramOrder, SealedNgramIndex>,
}

impl NgramLookup {
    /// Assemble from a vocabulary and one index per order of `orders`.
    pub fn from_parts(
        vocab: Vocabulary,
        orders: OrderRange,
        indices: Vec<SealedNgramIndex>,
    ) -> Result<Self> {
        let mut by_order = BTreeMap::new();
        for index in indices {
            index.check_vocabulary(&vocab)?;
            let order = index.order();
            if !orders.contains(order) {
                return Err(Error::invalid_config(format!(
                    "{}-gram index is outside the configured orders {}..={}",
                    order,
                    orders.min(),
                    orders.max()
                )));
            }
            if by_order.insert(order, index).is_some() {
                return Err(Error::invalid_config(format!(
                    "duplicate {}-gram index",
                    order
                )));
            }
        }
        if let Some(missing) = orders.iter().find(|o| !by_order.contains_key(o)) {
            return Err(Error::OrderNotBuilt {
                order: missing,
                min: orders.min(),
                max: orders.max(),
            });
        }
        Ok(NgramLookup {
            vocab,
            orders,
            indices: by_order,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The vocabulary queries are mapped through
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Orders with an index
    pub fn orders(&self) -> OrderRange {
        self.orders
    }

    /// Index for `order`, if built
    pub fn index(&self, order: GramOrder) -> Option<&SealedNgramIndex> {
        self.indices.get(&order)
    }

    /// Number of documents the indices were built over
    pub fn doc_count(&self) -> u32 {
        self.indices
            .values()
            .next()
            .map_or(0, SealedNgramIndex::doc_count)
    }

    /// Size summary of every order, ascending
    pub fn stats(&self) -> Vec<IndexStats> {
        self.indices.values().map(SealedNgramIndex::stats).collect()
    }

    fn index_for(&self, order: GramOrder) -> Result<&SealedNgramIndex> {
        self.indices.get(&order).ok_or(Error::OrderNotBuilt {
            order,
            min: self.orders.min(),
            max: self.orders.max(),
        })
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Classify `query` and return the documents containing it as a phrase.
    ///
    /// Fails with `OrderNotBuilt` if the normalized query length has no index.
    pub fn lookup(&self, query: &str) -> Result<LookupResult> {
        let words = normalize(query);
        self.lookup_words(&words)
    }

    /// Like [`lookup`](Self::lookup) for already-normalized words.
    pub fn lookup_words<S: AsRef<str>>(&self, words: &[S]) -> Result<LookupResult> {
        if words.is_empty() {
            tracing::debug!(target: "gramdex::engine", "Empty query");
            return Ok(LookupResult::no_query_given());
        }
        let ids = self.vocab.ids_of(words);
        self.lookup_ids(&ids)
    }

    fn lookup_ids(&self, ids: &[TokenId]) -> Result<LookupResult> {
        let unknown = self.vocab.unknown_id();
        if ids.iter().any(|&id| id == unknown) {
            tracing::debug!(target: "gramdex::engine", words = ids.len(), "Unknown word in query");
            return Ok(LookupResult::unknown_word());
        }

        let index = self.index_for(ids.len())?;
        let key = index.codec().pack(ids)?;
        let result = match index.lookup(key) {
            Some(matches) => LookupResult::found(matches),
            None => LookupResult::not_found(),
        };
        tracing::debug!(
            target: "gramdex::engine",
            order = ids.len(),
            key = %key,
            case = ?result.case,
            matches = result.matches.len(),
            "Looked up n-gram"
        );
        Ok(result)
    }

    /// Look up every `n`-word window of `text` independently.
    ///
    /// Texts shorter than `n` words yield no windows.
    pub fn lookup_ngrams(&self, text: &str, n: GramOrder) -> Result<Vec<NgramMatch>> {
        self.index_for(n)?;
        let words = normalize(text);
        let ids = self.vocab.ids_of(&words);

        let mut out = Vec::with_capacity(words.len().saturating_sub(n - 1));
        for (window, window_ids) in words.windows(n).zip(ids.windows(n)) {
            let result = self.lookup_ids(window_ids)?;
            out.push(NgramMatch {
                words: window.to_vec(),
                case: result.case,
                matches: result.matches,
            });
        }
        Ok(out)
    }

    /// Count how often each `n`-word window of `text` occurs in `document`.
    ///
    /// Uses only the vocabulary: windows with an unknown word are classified
    /// as such, the rest as found or not found within `document`.
    pub fn count_ngrams_in_document(
        &self,
        text: &str,
        document: &str,
        n: GramOrder,
    ) -> Result<Vec<DocumentNgramCount>> {
        if n == 0 {
            return Err(Error::invalid_config("gram order must be at least 1"));
        }
        let doc_ids = self.vocab.ids_of(&normalize(document));
        let doc_counts = count_windows(&doc_ids, n);

        let words = normalize(text);
        let ids = self.vocab.ids_of(&words);
        let unknown = self.vocab.unknown_id();

        Ok(words
            .windows(n)
            .zip(ids.windows(n))
            .map(|(window, window_ids)| {
                let (case, count) = if window_ids.contains(&unknown) {
                    (LookupCase::UnknownWordInQuery, 0)
                } else {
                    match doc_counts.get(window_ids) {
                        Some(&count) => (LookupCase::MatchFound, count),
                        None => (LookupCase::MatchNotFound, 0),
                    }
                };
                DocumentNgramCount {
                    words: window.to_vec(),
                    case,
                    count,
                }
            })
            .collect())
    }
}
