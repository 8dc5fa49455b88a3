//! N-gram index builder
//!
//! For one gram order, scans every document's id sequence with a rolling
//! packed key and records which documents contain each n-gram.
//!
//! Windows that contain the unknown id are never formed: the window is reset
//! whenever the unknown id is seen, so the index holds known n-grams only.
//! Documents are visited in ascending index order, so every posting list
//! comes out sorted and deduplicated by checking its last entry.

use gramdex_core::{DocIdx, Error, GramOrder, Result, TokenId};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::key::{KeyCodec, NgramKey};
use crate::vocabulary::Vocabulary;

// ============================================================================
// IndexStats
// ============================================================================

/// Size summary of one per-order index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Gram order
    pub order: GramOrder,
    /// Distinct n-grams
    pub key_count: usize,
    /// Sum of posting list lengths
    pub total_postings: u64,
    /// Documents scanned
    pub doc_count: u32,
}

// ============================================================================
// NgramPostings
// ============================================================================

/// In-memory result of building one order: packed key → sorted doc indices.
#[derive(Debug, Clone)]
pub struct NgramPostings {
    codec: KeyCodec,
    vocab_size: usize,
    vocab_fingerprint: u64,
    doc_count: u32,
    postings: FxHashMap<NgramKey, Vec<DocIdx>>,
}

impl NgramPostings {
    /// Gram order
    pub fn order(&self) -> GramOrder {
        self.codec.order()
    }

    /// Codec the keys were packed with
    pub fn codec(&self) -> KeyCodec {
        self.codec
    }

    /// Vocabulary size at build time
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// [`Vocabulary::fingerprint`] at build time
    pub fn vocab_fingerprint(&self) -> u64 {
        self.vocab_fingerprint
    }

    /// Number of documents scanned
    pub fn doc_count(&self) -> u32 {
        self.doc_count
    }

    /// Number of distinct n-grams
    pub fn key_count(&self) -> usize {
        self.postings.len()
    }

    /// Documents containing the n-gram `key`, ascending.
    pub fn get(&self, key: NgramKey) -> Option<&[DocIdx]> {
        self.postings.get(&key).map(Vec::as_slice)
    }

    /// All entries sorted by key.
    pub fn sorted_entries(&self) -> Vec<(NgramKey, &[DocIdx])> {
        let mut entries: Vec<(NgramKey, &[DocIdx])> = self
            .postings
            .iter()
            .map(|(&k, v)| (k, v.as_slice()))
            .collect();
        entries.sort_unstable_by_key(|&(k, _)| k);
        entries
    }

    /// Size summary
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            order: self.order(),
            key_count: self.key_count(),
            total_postings: self.postings.values().map(|v| v.len() as u64).sum(),
            doc_count: self.doc_count,
        }
    }
}

// ============================================================================
// Build
// ============================================================================

/// Map each normalized document to vocabulary ids.
pub fn encode_documents(
    vocab: &Vocabulary,
    documents: &[Vec<String>],
    parallel: bool,
) -> Vec<Vec<TokenId>> {
    if parallel {
        documents.par_iter().map(|d| vocab.ids_of(d)).collect()
    } else {
        documents.iter().map(|d| vocab.ids_of(d)).collect()
    }
}

/// Build the `order`-gram index over id-encoded documents.
///
/// Fails with `KeyOverflow` if the vocabulary is too large to pack `order`
/// ids into 128 bits, and with `KeyCollision` if two different windows ever
/// pack to the same key.
pub fn build_ngram_index(
    order: GramOrder,
    vocab: &Vocabulary,
    documents: &[Vec<TokenId>],
) -> Result<NgramPostings> {
    let codec = KeyCodec::new(vocab.size(), order)?;
    let doc_count = DocIdx::try_from(documents.len()).map_err(|_| {
        Error::invalid_config(format!(
            "corpus of {} documents exceeds the addressable document count",
            documents.len()
        ))
    })?;
    let unknown = vocab.unknown_id();
    let radix = codec.radix();

    let mut postings: FxHashMap<NgramKey, Vec<DocIdx>> = FxHashMap::default();

    for (doc_idx, ids) in documents.iter().enumerate() {
        let doc_idx = doc_idx as DocIdx;
        let mut key: NgramKey = 0;
        let mut filled = 0usize;

        for (pos, &id) in ids.iter().enumerate() {
            if id == unknown {
                key = 0;
                filled = 0;
                continue;
            }
            if id as u64 >= radix {
                return Err(Error::KeyOverflow { radix, order });
            }
            key = codec.roll(key, id);
            if filled < order {
                filled += 1;
            }
            if filled < order {
                continue;
            }

            if cfg!(debug_assertions) && codec.unpack(key) != ids[pos + 1 - order..=pos] {
                return Err(Error::KeyCollision { key });
            }

            let list = postings.entry(key).or_default();
            if list.last() != Some(&doc_idx) {
                list.push(doc_idx);
            }
        }
    }

    let built = NgramPostings {
        codec,
        vocab_size: vocab.size(),
        vocab_fingerprint: vocab.fingerprint(),
        doc_count,
        postings,
    };
    let stats = built.stats();
    tracing::info!(
        target: "gramdex::index",
        order,
        radix,
        keys = stats.key_count,
        postings = stats.total_postings,
        docs = stats.doc_count,
        "Built n-gram index"
    );
    Ok(built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::normalize_corpus;

    fn fixture(docs: &[&str]) -> (Vocabulary, Vec<Vec<TokenId>>) {
        let tokens = normalize_corpus(docs, false);
        let vocab = Vocabulary::build_from_tokens(&tokens);
        let encoded = encode_documents(&vocab, &tokens, false);
        (vocab, encoded)
    }

    fn key_of(vocab: &Vocabulary, built: &NgramPostings, words: &[&str]) -> NgramKey {
        built.codec().pack(&vocab.ids_of(words)).unwrap()
    }

    #[test]
    fn test_unigram_postings() {
        let (vocab, docs) = fixture(&["The cat sat.", "The dog ran."]);
        let built = build_ngram_index(1, &vocab, &docs).unwrap();
        assert_eq!(built.key_count(), 5);
        assert_eq!(built.get(key_of(&vocab, &built, &["the"])), Some(&[0, 1][..]));
        assert_eq!(built.get(key_of(&vocab, &built, &["dog"])), Some(&[1][..]));
    }

    #[test]
    fn test_bigram_postings() {
        let (vocab, docs) = fixture(&["The cat sat.", "The dog ran."]);
        let built = build_ngram_index(2, &vocab, &docs).unwrap();
        assert_eq!(built.key_count(), 4);
        assert_eq!(built.get(key_of(&vocab, &built, &["the", "cat"])), Some(&[0][..]));
        assert_eq!(built.get(key_of(&vocab, &built, &["cat", "the"])), None);
    }

    #[test]
    fn test_short_documents_contribute_nothing() {
        let (vocab, docs) = fixture(&["one two", "", "three"]);
        let built = build_ngram_index(3, &vocab, &docs).unwrap();
        assert_eq!(built.key_count(), 0);
        assert_eq!(built.doc_count(), 3);
    }

    #[test]
    fn test_duplicate_ngrams_in_doc_dedup() {
        let (vocab, docs) = fixture(&["a b a b a b", "a b"]);
        let built = build_ngram_index(2, &vocab, &docs).unwrap();
        assert_eq!(built.get(key_of(&vocab, &built, &["a", "b"])), Some(&[0, 1][..]));
        assert_eq!(built.get(key_of(&vocab, &built, &["b", "a"])), Some(&[0][..]));
        assert_eq!(built.stats().total_postings, 3);
    }

    #[test]
    fn test_unknown_breaks_windows() {
        let tokens = normalize_corpus(&["a b c d e"], false);
        let mut vocab = Vocabulary::new();
        for w in ["a", "b", "d", "e"] {
            vocab.add_word(w);
        }
        let docs = encode_documents(&vocab, &tokens, false);
        assert_eq!(docs[0][2], vocab.unknown_id());

        let built = build_ngram_index(2, &vocab, &docs).unwrap();
        let keys: Vec<Vec<&str>> = built
            .sorted_entries()
            .iter()
            .map(|(k, _)| vocab.words_of(&built.codec().unpack(*k)))
            .collect();
        assert_eq!(keys, vec![vec!["a", "b"], vec!["d", "e"]]);

        let trigrams = build_ngram_index(3, &vocab, &docs).unwrap();
        assert_eq!(trigrams.key_count(), 0);
    }

    #[test]
    fn test_overlapping_windows() {
        let mut vocab = Vocabulary::new();
        let a = vocab.add_word("a");
        let b = vocab.add_word("b");
        let built = build_ngram_index(2, &vocab, &[vec![a, b, a]]).unwrap();
        assert_eq!(built.key_count(), 2);
        assert!(built.get(built.codec().pack(&[a, b]).unwrap()).is_some());
        assert!(built.get(built.codec().pack(&[b, a]).unwrap()).is_some());
    }

    #[test]
    fn test_rebuild_is_identical() {
        let (vocab, docs) = fixture(&["x y z x y", "z x y", "y y y"]);
        let first = build_ngram_index(2, &vocab, &docs).unwrap();
        let second = build_ngram_index(2, &vocab, &docs).unwrap();
        assert_eq!(first.sorted_entries(), second.sorted_entries());
    }

    #[test]
    fn test_encode_parallel_matches_serial() {
        let tokens = normalize_corpus(&["a b c", "c b a", "d"], false);
        let vocab = Vocabulary::build_from_tokens(&tokens);
        assert_eq!(
            encode_documents(&vocab, &tokens, true),
            encode_documents(&vocab, &tokens, false)
        );
    }
}
