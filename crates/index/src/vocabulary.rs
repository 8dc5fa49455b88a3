//! Word ↔ id vocabulary with frequency counts
//!
//! Ids are dense and assigned in first-seen order. The unknown symbol
//! [`UNKNOWN_WORD`] is always present; every lookup of a word that was never
//! added resolves to its id, and every id out of range resolves to it.
//!
//! ## File Format
//!
//! ```text
//! <word>\t<frequency>\n      one line per id, line i → id i
//! ```
//!
//! The file must contain the unknown symbol exactly once. After [`Vocabulary::cap`]
//! the unknown symbol sits on the first line and the remaining lines are in
//! descending frequency order.

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use gramdex_core::{Error, Result, TokenId};
use rustc_hash::FxHashMap;
use xxhash_rust::xxh3::Xxh3;

use crate::store::write_atomic;
use crate::tokenizer::normalize_corpus;

/// Symbol standing in for every word not retained in the vocabulary
pub const UNKNOWN_WORD: &str = "<unk>";

/// Bidirectional word ↔ id mapping with per-id frequencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    word_to_id: FxHashMap<String, TokenId>,
    words: Vec<String>,
    freqs: Vec<u64>,
    unknown_id: TokenId,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

impl Vocabulary {
    /// Create a vocabulary holding only the unknown symbol (id 0, frequency 0).
    pub fn new() -> Self {
        let mut vocab = Vocabulary {
            word_to_id: FxHashMap::default(),
            words: Vec::new(),
            freqs: Vec::new(),
            unknown_id: 0,
        };
        vocab.unknown_id = vocab.register(UNKNOWN_WORD);
        vocab
    }

    /// Assign the next id to `word` if unseen; never touches frequencies.
    fn register(&mut self, word: &str) -> TokenId {
        if let Some(&id) = self.word_to_id.get(word) {
            return id;
        }
        let id = self.words.len() as TokenId;
        self.word_to_id.insert(word.to_owned(), id);
        self.words.push(word.to_owned());
        self.freqs.push(0);
        id
    }

    /// Register `word` if unseen, then increment its frequency.
    pub fn add_word(&mut self, word: &str) -> TokenId {
        let id = self.register(word);
        self.freqs[id as usize] += 1;
        id
    }

    /// Build from raw documents: normalize each, then add every token.
    pub fn build_from_corpus<S>(documents: &[S], parallel: bool) -> Self
    where
        S: AsRef<str> + Sync,
    {
        Self::build_from_tokens(&normalize_corpus(documents, parallel))
    }

    /// Build from already-normalized documents.
    pub fn build_from_tokens(documents: &[Vec<String>]) -> Self {
        let mut vocab = Self::new();
        for doc in documents {
            for word in doc {
                vocab.add_word(word);
            }
        }
        tracing::info!(
            target: "gramdex::vocab",
            documents = documents.len(),
            words = vocab.size(),
            tokens = vocab.total_frequency(),
            "Built vocabulary from corpus"
        );
        vocab
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Id of `word`, or the unknown id if it was never added.
    pub fn id_of(&self, word: &str) -> TokenId {
        self.word_to_id
            .get(word)
            .copied()
            .unwrap_or(self.unknown_id)
    }

    /// Word for `id`, or the unknown symbol if out of range.
    pub fn word_of(&self, id: TokenId) -> &str {
        self.words
            .get(id as usize)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_WORD)
    }

    /// Map a word sequence to ids.
    pub fn ids_of<S: AsRef<str>>(&self, words: &[S]) -> Vec<TokenId> {
        words.iter().map(|w| self.id_of(w.as_ref())).collect()
    }

    /// Map an id sequence to words.
    pub fn words_of(&self, ids: &[TokenId]) -> Vec<&str> {
        ids.iter().map(|&id| self.word_of(id)).collect()
    }

    /// Whether `word` has its own id (the unknown symbol counts).
    pub fn contains(&self, word: &str) -> bool {
        self.word_to_id.contains_key(word)
    }

    /// Number of distinct ids, including the unknown symbol.
    pub fn size(&self) -> usize {
        self.words.len()
    }

    /// Id of the unknown symbol
    pub fn unknown_id(&self) -> TokenId {
        self.unknown_id
    }

    /// Frequency of `id` (0 if out of range)
    pub fn frequency(&self, id: TokenId) -> u64 {
        self.freqs.get(id as usize).copied().unwrap_or(0)
    }

    /// Frequency of `word`, as resolved by [`id_of`](Self::id_of)
    pub fn frequency_of(&self, word: &str) -> u64 {
        self.frequency(self.id_of(word))
    }

    /// Sum of all frequencies
    pub fn total_frequency(&self) -> u64 {
        self.freqs.iter().sum()
    }

    /// Iterate `(id, word, frequency)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &str, u64)> + '_ {
        self.words
            .iter()
            .zip(self.freqs.iter())
            .enumerate()
            .map(|(id, (word, &freq))| (id as TokenId, word.as_str(), freq))
    }

    /// xxh3 over the words in id order.
    ///
    /// Two vocabularies with the same fingerprint assign the same ids, so
    /// packed keys built against one are valid against the other.
    /// Frequencies are not hashed.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.update(&(self.words.len() as u64).to_le_bytes());
        for word in &self.words {
            hasher.update(&(word.len() as u64).to_le_bytes());
            hasher.update(word.as_bytes());
        }
        hasher.digest()
    }

    // ========================================================================
    // Capping
    // ========================================================================

    /// Shrink the vocabulary to exactly `max_size` entries.
    ///
    /// No-op if already small enough. Otherwise the unknown symbol becomes id 0
    /// and the `max_size - 1` most frequent words (ties by lower id) follow in
    /// descending frequency. Evicted frequencies fold into the unknown symbol.
    ///
    /// Returns the number of evicted words.
    pub fn cap(&mut self, max_size: usize) -> Result<usize> {
        if max_size == 0 {
            return Err(Error::invalid_config(
                "max_vocab_size must leave room for the unknown symbol",
            ));
        }
        if self.size() <= max_size {
            return Ok(0);
        }

        let unknown = self.unknown_id;
        let mut ranked: Vec<TokenId> = (0..self.size() as TokenId)
            .filter(|&id| id != unknown)
            .collect();
        ranked.sort_by(|&a, &b| {
            self.freqs[b as usize]
                .cmp(&self.freqs[a as usize])
                .then(a.cmp(&b))
        });

        let (kept, evicted) = ranked.split_at(max_size - 1);
        let evicted_mass: u64 = evicted.iter().map(|&id| self.freqs[id as usize]).sum();

        let mut words = Vec::with_capacity(max_size);
        let mut freqs = Vec::with_capacity(max_size);
        words.push(UNKNOWN_WORD.to_owned());
        freqs.push(self.freqs[unknown as usize] + evicted_mass);
        for &id in kept {
            words.push(std::mem::take(&mut self.words[id as usize]));
            freqs.push(self.freqs[id as usize]);
        }

        let word_to_id = words
            .iter()
            .enumerate()
            .map(|(id, w)| (w.clone(), id as TokenId))
            .collect();

        let evicted_count = evicted.len();
        self.words = words;
        self.freqs = freqs;
        self.word_to_id = word_to_id;
        self.unknown_id = 0;

        tracing::info!(
            target: "gramdex::vocab",
            max_size,
            evicted = evicted_count,
            unknown_frequency = self.freqs[0],
            "Capped vocabulary"
        );
        Ok(evicted_count)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Write one `word\tfrequency` line per id, in id order (atomic).
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut buf = Vec::with_capacity(self.words.len() * 12);
        for (_, word, freq) in self.iter() {
            writeln!(buf, "{}\t{}", word, freq)?;
        }
        write_atomic(path, &buf)?;
        tracing::info!(
            target: "gramdex::vocab",
            path = %path.display(),
            words = self.size(),
            "Saved vocabulary"
        );
        Ok(())
    }

    /// Load a vocabulary file; line i becomes id i.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::missing_artifact(path));
        }
        let reader = BufReader::new(fs::File::open(path)?);
        let mut vocab = Vocabulary {
            word_to_id: FxHashMap::default(),
            words: Vec::new(),
            freqs: Vec::new(),
            unknown_id: 0,
        };
        let mut unknown = None;

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            let (word, freq) = line.rsplit_once('\t').ok_or_else(|| Error::VocabularyFormat {
                line: line_no,
                reason: "expected <word>\\t<frequency>".to_string(),
            })?;
            if word.is_empty() {
                return Err(Error::VocabularyFormat {
                    line: line_no,
                    reason: "empty word".to_string(),
                });
            }
            let freq: u64 = freq.trim().parse().map_err(|_| Error::VocabularyFormat {
                line: line_no,
                reason: format!("invalid frequency {:?}", freq),
            })?;
            if vocab.word_to_id.contains_key(word) {
                return Err(Error::VocabularyFormat {
                    line: line_no,
                    reason: format!("duplicate word {:?}", word),
                });
            }
            let id = vocab.register(word);
            vocab.freqs[id as usize] = freq;
            if word == UNKNOWN_WORD {
                unknown = Some(id);
            }
        }

        vocab.unknown_id = unknown.ok_or_else(|| Error::VocabularyFormat {
            line: 0,
            reason: format!("no {} entry", UNKNOWN_WORD),
        })?;

        tracing::info!(
            target: "gramdex::vocab",
            path = %path.display(),
            words = vocab.size(),
            "Loaded vocabulary"
        );
        Ok(vocab)
    }
}
