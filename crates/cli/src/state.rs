//! Session wrapper around an opened engine.
//!
//! Holds the `NgramLookup` and, when one was given, the corpus it was built
//! from so matched indices can be resolved back to documents.

use gramdex_core::{DocIdx, DocumentNgramCount, Error, LookupResult, NgramMatch, Result, TokenId};
use gramdex_engine::{IndexStats, NgramLookup};

use crate::corpus::{Corpus, DocumentRecord};
use crate::parse::CliAction;

/// One vocabulary row.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct VocabEntry {
    pub word: String,
    /// `None` when the word is not in the vocabulary
    pub id: Option<TokenId>,
    pub frequency: u64,
}

/// Result of executing a [`CliAction`].
#[derive(Debug, Clone)]
pub enum Output {
    Lookup {
        result: LookupResult,
        documents: Vec<DocumentRecord>,
    },
    Scan(Vec<NgramMatch>),
    Counts {
        document: DocumentRecord,
        counts: Vec<DocumentNgramCount>,
    },
    Vocab(Vec<VocabEntry>),
    Stats {
        vocab_size: usize,
        doc_count: u32,
        orders: Vec<IndexStats>,
    },
}

/// Wraps the engine and tracks the optional corpus.
pub struct SessionState {
    lookup: NgramLookup,
    corpus: Option<Corpus>,
}

impl SessionState {
    pub fn new(lookup: NgramLookup, corpus: Option<Corpus>) -> Self {
        Self { lookup, corpus }
    }

    /// Execute an action against the engine.
    pub fn execute(&self, action: CliAction) -> Result<Output> {
        match action {
            CliAction::Query { text } => {
                let result = self.lookup.lookup(&text)?;
                let documents = self.resolve(&result.matches);
                Ok(Output::Lookup { result, documents })
            }
            CliAction::Scan { text, order } => {
                Ok(Output::Scan(self.lookup.lookup_ngrams(&text, order)?))
            }
            CliAction::Count {
                text,
                document,
                order,
            } => {
                let corpus = self.corpus.as_ref().ok_or_else(|| {
                    Error::invalid_config("count needs the corpus; pass --corpus")
                })?;
                let doc = corpus.get(document).ok_or_else(|| {
                    Error::invalid_config(format!(
                        "document {} is out of range (corpus has {})",
                        document,
                        corpus.len()
                    ))
                })?;
                let counts = self
                    .lookup
                    .count_ngrams_in_document(&text, &doc.document, order)?;
                let record = DocumentRecord {
                    document_index: document,
                    id: Some(doc.id.clone()),
                    document: Some(doc.document.clone()),
                };
                Ok(Output::Counts {
                    document: record,
                    counts,
                })
            }
            CliAction::Vocab { words, limit } => Ok(Output::Vocab(self.vocab(&words, limit))),
            CliAction::Stats => Ok(Output::Stats {
                vocab_size: self.lookup.vocabulary().size(),
                doc_count: self.lookup.doc_count(),
                orders: self.lookup.stats(),
            }),
        }
    }

    fn resolve(&self, matches: &[DocIdx]) -> Vec<DocumentRecord> {
        match &self.corpus {
            Some(corpus) => corpus.resolve(matches),
            None => Corpus::default().resolve(matches),
        }
    }

    fn vocab(&self, words: &[String], limit: Option<usize>) -> Vec<VocabEntry> {
        let vocab = self.lookup.vocabulary();
        let limit = limit.unwrap_or(usize::MAX);
        if words.is_empty() {
            return vocab
                .iter()
                .take(limit)
                .map(|(id, word, frequency)| VocabEntry {
                    word: word.to_string(),
                    id: Some(id),
                    frequency,
                })
                .collect();
        }
        words
            .iter()
            .take(limit)
            .map(|word| {
                let normalized = gramdex_index::normalize_text(word);
                let id = vocab.contains(&normalized).then(|| vocab.id_of(&normalized));
                VocabEntry {
                    frequency: id.map_or(0, |id| vocab.frequency(id)),
                    word: normalized,
                    id,
                }
            })
            .collect()
    }

    /// Engine orders, for the prompt.
    pub fn prompt(&self) -> String {
        let orders = self.lookup.orders();
        format!("gramdex[{}-{}]> ", orders.min(), orders.max())
    }
}
