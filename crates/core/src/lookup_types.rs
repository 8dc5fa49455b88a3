//! Lookup result types
//!
//! Every lookup is classified into exactly one [`LookupCase`]. The case is a
//! normal return value, never an error.

use crate::types::DocIdx;
use serde::{Deserialize, Serialize};

// ============================================================================
// LookupCase
// ============================================================================

/// Classification of a single lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupCase {
    /// Query normalized to zero words
    NoQueryGiven,
    /// At least one query word is not in the vocabulary
    UnknownWordInQuery,
    /// All words are known but the n-gram occurs in no document
    MatchNotFound,
    /// The n-gram occurs in at least one document
    MatchFound,
}

impl LookupCase {
    /// Stable numeric code (0..=3), in declaration order
    pub fn code(&self) -> u8 {
        match self {
            LookupCase::NoQueryGiven => 0,
            LookupCase::UnknownWordInQuery => 1,
            LookupCase::MatchNotFound => 2,
            LookupCase::MatchFound => 3,
        }
    }

    /// Human-readable message for display layers
    pub fn message(&self) -> &'static str {
        match self {
            LookupCase::NoQueryGiven => "no query given",
            LookupCase::UnknownWordInQuery => "unknown word in query",
            LookupCase::MatchNotFound => "no documents matched",
            LookupCase::MatchFound => "documents matched",
        }
    }
}

impl std::fmt::Display for LookupCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

// ============================================================================
// LookupResult
// ============================================================================

/// Outcome of a phrase lookup: the case plus matching document indices.
///
/// `matches` is empty unless `case` is [`LookupCase::MatchFound`]. Callers
/// must not depend on the order of `matches`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    /// Classification of the query
    pub case: LookupCase,
    /// Matching document indices
    pub matches: Vec<DocIdx>,
}

impl LookupResult {
    /// Result for an empty query
    pub fn no_query_given() -> Self {
        Self::empty(LookupCase::NoQueryGiven)
    }

    /// Result for a query containing an unknown word
    pub fn unknown_word() -> Self {
        Self::empty(LookupCase::UnknownWordInQuery)
    }

    /// Result for a known n-gram that occurs nowhere
    pub fn not_found() -> Self {
        Self::empty(LookupCase::MatchNotFound)
    }

    /// Result for a matched n-gram
    pub fn found(matches: Vec<DocIdx>) -> Self {
        LookupResult {
            case: LookupCase::MatchFound,
            matches,
        }
    }

    fn empty(case: LookupCase) -> Self {
        LookupResult {
            case,
            matches: Vec::new(),
        }
    }

    /// True if at least one document matched
    pub fn is_match(&self) -> bool {
        self.case == LookupCase::MatchFound
    }
}

// ============================================================================
// Per-window results
// ============================================================================

/// Lookup outcome for one n-gram window of a longer text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgramMatch {
    /// The normalized words of the window
    pub words: Vec<String>,
    /// Classification of the window
    pub case: LookupCase,
    /// Matching document indices
    pub matches: Vec<DocIdx>,
}

/// Occurrence count of one n-gram window inside a single document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentNgramCount {
    /// The normalized words of the window
    pub words: Vec<String>,
    /// Classification of the window
    pub case: LookupCase,
    /// Number of occurrences in the document (0 unless matched)
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_codes_are_distinct() {
        let cases = [
            LookupCase::NoQueryGiven,
            LookupCase::UnknownWordInQuery,
            LookupCase::MatchNotFound,
            LookupCase::MatchFound,
        ];
        let codes: Vec<u8> = cases.iter().map(|c| c.code()).collect();
        assert_eq!(codes, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_case_messages() {
        assert_eq!(LookupCase::NoQueryGiven.to_string(), "no query given");
        assert_eq!(
            LookupCase::UnknownWordInQuery.to_string(),
            "unknown word in query"
        );
        assert_eq!(LookupCase::MatchNotFound.to_string(), "no documents matched");
    }

    #[test]
    fn test_result_constructors() {
        assert!(LookupResult::no_query_given().matches.is_empty());
        assert!(!LookupResult::unknown_word().is_match());
        assert!(!LookupResult::not_found().is_match());

        let found = LookupResult::found(vec![0, 3]);
        assert!(found.is_match());
        assert_eq!(found.matches, vec![0, 3]);
    }

    #[test]
    fn test_case_serializes_snake_case() {
        let json = serde_json::to_string(&LookupCase::UnknownWordInQuery).unwrap();
        assert_eq!(json, "\"unknown_word_in_query\"");

        let result = LookupResult::found(vec![1]);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"match_found\""));
        let parsed: LookupResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }
}
