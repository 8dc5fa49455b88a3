//! Text normalizer for indexing and querying
//!
//! Pipeline: strip → lowercase → remove ASCII punctuation
//!           → control characters to spaces → split on whitespace
//!
//! The same function is applied to corpus documents and to queries. Any
//! divergence between the two silently breaks matching.

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;

/// Unicode "Other" category (Cc, Cf, Cs, Co, Cn).
static CONTROL_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{C}").unwrap());

/// Normalize text into a whitespace-joined string of words.
///
/// No stemming, no stopwords. Non-ASCII punctuation is kept.
///
/// # Example
///
/// ```
/// use gramdex_index::tokenizer::normalize_text;
///
/// assert_eq!(normalize_text("  The Cat, sat!\u{0007}Down "), "the cat sat down");
/// ```
pub fn normalize_text(text: &str) -> String {
    normalize(text).join(" ")
}

/// Normalize text into word tokens.
///
/// # Example
///
/// ```
/// use gramdex_index::tokenizer::normalize;
///
/// assert_eq!(normalize("The cat sat."), vec!["the", "cat", "sat"]);
/// assert!(normalize("   ").is_empty());
/// ```
pub fn normalize(text: &str) -> Vec<String> {
    let lowered = text.trim().to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();
    CONTROL_CHARS
        .replace_all(&stripped, " ")
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Normalize every document of a corpus, in corpus order.
///
/// Documents are independent, so `parallel` maps them across the rayon pool.
pub fn normalize_corpus<S>(documents: &[S], parallel: bool) -> Vec<Vec<String>>
where
    S: AsRef<str> + Sync,
{
    if parallel {
        documents.par_iter().map(|d| normalize(d.as_ref())).collect()
    } else {
        documents.iter().map(|d| normalize(d.as_ref())).collect()
    }
}
