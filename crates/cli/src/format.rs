//! Output → human/json string formatting.
//!
//! Two modes:
//! - **Human** (default): the lookup messages, numbered match lists
//! - **JSON** (`--json`): `serde_json::to_string_pretty`

use serde::Serialize;
use serde_json::json;

use gramdex_core::{DocumentNgramCount, Error, LookupCase, NgramMatch};
use gramdex_engine::IndexStats;

use crate::corpus::DocumentRecord;
use crate::state::{Output, VocabEntry};

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Format a successful output.
pub fn format_output(output: &Output, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => format_json(output),
        OutputMode::Human => format_human(output),
    }
}

/// Format an error.
pub fn format_error(err: &Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => pretty(&json!({
            "error": err.to_string(),
            "configuration": err.is_configuration(),
        })),
        OutputMode::Human => format!("(error) {}", err),
    }
}

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {}\"}}", e))
}

// =========================================================================
// JSON
// =========================================================================

fn format_json(output: &Output) -> String {
    match output {
        Output::Lookup { result, documents } => pretty(&json!({
            "case": result.case,
            "code": result.case.code(),
            "message": result.case.message(),
            "matches": documents,
        })),
        Output::Scan(windows) => pretty(windows),
        Output::Counts { document, counts } => pretty(&json!({
            "document": document,
            "counts": counts,
        })),
        Output::Vocab(entries) => pretty(entries),
        Output::Stats {
            vocab_size,
            doc_count,
            orders,
        } => pretty(&json!({
            "vocab_size": vocab_size,
            "doc_count": doc_count,
            "orders": orders,
        })),
    }
}

// =========================================================================
// Human
// =========================================================================

fn format_human(output: &Output) -> String {
    match output {
        Output::Lookup { result, documents } => match result.case {
            LookupCase::MatchFound => format_documents(documents),
            case => case.message().to_string(),
        },
        Output::Scan(windows) => format_scan(windows),
        Output::Counts { document, counts } => format_counts(document, counts),
        Output::Vocab(entries) => format_vocab(entries),
        Output::Stats {
            vocab_size,
            doc_count,
            orders,
        } => format_stats(*vocab_size, *doc_count, orders),
    }
}

fn format_document(doc: &DocumentRecord) -> String {
    let mut line = format!("[{}]", doc.document_index);
    if let Some(id) = &doc.id {
        line.push_str(&format!(" id={}", id));
    }
    if let Some(text) = &doc.document {
        line.push_str(&format!(" \"{}\"", text));
    }
    line
}

fn format_documents(documents: &[DocumentRecord]) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| format!("{}) {}", i + 1, format_document(doc)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_scan(windows: &[NgramMatch]) -> String {
    if windows.is_empty() {
        return "(empty)".to_string();
    }
    windows
        .iter()
        .map(|w| {
            let outcome = match w.case {
                LookupCase::MatchFound => format!("{:?}", w.matches),
                case => format!("({})", case.message()),
            };
            format!("\"{}\" -> {}", w.words.join(" "), outcome)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_counts(document: &DocumentRecord, counts: &[DocumentNgramCount]) -> String {
    let mut lines = vec![format!("in {}", format_document(document))];
    if counts.is_empty() {
        lines.push("(empty)".to_string());
    }
    for c in counts {
        let outcome = match c.case {
            LookupCase::UnknownWordInQuery => format!("({})", c.case.message()),
            _ => c.count.to_string(),
        };
        lines.push(format!("\"{}\" -> {}", c.words.join(" "), outcome));
    }
    lines.join("\n")
}

fn format_vocab(entries: &[VocabEntry]) -> String {
    if entries.is_empty() {
        return "(empty)".to_string();
    }
    entries
        .iter()
        .map(|e| match e.id {
            Some(id) => format!("{}\t{}\t{}", id, e.word, e.frequency),
            None => format!("-\t{}\t(not in vocabulary)", e.word),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_stats(vocab_size: usize, doc_count: u32, orders: &[IndexStats]) -> String {
    let mut lines = vec![
        format!("vocabulary: {} words", vocab_size),
        format!("documents:  {}", doc_count),
    ];
    for s in orders {
        lines.push(format!(
            "order {}: {} keys, {} postings",
            s.order, s.key_count, s.total_postings
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gramdex_core::LookupResult;

    fn doc(i: u32, text: &str) -> DocumentRecord {
        DocumentRecord {
            document_index: i,
            id: Some(serde_json::Value::from(i)),
            document: Some(text.to_string()),
        }
    }

    #[test]
    fn test_human_lookup_messages() {
        for (result, expected) in [
            (LookupResult::no_query_given(), "no query given"),
            (LookupResult::unknown_word(), "unknown word in query"),
            (LookupResult::not_found(), "no documents matched"),
        ] {
            let out = Output::Lookup {
                result,
                documents: vec![],
            };
            assert_eq!(format_output(&out, OutputMode::Human), expected);
        }
    }

    #[test]
    fn test_human_lookup_matches() {
        let out = Output::Lookup {
            result: LookupResult::found(vec![0, 2]),
            documents: vec![doc(0, "The cat sat."), doc(2, "A cat ran.")],
        };
        assert_eq!(
            format_output(&out, OutputMode::Human),
            "1) [0] id=0 \"The cat sat.\"\n2) [2] id=2 \"A cat ran.\""
        );
    }

    #[test]
    fn test_json_lookup() {
        let out = Output::Lookup {
            result: LookupResult::found(vec![1]),
            documents: vec![doc(1, "The dog ran.")],
        };
        let value: serde_json::Value =
            serde_json::from_str(&format_output(&out, OutputMode::Json)).unwrap();
        assert_eq!(value["case"], "match_found");
        assert_eq!(value["code"], 3);
        assert_eq!(value["matches"][0]["document_index"], 1);
        assert_eq!(value["matches"][0]["document"], "The dog ran.");
    }

    #[test]
    fn test_human_scan() {
        let out = Output::Scan(vec![
            NgramMatch {
                words: vec!["the".into(), "cat".into()],
                case: LookupCase::MatchFound,
                matches: vec![0],
            },
            NgramMatch {
                words: vec!["cat".into(), "flew".into()],
                case: LookupCase::UnknownWordInQuery,
                matches: vec![],
            },
        ]);
        assert_eq!(
            format_output(&out, OutputMode::Human),
            "\"the cat\" -> [0]\n\"cat flew\" -> (unknown word in query)"
        );
    }

    #[test]
    fn test_error_formats() {
        let err = Error::OrderNotBuilt {
            order: 5,
            min: 1,
            max: 4,
        };
        assert!(format_error(&err, OutputMode::Human).starts_with("(error) "));
        let value: serde_json::Value =
            serde_json::from_str(&format_error(&err, OutputMode::Json)).unwrap();
        assert_eq!(value["configuration"], true);
    }
}
