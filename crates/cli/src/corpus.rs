//! Corpus files.
//!
//! Two layouts are accepted:
//! - **JSON lines** (`.jsonl`, `.ndjson`): one `{"id": ..., "document": "..."}` object per line
//! - **Plain text** (anything else): one document per line, id = line index
//!
//! Document indices are positions in the file, so a corpus must be read back
//! in the same order it was indexed in.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use gramdex_core::DocIdx;

/// One corpus entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CorpusDocument {
    /// Caller-side identifier, passed through untouched
    #[serde(default)]
    pub id: Value,
    /// Raw document text
    pub document: String,
}

/// A matched document index resolved against the corpus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRecord {
    pub document_index: DocIdx,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

/// Documents in index order.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<CorpusDocument>,
}

impl Corpus {
    /// Read a corpus file, picking the layout from its extension.
    pub fn read(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read corpus '{}': {}", path.display(), e))?;
        let is_jsonl = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("jsonl") | Some("ndjson")
        );
        if is_jsonl {
            Self::from_json_lines(&content)
                .map_err(|e| format!("Failed to parse corpus '{}': {}", path.display(), e))
        } else {
            Ok(Self::from_plain_text(&content))
        }
    }

    /// Blank lines are skipped; every other line must be a document object.
    pub fn from_json_lines(content: &str) -> Result<Self, String> {
        let mut documents = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let doc: CorpusDocument = serde_json::from_str(line)
                .map_err(|e| format!("line {}: {}", lineno + 1, e))?;
            documents.push(doc);
        }
        Ok(Corpus { documents })
    }

    /// Every line is a document, blank ones included.
    pub fn from_plain_text(content: &str) -> Self {
        let documents = content
            .lines()
            .enumerate()
            .map(|(i, line)| CorpusDocument {
                id: Value::from(i),
                document: line.to_string(),
            })
            .collect();
        Corpus { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Document texts, ready to hand to the engine.
    pub fn texts(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.document.as_str()).collect()
    }

    pub fn get(&self, index: DocIdx) -> Option<&CorpusDocument> {
        self.documents.get(index as usize)
    }

    /// Resolve matched indices. Indices outside the corpus keep only their index.
    pub fn resolve(&self, matches: &[DocIdx]) -> Vec<DocumentRecord> {
        matches
            .iter()
            .map(|&index| match self.get(index) {
                Some(doc) => DocumentRecord {
                    document_index: index,
                    id: Some(doc.id.clone()),
                    document: Some(doc.document.clone()),
                },
                None => DocumentRecord {
                    document_index: index,
                    id: None,
                    document: None,
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_plain_text_keeps_blank_lines() {
        let corpus = Corpus::from_plain_text("the cat\n\nthe dog\n");
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.texts(), vec!["the cat", "", "the dog"]);
        assert_eq!(corpus.get(2).unwrap().id, Value::from(2));
    }

    #[test]
    fn test_json_lines() {
        let corpus = Corpus::from_json_lines(
            "{\"id\": \"a-1\", \"document\": \"The cat sat.\"}\n\n{\"id\": 7, \"document\": \"The dog ran.\"}\n",
        )
        .unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.get(0).unwrap().id, Value::from("a-1"));
        assert_eq!(corpus.get(1).unwrap().document, "The dog ran.");
    }

    #[test]
    fn test_json_lines_reports_line() {
        let err = Corpus::from_json_lines("{\"document\": \"ok\"}\n{\"id\": 1}\n").unwrap_err();
        assert!(err.starts_with("line 2:"), "{}", err);
    }

    #[test]
    fn test_resolve_out_of_range() {
        let corpus = Corpus::from_plain_text("a\nb");
        let records = corpus.resolve(&[1, 5]);
        assert_eq!(records[0].document.as_deref(), Some("b"));
        assert_eq!(records[1].document_index, 5);
        assert!(records[1].document.is_none());
    }

    #[test]
    fn test_read_picks_layout_by_extension() {
        let tmp = TempDir::new().unwrap();
        let jsonl = tmp.path().join("corpus.jsonl");
        std::fs::write(&jsonl, "{\"id\": 1, \"document\": \"x y\"}\n").unwrap();
        assert_eq!(Corpus::read(&jsonl).unwrap().texts(), vec!["x y"]);

        let txt = tmp.path().join("corpus.txt");
        std::fs::write(&txt, "{\"id\": 1, \"document\": \"x y\"}\n").unwrap();
        assert_eq!(
            Corpus::read(&txt).unwrap().texts(),
            vec!["{\"id\": 1, \"document\": \"x y\"}"]
        );

        assert!(Corpus::read(&tmp.path().join("missing.txt")).is_err());
    }
}
