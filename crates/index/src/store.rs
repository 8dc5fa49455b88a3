//! Per-order index artifacts on disk
//!
//! Each gram order lives in its own file, addressed by a path template with a
//! single `%d` placeholder (e.g. `cache/ngram_dict_%d`). Files are published
//! atomically so a failed build never leaves a half-written artifact.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use gramdex_core::{Error, GramOrder, Result};

use crate::segment::SealedNgramIndex;
use crate::vocabulary::Vocabulary;

/// Placeholder replaced by the gram order
const ORDER_PLACEHOLDER: &str = "%d";

/// Sequence number for temp file names within this process
static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Write `bytes` to `path` via temp file, fsync and rename.
///
/// Every call writes its own `<name>.<pid>.<seq>.tmp`, so concurrent writers
/// of one artifact never share a temp file. The temp file is removed if any
/// step fails.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let mut tmp_name = path.file_name().map(OsString::from).unwrap_or_default();
    tmp_name.push(format!(
        ".{}.{}.tmp",
        std::process::id(),
        TMP_SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    let tmp_path = path.with_file_name(tmp_name);

    let result = write_then_rename(&tmp_path, path, bytes);
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn write_then_rename(tmp_path: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    {
        let mut file = fs::File::create(tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(tmp_path, path)
}

// ============================================================================
// PathTemplate
// ============================================================================

/// Path template parameterized by gram order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    template: String,
}

impl PathTemplate {
    /// Parse a template; it must contain `%d` exactly once.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        match template.matches(ORDER_PLACEHOLDER).count() {
            1 => Ok(PathTemplate { template }),
            n => Err(Error::invalid_config(format!(
                "path template {:?} must contain exactly one {} (found {})",
                template, ORDER_PLACEHOLDER, n
            ))),
        }
    }

    /// Concrete path for `order`
    pub fn path_for(&self, order: GramOrder) -> PathBuf {
        PathBuf::from(
            self.template
                .replacen(ORDER_PLACEHOLDER, &order.to_string(), 1),
        )
    }

    /// The raw template
    pub fn as_str(&self) -> &str {
        &self.template
    }
}

// ============================================================================
// IndexStore
// ============================================================================

/// Saves, loads and discards per-order index files.
#[derive(Debug, Clone)]
pub struct IndexStore {
    template: PathTemplate,
}

impl IndexStore {
    /// Store addressed by `template`
    pub fn new(template: PathTemplate) -> Self {
        IndexStore { template }
    }

    /// Path of the artifact for `order`
    pub fn path_for(&self, order: GramOrder) -> PathBuf {
        self.template.path_for(order)
    }

    /// Whether an artifact for `order` exists
    pub fn exists(&self, order: GramOrder) -> bool {
        self.path_for(order).exists()
    }

    /// Persist `index` at the path for its order.
    pub fn save(&self, index: &SealedNgramIndex) -> Result<PathBuf> {
        let path = self.path_for(index.order());
        index.write_to_file(&path)?;
        tracing::info!(
            target: "gramdex::index",
            order = index.order(),
            keys = index.key_count(),
            path = %path.display(),
            "Saved n-gram index"
        );
        Ok(path)
    }

    /// Load the `order` artifact and check it against `vocab`.
    ///
    /// Fails with `MissingArtifact` if the file does not exist; never builds.
    pub fn load(&self, order: GramOrder, vocab: &Vocabulary) -> Result<SealedNgramIndex> {
        let path = self.path_for(order);
        let index = SealedNgramIndex::open(&path)?;
        if index.order() != order {
            return Err(Error::corruption(format!(
                "{} holds a {}-gram index, expected {}",
                path.display(),
                index.order(),
                order
            )));
        }
        index.check_vocabulary(vocab)?;
        tracing::info!(
            target: "gramdex::index",
            order,
            keys = index.key_count(),
            postings = index.total_postings(),
            path = %path.display(),
            "Loaded n-gram index"
        );
        Ok(index)
    }

    /// Delete the `order` artifact. Returns whether a file was removed.
    pub fn discard(&self, order: GramOrder) -> Result<bool> {
        let path = self.path_for(order);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(
                    target: "gramdex::index",
                    order,
                    path = %path.display(),
                    "Discarded n-gram index"
                );
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
