//! Sealed n-gram index file format (.ngx)
//!
//! An immutable, mmap-able table from packed n-gram keys to delta-encoded
//! posting lists. One file holds one gram order.
//!
//! ## File Format
//!
//! ```text
//! HEADER (72 bytes):
//!   magic "NGIX"            4B
//!   version                 u32 LE
//!   order                   u32 LE
//!   reserved                u32 LE
//!   radix                   u64 LE
//!   vocab_size              u64 LE
//!   vocab_fingerprint       u64 LE    → xxh3 of the words in id order
//!   doc_count               u32 LE
//!   key_count               u32 LE
//!   keys_offset             u64 LE    → byte offset to key table (= 72)
//!   postings_offset         u64 LE    → byte offset to postings section
//!   total_postings          u64 LE
//!
//! KEY TABLE (key_count × 32 bytes, sorted by key):
//!   per key:
//!     key                   u128 LE
//!     posting_offset        u64 LE    → relative to postings section start
//!     posting_byte_len      u32 LE
//!     df                    u32 LE    → number of documents
//!
//! POSTINGS SECTION:
//!   per key's posting list:
//!     df × delta_doc_idx: varint     (ascending, first delta from 0)
//! ```
//!
//! Every offset, key order and posting list is validated when the file is
//! opened, so lookups on a loaded index cannot fail.

use std::path::Path;

use gramdex_core::{DocIdx, Error, GramOrder, Result};

use crate::builder::{IndexStats, NgramPostings};
use crate::key::{KeyCodec, NgramKey};
use crate::store::write_atomic;
use crate::vocabulary::Vocabulary;

/// Magic bytes for .ngx files
const NGX_MAGIC: &[u8; 4] = b"NGIX";
/// Current format version
const NGX_VERSION: u32 = 2;
/// Header size in bytes
const HEADER_SIZE: usize = 72;
/// Key table entry size in bytes
const KEY_ENTRY_SIZE: usize = 32;

// ============================================================================
// Varint (LEB128) Codec
// ============================================================================

/// Encode a u32 as a variable-length integer (LEB128).
pub(crate) fn encode_varint(mut value: u32, buf: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Decode a varint from a byte slice, returning (value, bytes_consumed).
pub(crate) fn decode_varint(data: &[u8]) -> Option<(u32, usize)> {
    let mut value: u32 = 0;
    let mut shift = 0;
    for (i, &byte) in data.iter().enumerate() {
        if shift == 28 && byte & 0x70 != 0 {
            return None; // overflow
        }
        value |= ((byte & 0x7F) as u32) << shift;
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
        shift += 7;
        if shift >= 35 {
            return None; // overflow
        }
    }
    None // truncated
}

#[inline]
fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}

#[inline]
fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(buf)
}

#[inline]
fn read_u128(bytes: &[u8], at: usize) -> u128 {
    let mut buf = [0u8; 16];
    buf.copy_from_slice(&bytes[at..at + 16]);
    u128::from_le_bytes(buf)
}

/// Narrow a count to the format's u32 fields.
fn checked_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        Error::invalid_config(format!(
            "{} {} does not fit the .ngx format (max {})",
            what,
            value,
            u32::MAX
        ))
    })
}

// ============================================================================
// IndexData
// ============================================================================

/// Underlying storage for a sealed index.
enum IndexData {
    /// In-memory owned data (freshly built)
    Owned(Vec<u8>),
    /// Memory-mapped file data
    Mmap(memmap2::Mmap),
}

impl IndexData {
    fn as_bytes(&self) -> &[u8] {
        match self {
            IndexData::Owned(v) => v,
            IndexData::Mmap(m) => m,
        }
    }
}

/// One decoded key table entry
#[derive(Debug, Clone, Copy)]
struct KeyEntry {
    key: NgramKey,
    posting_offset: u64,
    posting_len: u32,
    df: u32,
}

// ============================================================================
// SealedNgramIndex
// ============================================================================

/// An immutable per-order n-gram index.
///
/// Backed by either owned memory (right after a build) or an mmap'd file.
pub struct SealedNgramIndex {
    data: IndexData,
    codec: KeyCodec,
    vocab_size: u64,
    vocab_fingerprint: u64,
    doc_count: u32,
    key_count: u32,
    postings_offset: u64,
    total_postings: u64,
}

impl std::fmt::Debug for SealedNgramIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedNgramIndex")
            .field("order", &self.order())
            .field("radix", &self.radix())
            .field("vocab_size", &self.vocab_size)
            .field("vocab_fingerprint", &format_args!("{:016x}", self.vocab_fingerprint))
            .field("doc_count", &self.doc_count)
            .field("key_count", &self.key_count)
            .field("total_postings", &self.total_postings)
            .finish()
    }
}

impl SealedNgramIndex {
    /// Seal a freshly built index.
    ///
    /// Fails with `InvalidConfig` if a count outgrows the format's u32 fields.
    pub fn from_postings(postings: &NgramPostings) -> Result<Self> {
        let entries = postings.sorted_entries();
        let key_count = checked_u32(entries.len(), "key count")?;

        let mut table_buf: Vec<u8> = Vec::with_capacity(entries.len() * KEY_ENTRY_SIZE);
        let mut postings_buf: Vec<u8> = Vec::new();
        let mut total_postings = 0u64;

        for (key, docs) in &entries {
            let posting_offset = postings_buf.len() as u64;
            let mut prev = 0;
            for &doc in docs.iter() {
                encode_varint(doc - prev, &mut postings_buf);
                prev = doc;
            }
            let posting_len = checked_u32(
                postings_buf.len() - posting_offset as usize,
                "posting list byte length",
            )?;
            let df = checked_u32(docs.len(), "posting list length")?;
            total_postings += docs.len() as u64;

            table_buf.extend_from_slice(&key.to_le_bytes());
            table_buf.extend_from_slice(&posting_offset.to_le_bytes());
            table_buf.extend_from_slice(&posting_len.to_le_bytes());
            table_buf.extend_from_slice(&df.to_le_bytes());
        }

        let codec = postings.codec();
        let keys_offset = HEADER_SIZE as u64;
        let postings_offset = keys_offset + table_buf.len() as u64;
        let total_size = HEADER_SIZE + table_buf.len() + postings_buf.len();
        let mut buf = Vec::with_capacity(total_size);

        // Header (72 bytes)
        buf.extend_from_slice(NGX_MAGIC);
        buf.extend_from_slice(&NGX_VERSION.to_le_bytes());
        buf.extend_from_slice(&(codec.order() as u32).to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&codec.radix().to_le_bytes());
        buf.extend_from_slice(&(postings.vocab_size() as u64).to_le_bytes());
        buf.extend_from_slice(&postings.vocab_fingerprint().to_le_bytes());
        buf.extend_from_slice(&postings.doc_count().to_le_bytes());
        buf.extend_from_slice(&key_count.to_le_bytes());
        buf.extend_from_slice(&keys_offset.to_le_bytes());
        buf.extend_from_slice(&postings_offset.to_le_bytes());
        buf.extend_from_slice(&total_postings.to_le_bytes());
        debug_assert_eq!(buf.len(), HEADER_SIZE);

        buf.extend_from_slice(&table_buf);
        buf.extend_from_slice(&postings_buf);
        debug_assert_eq!(buf.len(), total_size);

        Ok(SealedNgramIndex {
            data: IndexData::Owned(buf),
            codec,
            vocab_size: postings.vocab_size() as u64,
            vocab_fingerprint: postings.vocab_fingerprint(),
            doc_count: postings.doc_count(),
            key_count,
            postings_offset,
            total_postings,
        })
    }

    /// Load a sealed index from raw bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::validate_and_create(IndexData::Owned(data))
    }

    /// Load a sealed index from an mmap'd file.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::missing_artifact(path));
        }
        let file = std::fs::File::open(path)?;
        // SAFETY: artifacts are only ever replaced by rename, never modified in place.
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        Self::validate_and_create(IndexData::Mmap(mmap))
    }

    fn validate_and_create(data: IndexData) -> Result<Self> {
        let bytes = data.as_bytes();
        if bytes.len() < HEADER_SIZE {
            return Err(Error::corruption("index file too small"));
        }
        if &bytes[0..4] != NGX_MAGIC {
            return Err(Error::corruption("bad NGIX magic"));
        }
        let version = read_u32(bytes, 4);
        if version != NGX_VERSION {
            return Err(Error::corruption(format!(
                "unsupported NGIX version {}",
                version
            )));
        }
        let order = read_u32(bytes, 8) as GramOrder;
        let radix = read_u64(bytes, 16);
        let vocab_size = read_u64(bytes, 24);
        let vocab_fingerprint = read_u64(bytes, 32);
        let doc_count = read_u32(bytes, 40);
        let key_count = read_u32(bytes, 44);
        let keys_offset = read_u64(bytes, 48);
        let postings_offset = read_u64(bytes, 56);
        let total_postings = read_u64(bytes, 64);

        let codec = KeyCodec::with_radix(radix, order)
            .map_err(|e| Error::corruption(format!("bad key parameters: {}", e)))?;

        let table_end = keys_offset
            .checked_add(key_count as u64 * KEY_ENTRY_SIZE as u64)
            .ok_or_else(|| Error::corruption("key table offset overflow"))?;
        if keys_offset != HEADER_SIZE as u64
            || table_end != postings_offset
            || postings_offset > bytes.len() as u64
        {
            return Err(Error::corruption("section offsets out of range"));
        }

        let index = SealedNgramIndex {
            data,
            codec,
            vocab_size,
            vocab_fingerprint,
            doc_count,
            key_count,
            postings_offset,
            total_postings,
        };
        index.validate_entries()?;
        Ok(index)
    }

    /// Check key order and decode every posting list once.
    fn validate_entries(&self) -> Result<()> {
        let postings_len = self.data.as_bytes().len() as u64 - self.postings_offset;
        let mut prev_key: Option<NgramKey> = None;
        let mut seen_postings = 0u64;

        for i in 0..self.key_count as usize {
            let entry = self.entry_at(i);
            if let Some(prev) = prev_key {
                if entry.key == prev {
                    return Err(Error::KeyCollision { key: entry.key });
                }
                if entry.key < prev {
                    return Err(Error::corruption(format!(
                        "key table not sorted at entry {}",
                        i
                    )));
                }
            }
            prev_key = Some(entry.key);

            let end = entry
                .posting_offset
                .checked_add(entry.posting_len as u64)
                .filter(|&end| end <= postings_len)
                .ok_or_else(|| {
                    Error::corruption(format!("posting list of key {} out of range", entry.key))
                })?;
            if entry.df == 0 {
                return Err(Error::corruption(format!("empty posting list for key {}", entry.key)));
            }

            let mut iter = self.posting_iter_for(&entry);
            let mut decoded = 0u32;
            let mut last: Option<DocIdx> = None;
            for doc in iter.by_ref() {
                if last.map_or(false, |l| doc <= l) || doc >= self.doc_count {
                    return Err(Error::corruption(format!(
                        "posting list of key {} is not ascending within the corpus",
                        entry.key
                    )));
                }
                last = Some(doc);
                decoded += 1;
            }
            if decoded != entry.df || iter.pos as u64 != end - entry.posting_offset {
                return Err(Error::corruption(format!(
                    "posting list of key {} is truncated",
                    entry.key
                )));
            }
            seen_postings += entry.df as u64;
        }

        if seen_postings != self.total_postings {
            return Err(Error::corruption("posting count does not match header"));
        }
        Ok(())
    }

    // ========================================================================
    // Metadata
    // ========================================================================

    /// Gram order
    pub fn order(&self) -> GramOrder {
        self.codec.order()
    }

    /// Positional radix of the packed keys
    pub fn radix(&self) -> u64 {
        self.codec.radix()
    }

    /// Codec for packing queries against this index
    pub fn codec(&self) -> KeyCodec {
        self.codec
    }

    /// Vocabulary size the index was built with
    pub fn vocab_size(&self) -> u64 {
        self.vocab_size
    }

    /// Fingerprint of the vocabulary the index was built with
    pub fn vocab_fingerprint(&self) -> u64 {
        self.vocab_fingerprint
    }

    /// Number of documents in the corpus at build time
    pub fn doc_count(&self) -> u32 {
        self.doc_count
    }

    /// Number of distinct n-grams
    pub fn key_count(&self) -> usize {
        self.key_count as usize
    }

    /// Sum of posting list lengths
    pub fn total_postings(&self) -> u64 {
        self.total_postings
    }

    /// Size summary
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            order: self.order(),
            key_count: self.key_count(),
            total_postings: self.total_postings,
            doc_count: self.doc_count,
        }
    }

    /// Fail with `VocabularyMismatch` unless `vocab` is the one this index was built with.
    ///
    /// Size, radix and the word fingerprint must all agree.
    pub fn check_vocabulary(&self, vocab: &Vocabulary) -> Result<()> {
        let expected_radix = KeyCodec::radix_for(vocab.size());
        let fingerprint = vocab.fingerprint();
        if self.vocab_size != vocab.size() as u64
            || self.radix() != expected_radix
            || self.vocab_fingerprint != fingerprint
        {
            return Err(Error::VocabularyMismatch {
                expected: format!(
                    "{} words (radix {}, fingerprint {:016x})",
                    self.vocab_size,
                    self.radix(),
                    self.vocab_fingerprint
                ),
                actual: format!(
                    "{} words (radix {}, fingerprint {:016x})",
                    vocab.size(),
                    expected_radix,
                    fingerprint
                ),
            });
        }
        Ok(())
    }

    /// Write this index's bytes to a file (atomic temp+rename).
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        write_atomic(path, self.data.as_bytes())?;
        Ok(())
    }

    // ========================================================================
    // Key Table Access
    // ========================================================================

    fn entry_at(&self, i: usize) -> KeyEntry {
        let bytes = self.data.as_bytes();
        let at = HEADER_SIZE + i * KEY_ENTRY_SIZE;
        KeyEntry {
            key: read_u128(bytes, at),
            posting_offset: read_u64(bytes, at + 16),
            posting_len: read_u32(bytes, at + 24),
            df: read_u32(bytes, at + 28),
        }
    }

    /// Binary search the key table.
    fn find_key(&self, key: NgramKey) -> Option<KeyEntry> {
        let mut lo = 0usize;
        let mut hi = self.key_count as usize;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let entry = self.entry_at(mid);
            match entry.key.cmp(&key) {
                std::cmp::Ordering::Equal => return Some(entry),
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
            }
        }
        None
    }

    fn posting_iter_for(&self, entry: &KeyEntry) -> PostingIter<'_> {
        let start = (self.postings_offset + entry.posting_offset) as usize;
        let end = start + entry.posting_len as usize;
        PostingIter {
            data: &self.data.as_bytes()[start..end],
            pos: 0,
            remaining: entry.df,
            prev: 0,
        }
    }

    /// Whether the n-gram `key` occurs in any document
    pub fn contains(&self, key: NgramKey) -> bool {
        self.find_key(key).is_some()
    }

    /// Number of documents containing `key` (0 if absent)
    pub fn doc_freq(&self, key: NgramKey) -> u32 {
        self.find_key(key).map_or(0, |e| e.df)
    }

    /// Documents containing `key`, ascending.
    pub fn lookup(&self, key: NgramKey) -> Option<Vec<DocIdx>> {
        self.posting_iter(key).map(Iterator::collect)
    }

    /// Zero-allocation iterator over the documents containing `key`.
    pub fn posting_iter(&self, key: NgramKey) -> Option<PostingIter<'_>> {
        let entry = self.find_key(key)?;
        Some(self.posting_iter_for(&entry))
    }

    /// Iterate `(key, df)` in ascending key order.
    pub fn entries(&self) -> impl Iterator<Item = (NgramKey, u32)> + '_ {
        (0..self.key_count as usize).map(move |i| {
            let e = self.entry_at(i);
            (e.key, e.df)
        })
    }
}

// ============================================================================
// PostingIter
// ============================================================================

/// Iterator that lazily decodes a delta-encoded posting list.
pub struct PostingIter<'a> {
    data: &'a [u8],
    pos: usize,
    remaining: u32,
    prev: DocIdx,
}

impl<'a> Iterator for PostingIter<'a> {
    type Item = DocIdx;

    #[inline]
    fn next(&mut self) -> Option<DocIdx> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let (delta, n) = decode_varint(&self.data[self.pos..])?;
        self.pos += n;
        self.prev = self.prev.checked_add(delta)?;
        Some(self.prev)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining as usize))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_ngram_index, encode_documents};
    use crate::tokenizer::normalize_corpus;

    fn sealed(docs: &[&str], order: GramOrder) -> (Vocabulary, SealedNgramIndex) {
        let tokens = normalize_corpus(docs, false);
        let vocab = Vocabulary::build_from_tokens(&tokens);
        let encoded = encode_documents(&vocab, &tokens, false);
        let built = build_ngram_index(order, &vocab, &encoded).unwrap();
        (vocab, SealedNgramIndex::from_postings(&built).unwrap())
    }

    fn key(vocab: &Vocabulary, index: &SealedNgramIndex, words: &[&str]) -> NgramKey {
        index.codec().pack(&vocab.ids_of(words)).unwrap()
    }

    #[test]
    fn test_varint_roundtrip() {
        for &val in &[0u32, 1, 127, 128, 16383, 16384, u32::MAX] {
            let mut buf = Vec::new();
            encode_varint(val, &mut buf);
            let (decoded, len) = decode_varint(&buf).unwrap();
            assert_eq!(decoded, val);
            assert_eq!(len, buf.len());
        }
    }

    #[test]
    fn test_varint_encoding_size() {
        let mut buf = Vec::new();
        encode_varint(127, &mut buf);
        assert_eq!(buf.len(), 1);

        buf.clear();
        encode_varint(128, &mut buf);
        assert_eq!(buf.len(), 2);

        buf.clear();
        encode_varint(u32::MAX, &mut buf);
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn test_varint_truncated_and_overflow() {
        assert!(decode_varint(&[0x80]).is_none());
        assert!(decode_varint(&[0xFF, 0xFF, 0xFF, 0xFF, 0x7F]).is_none());
    }

    #[test]
    fn test_empty_index() {
        let (vocab, index) = sealed(&["one"], 2);
        assert_eq!(index.key_count(), 0);
        assert_eq!(index.doc_count(), 1);
        assert!(index.lookup(key(&vocab, &index, &["one", "one"])).is_none());

        let reloaded = SealedNgramIndex::from_bytes(index.data.as_bytes().to_vec()).unwrap();
        assert_eq!(reloaded.key_count(), 0);
    }

    #[test]
    fn test_lookup_and_doc_freq() {
        let (vocab, index) = sealed(&["The cat sat.", "The dog ran.", "A cat ran."], 1);
        assert_eq!(index.lookup(key(&vocab, &index, &["the"])), Some(vec![0, 1]));
        assert_eq!(index.lookup(key(&vocab, &index, &["ran"])), Some(vec![1, 2]));
        assert_eq!(index.doc_freq(key(&vocab, &index, &["cat"])), 2);
        assert_eq!(index.doc_freq(key(&vocab, &index, &["a"])), 1);
        assert!(index.contains(key(&vocab, &index, &["sat"])));
        assert_eq!(index.stats().total_postings, 9);
    }

    #[test]
    fn test_entries_sorted() {
        let (_, index) = sealed(&["d c b a", "a b c d"], 2);
        let keys: Vec<NgramKey> = index.entries().map(|(k, _)| k).collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
        assert_eq!(keys.len(), 6);
    }

    #[test]
    fn test_large_doc_gaps() {
        let mut docs = vec!["filler"; 300];
        docs[0] = "needle here";
        docs[299] = "needle here";
        let (vocab, index) = sealed(&docs, 2);
        assert_eq!(
            index.lookup(key(&vocab, &index, &["needle", "here"])),
            Some(vec![0, 299])
        );
    }

    #[test]
    fn test_write_and_open_file() {
        let (vocab, index) = sealed(&["the cat sat", "the dog ran"], 2);
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bigrams.ngx");
        index.write_to_file(&path).unwrap();

        let loaded = SealedNgramIndex::open(&path).unwrap();
        assert_eq!(loaded.order(), 2);
        assert_eq!(loaded.radix(), 10);
        assert_eq!(loaded.vocab_size(), 6);
        assert_eq!(loaded.doc_count(), 2);
        assert_eq!(loaded.key_count(), 4);
        assert_eq!(loaded.lookup(key(&vocab, &loaded, &["the", "dog"])), Some(vec![1]));
        loaded.check_vocabulary(&vocab).unwrap();
    }

    #[test]
    fn test_open_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let err = SealedNgramIndex::open(&tmp.path().join("none.ngx")).unwrap_err();
        assert!(matches!(err, Error::MissingArtifact { .. }));
    }

    #[test]
    fn test_rejects_bad_magic() {
        let (_, index) = sealed(&["a b"], 1);
        let mut bytes = index.data.as_bytes().to_vec();
        bytes[0] = b'X';
        assert!(matches!(
            SealedNgramIndex::from_bytes(bytes),
            Err(Error::Corruption(_))
        ));
    }

    #[test]
    fn test_rejects_truncated() {
        let (_, index) = sealed(&["a b c", "b c d"], 1);
        let bytes = index.data.as_bytes().to_vec();
        assert!(SealedNgramIndex::from_bytes(bytes[..HEADER_SIZE - 1].to_vec()).is_err());
        assert!(SealedNgramIndex::from_bytes(bytes[..bytes.len() - 1].to_vec()).is_err());
    }

    #[test]
    fn test_rejects_duplicate_keys() {
        let (_, index) = sealed(&["a b"], 1);
        let mut bytes = index.data.as_bytes().to_vec();
        // Overwrite the second key with the first.
        let first: Vec<u8> = bytes[HEADER_SIZE..HEADER_SIZE + 16].to_vec();
        bytes[HEADER_SIZE + KEY_ENTRY_SIZE..HEADER_SIZE + KEY_ENTRY_SIZE + 16]
            .copy_from_slice(&first);
        assert!(matches!(
            SealedNgramIndex::from_bytes(bytes),
            Err(Error::KeyCollision { .. })
        ));
    }

    #[test]
    fn test_check_vocabulary_mismatch() {
        let (_, index) = sealed(&["a b"], 1);
        let other = Vocabulary::build_from_corpus(&["x y z w"], false);
        assert!(matches!(
            index.check_vocabulary(&other),
            Err(Error::VocabularyMismatch { .. })
        ));
    }

    #[test]
    fn test_check_vocabulary_same_size_other_words() {
        let (vocab, index) = sealed(&["a b"], 1);
        let swapped = Vocabulary::build_from_corpus(&["b a"], false);
        assert_eq!(swapped.size(), vocab.size());
        assert_eq!(index.vocab_fingerprint(), vocab.fingerprint());

        let err = index.check_vocabulary(&swapped).unwrap_err();
        assert!(matches!(err, Error::VocabularyMismatch { .. }));
        assert!(err.to_string().contains("fingerprint"));
    }

    #[test]
    fn test_fingerprint_survives_file() {
        let (vocab, index) = sealed(&["the cat sat", "the dog ran"], 2);
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bigrams.ngx");
        index.write_to_file(&path).unwrap();
        let loaded = SealedNgramIndex::open(&path).unwrap();
        assert_eq!(loaded.vocab_fingerprint(), vocab.fingerprint());
    }

    #[test]
    fn test_rejects_old_version() {
        let (_, index) = sealed(&["a b"], 1);
        let mut bytes = index.data.as_bytes().to_vec();
        bytes[4..8].copy_from_slice(&1u32.to_le_bytes());
        assert!(matches!(
            SealedNgramIndex::from_bytes(bytes),
            Err(Error::Corruption(_))
        ));
    }

    #[test]
    fn test_wide_keys_round_trip() {
        // 10,001 words: radix 10^5, so 4-gram keys need more than 64 bits.
        let doc: Vec<String> = (0..10_001).map(|i| format!("w{}", i)).collect();
        let (vocab, index) = sealed(&[doc.join(" ").as_str()], 4);
        assert_eq!(index.radix(), 100_000);
        let k = key(&vocab, &index, &["w9997", "w9998", "w9999", "w10000"]);
        assert!(index.radix().checked_pow(4).is_none());
        assert_eq!(index.lookup(k), Some(vec![0]));

        let reloaded = SealedNgramIndex::from_bytes(index.data.as_bytes().to_vec()).unwrap();
        assert_eq!(reloaded.lookup(k), Some(vec![0]));
        assert_eq!(reloaded.key_count(), 9_998);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_counts_beyond_u32_rejected() {
        assert_eq!(checked_u32(u32::MAX as usize, "key count").unwrap(), u32::MAX);
        let err = checked_u32(u32::MAX as usize + 1, "key count").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(err.to_string().contains("key count 4294967296"));
    }
}
