//! Packed integer keys for n-grams
//!
//! An n-gram `(id_0, .., id_{n-1})` packs to `sum(id_i * radix^(n-1-i))`,
//! i.e. the ids are the digits of a base-`radix` number. With `radix` at
//! least the vocabulary size every id is a single digit, so packing is
//! injective. `radix` is a power of ten so keys stay readable in decimal.
//!
//! Keys are 128 bits wide: an uncapped vocabulary of up to a million words
//! still packs 6-grams.

use gramdex_core::{Error, GramOrder, Result, TokenId};

/// A packed n-gram
pub type NgramKey = u128;

/// Packs and unpacks n-grams of one fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCodec {
    radix: u64,
    order: GramOrder,
    /// radix^(order-1): the place value of the leading digit
    lead: NgramKey,
}

impl KeyCodec {
    /// Smallest power of ten ≥ `vocab_size`.
    pub fn radix_for(vocab_size: usize) -> u64 {
        let mut radix = 1u64;
        while (radix as u128) < vocab_size as u128 {
            radix = radix.saturating_mul(10);
            if radix == u64::MAX {
                break;
            }
        }
        radix
    }

    /// Codec for a vocabulary of `vocab_size` ids and n-grams of `order`.
    pub fn new(vocab_size: usize, order: GramOrder) -> Result<Self> {
        Self::with_radix(Self::radix_for(vocab_size), order)
    }

    /// Codec with an explicit radix (as recorded in a persisted index).
    pub fn with_radix(radix: u64, order: GramOrder) -> Result<Self> {
        if order == 0 {
            return Err(Error::invalid_config("gram order must be at least 1"));
        }
        if radix == 0 {
            return Err(Error::KeyOverflow { radix, order });
        }
        let wide = radix as NgramKey;
        wide.checked_pow(order as u32)
            .ok_or(Error::KeyOverflow { radix, order })?;
        let lead = wide.pow(order as u32 - 1);
        Ok(KeyCodec { radix, order, lead })
    }

    /// Positional radix
    pub fn radix(&self) -> u64 {
        self.radix
    }

    /// Gram order this codec packs
    pub fn order(&self) -> GramOrder {
        self.order
    }

    /// Pack exactly `order` ids into one key.
    pub fn pack(&self, ids: &[TokenId]) -> Result<NgramKey> {
        if ids.len() != self.order {
            return Err(Error::invalid_config(format!(
                "cannot pack {} ids with a {}-gram codec",
                ids.len(),
                self.order
            )));
        }
        let mut key: NgramKey = 0;
        for &id in ids {
            if id as u64 >= self.radix {
                return Err(Error::KeyOverflow {
                    radix: self.radix,
                    order: self.order,
                });
            }
            key = key * self.radix as NgramKey + id as NgramKey;
        }
        Ok(key)
    }

    /// Recover the id tuple from a key.
    pub fn unpack(&self, key: NgramKey) -> Vec<TokenId> {
        let mut ids = vec![0; self.order];
        let mut rest = key;
        for slot in ids.iter_mut().rev() {
            *slot = (rest % self.radix as NgramKey) as TokenId;
            rest /= self.radix as NgramKey;
        }
        ids
    }

    /// Shift `id` into a rolling window key, dropping the oldest id.
    ///
    /// `id` must be below the radix.
    #[inline]
    pub fn roll(&self, key: NgramKey, id: TokenId) -> NgramKey {
        (key % self.lead) * self.radix as NgramKey + id as NgramKey
    }
}
