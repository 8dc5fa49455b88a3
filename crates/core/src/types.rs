//! Integer handles shared by the index and engine crates
//!
//! Words, documents and n-gram orders are all referred to by plain integers.
//! Documents are identified only by their 0-based position in the corpus;
//! mapping a position back to an external identifier is the caller's job.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Dense vocabulary id, assigned in first-seen order starting at 0
pub type TokenId = u32;

/// 0-based position of a document in the corpus
pub type DocIdx = u32;

/// Length n of an n-gram
pub type GramOrder = usize;

/// Largest gram order accepted by configuration
pub const MAX_GRAM_ORDER: GramOrder = 8;

/// Inclusive range of gram orders `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderRange {
    min: GramOrder,
    max: GramOrder,
}

impl OrderRange {
    /// Create a range, rejecting zero, inverted and oversized bounds.
    pub fn new(min: GramOrder, max: GramOrder) -> Result<Self> {
        if min == 0 {
            return Err(Error::invalid_config("min_order must be at least 1"));
        }
        if min > max {
            return Err(Error::invalid_config(format!(
                "min_order ({}) is greater than max_order ({})",
                min, max
            )));
        }
        if max > MAX_GRAM_ORDER {
            return Err(Error::invalid_config(format!(
                "max_order ({}) exceeds the supported maximum of {}",
                max, MAX_GRAM_ORDER
            )));
        }
        Ok(OrderRange { min, max })
    }

    /// Smallest order
    pub fn min(&self) -> GramOrder {
        self.min
    }

    /// Largest order
    pub fn max(&self) -> GramOrder {
        self.max
    }

    /// Whether `order` lies inside the range
    pub fn contains(&self, order: GramOrder) -> bool {
        self.min <= order && order <= self.max
    }

    /// Iterate orders from min to max
    pub fn iter(&self) -> impl Iterator<Item = GramOrder> {
        self.min..=self.max
    }

    /// Number of orders in the range
    pub fn len(&self) -> usize {
        self.max - self.min + 1
    }

    /// Always false; a valid range holds at least one order
    pub fn is_empty(&self) -> bool {
        false
    }
}
