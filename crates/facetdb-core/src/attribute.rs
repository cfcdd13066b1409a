//! Named per-product numeric attributes.
//!
//! During a load each attribute is a slot array indexed by dense item index.
//! `complete_load_data` turns it into an [`Attribute`]: the `(value, product_id)`
//! pairs sorted ascending by value, plus a per-index value table used to read
//! a single product's value back.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Lower or upper bound value meaning "unbounded".
///
/// Any negative bound is treated as unbounded on its side; `-1` is the
/// distinguished value that also disables the `to < from` emptiness check.
pub const UNBOUNDED: f32 = -1.0;

/// One `(value, product_id)` pair of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeEntry {
    /// Attribute value.
    pub value: f32,
    /// Product carrying the value.
    pub product_id: u32,
}

/// Positions of a sorted attribute selected by a value range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Both bounds unbounded: every product passes.
    All,
    /// A bound exists but no entry satisfies it.
    Empty,
    /// Inclusive position range into the sorted entries.
    Range(RangeInclusive<usize>),
}

/// A named attribute, sorted ascending by value.
#[derive(Debug, Clone)]
pub struct Attribute {
    /// Entries sorted ascending by value.
    entries: Vec<AttributeEntry>,
    /// Value per dense item index; NaN where the product has no value.
    values_by_index: Vec<f32>,
}

impl Attribute {
    /// Builds the sorted attribute from load-time slots.
    ///
    /// Products without a value (and NaN values) are left out of the sorted
    /// entries. The sort is stable, so equal values keep item-index order.
    pub(crate) fn from_slots(slots: Vec<Option<AttributeEntry>>) -> Self {
        let values_by_index = slots
            .iter()
            .map(|slot| slot.map_or(f32::NAN, |entry| entry.value))
            .collect();

        let mut entries: Vec<AttributeEntry> = slots
            .into_iter()
            .flatten()
            .filter(|entry| !entry.value.is_nan())
            .collect();
        entries.sort_by(|a, b| a.value.total_cmp(&b.value));

        Self {
            entries,
            values_by_index,
        }
    }

    /// Entries sorted ascending by value.
    #[must_use]
    pub fn entries(&self) -> &[AttributeEntry] {
        &self.entries
    }

    /// Number of products carrying a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no product carries a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if every product of the catalog carries a value.
    #[must_use]
    pub fn covers_catalog(&self) -> bool {
        self.entries.len() == self.values_by_index.len()
    }

    /// Value of the product at dense `index`.
    #[must_use]
    pub fn value_at(&self, index: u32) -> Option<f32> {
        self.values_by_index
            .get(index as usize)
            .copied()
            .filter(|value| !value.is_nan())
    }

    /// Product ids in ascending value order.
    pub fn sorted_products(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().map(|entry| entry.product_id)
    }

    /// Selects the sorted positions whose value lies in `[from, to]`.
    ///
    /// A negative `from` leaves the range unbounded below and a negative `to`
    /// leaves it unbounded above. `to < from` selects nothing unless `to` is
    /// exactly [`UNBOUNDED`].
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn select(&self, from: f32, to: f32) -> Selection {
        if to < from && to != UNBOUNDED {
            return Selection::Empty;
        }
        if from < 0.0 && to < 0.0 {
            return Selection::All;
        }

        let len = self.entries.len();

        let lo = if from < 0.0 {
            0
        } else {
            self.entries.partition_point(|entry| entry.value < from)
        };
        if lo >= len {
            return Selection::Empty;
        }

        let hi = if to < 0.0 {
            len - 1
        } else {
            match self.entries.partition_point(|entry| entry.value <= to) {
                0 => return Selection::Empty,
                count => count - 1,
            }
        };

        if lo > hi {
            return Selection::Empty;
        }
        Selection::Range(lo..=hi)
    }
}
