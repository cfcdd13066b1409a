//! Numeric range filters over sorted attributes.
//!
//! A filter narrows a match set to the products whose attribute value lies in
//! `[from, to]`. Both boundaries are found by binary search over the sorted
//! `(value, product_id)` array, so each filter costs O(log n) plus the size of
//! the selected slice. Several filters apply as successive intersections.

use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};

use crate::attribute::{Selection, UNBOUNDED};
use crate::storage::Storage;

/// Range filter on a named attribute.
///
/// Negative bounds mean "unbounded" on that side; see [`UNBOUNDED`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    /// Attribute name.
    pub attribute: String,
    /// Inclusive lower bound.
    #[serde(default = "unbounded")]
    pub from: f32,
    /// Inclusive upper bound.
    #[serde(default = "unbounded")]
    pub to: f32,
}

fn unbounded() -> f32 {
    UNBOUNDED
}

impl RangeFilter {
    /// Creates a filter with explicit bounds.
    #[must_use]
    pub fn new(attribute: impl Into<String>, from: f32, to: f32) -> Self {
        Self {
            attribute: attribute.into(),
            from,
            to,
        }
    }

    /// `from <= value <= to`.
    #[must_use]
    pub fn between(attribute: impl Into<String>, from: f32, to: f32) -> Self {
        Self::new(attribute, from, to)
    }

    /// `value >= from`.
    #[must_use]
    pub fn at_least(attribute: impl Into<String>, from: f32) -> Self {
        Self::new(attribute, from, UNBOUNDED)
    }

    /// `value <= to`.
    #[must_use]
    pub fn at_most(attribute: impl Into<String>, to: f32) -> Self {
        Self::new(attribute, UNBOUNDED, to)
    }
}

impl Storage {
    /// Intersects `matches` with the products selected by `filter`.
    ///
    /// An unregistered attribute leaves `matches` untouched. Products without
    /// a value for the attribute never pass a bounded filter.
    pub fn apply_filter(&self, matches: &mut RoaringBitmap, filter: &RangeFilter) {
        let Some(attribute) = self.attributes.get(&filter.attribute) else {
            tracing::trace!(attribute = %filter.attribute, "Filter on unknown attribute ignored");
            return;
        };

        match attribute.select(filter.from, filter.to) {
            Selection::All => {}
            Selection::Empty => matches.clear(),
            Selection::Range(range) => {
                if *range.start() == 0
                    && *range.end() + 1 == attribute.len()
                    && attribute.covers_catalog()
                {
                    return;
                }
                let selected: RoaringBitmap = attribute.entries()[range]
                    .iter()
                    .map(|entry| entry.product_id)
                    .collect();
                *matches &= selected;
            }
        }
    }

    /// Applies every filter in turn (logical AND).
    pub fn apply_filters(&self, matches: &mut RoaringBitmap, filters: &[RangeFilter]) {
        for filter in filters {
            if matches.is_empty() {
                break;
            }
            self.apply_filter(matches, filter);
        }
    }
}
