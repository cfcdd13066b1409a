//! Per-feature match and group counts.

use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::filter::RangeFilter;
use crate::storage::Storage;

/// Facet count record for one feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FacetCount {
    /// Feature id.
    pub feature_id: u32,
    /// Matched products carrying the feature.
    pub match_count: u32,
    /// Distinct groups among those products; 0 unless grouped counting was asked.
    pub group_count: u32,
    /// Always 0.
    pub reserved: u32,
}

impl FacetCount {
    fn new(feature_id: u32, match_count: u32, group_count: u32) -> Self {
        Self {
            feature_id,
            match_count,
            group_count,
            reserved: 0,
        }
    }
}

impl Storage {
    /// Counts, per feature, the products matching `expression` and `filters`.
    ///
    /// Features come from `included_features`, or every feature with at least
    /// one product when it is empty. Features without products (or outside
    /// the feature range) produce no record.
    ///
    /// # Errors
    ///
    /// Returns `NotReady` before the load completes, or `InvalidExpression`
    /// for a malformed expression.
    pub fn count_products(
        &self,
        expression: &str,
        included_features: &[u32],
        grouped: bool,
        filters: &[RangeFilter],
    ) -> Result<Vec<FacetCount>> {
        let mut matches = self.evaluate(expression)?;
        self.apply_filters(&mut matches, filters);

        let mut groups = RoaringBitmap::new();
        let mut count = |feature: u32, products: &RoaringBitmap| {
            let hits = &matches & products;
            let group_count = if grouped {
                self.distinct_groups(&hits, &mut groups)
            } else {
                0
            };
            FacetCount::new(feature, hits.len() as u32, group_count)
        };

        let counts = if included_features.is_empty() {
            (0..self.feature_count)
                .filter_map(|feature| Some(count(feature, self.feature_products(feature)?)))
                .collect()
        } else {
            included_features
                .iter()
                .filter_map(|&feature| Some(count(feature, self.feature_products(feature)?)))
                .collect()
        };
        Ok(counts)
    }

    /// Counts every feature over the whole catalog.
    ///
    /// One record per feature id in `[0, feature_count)`, including features
    /// without products (counted as 0).
    ///
    /// # Errors
    ///
    /// Returns `NotReady` before the load completes.
    pub fn count_all_products(&self, grouped: bool) -> Result<Vec<FacetCount>> {
        self.ensure_ready()?;

        Ok((0..self.feature_count)
            .map(|feature| {
                let match_count = self.feature_products(feature).map_or(0, |p| p.len() as u32);
                let group_count = if grouped {
                    self.feature_groups(feature).map_or(0, |g| g.len() as u32)
                } else {
                    0
                };
                FacetCount::new(feature, match_count, group_count)
            })
            .collect())
    }

    /// Number of distinct groups among `products`, using `scratch` as the
    /// group id set.
    fn distinct_groups(&self, products: &RoaringBitmap, scratch: &mut RoaringBitmap) -> u32 {
        scratch.clear();
        for product_id in products {
            if let Some(index) = self.product_index(product_id) {
                scratch.insert(self.index_to_group[index as usize]);
            }
        }
        scratch.len() as u32
    }
}
