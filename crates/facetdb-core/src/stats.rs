//! Catalog statistics and id bounds.
//!
//! Bounds are advisory telemetry: nothing in the query path depends on the
//! minimums, and the maximums only size id-keyed arrays during the build.

use serde::{Deserialize, Serialize};

use crate::storage::LoadState;

/// Inclusive `[min, max]` range of observed ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRange {
    /// Smallest id seen.
    pub min: u32,
    /// Largest id seen.
    pub max: u32,
}

impl IdRange {
    fn observe(range: &mut Option<Self>, id: u32) {
        match range {
            Some(r) => {
                r.min = r.min.min(id);
                r.max = r.max.max(id);
            }
            None => *range = Some(Self { min: id, max: id }),
        }
    }
}

/// Id bounds observed by `add_item`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogBounds {
    /// Product id range.
    pub products: Option<IdRange>,
    /// Group id range.
    pub groups: Option<IdRange>,
    /// Feature id range.
    pub features: Option<IdRange>,
    /// Extended feature id range.
    pub ext_features: Option<IdRange>,
}

impl CatalogBounds {
    pub(crate) fn observe_product(&mut self, product_id: u32) {
        IdRange::observe(&mut self.products, product_id);
    }

    pub(crate) fn observe_group(&mut self, group_id: u32) {
        IdRange::observe(&mut self.groups, group_id);
    }

    pub(crate) fn observe_features(&mut self, min: Option<u32>, max: Option<u32>) {
        for id in min.into_iter().chain(max) {
            IdRange::observe(&mut self.features, id);
        }
    }

    pub(crate) fn observe_ext_features(&mut self, min: Option<u32>, max: Option<u32>) {
        for id in min.into_iter().chain(max) {
            IdRange::observe(&mut self.ext_features, id);
        }
    }

    /// Largest product id seen, if any.
    #[must_use]
    pub fn max_product(&self) -> Option<u32> {
        self.products.map(|r| r.max)
    }

    /// Largest group id seen, if any.
    #[must_use]
    pub fn max_group(&self) -> Option<u32> {
        self.groups.map(|r| r.max)
    }
}

/// Snapshot of a storage instance, suitable for logging or JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    /// Load state.
    pub state: LoadState,
    /// Products in the load.
    pub product_count: u32,
    /// Size of the feature id space.
    pub feature_count: u32,
    /// Distinct groups with at least one product.
    pub group_count: usize,
    /// Features carried by at least one product.
    pub indexed_features: usize,
    /// Registered attribute names, sorted.
    pub attribute_names: Vec<String>,
    /// Registered sorting index names, sorted.
    pub sorting_index_names: Vec<String>,
    /// Observed id bounds.
    pub bounds: CatalogBounds,
}
