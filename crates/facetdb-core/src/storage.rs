//! Owned in-memory index state for one loaded catalog.
//!
//! `Storage` is an arena of vectors indexed by opaque integer keys: the dense
//! item `index`, and the externally assigned `product_id`, `group_id` and
//! `feature_id`. Every bitmap, array and registered attribute or sort order
//! is owned here; nothing survives `init_storage` or drop.
//!
//! # Lifecycle
//!
//! ```rust,ignore
//! let mut storage = Storage::new();
//! storage.init_storage(3, 8)?;
//! storage.add_item(Item::new(0, 100).group(1, 5).features([0, 1]))?;
//! // ... one add_item per index
//! storage.complete_load_data()?;
//!
//! let result = storage.lookup_products(&LookupRequest::new("0&1"))?;
//! ```

use roaring::RoaringBitmap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::attribute::{Attribute, AttributeEntry};
use crate::config::CatalogConfig;
use crate::error::{Error, Result};
use crate::sorting::SortingIndexes;
use crate::stats::{CatalogBounds, CatalogStats};

/// Sentinel for "no entry" in id-keyed lookup arrays.
pub const NOT_FOUND: u32 = u32::MAX;

/// Where a storage instance is in its load cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// Created but never initialized.
    #[default]
    Empty,
    /// `init_storage` ran; items are being added.
    Loading,
    /// `complete_load_data` ran; the catalog is queryable.
    Ready,
}

/// In-memory faceted index over one product catalog.
#[derive(Debug, Default)]
pub struct Storage {
    pub(crate) config: CatalogConfig,
    pub(crate) state: LoadState,

    pub(crate) product_count: u32,
    pub(crate) feature_count: u32,

    /// Item indices already passed to `add_item`.
    pub(crate) loaded: RoaringBitmap,

    pub(crate) product_features: Vec<RoaringBitmap>,
    pub(crate) product_features_ext: Vec<RoaringBitmap>,

    pub(crate) feature_products: Vec<Option<RoaringBitmap>>,
    pub(crate) feature_products_ext: Vec<Option<RoaringBitmap>>,
    pub(crate) feature_groups: Vec<Option<RoaringBitmap>>,

    pub(crate) group_products: Vec<Option<RoaringBitmap>>,
    pub(crate) group_features: Vec<Option<RoaringBitmap>>,

    pub(crate) index_to_product: Vec<u32>,
    pub(crate) product_to_index: Vec<u32>,
    pub(crate) index_to_group: Vec<u32>,
    pub(crate) index_to_group_order: Vec<u32>,

    /// Attribute slots written by `add_item`, keyed by name.
    pub(crate) pending_attributes: FxHashMap<String, Vec<Option<AttributeEntry>>>,
    /// Sorted attributes, available once the load completes.
    pub(crate) attributes: FxHashMap<String, Attribute>,
    pub(crate) sorting_indexes: SortingIndexes,

    pub(crate) bounds: CatalogBounds,
}

impl Storage {
    /// Creates an empty, uninitialized storage with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty storage with the given catalog configuration.
    #[must_use]
    pub fn with_config(config: CatalogConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Resets any previous state and allocates fresh arrays for a new load.
    ///
    /// # Errors
    ///
    /// - `InvalidDimensions` if either count is zero.
    /// - `AllocationFailed` if the per-product or per-feature arrays cannot
    ///   be allocated; the storage is left empty.
    pub fn init_storage(&mut self, product_count: u32, feature_count: u32) -> Result<()> {
        if product_count == 0 || feature_count == 0 {
            return Err(Error::InvalidDimensions {
                product_count,
                feature_count,
            });
        }

        self.reset();

        let products = product_count as usize;
        let features = feature_count as usize;

        self.product_features = try_filled(products, RoaringBitmap::new(), "product features")?;
        self.product_features_ext =
            try_filled(products, RoaringBitmap::new(), "product extended features")?;
        self.feature_products = try_filled(features, None, "feature products")?;
        self.feature_products_ext = try_filled(features, None, "feature extended products")?;
        self.feature_groups = try_filled(features, None, "feature groups")?;
        self.index_to_product = try_filled(products, NOT_FOUND, "index to product")?;
        self.index_to_group = try_filled(products, 0, "index to group")?;
        self.index_to_group_order = try_filled(products, 0, "index to group order")?;

        self.product_count = product_count;
        self.feature_count = feature_count;
        self.state = LoadState::Loading;

        tracing::debug!(product_count, feature_count, "Storage initialized");
        Ok(())
    }

    /// Releases everything owned by this storage.
    ///
    /// Dropping the storage has the same effect.
    pub fn destroy(mut self) {
        self.reset();
    }

    /// Frees all owned state, keeping only the configuration.
    fn reset(&mut self) {
        let config = std::mem::take(&mut self.config);
        *self = Self::with_config(config);
    }

    /// Returns the catalog configuration.
    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Returns the current load state.
    #[must_use]
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Returns true once `complete_load_data` has run.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Ready
    }

    /// Number of products in the current load.
    #[must_use]
    pub fn product_count(&self) -> u32 {
        self.product_count
    }

    /// Number of feature ids in the current load.
    #[must_use]
    pub fn feature_count(&self) -> u32 {
        self.feature_count
    }

    pub(crate) fn ensure_ready(&self) -> Result<()> {
        match self.state {
            LoadState::Ready => Ok(()),
            LoadState::Loading => Err(Error::NotReady),
            LoadState::Empty => Err(Error::NotInitialized),
        }
    }

    // =========================================================================
    // Index accessors
    // =========================================================================

    /// Products carrying `feature`, or `None` if no product does.
    #[must_use]
    pub fn feature_products(&self, feature: u32) -> Option<&RoaringBitmap> {
        self.feature_products.get(feature as usize)?.as_ref()
    }

    /// Products carrying extended feature `feature`.
    #[must_use]
    pub fn feature_products_ext(&self, feature: u32) -> Option<&RoaringBitmap> {
        self.feature_products_ext.get(feature as usize)?.as_ref()
    }

    /// Groups with at least one product carrying `feature`.
    #[must_use]
    pub fn feature_groups(&self, feature: u32) -> Option<&RoaringBitmap> {
        self.feature_groups.get(feature as usize)?.as_ref()
    }

    /// Products belonging to `group`.
    #[must_use]
    pub fn group_products(&self, group: u32) -> Option<&RoaringBitmap> {
        self.group_products.get(group as usize)?.as_ref()
    }

    /// Union of the features carried by the products of `group`.
    #[must_use]
    pub fn group_features(&self, group: u32) -> Option<&RoaringBitmap> {
        self.group_features.get(group as usize)?.as_ref()
    }

    /// Feature set of the product at dense `index`.
    #[must_use]
    pub fn product_features(&self, index: u32) -> Option<&RoaringBitmap> {
        self.product_features.get(index as usize)
    }

    /// Extended feature set of the product at dense `index`.
    #[must_use]
    pub fn product_features_ext(&self, index: u32) -> Option<&RoaringBitmap> {
        self.product_features_ext.get(index as usize)
    }

    /// Dense index of `product_id`, if it was loaded.
    #[must_use]
    pub fn product_index(&self, product_id: u32) -> Option<u32> {
        self.product_to_index
            .get(product_id as usize)
            .copied()
            .filter(|&index| index != NOT_FOUND)
    }

    /// Product id stored at dense `index`.
    #[must_use]
    pub fn product_id(&self, index: u32) -> Option<u32> {
        self.index_to_product
            .get(index as usize)
            .copied()
            .filter(|&id| id != NOT_FOUND)
    }

    /// Group id of the product at dense `index`.
    #[must_use]
    pub fn group_of(&self, index: u32) -> Option<u32> {
        self.index_to_group.get(index as usize).copied()
    }

    /// Intra-group ordering key of the product at dense `index`.
    #[must_use]
    pub fn group_order_of(&self, index: u32) -> Option<u32> {
        self.index_to_group_order.get(index as usize).copied()
    }

    /// Sorted attribute registered under `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Registered sort orders.
    #[must_use]
    pub fn sorting_indexes(&self) -> &SortingIndexes {
        &self.sorting_indexes
    }

    /// Id bounds observed while loading.
    #[must_use]
    pub fn bounds(&self) -> &CatalogBounds {
        &self.bounds
    }

    /// Snapshot of catalog statistics.
    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        let mut attribute_names: Vec<String> = self.attributes.keys().cloned().collect();
        attribute_names.sort_unstable();

        CatalogStats {
            state: self.state,
            product_count: self.product_count,
            feature_count: self.feature_count,
            group_count: self.group_products.iter().flatten().count(),
            indexed_features: self.feature_products.iter().flatten().count(),
            attribute_names,
            sorting_index_names: self.sorting_indexes.names(),
            bounds: self.bounds.clone(),
        }
    }
}

/// Allocates a vector of `len` copies of `value`, reporting allocation
/// failure instead of aborting.
pub(crate) fn try_filled<T: Clone>(len: usize, value: T, what: &str) -> Result<Vec<T>> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(len)
        .map_err(|e| Error::AllocationFailed(format!("{what} ({len} entries): {e}")))?;
    vec.resize(len, value);
    Ok(vec)
}
