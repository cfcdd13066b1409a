//! Shared handle for concurrent readers.
//!
//! `Storage` itself does no locking. Queries only need `&Storage` and may run
//! concurrently; anything that mutates (`set_sorting_index`, a reload) must
//! be exclusive. `SharedStorage` provides that reader/writer exclusion and a
//! whole-catalog swap for reloads built off to the side.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Result;
use crate::facets::FacetCount;
use crate::filter::RangeFilter;
use crate::lookup::{LookupRequest, LookupResult};
use crate::similarity::SimilarProduct;
use crate::storage::Storage;

/// Cloneable, thread-safe handle to one catalog.
#[derive(Debug, Clone, Default)]
pub struct SharedStorage {
    inner: Arc<RwLock<Storage>>,
}

impl SharedStorage {
    /// Wraps a storage instance.
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self {
            inner: Arc::new(RwLock::new(storage)),
        }
    }

    /// Shared read access.
    pub fn read(&self) -> RwLockReadGuard<'_, Storage> {
        self.inner.read()
    }

    /// Exclusive write access.
    pub fn write(&self) -> RwLockWriteGuard<'_, Storage> {
        self.inner.write()
    }

    /// Swaps in a freshly loaded catalog and returns the previous one.
    pub fn replace(&self, storage: Storage) -> Storage {
        let previous = std::mem::replace(&mut *self.inner.write(), storage);
        tracing::debug!("Catalog replaced");
        previous
    }

    /// See [`Storage::lookup_products`].
    ///
    /// # Errors
    ///
    /// Same as [`Storage::lookup_products`].
    pub fn lookup_products(&self, request: &LookupRequest) -> Result<LookupResult> {
        self.read().lookup_products(request)
    }

    /// See [`Storage::similar_products`].
    ///
    /// # Errors
    ///
    /// Same as [`Storage::similar_products`].
    pub fn similar_products(
        &self,
        product_id: u32,
        max_products: u32,
        ext_features: Option<&[u32]>,
    ) -> Result<Vec<SimilarProduct>> {
        self.read()
            .similar_products(product_id, max_products, ext_features)
    }

    /// See [`Storage::count_products`].
    ///
    /// # Errors
    ///
    /// Same as [`Storage::count_products`].
    pub fn count_products(
        &self,
        expression: &str,
        included_features: &[u32],
        grouped: bool,
        filters: &[RangeFilter],
    ) -> Result<Vec<FacetCount>> {
        self.read()
            .count_products(expression, included_features, grouped, filters)
    }

    /// See [`Storage::count_all_products`].
    ///
    /// # Errors
    ///
    /// Same as [`Storage::count_all_products`].
    pub fn count_all_products(&self, grouped: bool) -> Result<Vec<FacetCount>> {
        self.read().count_all_products(grouped)
    }

    /// See [`Storage::set_sorting_index`].
    ///
    /// # Errors
    ///
    /// Same as [`Storage::set_sorting_index`].
    pub fn set_sorting_index(&self, name: &str, ordered_products: &[u32]) -> Result<()> {
        self.write().set_sorting_index(name, ordered_products)
    }
}
