//! Catalog loading: per-item population and derivation of inverse indices.
//!
//! A load runs `init_storage`, one [`Storage::add_item`] per dense index, then
//! exactly one [`Storage::complete_load_data`]. The completion pass walks
//! every product's feature sets once to build the feature, group and
//! product-id inverses, then sorts each attribute and registers it as a
//! default sort order under the same name.

use std::collections::hash_map::Entry;
use std::time::Instant;

use roaring::RoaringBitmap;

use crate::attribute::{Attribute, AttributeEntry};
use crate::error::{Error, Result};
use crate::sorting::SortingIndex;
use crate::storage::{try_filled, LoadState, Storage, NOT_FOUND};

/// One product of a catalog load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    /// Dense index in `[0, product_count)`.
    pub index: u32,
    /// External product id.
    pub product_id: u32,
    /// External group id.
    pub group_id: u32,
    /// Preference within the group; the highest order wins deduplication.
    pub group_order: u32,
    /// Feature ids.
    pub features: RoaringBitmap,
    /// Extended feature ids, used to restrict similarity candidates.
    pub ext_features: RoaringBitmap,
    /// Named numeric attributes.
    pub attributes: Vec<(String, f32)>,
}

impl Item {
    /// Creates an item with no group, features or attributes.
    #[must_use]
    pub fn new(index: u32, product_id: u32) -> Self {
        Self {
            index,
            product_id,
            ..Self::default()
        }
    }

    /// Sets group membership and intra-group order.
    #[must_use]
    pub fn group(mut self, group_id: u32, group_order: u32) -> Self {
        self.group_id = group_id;
        self.group_order = group_order;
        self
    }

    /// Sets the feature ids.
    #[must_use]
    pub fn features(mut self, features: impl IntoIterator<Item = u32>) -> Self {
        self.features = features.into_iter().collect();
        self
    }

    /// Sets the extended feature ids.
    #[must_use]
    pub fn ext_features(mut self, features: impl IntoIterator<Item = u32>) -> Self {
        self.ext_features = features.into_iter().collect();
        self
    }

    /// Adds a named attribute value.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: f32) -> Self {
        self.attributes.push((name.into(), value));
        self
    }
}

impl Storage {
    /// Stores one product.
    ///
    /// The first time an attribute name is seen, a slot array of
    /// `product_count` entries is allocated for it.
    ///
    /// # Errors
    ///
    /// - `NotInitialized` / `AlreadyComplete` outside the loading phase.
    /// - `IndexOutOfRange` or `DuplicateIndex` for a bad `item.index`.
    /// - `AllocationFailed` if an attribute array cannot be allocated.
    pub fn add_item(&mut self, item: Item) -> Result<()> {
        match self.state {
            LoadState::Empty => return Err(Error::NotInitialized),
            LoadState::Ready => return Err(Error::AlreadyComplete),
            LoadState::Loading => {}
        }
        if item.index >= self.product_count {
            return Err(Error::IndexOutOfRange {
                index: item.index,
                product_count: self.product_count,
            });
        }
        if self.loaded.contains(item.index) {
            return Err(Error::DuplicateIndex(item.index));
        }

        let index = item.index as usize;
        for (name, value) in item.attributes {
            self.set_attribute(index, item.product_id, name, value)?;
        }

        self.bounds.observe_product(item.product_id);
        self.bounds.observe_group(item.group_id);
        self.bounds
            .observe_features(item.features.min(), item.features.max());
        self.bounds
            .observe_ext_features(item.ext_features.min(), item.ext_features.max());

        self.product_features[index] = item.features;
        self.product_features_ext[index] = item.ext_features;
        self.index_to_product[index] = item.product_id;
        self.index_to_group[index] = item.group_id;
        self.index_to_group_order[index] = item.group_order;
        self.loaded.insert(item.index);

        Ok(())
    }

    fn set_attribute(&mut self, index: usize, product_id: u32, name: String, value: f32) -> Result<()> {
        let slots = match self.pending_attributes.entry(name) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let slots = try_filled(self.product_count as usize, None, "attribute slots")?;
                tracing::debug!(attribute = %entry.key(), "Registering attribute");
                entry.insert(slots)
            }
        };
        slots[index] = Some(AttributeEntry { value, product_id });
        Ok(())
    }

    /// Derives all inverse indices and default sort orders.
    ///
    /// Feature ids at or above `feature_count` stay in the product's own
    /// feature set (they still count for similarity) but are not indexed.
    ///
    /// # Errors
    ///
    /// - `NotInitialized` / `AlreadyComplete` outside the loading phase.
    /// - `IncompleteLoad` if some index was never added.
    /// - `DuplicateProduct` if two items share a product id.
    /// - `AllocationFailed` if an id-keyed array cannot be allocated; the
    ///   storage must then be re-initialized.
    pub fn complete_load_data(&mut self) -> Result<()> {
        match self.state {
            LoadState::Empty => return Err(Error::NotInitialized),
            LoadState::Ready => return Err(Error::AlreadyComplete),
            LoadState::Loading => {}
        }
        let loaded = self.loaded.len() as u32;
        if loaded != self.product_count {
            return Err(Error::IncompleteLoad {
                expected: self.product_count,
                loaded,
            });
        }

        let start = Instant::now();
        let max_product = self.bounds.max_product().unwrap_or(0) as usize;
        let max_group = self.bounds.max_group().unwrap_or(0) as usize;

        let mut product_to_index = try_filled(max_product + 1, NOT_FOUND, "product to index")?;
        for (index, &product_id) in self.index_to_product.iter().enumerate() {
            let slot = &mut product_to_index[product_id as usize];
            if *slot != NOT_FOUND {
                return Err(Error::DuplicateProduct(product_id));
            }
            *slot = index as u32;
        }

        let mut group_products = try_filled(max_group + 1, None, "group products")?;
        let mut group_features = try_filled(max_group + 1, None, "group features")?;
        let feature_count = self.feature_count as usize;
        let mut unindexed = 0usize;

        for index in 0..self.product_count as usize {
            let product_id = self.index_to_product[index];
            let group_id = self.index_to_group[index];

            group_products[group_id as usize]
                .get_or_insert_with(RoaringBitmap::new)
                .insert(product_id);
            let group_feature_set =
                group_features[group_id as usize].get_or_insert_with(RoaringBitmap::new);

            for feature in &self.product_features[index] {
                let slot = feature as usize;
                if slot >= feature_count {
                    unindexed += 1;
                    continue;
                }
                self.feature_products[slot]
                    .get_or_insert_with(RoaringBitmap::new)
                    .insert(product_id);
                self.feature_groups[slot]
                    .get_or_insert_with(RoaringBitmap::new)
                    .insert(group_id);
                group_feature_set.insert(feature);
            }

            for feature in &self.product_features_ext[index] {
                let slot = feature as usize;
                if slot >= feature_count {
                    unindexed += 1;
                    continue;
                }
                self.feature_products_ext[slot]
                    .get_or_insert_with(RoaringBitmap::new)
                    .insert(product_id);
            }
        }
        if unindexed > 0 {
            tracing::warn!(
                unindexed,
                feature_count,
                "Feature ids outside the feature range were not indexed"
            );
        }

        self.product_to_index = product_to_index;
        self.group_products = group_products;
        self.group_features = group_features;

        for (name, slots) in std::mem::take(&mut self.pending_attributes) {
            let attribute = Attribute::from_slots(slots);
            let order: Vec<u32> = attribute.sorted_products().collect();
            self.sorting_indexes
                .insert(name.clone(), SortingIndex::new(&order)?);
            self.attributes.insert(name, attribute);
        }

        self.state = LoadState::Ready;
        tracing::info!(
            products = self.product_count,
            features = self.feature_count,
            groups = self.group_products.iter().flatten().count(),
            attributes = self.attributes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Catalog load complete"
        );
        Ok(())
    }
}
