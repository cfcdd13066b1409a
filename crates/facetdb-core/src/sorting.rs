//! Named total orders over product ids.
//!
//! A [`SortingIndex`] keeps the ordered id list together with an inverse
//! `product_id -> rank` array so that a match set can be reordered without
//! scanning the whole order. `complete_load_data` registers one index per
//! attribute (ascending by value); callers may register or replace others at
//! any time with [`Storage::set_sorting_index`].

use roaring::RoaringBitmap;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::storage::{try_filled, LoadState, Storage};

/// Rank value for ids that are not part of an order.
pub const NOT_RANKED: u32 = u32::MAX;

/// Ordered product ids plus their inverse rank table.
#[derive(Debug, Clone, Default)]
pub struct SortingIndex {
    products: Vec<u32>,
    ranks: Vec<u32>,
}

impl SortingIndex {
    /// Builds an index from product ids in the desired order.
    ///
    /// If an id appears more than once, its last position is its rank.
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailed` if the rank table (sized by the largest id)
    /// cannot be allocated.
    pub fn new(ordered_products: &[u32]) -> Result<Self> {
        let Some(&max_id) = ordered_products.iter().max() else {
            return Ok(Self::default());
        };

        let mut ranks = try_filled(max_id as usize + 1, NOT_RANKED, "sorting ranks")?;
        let mut duplicates = 0usize;
        for (rank, &product_id) in ordered_products.iter().enumerate() {
            let slot = &mut ranks[product_id as usize];
            if *slot != NOT_RANKED {
                duplicates += 1;
            }
            *slot = rank as u32;
        }
        if duplicates > 0 {
            tracing::warn!(duplicates, "Sorting index contains repeated product ids");
        }

        Ok(Self {
            products: ordered_products.to_vec(),
            ranks,
        })
    }

    /// Ordered product ids.
    #[must_use]
    pub fn products(&self) -> &[u32] {
        &self.products
    }

    /// Number of positions in the order.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Returns true if the order is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Rank of `product_id`, or `None` if it is not part of the order.
    #[must_use]
    pub fn rank_of(&self, product_id: u32) -> Option<u32> {
        self.ranks
            .get(product_id as usize)
            .copied()
            .filter(|&rank| rank != NOT_RANKED)
    }

    /// Orders `matches` by rank.
    ///
    /// Ids absent from the order follow every ranked id, in ascending id order.
    #[must_use]
    pub fn order(&self, matches: &RoaringBitmap) -> Vec<u32> {
        let mut ranked: Vec<(u32, u32)> = Vec::with_capacity(matches.len() as usize);
        let mut unranked = Vec::new();

        for product_id in matches {
            match self.rank_of(product_id) {
                Some(rank) => ranked.push((rank, product_id)),
                None => unranked.push(product_id),
            }
        }
        ranked.sort_unstable_by_key(|&(rank, _)| rank);

        ranked
            .into_iter()
            .map(|(_, product_id)| product_id)
            .chain(unranked)
            .collect()
    }
}

/// Registry of sorting indexes keyed by name.
#[derive(Debug, Clone, Default)]
pub struct SortingIndexes {
    indexes: FxHashMap<String, SortingIndex>,
}

impl SortingIndexes {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `index` under `name`, returning the index it replaced.
    pub fn insert(&mut self, name: impl Into<String>, index: SortingIndex) -> Option<SortingIndex> {
        self.indexes.insert(name.into(), index)
    }

    /// Returns the index registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SortingIndex> {
        self.indexes.get(name)
    }

    /// Removes the index registered under `name`.
    pub fn remove(&mut self, name: &str) -> Option<SortingIndex> {
        self.indexes.remove(name)
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.indexes.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.indexes.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered indexes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

impl Storage {
    /// Registers or replaces the named sort order.
    ///
    /// The previous index under `name`, if any, is dropped.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` before `init_storage`, or `AllocationFailed`
    /// if the rank table cannot be allocated.
    pub fn set_sorting_index(&mut self, name: &str, ordered_products: &[u32]) -> Result<()> {
        if self.state == LoadState::Empty {
            return Err(Error::NotInitialized);
        }

        let index = SortingIndex::new(ordered_products)?;
        let replaced = self.sorting_indexes.insert(name, index).is_some();
        tracing::debug!(
            name,
            len = ordered_products.len(),
            replaced,
            "Sorting index registered"
        );
        Ok(())
    }
}
