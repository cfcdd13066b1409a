//! Collapsing a result list to one representative per group.

use rustc_hash::FxHashMap;

use crate::storage::Storage;

/// Marker written over a product collapsed into its group representative.
pub const COLLAPSED: u32 = u32::MAX;

impl Storage {
    /// Keeps, per group, only the matched product with the highest group
    /// order. Every other product of that group is replaced in place by
    /// [`COLLAPSED`]; positions of the survivors do not move.
    ///
    /// Only groups of products present in `ordered` are considered. On equal
    /// group order the product met first in `ordered` wins.
    ///
    /// Returns the number of visible products.
    pub fn collapse_groups(&self, ordered: &mut [u32]) -> u32 {
        // group id -> (index, group order) of the best product so far
        let mut best: FxHashMap<u32, (u32, u32)> = FxHashMap::default();

        for &product_id in ordered.iter() {
            let Some(index) = self.product_index(product_id) else {
                continue;
            };
            let group = self.index_to_group[index as usize];
            let order = self.index_to_group_order[index as usize];
            best.entry(group)
                .and_modify(|current| {
                    if order > current.1 {
                        *current = (index, order);
                    }
                })
                .or_insert((index, order));
        }

        let mut visible = ordered.len() as u32;
        for slot in ordered.iter_mut() {
            let Some(index) = self.product_index(*slot) else {
                continue;
            };
            let group = self.index_to_group[index as usize];
            if best.get(&group).is_some_and(|&(winner, _)| winner != index) {
                *slot = COLLAPSED;
                visible -= 1;
            }
        }
        visible
    }
}
