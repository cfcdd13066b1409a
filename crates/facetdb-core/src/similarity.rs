//! Recommendations by Jaccard similarity of feature sets.
//!
//! ```text
//! jaccard(A, B) = |A ∩ B| / |A ∪ B|
//! ```
//!
//! Scores are rounded to an integer percent in `[0, 100]`. Two empty feature
//! sets score 0.

use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::storage::Storage;

/// A recommended product and its similarity percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarProduct {
    /// Product id.
    pub product_id: u32,
    /// Rounded Jaccard similarity, 0-100.
    pub percent: u8,
}

/// Jaccard similarity of two bitmaps as a rounded percent.
#[must_use]
pub fn jaccard_percent(a: &RoaringBitmap, b: &RoaringBitmap) -> u8 {
    let union = a.union_len(b);
    if union == 0 {
        return 0;
    }
    let intersection = a.intersection_len(b);
    (intersection as f64 / union as f64 * 100.0).round() as u8
}

impl Storage {
    /// Ranks other products by similarity to `product_id`.
    ///
    /// With a non-empty `ext_features`, candidates are restricted to products
    /// carrying every listed extended feature; if any of them has no products
    /// the result is empty. At most `min(max_products, product_count - 1)`
    /// products are returned, most similar first. Equal scores keep candidate
    /// order.
    ///
    /// # Errors
    ///
    /// Returns `NotReady` before the load completes, or `ProductNotFound` if
    /// `product_id` was not loaded.
    pub fn similar_products(
        &self,
        product_id: u32,
        max_products: u32,
        ext_features: Option<&[u32]>,
    ) -> Result<Vec<SimilarProduct>> {
        self.ensure_ready()?;
        let own_index = self
            .product_index(product_id)
            .ok_or(Error::ProductNotFound(product_id))?;

        let candidates: Vec<u32> = match ext_features {
            Some(features) if !features.is_empty() => {
                let Some(allowed) = self.ext_feature_intersection(features) else {
                    return Ok(Vec::new());
                };
                allowed
                    .iter()
                    .filter(|&id| id != product_id)
                    .filter_map(|id| self.product_index(id))
                    .collect()
            }
            _ => (0..self.product_count)
                .filter(|&index| index != own_index)
                .collect(),
        };

        let own_features = &self.product_features[own_index as usize];
        let mut scored = self.score_candidates(own_features, &candidates);
        scored.sort_by(|a, b| b.percent.cmp(&a.percent));

        let limit = max_products.min(self.product_count.saturating_sub(1)) as usize;
        scored.truncate(limit);
        Ok(scored)
    }

    /// Like [`Storage::similar_products`], returning ids only.
    ///
    /// # Errors
    ///
    /// Same as [`Storage::similar_products`].
    pub fn similar_product_ids(
        &self,
        product_id: u32,
        max_products: u32,
        ext_features: Option<&[u32]>,
    ) -> Result<Vec<u32>> {
        Ok(self
            .similar_products(product_id, max_products, ext_features)?
            .into_iter()
            .map(|similar| similar.product_id)
            .collect())
    }

    /// Products carrying every feature of `features`, or `None` if one of
    /// them has no products.
    fn ext_feature_intersection(&self, features: &[u32]) -> Option<RoaringBitmap> {
        let (first, rest) = features.split_first()?;
        let mut allowed = self.feature_products_ext(*first)?.clone();
        for &feature in rest {
            allowed &= self.feature_products_ext(feature)?;
        }
        Some(allowed)
    }

    #[cfg(not(feature = "parallel"))]
    fn score_candidates(&self, own: &RoaringBitmap, candidates: &[u32]) -> Vec<SimilarProduct> {
        candidates
            .iter()
            .map(|&index| self.score(own, index))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn score_candidates(&self, own: &RoaringBitmap, candidates: &[u32]) -> Vec<SimilarProduct> {
        candidates
            .par_iter()
            .map(|&index| self.score(own, index))
            .collect()
    }

    fn score(&self, own: &RoaringBitmap, index: u32) -> SimilarProduct {
        let i = index as usize;
        SimilarProduct {
            product_id: self.index_to_product[i],
            percent: jaccard_percent(own, &self.product_features[i]),
        }
    }
}
