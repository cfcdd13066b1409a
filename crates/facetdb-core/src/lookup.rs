//! The externally facing lookup: expression, filters, sort order and group
//! collapsing composed into one result.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::RangeFilter;
use crate::grouping::COLLAPSED;
use crate::storage::Storage;

/// Parameters of a product lookup.
///
/// # Example
///
/// ```rust,ignore
/// let request = LookupRequest::new("(1|2)&7")
///     .grouped(true)
///     .filter(RangeFilter::between("price", 10.0, 50.0))
///     .sort_by("price", false);
/// let result = storage.lookup_products(&request)?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupRequest {
    /// Boolean feature expression.
    pub expression: String,
    /// Collapse each group to its preferred product.
    #[serde(default)]
    pub grouped: bool,
    /// Range filters, applied as a conjunction.
    #[serde(default)]
    pub filters: Vec<RangeFilter>,
    /// Name of the sorting index to order by; `None` keeps ascending id order.
    #[serde(default)]
    pub sort: Option<String>,
    /// Direction of the result list.
    #[serde(default = "default_ascending")]
    pub ascending: bool,
}

fn default_ascending() -> bool {
    true
}

impl LookupRequest {
    /// Creates an ungrouped, unfiltered, unsorted ascending request.
    #[must_use]
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            grouped: false,
            filters: Vec::new(),
            sort: None,
            ascending: true,
        }
    }

    /// Enables or disables group collapsing.
    #[must_use]
    pub fn grouped(mut self, grouped: bool) -> Self {
        self.grouped = grouped;
        self
    }

    /// Adds a range filter.
    #[must_use]
    pub fn filter(mut self, filter: RangeFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Orders the result by the named sorting index.
    #[must_use]
    pub fn sort_by(mut self, name: impl Into<String>, ascending: bool) -> Self {
        self.sort = Some(name.into());
        self.ascending = ascending;
        self
    }

    /// Sets the direction without choosing a sorting index.
    #[must_use]
    pub fn ascending(mut self, ascending: bool) -> Self {
        self.ascending = ascending;
        self
    }
}

/// Outcome of a lookup.
///
/// `product_ids` has `match_count` entries; in a grouped lookup collapsed
/// products are [`COLLAPSED`] and only `group_count` entries are visible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
    /// Smallest price among matched products, 0 if none has one.
    pub min_price: f32,
    /// Largest price among matched products, 0 if none has one.
    pub max_price: f32,
    /// Number of matched products.
    pub match_count: u32,
    /// Number of visible products after group collapsing.
    pub group_count: u32,
    /// Ordered product ids, with collapsed entries.
    pub product_ids: Vec<u32>,
}

impl LookupResult {
    /// Product ids that survived group collapsing, in result order.
    pub fn visible_products(&self) -> impl Iterator<Item = u32> + '_ {
        self.product_ids
            .iter()
            .copied()
            .filter(|&id| id != COLLAPSED)
    }

    /// Returns true if nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.match_count == 0
    }
}

impl Storage {
    /// Runs a lookup.
    ///
    /// # Errors
    ///
    /// - `SortingIndexNotFound` if `request.sort` names no registered order.
    /// - `NotReady` before the load completes.
    /// - `InvalidExpression` for a malformed expression.
    pub fn lookup_products(&self, request: &LookupRequest) -> Result<LookupResult> {
        self.ensure_ready()?;

        let sorting_index = match request.sort.as_deref() {
            Some(name) => Some(
                self.sorting_indexes
                    .get(name)
                    .ok_or_else(|| Error::SortingIndexNotFound(name.to_string()))?,
            ),
            None => None,
        };

        let mut matches = self.evaluate(&request.expression)?;
        self.apply_filters(&mut matches, &request.filters);

        let mut product_ids: Vec<u32> = match sorting_index {
            Some(index) => index.order(&matches),
            None => matches.iter().collect(),
        };
        let match_count = product_ids.len() as u32;
        let (min_price, max_price) = self.price_range(&product_ids);

        let group_count = if request.grouped {
            self.collapse_groups(&mut product_ids)
        } else {
            match_count
        };

        if !request.ascending {
            product_ids.reverse();
        }

        tracing::trace!(
            expression = %request.expression,
            match_count,
            group_count,
            "Lookup evaluated"
        );

        Ok(LookupResult {
            min_price,
            max_price,
            match_count,
            group_count,
            product_ids,
        })
    }

    /// Min and max of the configured price attribute over `product_ids`.
    fn price_range(&self, product_ids: &[u32]) -> (f32, f32) {
        let Some(prices) = self.attributes.get(&self.config.price_attribute) else {
            return (0.0, 0.0);
        };

        product_ids
            .iter()
            .filter_map(|&id| prices.value_at(self.product_index(id)?))
            .fold(None, |range: Option<(f32, f32)>, price| match range {
                Some((min, max)) => Some((min.min(price), max.max(price))),
                None => Some((price, price)),
            })
            .unwrap_or((0.0, 0.0))
    }
}
