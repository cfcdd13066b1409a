//! # `FacetDB` Core
//!
//! In-memory faceted search and recommendation engine over compressed bitmaps.
//!
//! A catalog of products (each with a set of feature ids, a group and named
//! numeric attributes) is loaded once into a [`Storage`] and then queried:
//!
//! - **Lookup**: boolean feature expressions (`&`, `|`, nested
//!   parentheses), range filters on attributes, named sort orders and
//!   collapsing of product groups to one representative.
//! - **Recommendations**: other products ranked by Jaccard similarity of
//!   their feature sets.
//! - **Facet counts**: per-feature match and group counts for a query.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use facetdb_core::{Item, LookupRequest, RangeFilter, Storage};
//!
//! let mut storage = Storage::new();
//! storage.init_storage(2, 4)?;
//! storage.add_item(Item::new(0, 10).group(1, 1).features([0, 2]).attribute("price", 9.5))?;
//! storage.add_item(Item::new(1, 11).group(1, 3).features([0, 3]).attribute("price", 4.0))?;
//! storage.complete_load_data()?;
//!
//! let result = storage.lookup_products(
//!     &LookupRequest::new("0")
//!         .grouped(true)
//!         .filter(RangeFilter::at_most("price", 10.0))
//!         .sort_by("price", true),
//! )?;
//! assert_eq!(result.group_count, 1);
//!
//! let similar = storage.similar_products(10, 5, None)?;
//! let facets = storage.count_products("0", &[], false, &[])?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
// =============================================================================
// NUMERIC CAST LINTS
// =============================================================================
// Ids, counts and indices are u32 throughout; conversions to usize for
// indexing and back to u32 for counts are bounded by product_count.
// =============================================================================
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
// =============================================================================
// STYLISTIC LINTS
// =============================================================================
#![allow(clippy::option_if_let_else)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::redundant_pub_crate)]
#![allow(clippy::use_self)]

pub mod attribute;
pub mod builder;
pub mod config;
pub mod error;
pub mod facets;
pub mod filter;
pub mod grouping;
pub mod lookup;
pub mod query;
pub mod shared;
pub mod similarity;
pub mod sorting;
pub mod stats;
pub mod storage;
pub mod wire;

#[cfg(test)]
mod query_tests;
#[cfg(test)]
mod test_fixtures;

pub use attribute::{Attribute, AttributeEntry, Selection, UNBOUNDED};
pub use builder::Item;
pub use config::{
    CatalogConfig, ConfigError, FacetConfig, LoggingConfig, LookupConfig, SimilarityConfig,
};
pub use error::{Error, Result};
pub use facets::FacetCount;
pub use filter::RangeFilter;
pub use grouping::COLLAPSED;
pub use lookup::{LookupRequest, LookupResult};
pub use query::{Operator, QueryEvaluator};
pub use shared::SharedStorage;
pub use similarity::{jaccard_percent, SimilarProduct};
pub use sorting::{SortingIndex, SortingIndexes};
pub use stats::{CatalogBounds, CatalogStats, IdRange};
pub use storage::{LoadState, Storage};
