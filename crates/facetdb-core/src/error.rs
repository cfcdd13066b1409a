//! Error types for `FacetDB`.
//!
//! Query-time lookups degrade silently wherever the catalog simply has no
//! data (unknown attribute filters, out-of-range feature ids). The variants
//! below cover the remaining cases: lifecycle misuse, malformed expressions,
//! unknown sort orders and allocation failure.

use thiserror::Error;

/// Result type alias for `FacetDB` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `FacetDB` operations.
///
/// Error codes follow the pattern `FACET-XXX`.
#[derive(Error, Debug)]
pub enum Error {
    /// Catalog dimensions rejected by `init_storage` (FACET-001).
    #[error("[FACET-001] Invalid catalog dimensions: {product_count} products, {feature_count} features")]
    InvalidDimensions {
        /// Requested product count.
        product_count: u32,
        /// Requested feature count.
        feature_count: u32,
    },

    /// Storage has not been initialized with `init_storage` (FACET-002).
    #[error("[FACET-002] Storage not initialized")]
    NotInitialized,

    /// Query issued before `complete_load_data` (FACET-003).
    #[error("[FACET-003] Catalog load not complete")]
    NotReady,

    /// Build operation issued after `complete_load_data` (FACET-004).
    #[error("[FACET-004] Catalog load already completed, re-run init_storage to reload")]
    AlreadyComplete,

    /// Item index outside `[0, product_count)` (FACET-005).
    #[error("[FACET-005] Item index {index} out of range for {product_count} products")]
    IndexOutOfRange {
        /// Offending index.
        index: u32,
        /// Catalog product count.
        product_count: u32,
    },

    /// `add_item` called twice for the same index (FACET-006).
    #[error("[FACET-006] Item index {0} already loaded")]
    DuplicateIndex(u32),

    /// Two items share the same product id (FACET-007).
    #[error("[FACET-007] Product {0} loaded more than once")]
    DuplicateProduct(u32),

    /// `complete_load_data` called before every index was populated (FACET-008).
    #[error("[FACET-008] Incomplete load: {loaded} of {expected} items added")]
    IncompleteLoad {
        /// Expected item count.
        expected: u32,
        /// Items actually added.
        loaded: u32,
    },

    /// Product id not present in the loaded catalog (FACET-009).
    #[error("[FACET-009] Product {0} not found")]
    ProductNotFound(u32),

    /// Named sorting index not registered (FACET-010).
    #[error("[FACET-010] Sorting index '{0}' not found")]
    SortingIndexNotFound(String),

    /// Malformed feature expression (FACET-011).
    #[error("[FACET-011] Invalid expression at position {position}: {reason}")]
    InvalidExpression {
        /// Byte offset of the offending character.
        position: usize,
        /// What was wrong.
        reason: String,
    },

    /// Allocation of an index structure failed (FACET-012).
    ///
    /// The storage must be re-initialized before reuse.
    #[error("[FACET-012] Allocation failed: {0}")]
    AllocationFailed(String),
}

impl Error {
    /// Returns the error code (e.g., "FACET-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidDimensions { .. } => "FACET-001",
            Self::NotInitialized => "FACET-002",
            Self::NotReady => "FACET-003",
            Self::AlreadyComplete => "FACET-004",
            Self::IndexOutOfRange { .. } => "FACET-005",
            Self::DuplicateIndex(_) => "FACET-006",
            Self::DuplicateProduct(_) => "FACET-007",
            Self::IncompleteLoad { .. } => "FACET-008",
            Self::ProductNotFound(_) => "FACET-009",
            Self::SortingIndexNotFound(_) => "FACET-010",
            Self::InvalidExpression { .. } => "FACET-011",
            Self::AllocationFailed(_) => "FACET-012",
        }
    }

    /// Returns true if the storage is still usable after this error.
    ///
    /// An allocation failure can leave the storage partially populated, so
    /// the caller has to run `init_storage` again.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::AllocationFailed(_))
    }

    pub(crate) fn invalid_expression(position: usize, reason: impl Into<String>) -> Self {
        Self::InvalidExpression {
            position,
            reason: reason.into(),
        }
    }
}
