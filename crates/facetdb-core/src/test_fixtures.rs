//! Shared catalogs for unit tests.

use crate::builder::Item;
use crate::storage::Storage;

/// Loads `items` (indexed by position) into a ready storage.
pub(crate) fn build_storage(feature_count: u32, items: Vec<Item>) -> Storage {
    let mut storage = Storage::new();
    storage
        .init_storage(items.len() as u32, feature_count)
        .expect("init_storage");
    for item in items {
        storage.add_item(item).expect("add_item");
    }
    storage.complete_load_data().expect("complete_load_data");
    storage
}

/// Three products over features 0..6:
///
/// | index | product | group | order | features | ext    | price | rating |
/// |-------|---------|-------|-------|----------|--------|-------|--------|
/// | 0     | 1       | 10    | 5     | {0, 2}   | {4}    | 30.0  | 4.0    |
/// | 1     | 2       | 10    | 7     | {0, 1}   | {4, 5} | 10.0  | -      |
/// | 2     | 3       | 20    | 1     | {1, 2}   | {5}    | 20.0  | 3.0    |
///
/// so `feature_products[0] = {1, 2}`, `[1] = {2, 3}`, `[2] = {1, 3}` and
/// features 3..6 carry no products.
pub(crate) fn sample_storage() -> Storage {
    build_storage(
        6,
        vec![
            Item::new(0, 1)
                .group(10, 5)
                .features([0, 2])
                .ext_features([4])
                .attribute("price", 30.0)
                .attribute("rating", 4.0),
            Item::new(1, 2)
                .group(10, 7)
                .features([0, 1])
                .ext_features([4, 5])
                .attribute("price", 10.0),
            Item::new(2, 3)
                .group(20, 1)
                .features([1, 2])
                .ext_features([5])
                .attribute("price", 20.0)
                .attribute("rating", 3.0),
        ],
    )
}
