//! End-to-end catalog lifecycle: load, query, re-sort, reload.
//!
//! Models a small apparel catalog where each style (group) has several
//! colour variants (products) and features encode brand, category and size.

use facetdb_core::{
    wire, Error, FacetConfig, Item, LoadState, LookupRequest, RangeFilter, SharedStorage,
    Storage, COLLAPSED,
};

const BRAND_A: u32 = 0;
const BRAND_B: u32 = 1;
const SHIRTS: u32 = 2;
const SHOES: u32 = 3;
const SIZE_M: u32 = 4;
const SIZE_L: u32 = 5;
const ECO: u32 = 0;

struct Variant {
    product: u32,
    style: u32,
    order: u32,
    features: &'static [u32],
    price: f32,
}

const CATALOG: &[Variant] = &[
    Variant { product: 100, style: 1, order: 1, features: &[BRAND_A, SHIRTS, SIZE_M], price: 25.0 },
    Variant { product: 101, style: 1, order: 3, features: &[BRAND_A, SHIRTS, SIZE_L], price: 27.0 },
    Variant { product: 102, style: 2, order: 2, features: &[BRAND_B, SHIRTS, SIZE_M], price: 19.0 },
    Variant { product: 103, style: 3, order: 1, features: &[BRAND_B, SHOES, SIZE_L], price: 80.0 },
    Variant { product: 104, style: 3, order: 9, features: &[BRAND_B, SHOES, SIZE_M], price: 75.0 },
    Variant { product: 105, style: 4, order: 1, features: &[BRAND_A, SHOES], price: 120.0 },
];

fn load(storage: &mut Storage) {
    storage
        .init_storage(CATALOG.len() as u32, 8)
        .expect("init_storage");
    for (index, variant) in CATALOG.iter().enumerate() {
        let mut item = Item::new(index as u32, variant.product)
            .group(variant.style, variant.order)
            .features(variant.features.iter().copied())
            .attribute("price", variant.price);
        if variant.product % 2 == 0 {
            item = item.ext_features([ECO]);
        }
        storage.add_item(item).expect("add_item");
    }
    storage.complete_load_data().expect("complete_load_data");
}

fn loaded() -> Storage {
    let mut storage = Storage::with_config(FacetConfig::default().catalog);
    load(&mut storage);
    storage
}

#[test]
fn test_lifecycle_states() {
    // Arrange
    let mut storage = Storage::new();
    assert_eq!(storage.state(), LoadState::Empty);

    // Act
    load(&mut storage);

    // Assert
    assert!(storage.is_ready());
    assert_eq!(storage.stats().group_count, 4);
}

#[test]
fn test_lookup_shirts_grouped_by_price() {
    // Arrange
    let storage = loaded();
    let request = LookupRequest::new(format!("{SHIRTS}"))
        .grouped(true)
        .sort_by("price", true);

    // Act
    let result = storage.lookup_products(&request).expect("lookup");

    // Assert: 102 (19), 100 (25, collapsed into 101), 101 (27)
    assert_eq!(result.match_count, 3);
    assert_eq!(result.group_count, 2);
    assert_eq!(result.product_ids, vec![102, COLLAPSED, 101]);
    assert_eq!((result.min_price, result.max_price), (19.0, 27.0));
}

#[test]
fn test_lookup_brand_or_with_size_and_price_cap() {
    // Arrange
    let storage = loaded();
    let request = LookupRequest::new(format!("({BRAND_A}|{BRAND_B})&{SIZE_M}"))
        .filter(RangeFilter::at_most("price", 50.0))
        .sort_by("price", false);

    // Act
    let result = storage.lookup_products(&request).expect("lookup");

    // Assert
    assert_eq!(result.product_ids, vec![100, 102]);
}

#[test]
fn test_custom_sort_order_and_replace() {
    // Arrange
    let shared = SharedStorage::new(loaded());
    let request = LookupRequest::new(format!("{SHOES}")).sort_by("bestsellers", true);
    assert!(matches!(
        shared.lookup_products(&request),
        Err(Error::SortingIndexNotFound(_))
    ));

    // Act
    shared
        .set_sorting_index("bestsellers", &[105, 104, 103])
        .expect("sort");
    let first = shared.lookup_products(&request).expect("lookup");
    shared.set_sorting_index("bestsellers", &[103]).expect("sort");
    let second = shared.lookup_products(&request).expect("lookup");

    // Assert
    assert_eq!(first.product_ids, vec![105, 104, 103]);
    assert_eq!(second.product_ids, vec![103, 104, 105]);
}

#[test]
fn test_recommendations_restricted_to_eco() {
    // Arrange
    let storage = loaded();

    // Act
    let all = storage.similar_products(100, 10, None).expect("similar");
    let eco = storage
        .similar_product_ids(100, 10, Some(&[ECO]))
        .expect("similar");

    // Assert
    assert_eq!(all.len(), 5);
    assert_eq!(all[0].product_id, 101);
    assert_eq!(all[0].percent, 50);
    assert!(eco.iter().all(|id| id % 2 == 0));
    assert!(!eco.contains(&100));
}

#[test]
fn test_facets_for_brand_b() {
    // Arrange
    let storage = loaded();

    // Act
    let counts = storage
        .count_products(&BRAND_B.to_string(), &[SHIRTS, SHOES], true, &[])
        .expect("count");
    let words = wire::facets_to_words(&counts);

    // Assert
    assert_eq!(words, vec![SHIRTS, 1, 1, 0, SHOES, 2, 1, 0]);
}

#[test]
fn test_reload_replaces_everything() {
    // Arrange
    let mut storage = loaded();
    storage.set_sorting_index("bestsellers", &[100]).expect("sort");

    // Act
    storage.init_storage(1, 1).expect("init");
    storage
        .add_item(Item::new(0, 7).features([0]))
        .expect("add");
    storage.complete_load_data().expect("complete");

    // Assert
    assert!(storage.sorting_indexes().is_empty());
    assert_eq!(storage.product_index(100), None);
    let result = storage
        .lookup_products(&LookupRequest::new("0"))
        .expect("lookup");
    assert_eq!(result.product_ids, vec![7]);
}

#[test]
fn test_result_buffer_bytes() {
    // Arrange
    let storage = loaded();
    let result = storage
        .lookup_products(&LookupRequest::new(format!("{SHOES}")).grouped(true))
        .expect("lookup");

    // Act
    let bytes = result.to_bytes();
    let decoded = facetdb_core::LookupResult::from_bytes(&bytes).expect("decode");

    // Assert
    assert_eq!(decoded, result);
    assert_eq!(decoded.visible_products().count() as u32, decoded.group_count);
}
