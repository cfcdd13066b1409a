//! Lookup and facet counting throughput on a synthetic catalog.
//!
//! # Usage
//!
//! ```bash
//! cargo bench --bench lookup_benchmark -- --noplot
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use facetdb_core::{Item, LookupRequest, RangeFilter, Storage};
use rand::{Rng, SeedableRng};

const FEATURES: u32 = 512;
const FEATURES_PER_PRODUCT: usize = 24;

fn build_catalog(products: u32, seed: u64) -> Storage {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut storage = Storage::new();
    storage.init_storage(products, FEATURES).unwrap();

    for index in 0..products {
        let features: Vec<u32> = (0..FEATURES_PER_PRODUCT)
            .map(|_| rng.gen_range(0..FEATURES))
            .collect();
        let item = Item::new(index, index * 3 + 1)
            .group(index / 4, rng.gen_range(0..16))
            .features(features)
            .attribute("price", rng.gen_range(1.0..500.0))
            .attribute("rating", rng.gen_range(0.0..5.0));
        storage.add_item(item).unwrap();
    }
    storage.complete_load_data().unwrap();
    storage
}

fn bench_complete_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("complete_load");
    group.sample_size(10);

    for products in [10_000u32, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(products), &products, |b, &n| {
            b.iter(|| black_box(build_catalog(n, 42)));
        });
    }
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let storage = build_catalog(100_000, 42);
    let mut group = c.benchmark_group("lookup");

    let requests = [
        ("single", LookupRequest::new("7")),
        ("or_and", LookupRequest::new("(1|2|3)&4")),
        (
            "grouped_sorted_filtered",
            LookupRequest::new("(1|2|3|5|8)&13")
                .grouped(true)
                .filter(RangeFilter::between("price", 50.0, 250.0))
                .sort_by("rating", false),
        ),
    ];

    for (name, request) in &requests {
        group.bench_function(*name, |b| {
            b.iter(|| black_box(storage.lookup_products(request).unwrap()));
        });
    }
    group.finish();
}

fn bench_facets(c: &mut Criterion) {
    let storage = build_catalog(100_000, 42);
    let mut group = c.benchmark_group("facets");

    group.bench_function("count_products_all", |b| {
        b.iter(|| black_box(storage.count_products("1|2", &[], true, &[]).unwrap()));
    });
    group.bench_function("count_all_products", |b| {
        b.iter(|| black_box(storage.count_all_products(true).unwrap()));
    });
    group.finish();
}

criterion_group!(benches, bench_complete_load, bench_lookup, bench_facets);
criterion_main!(benches);
