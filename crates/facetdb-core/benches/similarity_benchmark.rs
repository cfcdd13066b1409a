//! Jaccard recommendation cost, with and without extended-feature narrowing.
//!
//! Compare against the rayon scorer with `--features parallel`.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use facetdb_core::{Item, Storage};
use rand::{Rng, SeedableRng};

const FEATURES: u32 = 1024;

fn build_catalog(products: u32) -> Storage {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let mut storage = Storage::new();
    storage.init_storage(products, FEATURES).unwrap();

    for index in 0..products {
        let features: Vec<u32> = (0..32).map(|_| rng.gen_range(0..FEATURES)).collect();
        let ext: Vec<u32> = (0..2).map(|_| rng.gen_range(0..8)).collect();
        storage
            .add_item(Item::new(index, index).features(features).ext_features(ext))
            .unwrap();
    }
    storage.complete_load_data().unwrap();
    storage
}

fn bench_similar_products(c: &mut Criterion) {
    let mut group = c.benchmark_group("similar_products");
    group.sample_size(20);

    for products in [10_000u32, 50_000] {
        let storage = build_catalog(products);
        group.bench_with_input(BenchmarkId::new("all", products), &storage, |b, s| {
            b.iter(|| black_box(s.similar_products(black_box(17), 20, None).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("ext", products), &storage, |b, s| {
            b.iter(|| black_box(s.similar_products(black_box(17), 20, Some(&[3])).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_similar_products);
criterion_main!(benches);
