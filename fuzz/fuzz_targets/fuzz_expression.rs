//! Fuzz target for the feature expression evaluator.
//!
//! Arbitrary expression text against a fixed feature index must either
//! evaluate or return `InvalidExpression`; it must never panic or hang.
//! Results may only contain product ids present in the index.

#![no_main]

use arbitrary::Arbitrary;
use facetdb_core::{Error, QueryEvaluator};
use libfuzzer_sys::fuzz_target;
use roaring::RoaringBitmap;

#[derive(Debug, Arbitrary)]
struct Input {
    /// Sparse feature index: feature slot -> product ids.
    features: Vec<Option<Vec<u8>>>,
    expression: String,
}

fuzz_target!(|input: Input| {
    let index: Vec<Option<RoaringBitmap>> = input
        .features
        .iter()
        .take(64)
        .map(|slot| {
            slot.as_ref()
                .map(|ids| ids.iter().map(|&id| u32::from(id)).collect())
        })
        .collect();
    let universe: RoaringBitmap = index.iter().flatten().flatten().collect();

    match QueryEvaluator::new(&index).evaluate(&input.expression) {
        Ok(matches) => assert!(matches.is_subset(&universe)),
        Err(Error::InvalidExpression { position, .. }) => {
            assert!(position < input.expression.len());
        }
        Err(other) => panic!("unexpected error: {other}"),
    }
});
