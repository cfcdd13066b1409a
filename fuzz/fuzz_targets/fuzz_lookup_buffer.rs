//! Fuzz target for decoding lookup result and facet buffers.
//!
//! Decoding untrusted bytes must never panic, and anything that decodes
//! must encode back to the same words.

#![no_main]

use facetdb_core::wire::{facets_from_words, facets_to_words, words_from_bytes};
use facetdb_core::LookupResult;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Some(result) = LookupResult::from_bytes(data) {
        let words = result.to_words();
        let decoded = LookupResult::from_words(&words).expect("re-decode");
        assert_eq!(decoded.product_ids, result.product_ids);
    }

    if let Some(words) = words_from_bytes(data) {
        if let Some(counts) = facets_from_words(&words) {
            assert_eq!(facets_to_words(&counts), words);
        }
    }
});
