//! Fixed-width word layouts handed to host bindings.
//!
//! # Lookup result
//!
//! ```text
//! [min_price, max_price, match_count, group_count, product_id_0, ..., product_id_{match_count-1}]
//! ```
//!
//! Words 0 and 1 carry IEEE-754 `f32` bits. Collapsed duplicates of a grouped
//! lookup are `0xFFFF_FFFF`; consumers rely on `group_count`, not the array
//! length, for the visible count.
//!
//! # Facet counts
//!
//! A flat sequence of 4-word records `(feature_id, match_count, group_count, reserved)`.
//!
//! Byte encodings are little-endian.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::facets::FacetCount;
use crate::lookup::LookupResult;

/// Header words preceding the product ids of a lookup result.
pub const LOOKUP_HEADER_WORDS: usize = 4;

/// Words per facet count record.
pub const FACET_RECORD_WORDS: usize = 4;

const WORD_BYTES: usize = std::mem::size_of::<u32>();

impl LookupResult {
    /// Encodes the result as its word layout.
    #[must_use]
    pub fn to_words(&self) -> Vec<u32> {
        let mut words = Vec::with_capacity(LOOKUP_HEADER_WORDS + self.product_ids.len());
        words.push(self.min_price.to_bits());
        words.push(self.max_price.to_bits());
        words.push(self.match_count);
        words.push(self.group_count);
        words.extend_from_slice(&self.product_ids);
        words
    }

    /// Decodes a word layout; `None` if it is shorter than its header claims.
    #[must_use]
    pub fn from_words(words: &[u32]) -> Option<Self> {
        let (header, ids) = words.split_at_checked(LOOKUP_HEADER_WORDS)?;
        let match_count = header[2];
        let product_ids = ids.get(..match_count as usize)?.to_vec();
        Some(Self {
            min_price: f32::from_bits(header[0]),
            max_price: f32::from_bits(header[1]),
            match_count,
            group_count: header[3],
            product_ids,
        })
    }

    /// Encodes the word layout as little-endian bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        words_to_bytes(&self.to_words())
    }

    /// Decodes little-endian bytes produced by [`LookupResult::to_bytes`].
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        Self::from_words(&words_from_bytes(bytes)?)
    }
}

/// Encodes facet counts as 4-word records.
#[must_use]
pub fn facets_to_words(counts: &[FacetCount]) -> Vec<u32> {
    let mut words = Vec::with_capacity(counts.len() * FACET_RECORD_WORDS);
    for count in counts {
        words.extend_from_slice(&[
            count.feature_id,
            count.match_count,
            count.group_count,
            count.reserved,
        ]);
    }
    words
}

/// Decodes 4-word facet records; `None` if the length is not a multiple of 4.
#[must_use]
pub fn facets_from_words(words: &[u32]) -> Option<Vec<FacetCount>> {
    if words.len() % FACET_RECORD_WORDS != 0 {
        return None;
    }
    Some(
        words
            .chunks_exact(FACET_RECORD_WORDS)
            .map(|record| FacetCount {
                feature_id: record[0],
                match_count: record[1],
                group_count: record[2],
                reserved: record[3],
            })
            .collect(),
    )
}

/// Encodes facet counts as little-endian bytes.
#[must_use]
pub fn facets_to_bytes(counts: &[FacetCount]) -> Bytes {
    words_to_bytes(&facets_to_words(counts))
}

/// Little-endian byte encoding of a word slice.
#[must_use]
pub fn words_to_bytes(words: &[u32]) -> Bytes {
    let mut buf = BytesMut::with_capacity(words.len() * WORD_BYTES);
    for &word in words {
        buf.put_u32_le(word);
    }
    buf.freeze()
}

/// Words of a little-endian byte buffer; `None` if its length is not a
/// multiple of 4.
#[must_use]
pub fn words_from_bytes(mut bytes: &[u8]) -> Option<Vec<u32>> {
    if bytes.len() % WORD_BYTES != 0 {
        return None;
    }
    let mut words = Vec::with_capacity(bytes.len() / WORD_BYTES);
    while bytes.has_remaining() {
        words.push(bytes.get_u32_le());
    }
    Some(words)
}
