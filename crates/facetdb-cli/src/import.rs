//! Catalog import for the `FacetDB` CLI
//!
//! Reads a JSON Lines catalog (one product per line) into a ready
//! [`Storage`], plus an optional JSON file of named sort orders.
//!
//! ```text
//! {"id": 100, "group": 1, "group_order": 3, "features": [0, 2], "ext_features": [7], "attributes": {"price": 19.5}}
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use facetdb_core::{CatalogConfig, Item, RangeFilter, Storage, UNBOUNDED};

/// One catalog line.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CatalogRecord {
    pub id: u32,
    #[serde(default)]
    pub group: u32,
    #[serde(default)]
    pub group_order: u32,
    #[serde(default)]
    pub features: Vec<u32>,
    #[serde(default)]
    pub ext_features: Vec<u32>,
    #[serde(default)]
    pub attributes: BTreeMap<String, f32>,
}

impl CatalogRecord {
    fn into_item(self, index: u32) -> Item {
        let mut item = Item::new(index, self.id)
            .group(self.group, self.group_order)
            .features(self.features)
            .ext_features(self.ext_features);
        for (name, value) in self.attributes {
            item = item.attribute(name, value);
        }
        item
    }

    fn max_feature(&self) -> Option<u32> {
        self.features.iter().chain(&self.ext_features).copied().max()
    }
}

/// Import statistics
#[derive(Debug, Default)]
pub struct ImportStats {
    pub products: usize,
    pub feature_count: u32,
    pub sorting_indexes: usize,
    pub duration_ms: u64,
}

impl ImportStats {
    /// Products per second
    pub fn products_per_sec(&self) -> f64 {
        if self.duration_ms == 0 {
            0.0
        } else {
            (self.products as f64) / (self.duration_ms as f64 / 1000.0)
        }
    }
}

/// Parses every non-blank line of a JSONL catalog.
pub fn read_catalog(path: &Path) -> Result<Vec<CatalogRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open catalog {}", path.display()))?;
    let reader = BufReader::with_capacity(128 * 1024, file);

    let mut records = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: CatalogRecord = serde_json::from_str(&line)
            .with_context(|| format!("Invalid catalog record on line {}", line_no + 1))?;
        records.push(record);
    }

    if records.is_empty() {
        anyhow::bail!("Empty catalog: {}", path.display());
    }
    Ok(records)
}

/// Reads named sort orders: `{"name": [product_id, ...], ...}`.
pub fn read_orders(path: &Path) -> Result<BTreeMap<String, Vec<u32>>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open sort orders {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file)).context("Invalid sort order file")
}

/// Builds a ready storage from parsed records.
///
/// Without an explicit `feature_count`, the feature space is sized to the
/// largest feature or extended feature id plus one.
pub fn load_storage(
    records: Vec<CatalogRecord>,
    feature_count: Option<u32>,
    config: CatalogConfig,
    orders: &BTreeMap<String, Vec<u32>>,
) -> Result<(Storage, ImportStats)> {
    let start = Instant::now();
    let product_count =
        u32::try_from(records.len()).context("Catalog has more than u32::MAX products")?;
    let feature_count = match feature_count {
        Some(count) => count,
        None => records
            .iter()
            .filter_map(CatalogRecord::max_feature)
            .max()
            .map_or(1, |max| max.saturating_add(1)),
    };

    let mut storage = Storage::with_config(config);
    storage.init_storage(product_count, feature_count)?;
    for (index, record) in records.into_iter().enumerate() {
        let product_id = record.id;
        storage
            .add_item(record.into_item(index as u32))
            .with_context(|| format!("Failed to add product {product_id}"))?;
    }
    storage.complete_load_data()?;

    for (name, products) in orders {
        storage.set_sorting_index(name, products)?;
    }

    let stats = ImportStats {
        products: product_count as usize,
        feature_count,
        sorting_indexes: storage.sorting_indexes().len(),
        duration_ms: start.elapsed().as_millis() as u64,
    };
    Ok((storage, stats))
}

/// Reads a catalog file (and optional orders file) into a ready storage.
pub fn import_catalog(
    catalog: &Path,
    orders: Option<&Path>,
    feature_count: Option<u32>,
    config: CatalogConfig,
) -> Result<(Storage, ImportStats)> {
    let records = read_catalog(catalog)?;
    let orders = match orders {
        Some(path) => read_orders(path)?,
        None => BTreeMap::new(),
    };
    let (storage, stats) = load_storage(records, feature_count, config, &orders)?;
    tracing::info!(
        products = stats.products,
        features = stats.feature_count,
        duration_ms = stats.duration_ms,
        "Catalog imported"
    );
    Ok((storage, stats))
}

/// Parses a range filter argument: `name:from:to`, `name:from` or
/// `name::to`. An empty bound is unbounded.
pub fn parse_filter(s: &str) -> Result<RangeFilter> {
    let mut parts = s.splitn(3, ':');
    let name = parts.next().unwrap_or_default().trim();
    if name.is_empty() {
        anyhow::bail!("Filter '{s}' has no attribute name");
    }
    let from = parse_bound(parts.next())?;
    let to = parse_bound(parts.next())?;
    Ok(RangeFilter::new(name, from, to))
}

fn parse_bound(part: Option<&str>) -> Result<f32> {
    match part.map(str::trim) {
        None | Some("") => Ok(UNBOUNDED),
        Some(value) => value
            .parse::<f32>()
            .with_context(|| format!("Invalid filter bound '{value}'")),
    }
}

#[cfg(test)]
#[path = "import_tests.rs"]
mod tests;
