//! Output formatting for the `FacetDB` CLI.

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use serde::Serialize;

use facetdb_core::{CatalogStats, FacetCount, LookupResult, SimilarProduct};

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        header
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    table
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct LookupOutput<'a> {
    min_price: f32,
    max_price: f32,
    match_count: u32,
    group_count: u32,
    product_ids: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    words: Option<&'a [u32]>,
}

/// Prints a lookup result; collapsed entries are hidden unless `raw`.
pub fn print_lookup(result: &LookupResult, format: OutputFormat, raw: bool) -> Result<()> {
    let words = raw.then(|| result.to_words());
    let product_ids: Vec<u32> = if raw {
        result.product_ids.clone()
    } else {
        result.visible_products().collect()
    };

    match format {
        OutputFormat::Json => print_json(&LookupOutput {
            min_price: result.min_price,
            max_price: result.max_price,
            match_count: result.match_count,
            group_count: result.group_count,
            product_ids,
            words: words.as_deref(),
        }),
        OutputFormat::Table => {
            if result.is_empty() {
                println!("{}", "No results.".dimmed());
                return Ok(());
            }
            println!(
                "{} {}  {} {}  {} {:.2} - {:.2}",
                "matches:".bold(),
                result.match_count,
                "visible:".bold(),
                result.group_count,
                "price:".bold(),
                result.min_price,
                result.max_price
            );
            let mut table = new_table(&["#", "product_id"]);
            for (rank, id) in product_ids.iter().enumerate() {
                table.add_row(vec![Cell::new(rank + 1), Cell::new(id)]);
            }
            println!("{table}");
            Ok(())
        }
    }
}

/// Prints similarity results.
pub fn print_similar(similar: &[SimilarProduct], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(similar),
        OutputFormat::Table => {
            if similar.is_empty() {
                println!("{}", "No similar products.".dimmed());
                return Ok(());
            }
            let mut table = new_table(&["product_id", "similarity %"]);
            for s in similar {
                table.add_row(vec![Cell::new(s.product_id), Cell::new(s.percent)]);
            }
            println!("{table}");
            Ok(())
        }
    }
}

/// Prints facet counts.
pub fn print_facets(counts: &[FacetCount], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(counts),
        OutputFormat::Table => {
            let mut table = new_table(&["feature", "products", "groups"]);
            for c in counts {
                table.add_row(vec![
                    Cell::new(c.feature_id),
                    Cell::new(c.match_count),
                    Cell::new(c.group_count),
                ]);
            }
            println!("{table}");
            Ok(())
        }
    }
}

/// Prints catalog statistics.
pub fn print_stats(stats: &CatalogStats, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(stats),
        OutputFormat::Table => {
            println!("{}", "Catalog".bold().underline());
            println!("  Products:          {}", stats.product_count);
            println!("  Feature space:     {}", stats.feature_count);
            println!("  Indexed features:  {}", stats.indexed_features);
            println!("  Groups:            {}", stats.group_count);
            println!("  Attributes:        {}", stats.attribute_names.join(", "));
            println!(
                "  Sorting indexes:   {}",
                stats.sorting_index_names.join(", ")
            );
            if let Some(products) = stats.bounds.products {
                println!("  Product ids:       {}..={}", products.min, products.max);
            }
            if let Some(groups) = stats.bounds.groups {
                println!("  Group ids:         {}..={}", groups.min, groups.max);
            }
            Ok(())
        }
    }
}
