#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
//! `FacetDB` CLI - faceted lookups and recommendations over a JSONL catalog
//!
//! Usage:
//!   `facetdb load-check ./catalog.jsonl`
//!   `facetdb lookup ./catalog.jsonl "(1|2)&7" --grouped --sort price --desc`
//!   `facetdb similar ./catalog.jsonl 100 --max 10 --ext 3`
//!   `facetdb facets ./catalog.jsonl "1|2" --grouped`
//!   `facetdb stats ./catalog.jsonl --format json`

mod import;
mod output;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use facetdb_core::{FacetConfig, LookupRequest, RangeFilter, Storage};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use output::OutputFormat;

#[derive(Parser)]
#[command(name = "facetdb")]
#[command(
    author,
    version,
    about = "FacetDB CLI - In-memory faceted search and recommendations"
)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = "facetdb.toml", env = "FACETDB_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Catalog source shared by every command
#[derive(Args, Debug)]
struct CatalogArgs {
    /// Path to the JSONL catalog
    catalog: PathBuf,

    /// JSON file of named sort orders ({"name": [product ids]})
    #[arg(long)]
    orders: Option<PathBuf>,

    /// Size of the feature id space (defaults to the largest id + 1)
    #[arg(long)]
    features: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a catalog and report import statistics
    LoadCheck {
        #[command(flatten)]
        catalog: CatalogArgs,
    },

    /// Run a product lookup
    Lookup {
        #[command(flatten)]
        catalog: CatalogArgs,

        /// Feature expression, e.g. "(1|2)&7"
        expression: String,

        /// Collapse each group to its preferred product
        #[arg(long)]
        grouped: bool,

        /// Range filter `name:from:to` (empty bound = unbounded), repeatable
        #[arg(long = "filter", value_parser = import::parse_filter)]
        filters: Vec<RangeFilter>,

        /// Sorting index name
        #[arg(long)]
        sort: Option<String>,

        /// Descending order
        #[arg(long, conflicts_with = "asc")]
        desc: bool,

        /// Ascending order
        #[arg(long)]
        asc: bool,

        /// Show collapsed entries and the raw word buffer
        #[arg(long)]
        raw: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Recommend products similar to one product
    Similar {
        #[command(flatten)]
        catalog: CatalogArgs,

        /// Product id
        product: u32,

        /// Maximum number of recommendations
        #[arg(long)]
        max: Option<u32>,

        /// Required extended features, comma-separated
        #[arg(long, value_delimiter = ',')]
        ext: Option<Vec<u32>>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Count matching products per feature
    Facets {
        #[command(flatten)]
        catalog: CatalogArgs,

        /// Feature expression; omit to count the whole catalog
        expression: Option<String>,

        /// Features to count, comma-separated (default: all)
        #[arg(long, value_delimiter = ',')]
        include: Option<Vec<u32>>,

        /// Also count distinct groups
        #[arg(long)]
        grouped: bool,

        /// Range filter `name:from:to`, repeatable
        #[arg(long = "filter", value_parser = import::parse_filter)]
        filters: Vec<RangeFilter>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show catalog statistics
    Stats {
        #[command(flatten)]
        catalog: CatalogArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

fn init_tracing(config: &FacetConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,facetdb_core={0},facetdb={0}",
            config.logging.level
        ))
    });
    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn open(args: &CatalogArgs, config: &FacetConfig) -> Result<(Storage, import::ImportStats)> {
    import::import_catalog(
        &args.catalog,
        args.orders.as_deref(),
        args.features,
        config.catalog.clone(),
    )
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = FacetConfig::load_from_path(&cli.config).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    init_tracing(&config);

    match cli.command {
        Commands::LoadCheck { catalog } => {
            let (storage, stats) = open(&catalog, &config)?;
            let catalog_stats = storage.stats();

            println!("\n{}", "Load Summary".green().bold());
            println!("  Products:         {}", stats.products.to_string().green());
            println!("  Feature space:    {}", stats.feature_count);
            println!("  Groups:           {}", catalog_stats.group_count);
            println!("  Sorting indexes:  {}", stats.sorting_indexes);
            println!("  Duration:         {} ms", stats.duration_ms);
            println!(
                "  Throughput:       {:.0} products/sec",
                stats.products_per_sec()
            );
        }
        Commands::Lookup {
            catalog,
            expression,
            grouped,
            filters,
            sort,
            desc,
            asc,
            raw,
            format,
        } => {
            let (storage, _) = open(&catalog, &config)?;
            let ascending = if desc || asc {
                !desc
            } else {
                config.lookup.default_ascending
            };

            let mut request = LookupRequest::new(expression)
                .grouped(grouped)
                .ascending(ascending);
            request.filters = filters;
            if let Some(name) = sort {
                request = request.sort_by(name, ascending);
            }

            let result = storage.lookup_products(&request)?;
            output::print_lookup(&result, format, raw)?;
        }
        Commands::Similar {
            catalog,
            product,
            max,
            ext,
            format,
        } => {
            let (storage, _) = open(&catalog, &config)?;
            let max_products = config.similarity.effective_max_products(max);
            let similar = storage.similar_products(product, max_products, ext.as_deref())?;
            output::print_similar(&similar, format)?;
        }
        Commands::Facets {
            catalog,
            expression,
            include,
            grouped,
            filters,
            format,
        } => {
            let (storage, _) = open(&catalog, &config)?;
            let counts = match expression {
                Some(expression) => storage.count_products(
                    &expression,
                    include.as_deref().unwrap_or_default(),
                    grouped,
                    &filters,
                )?,
                None => storage.count_all_products(grouped)?,
            };
            output::print_facets(&counts, format)?;
        }
        Commands::Stats { catalog, format } => {
            let (storage, _) = open(&catalog, &config)?;
            output::print_stats(&storage.stats(), format)?;
        }
    }

    Ok(())
}
