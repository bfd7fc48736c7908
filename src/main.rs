//! # Item Catalog CLI (`catalog`)
//!
//! Lists, searches, and edits items held in a json-server style REST store,
//! and can serve such a store itself.
//!
//! ## Usage
//!
//! ```bash
//! catalog --config ./config/catalog.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `catalog list` | One page of items, optionally searched and sorted |
//! | `catalog get <id>` | Print one item |
//! | `catalog create` | Validate and create an item |
//! | `catalog update <id>` | Validate and patch an item |
//! | `catalog delete <id>` | Delete an item |
//! | `catalog serve` | Start the REST store server |
//!
//! ## Examples
//!
//! ```bash
//! # Start a local store seeded from data/items.json
//! catalog serve
//!
//! # Second page of items whose title or description mentions "red"
//! catalog list --search red --page 1 --page-size 5
//!
//! # Most recently updated first, as JSON
//! catalog list --sort-by updated-at --direction desc --json
//! ```

use clap::{Parser, Subcommand};
use item_catalog::config;
use item_catalog::list::ListOptions;
use item_catalog::{items, list, server};
use item_catalog_core::models::{CreateItemFields, ItemPatch};
use item_catalog_core::query::{SortDirection, SortField};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Item Catalog CLI: list, search, and manage catalog items.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. When the file does not exist, built-in defaults are used.
#[derive(Parser)]
#[command(
    name = "catalog",
    about = "List, search, and manage catalog items held in a REST resource store",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/catalog.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of items.
    ///
    /// Search text shorter than `[query].search_min_chars` is ignored and
    /// the unfiltered list is shown.
    List {
        /// Case-insensitive text matched against title and description.
        #[arg(long)]
        search: Option<String>,

        /// Sort field: `title`, `created-at`, or `updated-at`.
        #[arg(long, default_value = "title")]
        sort_by: SortField,

        /// Sort direction: `asc` or `desc`.
        #[arg(long, default_value = "asc")]
        direction: SortDirection,

        /// Zero-based page index.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        page: i64,

        /// Items per page (defaults to `[query].default_page_size`).
        #[arg(long)]
        page_size: Option<i64>,

        /// Print the page as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print one item.
    Get {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Create an item.
    Create {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        /// `http(s)` image URL or `data:image/...;base64,` string.
        #[arg(long)]
        image_url: String,

        #[arg(long)]
        json: bool,
    },

    /// Update the given fields of an item.
    Update {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        image_url: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Delete an item.
    Delete { id: String },

    /// Start the REST store server.
    ///
    /// Binds to `[server].bind` and loads `[server].seed` if set.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_or_minimal(&cli.config)?;

    // RUST_LOG wins over [logging].level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::List {
            search,
            sort_by,
            direction,
            page,
            page_size,
            json,
        } => {
            let opts = ListOptions {
                search,
                sort_by,
                direction,
                page,
                page_size,
            };
            list::run_list(&cfg, &opts, json).await?;
        }
        Commands::Get { id, json } => {
            items::run_get(&cfg, &id, json).await?;
        }
        Commands::Create {
            title,
            description,
            image_url,
            json,
        } => {
            let fields = CreateItemFields {
                title,
                description,
                image_url,
            };
            items::run_create(&cfg, fields, json).await?;
        }
        Commands::Update {
            id,
            title,
            description,
            image_url,
            json,
        } => {
            let patch = ItemPatch {
                title,
                description,
                image_url,
            };
            items::run_update(&cfg, &id, patch, json).await?;
        }
        Commands::Delete { id } => {
            items::run_delete(&cfg, &id).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
