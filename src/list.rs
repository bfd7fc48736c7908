//! `catalog list`: one page of the catalog.
//!
//! Runs a single [`SearchSession`] step against the configured store: search
//! text first (so the minimum-length convention and page reset apply), then
//! sort, then the requested page.

use anyhow::{bail, Result};
use item_catalog_core::paginator::PaginatorLabels;
use item_catalog_core::query::{PaginatedResult, SortDirection, SortField};
use item_catalog_core::store::ItemStore;
use serde::Serialize;
use std::sync::Arc;

use crate::config::Config;
use crate::http_store::HttpItemStore;
use crate::session::{SearchSession, SessionSettings};

/// Options accepted by `catalog list`.
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub search: Option<String>,
    pub sort_by: SortField,
    pub direction: SortDirection,
    pub page: i64,
    /// Falls back to `[query].default_page_size`.
    pub page_size: Option<i64>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            search: None,
            sort_by: SortField::Title,
            direction: SortDirection::Asc,
            page: 0,
            page_size: None,
        }
    }
}

/// A page plus the paginator text shown under it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOutcome {
    #[serde(flatten)]
    pub result: PaginatedResult,
    pub range_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Core list function returning structured data (used by CLI and tests).
pub async fn list_items<S: ItemStore + ?Sized>(
    store: Arc<S>,
    config: &Config,
    opts: &ListOptions,
) -> Result<ListOutcome> {
    let page_size = opts.page_size.unwrap_or(config.query.default_page_size);
    let options = &config.query.page_size_options;
    if !options.is_empty() && !options.contains(&page_size) {
        bail!("page size {} is not one of {:?}", page_size, options);
    }

    let session = SearchSession::new(store, SessionSettings::from_config(config));
    session.set_search(opts.search.as_deref().unwrap_or(""));
    session.set_sort(Some(opts.sort_by), opts.direction);
    session.set_page(opts.page, page_size);

    session.refresh().await?;
    let (Some(result), Some(range_label)) = (session.current(), session.range_label()) else {
        bail!("list query was superseded");
    };
    Ok(ListOutcome {
        result,
        range_label,
        hint: session.hint(),
    })
}

/// CLI entry point: queries the configured HTTP store and prints the page.
pub async fn run_list(config: &Config, opts: &ListOptions, json: bool) -> Result<()> {
    let store = Arc::new(HttpItemStore::from_config(config)?);
    let outcome = list_items(store, config, opts).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    if let Some(ref hint) = outcome.hint {
        eprintln!("{}", hint);
    }

    if outcome.result.data.is_empty() {
        println!("No items.");
    } else {
        println!("{:<8} {:<32} {:<20}", "ID", "TITLE", "UPDATED");
        for item in &outcome.result.data {
            let updated = item
                .updated_at
                .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<8} {:<32} {:<20}",
                item.id.to_string(),
                truncate(&item.title, 32),
                updated
            );
        }
    }
    println!();
    println!(
        "{}",
        footer(&outcome, &PaginatorLabels::for_locale(config.ui.locale))
    );

    Ok(())
}

/// Paginator line printed under the table.
fn footer(outcome: &ListOutcome, labels: &PaginatorLabels) -> String {
    format!(
        "{} {}    {}",
        labels.items_per_page, outcome.result.pagination.page_size, outcome.range_label
    )
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
