//! Single-item commands: `catalog get`, `create`, `update`, `delete`.
//!
//! Each command has a core function over any [`ItemStore`] (used by the CLI
//! and the integration tests) and a `run_*` entry point that talks to the
//! configured HTTP store and prints to stdout. Create and update validate
//! locally before any request is sent.

use anyhow::{bail, Context, Result};
use item_catalog_core::models::{CreateItemFields, Item, ItemId, ItemPatch};
use item_catalog_core::store::ItemStore;
use item_catalog_core::validation::{validate_new_item, validate_patch};
use tracing::info;

use crate::config::Config;
use crate::http_store::HttpItemStore;

pub async fn get_item<S: ItemStore + ?Sized>(store: &S, id: &ItemId) -> Result<Item> {
    store
        .fetch_one(id)
        .await
        .with_context(|| format!("Failed to fetch item {}", id))
}

pub async fn create_item<S: ItemStore + ?Sized>(
    store: &S,
    fields: &CreateItemFields,
) -> Result<Item> {
    validate_new_item(fields)?;
    let item = store.create(fields).await.context("Failed to create item")?;
    info!(id = %item.id, "created item");
    Ok(item)
}

pub async fn update_item<S: ItemStore + ?Sized>(
    store: &S,
    id: &ItemId,
    patch: &ItemPatch,
) -> Result<Item> {
    if patch.is_empty() {
        bail!("nothing to update: pass --title, --description or --image-url");
    }
    validate_patch(patch)?;
    let item = store
        .update(id, patch)
        .await
        .with_context(|| format!("Failed to update item {}", id))?;
    info!(id = %item.id, "updated item");
    Ok(item)
}

pub async fn delete_item<S: ItemStore + ?Sized>(store: &S, id: &ItemId) -> Result<()> {
    store
        .delete(id)
        .await
        .with_context(|| format!("Failed to delete item {}", id))?;
    info!(id = %id, "deleted item");
    Ok(())
}

pub async fn run_get(config: &Config, id: &str, json: bool) -> Result<()> {
    let store = HttpItemStore::from_config(config)?;
    let item = get_item(&store, &ItemId::parse(id)).await?;
    print_item(&item, json)
}

pub async fn run_create(config: &Config, fields: CreateItemFields, json: bool) -> Result<()> {
    let store = HttpItemStore::from_config(config)?;
    let item = create_item(&store, &fields).await?;
    print_item(&item, json)
}

pub async fn run_update(config: &Config, id: &str, patch: ItemPatch, json: bool) -> Result<()> {
    let store = HttpItemStore::from_config(config)?;
    let item = update_item(&store, &ItemId::parse(id), &patch).await?;
    print_item(&item, json)
}

pub async fn run_delete(config: &Config, id: &str) -> Result<()> {
    let store = HttpItemStore::from_config(config)?;
    let id = ItemId::parse(id);
    delete_item(&store, &id).await?;
    println!("Deleted item {}", id);
    Ok(())
}

fn print_item(item: &Item, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
        return Ok(());
    }

    println!("--- Item ---");
    println!("id:          {}", item.id);
    println!("title:       {}", item.title);
    println!("image_url:   {}", display_image(&item.image_url));
    if let Some(ts) = item.created_at {
        println!("created_at:  {}", ts.to_rfc3339());
    }
    if let Some(ts) = item.updated_at {
        println!("updated_at:  {}", ts.to_rfc3339());
    }
    println!();
    println!("--- Description ---");
    println!("{}", item.description);
    Ok(())
}

/// Inline images are abbreviated to their media type.
fn display_image(image_url: &str) -> String {
    match image_url.strip_prefix("data:") {
        Some(rest) => {
            let media = rest.split([';', ',']).next().unwrap_or("image");
            format!("(inline {}, {} bytes)", media, image_url.len())
        }
        None => image_url.to_string(),
    }
}
