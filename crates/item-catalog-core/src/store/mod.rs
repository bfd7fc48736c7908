//! Item store abstraction.
//!
//! The [`ItemStore`] trait is the only collaborator the query reconciler
//! talks to. Implementations include the in-memory store in [`memory`] and
//! the REST client in the application crate.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CreateItemFields, Item, ItemId, ItemPatch};
use crate::query::{sort_items, PageWindow, SortDirection, SortField};

/// Failures reported by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached (connect, timeout, I/O).
    #[error("store unreachable: {0}")]
    Transport(String),
    /// The store answered with a non-success status.
    #[error("store returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("item not found: {0}")]
    NotFound(ItemId),
    /// No numeric id above the given one is left to assign.
    #[error("no item ids left after {0}")]
    IdsExhausted(i64),
    /// The store answered, but the body or headers could not be understood.
    #[error("unexpected store response: {0}")]
    Decode(String),
}

/// Abstract item collection.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`fetch_all`](ItemStore::fetch_all) | Every item, in store order |
/// | [`fetch_page`](ItemStore::fetch_page) | Sorted page plus total count |
/// | [`fetch_one`](ItemStore::fetch_one) | One item by id |
/// | [`create`](ItemStore::create) | Insert, stamping both timestamps |
/// | [`update`](ItemStore::update) | Merge a patch, refreshing `updatedAt` |
/// | [`delete`](ItemStore::delete) | Remove by id |
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Item>, StoreError>;

    /// Whether [`fetch_page`](ItemStore::fetch_page) is served natively.
    ///
    /// Stores that leave this `false` still answer `fetch_page` through the
    /// default emulation, but the reconciler will not prefer it.
    fn supports_paging(&self) -> bool {
        false
    }

    /// Fetch `limit` items starting at `offset` of the sorted collection,
    /// along with the size of the whole collection.
    async fn fetch_page(
        &self,
        sort_by: Option<SortField>,
        direction: SortDirection,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<Item>, usize), StoreError> {
        let mut items = self.fetch_all().await?;
        sort_items(&mut items, sort_by, direction);
        let window = PageWindow {
            page: if limit == 0 { 0 } else { offset / limit },
            page_size: limit,
            offset,
        };
        let total = items.len();
        Ok((window.slice(&items), total))
    }

    async fn fetch_one(&self, id: &ItemId) -> Result<Item, StoreError>;

    async fn create(&self, fields: &CreateItemFields) -> Result<Item, StoreError>;

    async fn update(&self, id: &ItemId, patch: &ItemPatch) -> Result<Item, StoreError>;

    async fn delete(&self, id: &ItemId) -> Result<(), StoreError>;
}
