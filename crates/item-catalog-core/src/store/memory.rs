//! In-memory [`ItemStore`] implementation.
//!
//! Backs the bundled REST store server and the test suites. Items live in a
//! `Vec` behind `std::sync::RwLock`, so insertion order is the store order
//! reported by [`fetch_all`](ItemStore::fetch_all). Ids are numeric and
//! assigned from a counter that starts past the largest seeded numeric id.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::models::{CreateItemFields, Item, ItemId, ItemPatch};
use crate::query::{sort_items, PageWindow, SortDirection, SortField};

use super::{ItemStore, StoreError};

struct Inner {
    items: Vec<Item>,
    next_id: i64,
}

/// Volatile item store.
pub struct InMemoryItemStore {
    inner: RwLock<Inner>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                items: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Seed the store. Items keep their ids and timestamps as given.
    ///
    /// Fails when a seeded numeric id leaves no room for the next one.
    pub fn with_items(items: Vec<Item>) -> Result<Self, StoreError> {
        let max_id = items
            .iter()
            .filter_map(|item| match item.id {
                ItemId::Number(n) => Some(n),
                ItemId::Text(_) => None,
            })
            .max()
            .unwrap_or(0);
        let next_id = max_id
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted(max_id))?;
        Ok(Self {
            inner: RwLock::new(Inner { items, next_id }),
        })
    }

    pub fn len(&self) -> usize {
        self.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn fetch_all(&self) -> Result<Vec<Item>, StoreError> {
        Ok(self.read().items.clone())
    }

    fn supports_paging(&self) -> bool {
        true
    }

    async fn fetch_page(
        &self,
        sort_by: Option<SortField>,
        direction: SortDirection,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<Item>, usize), StoreError> {
        let mut items = self.read().items.clone();
        sort_items(&mut items, sort_by, direction);
        let window = PageWindow {
            page: if limit == 0 { 0 } else { offset / limit },
            page_size: limit,
            offset,
        };
        let total = items.len();
        Ok((window.slice(&items), total))
    }

    async fn fetch_one(&self, id: &ItemId) -> Result<Item, StoreError> {
        self.read()
            .items
            .iter()
            .find(|item| &item.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn create(&self, fields: &CreateItemFields) -> Result<Item, StoreError> {
        let now = Utc::now();
        let mut inner = self.write();
        let id = inner.next_id;
        inner.next_id = id.checked_add(1).ok_or(StoreError::IdsExhausted(id))?;
        let id = ItemId::Number(id);
        let item = Item {
            id,
            title: fields.title.clone(),
            description: fields.description.clone(),
            image_url: fields.image_url.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        inner.items.push(item.clone());
        Ok(item)
    }

    async fn update(&self, id: &ItemId, patch: &ItemPatch) -> Result<Item, StoreError> {
        let now = Utc::now();
        let mut inner = self.write();
        let item = inner
            .items
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        item.apply(patch);
        item.updated_at = Some(match item.created_at {
            Some(created) if created > now => created,
            _ => now,
        });
        Ok(item.clone())
    }

    async fn delete(&self, id: &ItemId) -> Result<(), StoreError> {
        let mut inner = self.write();
        let before = inner.items.len();
        inner.items.retain(|item| &item.id != id);
        if inner.items.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }
}
