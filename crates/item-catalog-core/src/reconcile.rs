//! List query reconciliation.
//!
//! [`query`] turns a [`Filter`] and a [`PageRequest`] into one page of items,
//! choosing per request between two paths:
//!
//! | Condition | Path |
//! |-----------|------|
//! | no search term, [`PagingStrategy::Server`], store pages natively | store `fetch_page` |
//! | no search term, otherwise | `fetch_all`, sort, slice locally |
//! | search term present | `fetch_all`, sort, filter, slice locally |
//!
//! Both paths return the same [`PaginatedResult`] shape, and for a given
//! collection the same data and totals. The reconciler keeps no state
//! between calls and never retries; every store failure becomes
//! [`QueryError::TransportFailure`].

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::QueryError;
use crate::models::Item;
use crate::query::{matches_search, sort_items, Filter, PageRequest, PageWindow, PaginatedResult};
use crate::store::{ItemStore, StoreError};

/// Who performs paging when there is no search term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PagingStrategy {
    /// Delegate to the store when it supports paging.
    #[default]
    Server,
    /// Always fetch everything and page locally.
    Client,
}

impl FromStr for PagingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "server" => Ok(PagingStrategy::Server),
            "client" => Ok(PagingStrategy::Client),
            other => Err(format!("unknown paging strategy '{}'. Use server or client.", other)),
        }
    }
}

/// Bundles all inputs for a single list query.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub filter: Filter,
    pub page: PageRequest,
    pub strategy: PagingStrategy,
}

impl QueryRequest {
    pub fn new(filter: Filter, page: PageRequest) -> Self {
        Self {
            filter,
            page,
            strategy: PagingStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: PagingStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Run a list query against an [`ItemStore`].
///
/// Pagination is validated before the store is touched, so a malformed
/// request never costs a round-trip.
pub async fn query<S: ItemStore + ?Sized>(
    store: &S,
    req: &QueryRequest,
) -> Result<PaginatedResult, QueryError> {
    let window = req.page.window()?;
    let filter = &req.filter;

    match filter.search_term() {
        None if req.strategy == PagingStrategy::Server && store.supports_paging() => {
            debug!(
                page = window.page,
                page_size = window.page_size,
                sort_by = ?filter.sort_by,
                "delegating page to store"
            );
            let (data, total) = store
                .fetch_page(
                    filter.sort_by,
                    filter.sort_direction,
                    window.offset,
                    window.page_size,
                )
                .await
                .map_err(transport_failure)?;
            Ok(store_page(data, total, filter, &window))
        }
        None => {
            debug!(
                page = window.page,
                page_size = window.page_size,
                sort_by = ?filter.sort_by,
                "paging locally"
            );
            let mut items = store.fetch_all().await.map_err(transport_failure)?;
            sort_items(&mut items, filter.sort_by, filter.sort_direction);
            Ok(local_page(&items, &window))
        }
        Some(term) => {
            debug!(
                term = %term,
                page = window.page,
                page_size = window.page_size,
                "searching locally"
            );
            let mut items = store.fetch_all().await.map_err(transport_failure)?;
            sort_items(&mut items, filter.sort_by, filter.sort_direction);
            items.retain(|item| matches_search(item, &term));
            Ok(local_page(&items, &window))
        }
    }
}

/// Accept a page from the store, never letting it exceed the window.
///
/// A store that ignored the paging parameters and sent the whole collection
/// is paged locally; any other oversized page is cut to `page_size`.
fn store_page(
    mut data: Vec<Item>,
    total: usize,
    filter: &Filter,
    window: &PageWindow,
) -> PaginatedResult {
    if data.len() <= window.page_size {
        return PaginatedResult::new(data, window, total);
    }
    warn!(
        returned = data.len(),
        page_size = window.page_size,
        total,
        "store returned an oversized page"
    );
    if data.len() == total {
        sort_items(&mut data, filter.sort_by, filter.sort_direction);
        return local_page(&data, window);
    }
    data.truncate(window.page_size);
    PaginatedResult::new(data, window, total)
}

fn local_page(matched: &[Item], window: &PageWindow) -> PaginatedResult {
    PaginatedResult::new(window.slice(matched), window, matched.len())
}

fn transport_failure(err: StoreError) -> QueryError {
    warn!(error = %err, "item store fetch failed");
    QueryError::TransportFailure(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateItemFields, ItemId, ItemPatch};
    use crate::query::{SortDirection, SortField};
    use crate::store::memory::InMemoryItemStore;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    fn item(id: i64, title: &str, description: &str, updated_secs: i64) -> Item {
        let ts = Utc.timestamp_opt(updated_secs, 0).unwrap();
        Item {
            id: ItemId::Number(id),
            title: title.to_string(),
            description: description.to_string(),
            image_url: format!("https://img.test/{}.png", id),
            created_at: Some(Utc.timestamp_opt(1_000, 0).unwrap()),
            updated_at: Some(ts),
        }
    }

    fn furniture() -> InMemoryItemStore {
        InMemoryItemStore::with_items(vec![
            item(1, "Red Chair", "Dining chair", 1_000),
            item(2, "Blue Table", "Kitchen table", 2_000),
            item(3, "Red Sofa", "Three seats", 3_000),
        ])
        .unwrap()
    }

    /// A larger collection with duplicate titles and timestamps and one item
    /// missing its timestamps.
    fn mixed() -> InMemoryItemStore {
        let mut items = Vec::new();
        for i in 0..23i64 {
            let title = match i % 4 {
                0 => format!("lamp {}", i % 5),
                1 => format!("Lamp {}", i % 5),
                2 => format!("Rug {}", i),
                _ => format!("apron {}", i % 3),
            };
            items.push(item(i + 1, &title, &format!("note {}", i % 6), 1_000 + (i % 7) * 10));
        }
        items[5].updated_at = None;
        InMemoryItemStore::with_items(items).unwrap()
    }

    fn titles(result: &PaginatedResult) -> Vec<&str> {
        result.data.iter().map(|i| i.title.as_str()).collect()
    }

    fn request(
        filter: Filter,
        page: i64,
        page_size: i64,
        strategy: PagingStrategy,
    ) -> QueryRequest {
        QueryRequest::new(filter, PageRequest::new(page, page_size)).with_strategy(strategy)
    }

    /// Store that only implements `fetch_all`, relying on the default
    /// emulated `fetch_page`.
    struct PlainStore(InMemoryItemStore);

    #[async_trait]
    impl ItemStore for PlainStore {
        async fn fetch_all(&self) -> Result<Vec<Item>, StoreError> {
            self.0.fetch_all().await
        }
        async fn fetch_one(&self, id: &ItemId) -> Result<Item, StoreError> {
            self.0.fetch_one(id).await
        }
        async fn create(&self, fields: &CreateItemFields) -> Result<Item, StoreError> {
            self.0.create(fields).await
        }
        async fn update(&self, id: &ItemId, patch: &ItemPatch) -> Result<Item, StoreError> {
            self.0.update(id, patch).await
        }
        async fn delete(&self, id: &ItemId) -> Result<(), StoreError> {
            self.0.delete(id).await
        }
    }

    struct FailingStore;

    #[async_trait]
    impl ItemStore for FailingStore {
        async fn fetch_all(&self) -> Result<Vec<Item>, StoreError> {
            Err(StoreError::Transport("connection refused".to_string()))
        }
        fn supports_paging(&self) -> bool {
            true
        }
        async fn fetch_page(
            &self,
            _sort_by: Option<SortField>,
            _direction: SortDirection,
            _offset: usize,
            _limit: usize,
        ) -> Result<(Vec<Item>, usize), StoreError> {
            Err(StoreError::Status {
                status: 503,
                message: "unavailable".to_string(),
            })
        }
        async fn fetch_one(&self, id: &ItemId) -> Result<Item, StoreError> {
            Err(StoreError::NotFound(id.clone()))
        }
        async fn create(&self, _fields: &CreateItemFields) -> Result<Item, StoreError> {
            Err(StoreError::Transport("connection refused".to_string()))
        }
        async fn update(&self, id: &ItemId, _patch: &ItemPatch) -> Result<Item, StoreError> {
            Err(StoreError::NotFound(id.clone()))
        }
        async fn delete(&self, id: &ItemId) -> Result<(), StoreError> {
            Err(StoreError::NotFound(id.clone()))
        }
    }

    /// Store that claims native paging but answers every page request with
    /// its first `sent` items in insertion order.
    struct UnboundedPageStore {
        inner: InMemoryItemStore,
        sent: usize,
    }

    #[async_trait]
    impl ItemStore for UnboundedPageStore {
        async fn fetch_all(&self) -> Result<Vec<Item>, StoreError> {
            self.inner.fetch_all().await
        }
        fn supports_paging(&self) -> bool {
            true
        }
        async fn fetch_page(
            &self,
            _sort_by: Option<SortField>,
            _direction: SortDirection,
            _offset: usize,
            _limit: usize,
        ) -> Result<(Vec<Item>, usize), StoreError> {
            let all = self.inner.fetch_all().await?;
            let total = all.len();
            Ok((all.into_iter().take(self.sent).collect(), total))
        }
        async fn fetch_one(&self, id: &ItemId) -> Result<Item, StoreError> {
            self.inner.fetch_one(id).await
        }
        async fn create(&self, fields: &CreateItemFields) -> Result<Item, StoreError> {
            self.inner.create(fields).await
        }
        async fn update(&self, id: &ItemId, patch: &ItemPatch) -> Result<Item, StoreError> {
            self.inner.update(id, patch).await
        }
        async fn delete(&self, id: &ItemId) -> Result<(), StoreError> {
            self.inner.delete(id).await
        }
    }

    #[tokio::test]
    async fn test_search_updated_desc_scenario() {
        let store = furniture();
        let filter = Filter {
            search: Some("red".to_string()),
            sort_by: Some(SortField::UpdatedAt),
            sort_direction: SortDirection::Desc,
        };
        let result = query(&store, &request(filter, 0, 10, PagingStrategy::Server))
            .await
            .unwrap();
        assert_eq!(titles(&result), vec!["Red Sofa", "Red Chair"]);
        assert_eq!(result.pagination.total_items, 2);
        assert_eq!(result.pagination.total_pages, 1);
        assert_eq!(result.total, 2);
    }

    #[tokio::test]
    async fn test_title_asc_pages_scenario() {
        let store = furniture();
        let filter = Filter {
            search: None,
            sort_by: Some(SortField::Title),
            sort_direction: SortDirection::Asc,
        };
        for strategy in [PagingStrategy::Server, PagingStrategy::Client] {
            let first = query(&store, &request(filter.clone(), 0, 2, strategy)).await.unwrap();
            assert_eq!(titles(&first), vec!["Blue Table", "Red Chair"]);
            assert_eq!(first.pagination.total_items, 3);
            assert_eq!(first.pagination.total_pages, 2);

            let second = query(&store, &request(filter.clone(), 1, 2, strategy)).await.unwrap();
            assert_eq!(titles(&second), vec!["Red Sofa"]);
            assert_eq!(second.pagination.page, 1);
        }
    }

    #[tokio::test]
    async fn test_server_and_client_paging_agree() {
        let store = mixed();
        let plain = PlainStore(mixed());
        let sorts = [
            None,
            Some(SortField::Title),
            Some(SortField::CreatedAt),
            Some(SortField::UpdatedAt),
        ];
        for sort_by in sorts {
            for direction in [SortDirection::Asc, SortDirection::Desc] {
                for page_size in [1i64, 4, 5, 10, 50] {
                    for page in 0..7i64 {
                        let filter = Filter {
                            search: Some("  ".to_string()),
                            sort_by,
                            sort_direction: direction,
                        };
                        let server_req =
                            request(filter.clone(), page, page_size, PagingStrategy::Server);
                        let client_req =
                            request(filter.clone(), page, page_size, PagingStrategy::Client);
                        let server = query(&store, &server_req).await.unwrap();
                        let client = query(&store, &client_req).await.unwrap();
                        let emulated = query(&plain, &server_req).await.unwrap();
                        assert_eq!(
                            server, client,
                            "sort={:?} dir={:?} page={} size={}",
                            sort_by, direction, page, page_size
                        );
                        assert_eq!(server, emulated);
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn test_search_results_all_match() {
        let store = mixed();
        for term in ["lamp", "LAMP", "note 3", "apron", "zzz"] {
            let filter = Filter {
                search: Some(term.to_string()),
                sort_by: Some(SortField::Title),
                sort_direction: SortDirection::Asc,
            };
            let result = query(&store, &request(filter, 0, 100, PagingStrategy::Server))
                .await
                .unwrap();
            let needle = term.to_lowercase();
            for it in &result.data {
                assert!(
                    it.title.to_lowercase().contains(&needle)
                        || it.description.to_lowercase().contains(&needle),
                    "{:?} does not match {}",
                    it.title,
                    term
                );
            }
            let expected = store
                .fetch_all()
                .await
                .unwrap()
                .iter()
                .filter(|it| matches_search(it, &needle))
                .count();
            assert_eq!(result.pagination.total_items, expected);
        }
    }

    #[tokio::test]
    async fn test_page_lengths_follow_matched_size() {
        let store = mixed();
        let filter = Filter {
            search: Some("lamp".to_string()),
            ..Default::default()
        };
        let n = query(&store, &request(filter.clone(), 0, 1000, PagingStrategy::Server))
            .await
            .unwrap()
            .total;
        for page_size in 1..=7i64 {
            for page in 0..12i64 {
                let req = request(filter.clone(), page, page_size, PagingStrategy::Server);
                let result = query(&store, &req).await.unwrap();
                let remaining = (n as i64 - page * page_size).max(0);
                assert_eq!(result.data.len() as i64, page_size.min(remaining));
                assert_eq!(result.total, n);
            }
        }
    }

    #[tokio::test]
    async fn test_updated_desc_is_non_increasing() {
        let store = mixed();
        let filter = Filter {
            search: None,
            sort_by: Some(SortField::UpdatedAt),
            sort_direction: SortDirection::Desc,
        };
        for strategy in [PagingStrategy::Server, PagingStrategy::Client] {
            let result = query(&store, &request(filter.clone(), 0, 50, strategy)).await.unwrap();
            for pair in result.data.windows(2) {
                assert!(pair[0].updated_millis() >= pair[1].updated_millis());
            }
        }
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = InMemoryItemStore::new();
        let filters = [
            Filter::default(),
            Filter {
                search: Some("red".to_string()),
                sort_by: Some(SortField::CreatedAt),
                sort_direction: SortDirection::Desc,
            },
        ];
        for filter in filters {
            for strategy in [PagingStrategy::Server, PagingStrategy::Client] {
                let result = query(&store, &request(filter.clone(), 3, 10, strategy))
                    .await
                    .unwrap();
                assert!(result.data.is_empty());
                assert_eq!(result.pagination.total_items, 0);
                assert_eq!(result.pagination.total_pages, 0);
            }
        }
    }

    #[tokio::test]
    async fn test_page_past_end_keeps_totals() {
        let store = furniture();
        let result = query(&store, &request(Filter::default(), 5, 2, PagingStrategy::Client))
            .await
            .unwrap();
        assert!(result.data.is_empty());
        assert_eq!(result.pagination.total_items, 3);
        assert_eq!(result.pagination.total_pages, 2);
    }

    #[tokio::test]
    async fn test_store_ignoring_limit_is_paged_locally() {
        let store = UnboundedPageStore {
            inner: furniture(),
            sent: usize::MAX,
        };
        let filter = Filter {
            search: None,
            sort_by: Some(SortField::Title),
            sort_direction: SortDirection::Asc,
        };

        let first = query(&store, &request(filter.clone(), 0, 2, PagingStrategy::Server))
            .await
            .unwrap();
        assert_eq!(titles(&first), vec!["Blue Table", "Red Chair"]);
        assert_eq!(first.total, 3);
        assert_eq!(first.pagination.total_pages, 2);

        let second = query(&store, &request(filter, 1, 2, PagingStrategy::Server))
            .await
            .unwrap();
        assert_eq!(titles(&second), vec!["Red Sofa"]);
        assert_eq!(second.total, 3);
    }

    #[tokio::test]
    async fn test_oversized_partial_page_is_truncated() {
        let store = UnboundedPageStore {
            inner: mixed(),
            sent: 7,
        };
        let result = query(&store, &request(Filter::default(), 0, 5, PagingStrategy::Server))
            .await
            .unwrap();
        assert_eq!(result.data.len(), 5);
        assert_eq!(result.total, 23);
        assert_eq!(result.pagination.total_pages, 5);
    }

    #[tokio::test]
    async fn test_accented_titles_sort_alike_on_both_paths() {
        let accented = || {
            InMemoryItemStore::with_items(vec![
                item(1, "Zebra", "Striped rug", 1_000),
                item(2, "Éclair", "Pastry print", 1_000),
                item(3, "banco", "Garden bench", 1_000),
                item(4, "Árvore", "Tree poster", 1_000),
                item(5, "café", "Coffee mug", 1_000),
                item(6, "cafes", "Mug set", 1_000),
                item(7, "cafe", "Plain mug", 1_000),
            ])
            .unwrap()
        };
        let store = accented();
        let plain = PlainStore(accented());
        let expected = vec!["Árvore", "banco", "cafe", "café", "cafes", "Éclair", "Zebra"];
        let filter = Filter {
            search: None,
            sort_by: Some(SortField::Title),
            sort_direction: SortDirection::Asc,
        };

        for strategy in [PagingStrategy::Server, PagingStrategy::Client] {
            let result = query(&store, &request(filter.clone(), 0, 10, strategy))
                .await
                .unwrap();
            assert_eq!(titles(&result), expected, "{:?}", strategy);
        }
        let emulated = query(&plain, &request(filter.clone(), 0, 10, PagingStrategy::Server))
            .await
            .unwrap();
        assert_eq!(titles(&emulated), expected);

        let second = query(&store, &request(filter, 1, 3, PagingStrategy::Server))
            .await
            .unwrap();
        assert_eq!(titles(&second), vec!["café", "cafes", "Éclair"]);
    }

    #[tokio::test]
    async fn test_store_failure_is_transport_failure() {
        for filter in [
            Filter::default(),
            Filter {
                search: Some("red".to_string()),
                ..Default::default()
            },
        ] {
            for strategy in [PagingStrategy::Server, PagingStrategy::Client] {
                let err = query(&FailingStore, &request(filter.clone(), 0, 10, strategy))
                    .await
                    .unwrap_err();
                assert!(err.is_transport(), "got {:?}", err);
            }
        }
    }

    #[tokio::test]
    async fn test_invalid_pagination_fails_fast() {
        // FailingStore would report a transport error if it were reached.
        let err = query(&FailingStore, &request(Filter::default(), 0, 0, PagingStrategy::Server))
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidRequest(_)));
        let err = query(&FailingStore, &request(Filter::default(), -2, 10, PagingStrategy::Server))
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidRequest(_)));
    }

    #[test]
    fn test_paging_strategy_parse() {
        assert_eq!("client".parse::<PagingStrategy>().unwrap(), PagingStrategy::Client);
        assert!("both".parse::<PagingStrategy>().is_err());
    }
}
