//! Interactive list state: search box, sort, paginator.
//!
//! A [`SearchSession`] holds what a list screen holds between queries and
//! runs every query through [`reconcile::query`]. It adds three behaviours
//! on top of the stateless reconciler:
//!
//! - **Debounce**: [`SearchSession::type_search`] waits for the debounce
//!   window and gives up if another keystroke arrived meanwhile.
//! - **Distinct terms**: a settled search equal to the one already applied
//!   does not query again.
//! - **Latest wins**: a result is stored only if no newer query was issued
//!   while it was in flight.
//!
//! Changing the search term, sort field, or direction moves back to page 0.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use item_catalog_core::generation::QueryGenerations;
use item_catalog_core::paginator::{search_hint, Locale, PaginatorLabels};
use item_catalog_core::query::{Filter, PageRequest, PaginatedResult, SortDirection, SortField};
use item_catalog_core::reconcile::{self, PagingStrategy, QueryRequest};
use item_catalog_core::store::ItemStore;
use item_catalog_core::QueryError;
use tracing::debug;

use crate::config::Config;

/// Fixed knobs for a session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub strategy: PagingStrategy,
    pub page_size: i64,
    pub search_min_chars: usize,
    pub debounce: Duration,
    pub locale: Locale,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            strategy: PagingStrategy::Server,
            page_size: 10,
            search_min_chars: 3,
            debounce: Duration::from_millis(500),
            locale: Locale::En,
        }
    }
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            strategy: config.query.paging,
            page_size: config.query.default_page_size,
            search_min_chars: config.query.search_min_chars,
            debounce: config.query.debounce(),
            locale: config.ui.locale,
        }
    }
}

#[derive(Debug)]
struct SessionState {
    raw_search: String,
    filter: Filter,
    page: PageRequest,
    current: Option<PaginatedResult>,
}

pub struct SearchSession<S: ItemStore + ?Sized> {
    store: Arc<S>,
    settings: SessionSettings,
    state: Mutex<SessionState>,
    keystrokes: QueryGenerations,
    queries: QueryGenerations,
}

impl<S: ItemStore + ?Sized> SearchSession<S> {
    /// Start with the list screen defaults: no search, title ascending,
    /// first page.
    pub fn new(store: Arc<S>, settings: SessionSettings) -> Self {
        let state = SessionState {
            raw_search: String::new(),
            filter: Filter {
                search: None,
                sort_by: Some(SortField::Title),
                sort_direction: SortDirection::Asc,
            },
            page: PageRequest::new(0, settings.page_size),
            current: None,
        };
        Self {
            store,
            settings,
            state: Mutex::new(state),
            keystrokes: QueryGenerations::new(),
            queries: QueryGenerations::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn filter(&self) -> Filter {
        self.lock().filter.clone()
    }

    pub fn page(&self) -> PageRequest {
        self.lock().page
    }

    /// Last result applied to the session.
    pub fn current(&self) -> Option<PaginatedResult> {
        self.lock().current.clone()
    }

    /// Hint for a search box that is too short to search yet.
    pub fn hint(&self) -> Option<String> {
        let raw = self.lock().raw_search.clone();
        search_hint(&raw, self.settings.search_min_chars, self.settings.locale)
    }

    /// Range label for the last applied result.
    pub fn range_label(&self) -> Option<String> {
        let state = self.lock();
        let result = state.current.as_ref()?;
        let labels = PaginatorLabels::for_locale(self.settings.locale);
        Some(labels.range_label(
            result.pagination.page,
            result.pagination.page_size,
            result.total,
        ))
    }

    /// Set the search text without debouncing.
    ///
    /// Returns `true` when the effective search term changed, in which case
    /// the page is reset to 0.
    pub fn set_search(&self, raw: &str) -> bool {
        let mut state = self.lock();
        state.raw_search = raw.to_string();
        let next = Filter::from_input(
            raw,
            state.filter.sort_by,
            state.filter.sort_direction,
            self.settings.search_min_chars,
        );
        if next.search == state.filter.search {
            return false;
        }
        state.filter.search = next.search;
        state.page.page = 0;
        true
    }

    /// Returns `true` when the sort order changed, in which case the page is
    /// reset to 0.
    pub fn set_sort(&self, sort_by: Option<SortField>, direction: SortDirection) -> bool {
        let mut state = self.lock();
        if state.filter.sort_by == sort_by && state.filter.sort_direction == direction {
            return false;
        }
        state.filter.sort_by = sort_by;
        state.filter.sort_direction = direction;
        state.page.page = 0;
        true
    }

    /// Paginator event: page index and page size.
    pub fn set_page(&self, page: i64, page_size: i64) {
        let mut state = self.lock();
        state.page = PageRequest::new(page, page_size);
    }

    /// Run the query for the current state.
    ///
    /// Returns `Ok(None)` if a newer query was issued before this one
    /// finished; its result is then discarded.
    pub async fn refresh(&self) -> Result<Option<PaginatedResult>, QueryError> {
        let ticket = self.queries.issue();
        let req = {
            let state = self.lock();
            QueryRequest::new(state.filter.clone(), state.page)
                .with_strategy(self.settings.strategy)
        };

        let result = reconcile::query(self.store.as_ref(), &req).await?;

        let Some(result) = self.queries.accept(ticket, result) else {
            debug!(?ticket, "discarding superseded result");
            return Ok(None);
        };
        self.lock().current = Some(result.clone());
        Ok(Some(result))
    }

    /// Keystroke in the search box.
    ///
    /// Waits for the debounce window, then queries if this is still the
    /// latest keystroke and the effective term changed. Returns `Ok(None)`
    /// when the keystroke was superseded, the term is unchanged, or the
    /// result itself was superseded.
    pub async fn type_search(&self, raw: &str) -> Result<Option<PaginatedResult>, QueryError> {
        let keystroke = self.keystrokes.issue();
        tokio::time::sleep(self.settings.debounce).await;

        if !self.keystrokes.is_current(keystroke) {
            debug!(raw, "keystroke superseded");
            return Ok(None);
        }
        if !self.set_search(raw) {
            debug!(raw, "search term unchanged");
            return Ok(None);
        }
        self.refresh().await
    }
}
