//! Filter, sort, and pagination primitives.
//!
//! Everything here is pure and synchronous: the reconciler in
//! [`crate::reconcile`] composes these over a snapshot fetched from a store,
//! and [`crate::store::memory`] reuses them to serve native paging.

use feruca::Collator;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::QueryError;
use crate::models::Item;

/// Field a list may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Title,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Wire name used by the REST store (`_sort=`).
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(SortField::Title),
            "createdAt" | "created_at" | "created-at" => Ok(SortField::CreatedAt),
            "updatedAt" | "updated_at" | "updated-at" => Ok(SortField::UpdatedAt),
            other => Err(format!(
                "unknown sort field '{}'. Use title, createdAt, or updatedAt.",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction '{}'. Use asc or desc.", other)),
        }
    }
}

/// Search text plus sort order for one list query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Filter {
    pub search: Option<String>,
    pub sort_by: Option<SortField>,
    pub sort_direction: SortDirection,
}

impl Filter {
    /// Build a filter from raw user input, applying the minimum-length
    /// convention: search text shorter than `min_chars` characters is
    /// dropped so the query runs as an unfiltered list.
    pub fn from_input(
        raw_search: &str,
        sort_by: Option<SortField>,
        sort_direction: SortDirection,
        min_chars: usize,
    ) -> Self {
        let search = if raw_search.is_empty() || raw_search.chars().count() < min_chars {
            None
        } else {
            Some(raw_search.to_string())
        };
        Self {
            search,
            sort_by,
            sort_direction,
        }
    }

    /// The normalized (trimmed, lowercased) search term, or `None` when the
    /// search text is absent or blank.
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn has_search(&self) -> bool {
        self.search_term().is_some()
    }
}

/// Requested page, as supplied by a caller.
///
/// Signed so that malformed input reaches [`PageRequest::window`] and is
/// rejected there instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    /// Validate and convert to an index window over the matched set.
    pub fn window(&self) -> Result<PageWindow, QueryError> {
        if self.page_size <= 0 {
            return Err(QueryError::InvalidRequest(format!(
                "pageSize must be > 0, got {}",
                self.page_size
            )));
        }
        if self.page < 0 {
            return Err(QueryError::InvalidRequest(format!(
                "page must be >= 0, got {}",
                self.page
            )));
        }
        let page = usize::try_from(self.page)
            .map_err(|_| QueryError::InvalidRequest(format!("page {} out of range", self.page)))?;
        let page_size = usize::try_from(self.page_size).map_err(|_| {
            QueryError::InvalidRequest(format!("pageSize {} out of range", self.page_size))
        })?;
        let offset = page.checked_mul(page_size).ok_or_else(|| {
            QueryError::InvalidRequest(format!(
                "page {} with pageSize {} overflows the offset",
                page, page_size
            ))
        })?;
        Ok(PageWindow {
            page,
            page_size,
            offset,
        })
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: 10,
        }
    }
}

/// A validated page request: zero-based `page`, positive `page_size`, and
/// the derived `offset = page * page_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: usize,
    pub page_size: usize,
    pub offset: usize,
}

impl PageWindow {
    /// Slice this window out of a full, already filtered and sorted set.
    pub fn slice<T: Clone>(&self, all: &[T]) -> Vec<T> {
        if self.offset >= all.len() {
            return Vec::new();
        }
        let end = self.offset.saturating_add(self.page_size).min(all.len());
        all[self.offset..end].to_vec()
    }
}

/// Pagination metadata returned with every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl PageInfo {
    pub fn new(window: &PageWindow, total_items: usize) -> Self {
        Self {
            page: window.page,
            page_size: window.page_size,
            total_items,
            total_pages: total_items.div_ceil(window.page_size),
        }
    }
}

/// Uniform page shape, whichever path produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult {
    pub data: Vec<Item>,
    pub pagination: PageInfo,
    pub total: usize,
}

impl PaginatedResult {
    pub fn new(data: Vec<Item>, window: &PageWindow, total: usize) -> Self {
        Self {
            data,
            pagination: PageInfo::new(window, total),
            total,
        }
    }
}

/// Compare two strings with the Unicode Collation Algorithm (CLDR root
/// tailoring): accents and case only break ties, and lowercase sorts
/// before uppercase.
pub fn collate(a: &str, b: &str) -> Ordering {
    Collator::default().collate(a, b)
}

/// Ordering of two items on `field`, ascending.
///
/// Timestamps compare as epoch milliseconds; an item with no timestamp sorts
/// before every item that has one.
pub fn compare_items(a: &Item, b: &Item, field: SortField) -> Ordering {
    compare_with(&mut Collator::default(), a, b, field)
}

fn compare_with(collator: &mut Collator, a: &Item, b: &Item, field: SortField) -> Ordering {
    match field {
        SortField::Title => collator.collate(a.title.as_str(), b.title.as_str()),
        SortField::CreatedAt => a.created_millis().cmp(&b.created_millis()),
        SortField::UpdatedAt => a.updated_millis().cmp(&b.updated_millis()),
    }
}

/// Stable in-place sort. `None` leaves the store's order untouched.
pub fn sort_items(items: &mut [Item], sort_by: Option<SortField>, direction: SortDirection) {
    let Some(field) = sort_by else {
        return;
    };
    let mut collator = Collator::default();
    items.sort_by(|a, b| {
        let ord = compare_with(&mut collator, a, b, field);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

/// Case-insensitive substring match on title or description.
///
/// `term` must already be normalized by [`Filter::search_term`].
pub fn matches_search(item: &Item, term: &str) -> bool {
    item.title.to_lowercase().contains(term) || item.description.to_lowercase().contains(term)
}
