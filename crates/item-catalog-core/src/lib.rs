//! # Item Catalog Core
//!
//! Shared logic for Item Catalog: the item data model, the [`store::ItemStore`]
//! abstraction, filtering/sorting/pagination, the query reconciler, and
//! form-level validation.
//!
//! This crate contains no tokio, reqwest, filesystem I/O, or other
//! runtime-specific dependencies. Transports live in the application crate.

pub mod error;
pub mod generation;
pub mod models;
pub mod paginator;
pub mod query;
pub mod reconcile;
pub mod store;
pub mod validation;

pub use error::QueryError;
pub use models::{CreateItemFields, Item, ItemId, ItemPatch};
pub use query::{Filter, PageInfo, PageRequest, PaginatedResult, SortDirection, SortField};
pub use reconcile::{PagingStrategy, QueryRequest};
pub use store::{ItemStore, StoreError};
