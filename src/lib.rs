//! # Item Catalog
//!
//! List, search, and manage catalog items held in a generic REST resource
//! store.
//!
//! The query logic lives in the `item-catalog-core` crate; this crate adds
//! the HTTP store client, the REST store server, the interactive search
//! session, and the `catalog` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────────┐   ┌──────────────────┐
//! │ CLI / session│──▶│   Reconciler    │──▶│    ItemStore     │
//! │  (catalog)   │   │ (core::query)   │   │ HTTP │ in-memory │
//! └──────────────┘   └─────────────────┘   └───┬──────────────┘
//!                                              │ json-server API
//!                                              ▼
//!                                      ┌────────────────┐
//!                                      │ catalog serve  │
//!                                      │ (axum server)  │
//!                                      └────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! catalog serve                            # local store on :3000
//! catalog create --title Lamp --description "Brass desk lamp" \
//!     --image-url https://cdn.example/lamp.png
//! catalog list --search lamp --sort-by updated-at --direction desc
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`http_store`] | json-server REST client implementing `ItemStore` |
//! | [`server`] | REST store server over an in-memory store |
//! | [`session`] | Debounced, latest-wins list session |
//! | [`list`] | `catalog list` |
//! | [`items`] | `catalog get/create/update/delete` |

pub mod config;
pub mod http_store;
pub mod items;
pub mod list;
pub mod server;
pub mod session;
