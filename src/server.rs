//! REST item store server.
//!
//! Serves an [`InMemoryItemStore`] over the same json-server routes that
//! [`HttpItemStore`](crate::http_store::HttpItemStore) speaks, so the CLI and
//! the tests can run against a local store without external tooling.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/items` | Collection; json-server `_sort`/`_order`/`_start`/`_limit` |
//! | `POST` | `/items` | Create (validated) |
//! | `GET`  | `/items/{id}` | One item |
//! | `PATCH`/`PUT` | `/items/{id}` | Partial update (validated) |
//! | `DELETE` | `/items/{id}` | Delete |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "unknown sort field 'price'" } }
//! ```
//!
//! Error codes: `bad_request` (400), `validation` (400), `not_found` (404),
//! `internal` (500).

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use item_catalog_core::models::{CreateItemFields, Item, ItemId, ItemPatch};
use item_catalog_core::query::{sort_items, SortDirection, SortField};
use item_catalog_core::store::memory::InMemoryItemStore;
use item_catalog_core::store::{ItemStore, StoreError};
use item_catalog_core::validation::{validate_new_item, validate_patch, ValidationErrors};
use serde::{Deserialize, Serialize};
use std::path::Path as FsPath;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::http_store::TOTAL_COUNT_HEADER;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    store: Arc<InMemoryItemStore>,
}

/// Starts the store server on `[server].bind`, seeded from `[server].seed`.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config) -> Result<()> {
    let items = match config.server.seed {
        Some(ref path) => load_seed(path)?,
        None => Vec::new(),
    };
    let store = Arc::new(InMemoryItemStore::with_items(items).context("Invalid seed items")?);

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    info!(
        addr = %config.server.bind,
        items = store.len(),
        "item store listening on http://{}/items",
        config.server.bind
    );
    serve(listener, store).await
}

/// Serve `store` on an already-bound listener.
pub async fn serve(listener: TcpListener, store: Arc<InMemoryItemStore>) -> Result<()> {
    axum::serve(listener, router(store)).await?;
    Ok(())
}

/// Build the route table for `store`.
pub fn router(store: Arc<InMemoryItemStore>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    Router::new()
        .route("/items", get(handle_list).post(handle_create))
        .route(
            "/items/{id}",
            get(handle_get)
                .patch(handle_update)
                .put(handle_update)
                .delete(handle_delete),
        )
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { store })
}

/// Read a JSON array of items.
pub fn load_seed(path: &FsPath) -> Result<Vec<Item>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse seed file: {}", path.display()))
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError {
            status: StatusCode::BAD_REQUEST,
            code: "validation".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AppError {
                status: StatusCode::NOT_FOUND,
                code: "not_found".to_string(),
                message: err.to_string(),
            },
            other => {
                warn!(error = %other, "store operation failed");
                AppError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: "internal".to_string(),
                    message: other.to_string(),
                }
            }
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /items ============

/// json-server list parameters.
#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(rename = "_sort")]
    sort: Option<String>,
    #[serde(rename = "_order")]
    order: Option<String>,
    #[serde(rename = "_start")]
    start: Option<usize>,
    #[serde(rename = "_limit")]
    limit: Option<usize>,
}

/// Handler for `GET /items`.
///
/// A paged request sets `X-Total-Count`. Without `_start`/`_limit` the whole
/// (optionally sorted) collection is returned and no count header is set.
async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Response, AppError> {
    let sort_by = params
        .sort
        .as_deref()
        .map(str::parse::<SortField>)
        .transpose()
        .map_err(bad_request)?;
    let direction = params
        .order
        .as_deref()
        .map(str::parse::<SortDirection>)
        .transpose()
        .map_err(bad_request)?
        .unwrap_or_default();

    if params.start.is_none() && params.limit.is_none() {
        let mut items = state.store.fetch_all().await?;
        sort_items(&mut items, sort_by, direction);
        debug!(count = items.len(), "list collection");
        return Ok(Json(items).into_response());
    }

    let offset = params.start.unwrap_or(0);
    let limit = params.limit.unwrap_or(usize::MAX);
    if limit == 0 {
        return Err(bad_request("_limit must be > 0"));
    }
    let (items, total) = state
        .store
        .fetch_page(sort_by, direction, offset, limit)
        .await?;
    debug!(offset, limit, total, count = items.len(), "list page");

    let mut headers = HeaderMap::new();
    headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from(total as u64));
    Ok((headers, Json(items)).into_response())
}

// ============ /items/{id} ============

async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Item>, AppError> {
    let item = state.store.fetch_one(&ItemId::parse(&id)).await?;
    Ok(Json(item))
}

async fn handle_create(
    State(state): State<AppState>,
    Json(fields): Json<CreateItemFields>,
) -> Result<(StatusCode, Json<Item>), AppError> {
    validate_new_item(&fields)?;
    let item = state.store.create(&fields).await?;
    info!(id = %item.id, title = %item.title, "item created");
    Ok((StatusCode::CREATED, Json(item)))
}

async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ItemPatch>,
) -> Result<Json<Item>, AppError> {
    validate_patch(&patch)?;
    let item = state.store.update(&ItemId::parse(&id), &patch).await?;
    info!(id = %item.id, "item updated");
    Ok(Json(item))
}

async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = ItemId::parse(&id);
    state.store.delete(&id).await?;
    info!(id = %id, "item deleted");
    Ok(Json(serde_json::json!({})))
}
