//! REST-backed [`ItemStore`] speaking json-server conventions.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | `fetch_all` | `GET /items` |
//! | `fetch_page` | `GET /items?_sort=F&_order=D&_start=N&_limit=M`, total from `X-Total-Count` |
//! | `fetch_one` | `GET /items/{id}` |
//! | `create` | `POST /items` with `createdAt`/`updatedAt` stamped |
//! | `update` | `PATCH /items/{id}` with `updatedAt` stamped |
//! | `delete` | `DELETE /items/{id}` |
//!
//! The store itself does not stamp timestamps, so the client does.
//! Nothing here retries; failures map onto [`StoreError`].

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use item_catalog_core::models::{CreateItemFields, Item, ItemId, ItemPatch};
use item_catalog_core::query::{SortDirection, SortField};
use item_catalog_core::store::{ItemStore, StoreError};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;

/// Response header carrying the unpaged collection size.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

pub struct HttpItemStore {
    client: reqwest::Client,
    items_url: Url,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewItemBody<'a> {
    #[serde(flatten)]
    fields: &'a CreateItemFields,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PatchBody<'a> {
    #[serde(flatten)]
    patch: &'a ItemPatch,
    updated_at: DateTime<Utc>,
}

impl HttpItemStore {
    /// Create a client for the collection at `items_url`
    /// (e.g. `http://localhost:3000/items`).
    pub fn new(items_url: &str, timeout: Duration) -> Result<Self> {
        let items_url = Url::parse(items_url)
            .with_context(|| format!("Invalid item store URL: {}", items_url))?;
        if items_url.cannot_be_a_base() {
            bail!("Item store URL cannot carry a path: {}", items_url);
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, items_url })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.items_url(), config.store.timeout())
    }

    pub fn items_url(&self) -> &Url {
        &self.items_url
    }

    fn item_url(&self, id: &ItemId) -> Url {
        let mut url = self.items_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&id.to_string());
        }
        url
    }
}

/// Send a request and turn non-success statuses into [`StoreError`]s.
///
/// `id` is the item addressed by the request, so a 404 can be reported as
/// [`StoreError::NotFound`].
async fn send(req: RequestBuilder, id: Option<&ItemId>) -> Result<Response, StoreError> {
    let resp = req.send().await.map_err(request_error)?;
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = id {
            return Err(StoreError::NotFound(id.clone()));
        }
    }
    let message = resp.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        message,
    })
}

fn request_error(err: reqwest::Error) -> StoreError {
    if err.is_decode() {
        StoreError::Decode(err.to_string())
    } else {
        StoreError::Transport(err.to_string())
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, StoreError> {
    resp.json::<T>().await.map_err(|e| {
        if e.is_decode() {
            StoreError::Decode(e.to_string())
        } else {
            StoreError::Transport(e.to_string())
        }
    })
}

fn total_count(resp: &Response) -> Result<usize, StoreError> {
    let raw = resp
        .headers()
        .get(TOTAL_COUNT_HEADER)
        .ok_or_else(|| StoreError::Decode(format!("missing {} header", TOTAL_COUNT_HEADER)))?;
    raw.to_str()
        .ok()
        .and_then(|s| s.trim().parse::<usize>().ok())
        .ok_or_else(|| {
            StoreError::Decode(format!("invalid {} header: {:?}", TOTAL_COUNT_HEADER, raw))
        })
}

#[async_trait]
impl ItemStore for HttpItemStore {
    async fn fetch_all(&self) -> Result<Vec<Item>, StoreError> {
        debug!(url = %self.items_url, "GET collection");
        let resp = send(self.client.get(self.items_url.clone()), None).await?;
        read_json(resp).await
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
        let mut params: Vec<(&str, String)> = Vec::with_capacity(4);
        if let Some(field) = sort_by {
            params.push(("_sort", field.as_str().to_string()));
            params.push(("_order", direction.as_str().to_string()));
        }
        params.push(("_start", offset.to_string()));
        params.push(("_limit", limit.to_string()));

        debug!(url = %self.items_url, ?params, "GET page");
        let resp = send(self.client.get(self.items_url.clone()).query(&params), None).await?;
        let total = total_count(&resp)?;
        let items: Vec<Item> = read_json(resp).await?;
        Ok((items, total))
    }

    async fn fetch_one(&self, id: &ItemId) -> Result<Item, StoreError> {
        let resp = send(self.client.get(self.item_url(id)), Some(id)).await?;
        read_json(resp).await
    }

    async fn create(&self, fields: &CreateItemFields) -> Result<Item, StoreError> {
        let now = Utc::now();
        let body = NewItemBody {
            fields,
            created_at: now,
            updated_at: now,
        };
        let resp = send(self.client.post(self.items_url.clone()).json(&body), None).await?;
        read_json(resp).await
    }

    async fn update(&self, id: &ItemId, patch: &ItemPatch) -> Result<Item, StoreError> {
        let body = PatchBody {
            patch,
            updated_at: Utc::now(),
        };
        let resp = send(self.client.patch(self.item_url(id)).json(&body), Some(id)).await?;
        read_json(resp).await
    }

    async fn delete(&self, id: &ItemId) -> Result<(), StoreError> {
        send(self.client.delete(self.item_url(id)), Some(id)).await?;
        Ok(())
    }
}
