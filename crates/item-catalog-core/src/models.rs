//! Core data models for catalog items.
//!
//! Field names follow the REST store's JSON shape (`imageUrl`, `createdAt`,
//! `updatedAt`), so these types are serialized as-is by both the HTTP client
//! and the bundled store server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned item identifier.
///
/// Generic REST stores hand out either numeric or string ids, so both are
/// accepted. The id is opaque to everything except the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl ItemId {
    /// Parse an id typed by a user: digits become [`ItemId::Number`],
    /// anything else is kept as text.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(n) => ItemId::Number(n),
            Err(_) => ItemId::Text(raw.trim().to_string()),
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{}", n),
            ItemId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        ItemId::Number(n)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId::Text(s.to_string())
    }
}

/// A catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub description: String,
    /// An `http(s)` URL or an inline `data:image/...;base64,` string.
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Item {
    /// Milliseconds since the epoch for `createdAt`, if present.
    pub fn created_millis(&self) -> Option<i64> {
        self.created_at.map(|ts| ts.timestamp_millis())
    }

    /// Milliseconds since the epoch for `updatedAt`, if present.
    pub fn updated_millis(&self) -> Option<i64> {
        self.updated_at.map(|ts| ts.timestamp_millis())
    }

    /// Apply the present fields of a patch in place.
    ///
    /// Timestamps are left alone; stamping is the store's job.
    pub fn apply(&mut self, patch: &ItemPatch) {
        if let Some(ref title) = patch.title {
            self.title = title.clone();
        }
        if let Some(ref description) = patch.description {
            self.description = description.clone();
        }
        if let Some(ref image_url) = patch.image_url {
            self.image_url = image_url.clone();
        }
    }
}

/// Fields required to create an item. The store assigns `id` and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemFields {
    pub title: String,
    pub description: String,
    pub image_url: String,
}

/// Partial update: only `Some` fields are changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.image_url.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_untagged_json() {
        let n: ItemId = serde_json::from_str("7").unwrap();
        assert_eq!(n, ItemId::Number(7));
        let s: ItemId = serde_json::from_str("\"a1b2\"").unwrap();
        assert_eq!(s, ItemId::Text("a1b2".to_string()));
        assert_eq!(serde_json::to_string(&ItemId::Number(3)).unwrap(), "3");
    }

    #[test]
    fn test_item_id_parse() {
        assert_eq!(ItemId::parse("42"), ItemId::Number(42));
        assert_eq!(ItemId::parse(" x9 "), ItemId::Text("x9".to_string()));
    }

    #[test]
    fn test_item_camel_case_and_optional_timestamps() {
        let json = r#"{
            "id": 1,
            "title": "Red Chair",
            "description": "A red chair",
            "imageUrl": "https://x.test/a.png"
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.image_url, "https://x.test/a.png");
        assert!(item.created_at.is_none());

        let out = serde_json::to_value(&item).unwrap();
        assert!(out.get("createdAt").is_none());
        assert_eq!(out["imageUrl"], "https://x.test/a.png");
    }

    #[test]
    fn test_item_accepts_js_date_strings() {
        let json = r#"{"id":"abc","title":"t","description":"d","imageUrl":"u",
            "createdAt":"2024-03-01T10:00:00.000Z","updatedAt":"2024-03-02T10:00:00.000Z"}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert!(item.updated_millis().unwrap() > item.created_millis().unwrap());
    }

    #[test]
    fn test_apply_patch_only_touches_present_fields() {
        let mut item = Item {
            id: ItemId::Number(1),
            title: "Old".to_string(),
            description: "Old description".to_string(),
            image_url: "https://x.test/a.png".to_string(),
            created_at: None,
            updated_at: None,
        };
        item.apply(&ItemPatch {
            title: Some("New".to_string()),
            ..Default::default()
        });
        assert_eq!(item.title, "New");
        assert_eq!(item.description, "Old description");
    }
}
