//! Product (stock) records.

use chrono::{DateTime, Utc};
use grayshop_core::{Price, ProductId};
use serde::{Deserialize, Serialize};

/// A product as listed by `GET /api/products`.
///
/// Owned by the server; the client never edits one in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "ID")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub category: String,
    /// Unit price in minor units.
    pub price: Price,
    /// Units in stock; `None` when the server does not track it.
    #[serde(default)]
    pub inventory: Option<u32>,
    /// Free-form description.
    #[serde(rename = "info", default)]
    pub description: String,
    /// Public path of the uploaded picture, empty when none.
    #[serde(default)]
    pub picture: String,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
}

impl Product {
    /// Category shown on cards; uncategorized products get a placeholder.
    #[must_use]
    pub fn category_label(&self) -> &str {
        if self.category.is_empty() {
            "未分类"
        } else {
            &self.category
        }
    }
}
