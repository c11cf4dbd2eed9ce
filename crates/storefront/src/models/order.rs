//! Orders and order pages.

use grayshop_core::{OrderId, OrderStatus, Price, ProductId};
use serde::{Deserialize, Serialize};

use super::null_as_default;

/// An order as returned by the list and detail endpoints.
///
/// The list endpoint does not preload items, so `items` is empty there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "ID")]
    pub id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
    /// Total in minor units, computed server-side at checkout.
    #[serde(default)]
    pub total_price: Price,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<OrderItem>,
}

/// A line of an order, snapshotted at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub stock_id: ProductId,
    pub name: String,
    /// Unit price in minor units at checkout time.
    pub price: Price,
    pub qty: u32,
}

/// One page of `GET /api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderPage {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub list: Vec<Order>,
}
