//! Controllers between the shopper's actions and the REST API.
//!
//! # Services
//!
//! - `catalog` - Product loading plus client-side filter and sort
//! - `cart` - Cart mutations, each followed by a full reload
//! - `orders` - Order list, detail, pay and cancel
//! - `account` - Login, registration, logout and current user
//! - `stock` - Admin stock publishing
//!
//! Controllers borrow the [`ApiClient`] and hand fresh server data back to the
//! caller; they never keep a local copy that could drift from the server.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod stock;

pub use account::{AccountController, Registration};
pub use cart::{CartController, CartSummary, Cleared};
pub use catalog::{CatalogController, CatalogFilter, SortKey};
pub use orders::{OrderController, Refreshed};
pub use stock::StockPublisher;

use crate::api::ApiClient;
use crate::error::{AppError, Result};

/// Fail with `NotLoggedIn` (after redirecting to login) when no credential
/// is stored. No request is issued in that case.
pub(crate) async fn ensure_login(api: &ApiClient) -> Result<()> {
    if api.has_token()? {
        return Ok(());
    }
    api.navigator().redirect_to_login().await;
    Err(AppError::NotLoggedIn)
}
