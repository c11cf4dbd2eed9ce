//! Cart synchronization.
//!
//! Every mutation is one request followed by a full `GET /api/cart`. There is
//! no optimistic update and no local merge: the reloaded list is the only
//! cart state the caller ever sees.

use grayshop_core::{CartLineId, Price, ProductId};
use tracing::instrument;

use super::ensure_login;
use crate::api::ApiClient;
use crate::error::{AppError, Result};
use crate::models::CartLine;
use crate::navigation::Route;

/// Derived figures for the cart drawer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartSummary {
    pub lines: usize,
    pub total_quantity: u64,
    pub total: Price,
}

impl CartSummary {
    #[must_use]
    pub fn of(lines: &[CartLine]) -> Self {
        Self {
            lines: lines.len(),
            total_quantity: lines.iter().map(|l| u64::from(l.quantity)).sum(),
            total: lines.iter().map(CartLine::line_total).sum(),
        }
    }
}

/// Result of clearing the cart.
///
/// `lines` is the cart as reloaded afterwards; `failure` is the delete that
/// stopped the run, if any.
#[derive(Debug)]
pub struct Cleared {
    pub lines: Vec<CartLine>,
    pub failure: Option<AppError>,
}

/// Cart operations against `/api/cart`.
pub struct CartController<'a> {
    api: &'a ApiClient,
}

impl<'a> CartController<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Fetch the current cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotLoggedIn` without a credential, or any API error.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Vec<CartLine>> {
        ensure_login(self.api).await?;
        self.api.get_cart().await
    }

    /// Add `quantity` units of a product. The server merges with an existing
    /// line, so a first add of 1 yields quantity 1.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ClientValidation` for a zero quantity,
    /// `AppError::NotLoggedIn` without a credential, or any API error.
    #[instrument(skip(self))]
    pub async fn add(&self, stock_id: ProductId, quantity: u32) -> Result<Vec<CartLine>> {
        if quantity == 0 {
            return Err(AppError::ClientValidation("数量必须大于 0".to_string()));
        }
        ensure_login(self.api).await?;
        self.api.add_to_cart(stock_id, quantity).await?;
        self.api.get_cart().await
    }

    /// Set a line to an absolute quantity; zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotLoggedIn` without a credential, or any API error.
    #[instrument(skip(self))]
    pub async fn set_quantity(&self, id: CartLineId, quantity: u32) -> Result<Vec<CartLine>> {
        ensure_login(self.api).await?;
        if quantity == 0 {
            self.api.delete_cart_line(id).await?;
        } else {
            self.api.update_cart_line(id, quantity).await?;
        }
        self.api.get_cart().await
    }

    /// One more unit of `line`.
    ///
    /// # Errors
    ///
    /// Same as [`CartController::set_quantity`].
    pub async fn increment(&self, line: &CartLine) -> Result<Vec<CartLine>> {
        self.set_quantity(line.id, line.quantity.saturating_add(1))
            .await
    }

    /// One less unit of `line`; the last unit removes it.
    ///
    /// # Errors
    ///
    /// Same as [`CartController::set_quantity`].
    pub async fn decrement(&self, line: &CartLine) -> Result<Vec<CartLine>> {
        self.set_quantity(line.id, line.quantity.saturating_sub(1))
            .await
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotLoggedIn` without a credential, or any API error.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: CartLineId) -> Result<Vec<CartLine>> {
        self.set_quantity(id, 0).await
    }

    /// Delete `lines` one at a time, then reload.
    ///
    /// Stops at the first failed delete; lines already deleted stay deleted.
    /// The cart is reloaded either way, except after a 401, when there is no
    /// session left to reload with.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotLoggedIn` without a credential. When the reload
    /// fails, returns the delete error, unless the reload hit a 401.
    #[instrument(skip(self, lines), fields(count = lines.len()))]
    pub async fn clear(&self, lines: &[CartLine]) -> Result<Cleared> {
        ensure_login(self.api).await?;

        let mut failure = None;
        for line in lines {
            if let Err(e) = self.api.delete_cart_line(line.id).await {
                tracing::warn!(line_id = %line.id, error = %e, "Clearing cart stopped");
                failure = Some(e);
                break;
            }
        }

        if let Some(e @ AppError::Unauthorized(_)) = failure {
            return Err(e);
        }

        match self.api.get_cart().await {
            Ok(lines) => Ok(Cleared { lines, failure }),
            Err(reload @ AppError::Unauthorized(_)) => Err(reload),
            Err(reload) => Err(failure.unwrap_or(reload)),
        }
    }

    /// Turn the cart into a pending order and switch to the orders view.
    ///
    /// Returns the reloaded (normally empty) cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ClientValidation` for an empty cart,
    /// `AppError::NotLoggedIn` without a credential, or any API error.
    #[instrument(skip(self, lines), fields(count = lines.len()))]
    pub async fn checkout(&self, lines: &[CartLine]) -> Result<Vec<CartLine>> {
        ensure_login(self.api).await?;
        if lines.is_empty() {
            return Err(AppError::ClientValidation("购物车为空".to_string()));
        }

        self.api.create_order().await?;
        tracing::info!(
            total = %CartSummary::of(lines).total,
            "Order placed"
        );

        let lines = self.api.get_cart().await?;
        self.api.navigator().go(Route::Orders).await;
        Ok(lines)
    }
}
