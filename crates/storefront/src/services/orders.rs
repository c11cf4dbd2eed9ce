//! Order list, detail and status transitions.

use grayshop_core::OrderId;
use tracing::instrument;

use super::ensure_login;
use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{Order, OrderPage};

/// First page of the order list.
pub const FIRST_PAGE: u32 = 1;

/// Server state after a pay or cancel.
#[derive(Debug, Clone)]
pub struct Refreshed {
    pub page: OrderPage,
    pub detail: Order,
}

/// Order operations against `/api/orders`.
pub struct OrderController<'a> {
    api: &'a ApiClient,
    page_size: u32,
}

impl<'a> OrderController<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient, page_size: u32) -> Self {
        Self { api, page_size }
    }

    /// Fetch one page of orders.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotLoggedIn` without a credential, or any API error.
    #[instrument(skip(self), fields(page_size = self.page_size))]
    pub async fn list(&self, page: u32) -> Result<OrderPage> {
        ensure_login(self.api).await?;
        let page = self.api.list_orders(page.max(FIRST_PAGE), self.page_size).await?;
        tracing::debug!(total = page.total, shown = page.list.len(), "Loaded orders");
        Ok(page)
    }

    /// Fetch one order with its items.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotLoggedIn` without a credential, or any API error.
    #[instrument(skip(self))]
    pub async fn detail(&self, id: OrderId) -> Result<Order> {
        ensure_login(self.api).await?;
        self.api.get_order(id).await
    }

    /// Pay a pending order, then reload `page` and the order's detail.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotLoggedIn` without a credential, or any API error.
    #[instrument(skip(self))]
    pub async fn pay(&self, id: OrderId, page: u32) -> Result<Refreshed> {
        ensure_login(self.api).await?;
        self.api.pay_order(id).await?;
        tracing::info!(order_id = %id, "Order paid");
        self.refresh(id, page).await
    }

    /// Cancel a pending order, then reload `page` and the order's detail.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotLoggedIn` without a credential, or any API error.
    #[instrument(skip(self))]
    pub async fn cancel(&self, id: OrderId, page: u32) -> Result<Refreshed> {
        ensure_login(self.api).await?;
        self.api.cancel_order(id).await?;
        tracing::info!(order_id = %id, "Order canceled");
        self.refresh(id, page).await
    }

    async fn refresh(&self, id: OrderId, page: u32) -> Result<Refreshed> {
        let page = self.api.list_orders(page.max(FIRST_PAGE), self.page_size).await?;
        let detail = self.api.get_order(id).await?;
        Ok(Refreshed { page, detail })
    }
}
