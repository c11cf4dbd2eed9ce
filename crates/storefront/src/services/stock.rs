//! Admin stock publishing.

use tracing::instrument;

use super::ensure_login;
use crate::api::{ApiClient, NewStock};
use crate::error::{AppError, Result};
use crate::models::Product;

/// Publishes new products through `POST /api/admin/stocks`.
pub struct StockPublisher<'a> {
    api: &'a ApiClient,
}

impl<'a> StockPublisher<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Upload `stock`. Admin rights are checked by the server.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ClientValidation` for a blank name or non-positive
    /// price, `AppError::NotLoggedIn` without a credential, or any API error.
    #[instrument(skip(self, stock), fields(name = %stock.name, price = %stock.price))]
    pub async fn publish(&self, stock: NewStock) -> Result<Option<Product>> {
        if stock.name.trim().is_empty() {
            return Err(AppError::ClientValidation("请输入商品名称".to_string()));
        }
        if stock.price.minor() <= 0 {
            return Err(AppError::ClientValidation("价格必须大于 0".to_string()));
        }
        ensure_login(self.api).await?;

        let created = self.api.publish_stock(stock).await?;
        if let Some(product) = &created {
            tracing::info!(product_id = %product.id, "Stock published");
        }
        Ok(created)
    }
}
