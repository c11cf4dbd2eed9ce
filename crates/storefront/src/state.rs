//! Everything the front-end shows, owned in one place.

use std::fmt;

use grayshop_core::ProductId;

use crate::models::{CartLine, Order, OrderPage, Product, User};
use crate::services::catalog::{self, CatalogFilter};
use crate::services::CartSummary;

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient message shown after an action, like a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// UI state for one storefront session.
///
/// Server-owned collections are replaced wholesale after every successful
/// read; nothing here is edited in place.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Full product list in server order.
    pub products: Vec<Product>,
    pub filter: CatalogFilter,
    pub cart: Vec<CartLine>,
    pub orders: OrderPage,
    /// Page the order list was last loaded at.
    pub order_page: u32,
    /// Order shown in the detail pane.
    pub open_order: Option<Order>,
    /// Product shown in the detail modal.
    pub modal: Option<ProductId>,
    pub user: Option<User>,
    pub notice: Option<Notice>,
}

impl AppState {
    /// Products passing the current filter, in display order.
    #[must_use]
    pub fn visible_products(&self) -> Vec<&Product> {
        self.filter.apply(&self.products)
    }

    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        catalog::categories(&self.products)
    }

    #[must_use]
    pub fn cart_summary(&self) -> CartSummary {
        CartSummary::of(&self.cart)
    }

    /// The product open in the modal, if it is still loaded.
    #[must_use]
    pub fn modal_product(&self) -> Option<&Product> {
        let id = self.modal?;
        self.products.iter().find(|p| p.id == id)
    }

    /// Drop everything tied to the signed-in shopper.
    pub fn forget_session(&mut self) {
        self.user = None;
        self.cart.clear();
        self.orders = OrderPage::default();
        self.order_page = 0;
        self.open_order = None;
    }
}
