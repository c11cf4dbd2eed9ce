//! Action dispatch.
//!
//! Front-ends translate input into an [`Action`] and hand it to
//! [`App::dispatch`]. The app runs the matching controller, stores what the
//! server returned in [`AppState`] and leaves a [`Notice`] behind. No action
//! error is fatal; the shopper can simply try again.

use grayshop_core::{CartLineId, OrderId, ProductId};
use rust_decimal::Decimal;
use secrecy::SecretString;
use tracing::instrument;

use crate::api::{ApiClient, NewStock};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::CartLine;
use crate::navigation::Route;
use crate::services::catalog::find_product;
use crate::services::orders::FIRST_PAGE;
use crate::services::{
    AccountController, CartController, CatalogController, OrderController, Registration,
    SortKey, StockPublisher,
};
use crate::state::{AppState, Notice};

/// Every user action the storefront understands.
#[derive(Debug)]
pub enum Action {
    Navigate(Route),

    // Catalog
    LoadProducts,
    /// `None` selects all categories.
    SetCategory(Option<String>),
    SetKeyword(String),
    SetPriceRange {
        min: Option<Decimal>,
        max: Option<Decimal>,
    },
    SetSort(SortKey),
    ResetFilter,
    OpenProduct(ProductId),
    CloseProduct,

    // Cart
    LoadCart,
    AddToCart {
        product: ProductId,
        quantity: u32,
    },
    Increment(CartLineId),
    Decrement(CartLineId),
    RemoveLine(CartLineId),
    ClearCart,
    Checkout,

    // Orders
    LoadOrders {
        page: u32,
    },
    OpenOrder(OrderId),
    PayOrder(OrderId),
    CancelOrder(OrderId),

    // Account
    Login {
        account: String,
        password: SecretString,
    },
    Register(Registration),
    Logout,
    LoadMe,

    // Admin
    PublishStock(NewStock),
}

impl Action {
    /// Short name for breadcrumbs and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Navigate(_) => "navigate",
            Self::LoadProducts => "load_products",
            Self::SetCategory(_) => "set_category",
            Self::SetKeyword(_) => "set_keyword",
            Self::SetPriceRange { .. } => "set_price_range",
            Self::SetSort(_) => "set_sort",
            Self::ResetFilter => "reset_filter",
            Self::OpenProduct(_) => "open_product",
            Self::CloseProduct => "close_product",
            Self::LoadCart => "load_cart",
            Self::AddToCart { .. } => "add_to_cart",
            Self::Increment(_) => "increment",
            Self::Decrement(_) => "decrement",
            Self::RemoveLine(_) => "remove_line",
            Self::ClearCart => "clear_cart",
            Self::Checkout => "checkout",
            Self::LoadOrders { .. } => "load_orders",
            Self::OpenOrder(_) => "open_order",
            Self::PayOrder(_) => "pay_order",
            Self::CancelOrder(_) => "cancel_order",
            Self::Login { .. } => "login",
            Self::Register(_) => "register",
            Self::Logout => "logout",
            Self::LoadMe => "load_me",
            Self::PublishStock(_) => "publish_stock",
        }
    }
}

/// The storefront session: one API client, one state.
pub struct App {
    api: ApiClient,
    page_size: u32,
    state: AppState,
}

impl App {
    #[must_use]
    pub fn new(api: ApiClient, page_size: u32) -> Self {
        Self {
            api,
            page_size,
            state: AppState::default(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The view the shopper is on.
    pub async fn route(&self) -> Route {
        self.api.navigator().current().await
    }

    /// Run one action and record its outcome as the current notice.
    #[instrument(skip(self, action), fields(action = action.name()))]
    pub async fn dispatch(&mut self, action: Action) {
        add_breadcrumb("action", action.name(), &[]);
        self.state.notice = None;

        match self.handle(action).await {
            Ok(Some(message)) => self.state.notice = Some(Notice::info(message)),
            Ok(None) => {}
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, error: AppError) {
        error.report();
        if matches!(error, AppError::Unauthorized(_)) {
            self.state.forget_session();
        }
        if !error.is_silent() {
            self.state.notice = Some(Notice::error(error.to_string()));
        }
    }

    async fn handle(&mut self, action: Action) -> Result<Option<String>> {
        let api = &self.api;
        let state = &mut self.state;

        match action {
            Action::Navigate(route) => {
                api.navigator().go(route).await;
                Ok(None)
            }

            Action::LoadProducts => {
                state.products = CatalogController::new(api).load().await?;
                Ok(None)
            }
            Action::SetCategory(category) => {
                state.filter.category = category;
                Ok(None)
            }
            Action::SetKeyword(keyword) => {
                state.filter.keyword = keyword;
                Ok(None)
            }
            Action::SetPriceRange { min, max } => {
                state.filter.min_price = min;
                state.filter.max_price = max;
                Ok(None)
            }
            Action::SetSort(sort) => {
                state.filter.sort = sort;
                Ok(None)
            }
            Action::ResetFilter => {
                state.filter.reset();
                Ok(None)
            }
            Action::OpenProduct(id) => {
                find_product(&state.products, id)?;
                state.modal = Some(id);
                Ok(None)
            }
            Action::CloseProduct => {
                state.modal = None;
                Ok(None)
            }

            Action::LoadCart => {
                state.cart = CartController::new(api).load().await?;
                Ok(None)
            }
            Action::AddToCart { product, quantity } => {
                state.cart = CartController::new(api).add(product, quantity).await?;
                Ok(Some("已加入购物车".to_string()))
            }
            Action::Increment(id) => {
                let line = cart_line(state, id)?;
                state.cart = CartController::new(api).increment(&line).await?;
                Ok(None)
            }
            Action::Decrement(id) => {
                let line = cart_line(state, id)?;
                state.cart = CartController::new(api).decrement(&line).await?;
                Ok(None)
            }
            Action::RemoveLine(id) => {
                state.cart = CartController::new(api).remove(id).await?;
                Ok(None)
            }
            Action::ClearCart => {
                let cleared = CartController::new(api).clear(&state.cart).await?;
                state.cart = cleared.lines;
                match cleared.failure {
                    Some(e) => Err(e),
                    None => Ok(Some("已清空购物车".to_string())),
                }
            }
            Action::Checkout => {
                state.cart = CartController::new(api).checkout(&state.cart).await?;
                state.open_order = None;
                state.order_page = FIRST_PAGE;
                state.orders = OrderController::new(api, self.page_size)
                    .list(FIRST_PAGE)
                    .await?;
                Ok(Some("下单成功".to_string()))
            }

            Action::LoadOrders { page } => {
                let page = page.max(FIRST_PAGE);
                state.orders = OrderController::new(api, self.page_size).list(page).await?;
                state.order_page = page;
                Ok(None)
            }
            Action::OpenOrder(id) => {
                state.open_order = Some(OrderController::new(api, self.page_size).detail(id).await?);
                Ok(None)
            }
            Action::PayOrder(id) => {
                let refreshed = OrderController::new(api, self.page_size)
                    .pay(id, state.order_page)
                    .await?;
                state.orders = refreshed.page;
                state.open_order = Some(refreshed.detail);
                Ok(Some("支付成功".to_string()))
            }
            Action::CancelOrder(id) => {
                let refreshed = OrderController::new(api, self.page_size)
                    .cancel(id, state.order_page)
                    .await?;
                state.orders = refreshed.page;
                state.open_order = Some(refreshed.detail);
                Ok(Some("已取消".to_string()))
            }

            Action::Login { account, password } => {
                let user = AccountController::new(api).login(&account, &password).await?;
                state.user = Some(user);
                Ok(Some("登录成功".to_string()))
            }
            Action::Register(registration) => {
                AccountController::new(api).register(registration).await?;
                Ok(Some("注册成功，请登录".to_string()))
            }
            Action::Logout => {
                AccountController::new(api).logout().await?;
                state.forget_session();
                Ok(Some("已退出登录".to_string()))
            }
            Action::LoadMe => {
                state.user = Some(AccountController::new(api).me().await?);
                Ok(None)
            }

            Action::PublishStock(stock) => {
                StockPublisher::new(api).publish(stock).await?;
                Ok(Some("发布成功".to_string()))
            }
        }
    }
}

fn cart_line(state: &AppState, id: CartLineId) -> Result<CartLine> {
    state
        .cart
        .iter()
        .find(|line| line.id == id)
        .cloned()
        .ok_or_else(|| AppError::ClientValidation("购物车项不存在".to_string()))
}
