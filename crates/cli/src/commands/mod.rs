//! Subcommands and their mapping onto storefront actions.
//!
//! A command expands to a short list of [`Action`]s. The list starts with the
//! loads the command depends on, so a one-shot invocation works on fresh
//! server data just like a long-running shell does.

pub mod publish;
pub mod shell;

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Subcommand;
use grayshop_core::{CartLineId, OrderId, ProductId};
use grayshop_storefront::app::{Action, App};
use grayshop_storefront::config::ConfigError;
use grayshop_storefront::navigation::Route;
use grayshop_storefront::render::{
    CartView, CatalogView, OrderDetailView, OrdersView, ProductView, Screen,
};
use grayshop_storefront::services::{Registration, SortKey};
use grayshop_storefront::AppError;
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

/// Errors that stop the CLI itself, as opposed to storefront notices.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    App(#[from] AppError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid price: {0} (at most two decimal places)")]
    InvalidPrice(Decimal),
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List products, optionally filtered and sorted
    Products {
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,

        /// Case-insensitive search over name, category and description
        #[arg(short, long)]
        keyword: Option<String>,

        /// Minimum price in yuan (inclusive)
        #[arg(long)]
        min: Option<Decimal>,

        /// Maximum price in yuan (inclusive)
        #[arg(long)]
        max: Option<Decimal>,

        /// `recommended`, `price_asc`, `price_desc` or `newest`
        #[arg(short, long, default_value = "recommended")]
        sort: String,
    },
    /// Reset the catalog filter
    Reset,
    /// Show one product
    Show { id: ProductId },
    /// Show the cart
    Cart,
    /// Add a product to the cart
    Add {
        product: ProductId,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// One more unit of a cart line
    Inc { line: CartLineId },
    /// One less unit of a cart line (removes it at zero)
    Dec { line: CartLineId },
    /// Remove a cart line
    Remove { line: CartLineId },
    /// Remove every cart line
    Clear,
    /// Place an order for the whole cart
    Checkout,
    /// List orders
    Orders {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Show one order with its items
    Order { id: OrderId },
    /// Pay a pending order
    Pay { id: OrderId },
    /// Cancel a pending order
    Cancel { id: OrderId },
    /// Log in with a username, email or phone number
    Login { account: String, password: String },
    /// Create an account
    Register {
        username: String,
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
        #[arg(long, default_value = "")]
        phone: String,
    },
    /// Forget the stored token
    Logout,
    /// Show the current user
    Me,
    /// Publish a new product (admin)
    Publish {
        name: String,
        /// Price in yuan, e.g. 399.00
        #[arg(long)]
        price: Decimal,
        #[arg(long, default_value_t = 0)]
        inventory: u32,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "")]
        info: String,
        /// Image file to upload
        #[arg(long)]
        picture: Option<PathBuf>,
    },
    /// Interactive session
    Shell,
}

/// Which part of the state a command prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Catalog,
    Product,
    Cart,
    Orders,
    Account,
    /// Nothing besides the notice.
    Quiet,
}

impl Command {
    /// The view printed after the command runs.
    #[must_use]
    pub const fn view(&self) -> View {
        match self {
            Self::Products { .. } | Self::Reset => View::Catalog,
            Self::Show { .. } => View::Product,
            Self::Cart
            | Self::Add { .. }
            | Self::Inc { .. }
            | Self::Dec { .. }
            | Self::Remove { .. }
            | Self::Clear => View::Cart,
            Self::Checkout
            | Self::Orders { .. }
            | Self::Order { .. }
            | Self::Pay { .. }
            | Self::Cancel { .. } => View::Orders,
            Self::Me | Self::Login { .. } => View::Account,
            Self::Register { .. } | Self::Logout | Self::Publish { .. } | Self::Shell => {
                View::Quiet
            }
        }
    }

    /// Expand into storefront actions.
    ///
    /// # Errors
    ///
    /// Returns `CliError` for input that cannot become an action (bad sort
    /// key, unreadable picture, price with too many decimals).
    pub async fn into_actions(self) -> Result<Vec<Action>, CliError> {
        let actions = match self {
            Self::Products {
                category,
                keyword,
                min,
                max,
                sort,
            } => vec![
                Action::Navigate(Route::Catalog),
                Action::LoadProducts,
                Action::SetCategory(category),
                Action::SetKeyword(keyword.unwrap_or_default()),
                Action::SetPriceRange { min, max },
                Action::SetSort(sort.parse::<SortKey>()?),
            ],
            Self::Reset => vec![
                Action::Navigate(Route::Catalog),
                Action::LoadProducts,
                Action::ResetFilter,
            ],
            Self::Show { id } => vec![
                Action::Navigate(Route::Catalog),
                Action::LoadProducts,
                Action::OpenProduct(id),
            ],
            Self::Cart => vec![Action::LoadCart],
            Self::Add { product, quantity } => vec![Action::AddToCart { product, quantity }],
            Self::Inc { line } => vec![Action::LoadCart, Action::Increment(line)],
            Self::Dec { line } => vec![Action::LoadCart, Action::Decrement(line)],
            Self::Remove { line } => vec![Action::RemoveLine(line)],
            Self::Clear => vec![Action::LoadCart, Action::ClearCart],
            Self::Checkout => vec![Action::LoadCart, Action::Checkout],
            Self::Orders { page } => vec![
                Action::Navigate(Route::Orders),
                Action::LoadOrders { page },
            ],
            Self::Order { id } => vec![Action::Navigate(Route::Orders), Action::OpenOrder(id)],
            Self::Pay { id } => vec![Action::Navigate(Route::Orders), Action::PayOrder(id)],
            Self::Cancel { id } => vec![Action::Navigate(Route::Orders), Action::CancelOrder(id)],
            Self::Login { account, password } => vec![Action::Login {
                account,
                password: SecretString::from(password),
            }],
            Self::Register {
                username,
                email,
                password,
                confirm,
                phone,
            } => vec![Action::Register(Registration {
                username,
                password: SecretString::from(password),
                confirm_password: SecretString::from(confirm),
                email,
                phone_num: phone,
            })],
            Self::Logout => vec![Action::Logout],
            Self::Me => vec![Action::LoadMe],
            Self::Publish {
                name,
                price,
                inventory,
                category,
                info,
                picture,
            } => {
                let stock =
                    publish::new_stock(name, price, inventory, category, info, picture).await?;
                vec![Action::Navigate(Route::Admin), Action::PublishStock(stock)]
            }
            Self::Shell => Vec::new(),
        };
        Ok(actions)
    }
}

/// Dispatch `actions` in order, stopping at the first error notice.
///
/// Returns `true` if every action succeeded.
pub async fn dispatch_all(app: &mut App, actions: Vec<Action>) -> bool {
    for action in actions {
        app.dispatch(action).await;
        if app.state().notice.as_ref().is_some_and(|n| n.is_error()) {
            return false;
        }
        // A guard redirect is silent; nothing after it can succeed.
        if app.state().notice.is_none() && app.route().await == Route::Login {
            return false;
        }
    }
    true
}

/// Print `view` followed by the current notice.
///
/// # Errors
///
/// Returns `io::Error` if stdout cannot be written.
pub async fn print(app: &App, view: View) -> io::Result<()> {
    let text = render(app, view).await;
    write_out(&text)
}

pub(crate) fn write_out(text: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    out.write_all(text.as_bytes())?;
    out.flush()
}

async fn render(app: &App, view: View) -> String {
    let state = app.state();
    let route = app.route().await;

    // A redirect to login replaces whatever the command meant to show.
    if route == Route::Login && view != View::Account && view != View::Quiet {
        return Screen { state, route }.to_string();
    }

    let mut text = match view {
        View::Catalog => CatalogView(state).to_string(),
        View::Product => state
            .modal_product()
            .map(|p| ProductView(p).to_string())
            .unwrap_or_default(),
        View::Cart => CartView(state).to_string(),
        View::Orders => {
            let mut text = OrdersView(state).to_string();
            if let Some(order) = &state.open_order {
                text.push('\n');
                text.push_str(&OrderDetailView(order).to_string());
            }
            text
        }
        View::Account => state
            .user
            .as_ref()
            .map(|u| format!("已登录: {} (#{})\n", u.username, u.id))
            .unwrap_or_default(),
        View::Quiet => String::new(),
    };

    if let Some(notice) = &state.notice {
        let marker = if notice.is_error() { "!" } else { "*" };
        text.push_str(&format!("{marker} {notice}\n"));
    }
    text
}

/// Run a one-shot command and print its view.
///
/// # Errors
///
/// Returns `CliError` for unusable input or if stdout cannot be written.
pub async fn execute(app: &mut App, command: Command) -> Result<bool, CliError> {
    let (ok, text) = run_command(app, command).await?;
    write_out(&text)?;
    Ok(ok)
}

/// Dispatch `command` and render its view.
///
/// Returns whether every action succeeded, and the text to print.
///
/// # Errors
///
/// Returns `CliError` for input that cannot become an action.
pub async fn run_command(app: &mut App, command: Command) -> Result<(bool, String), CliError> {
    let view = command.view();
    let actions = command.into_actions().await?;
    let ok = dispatch_all(app, actions).await;
    Ok((ok, render(app, view).await))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn names(actions: &[Action]) -> Vec<&'static str> {
        actions.iter().map(Action::name).collect()
    }

    #[tokio::test]
    async fn test_products_expands_to_load_and_filter() {
        let actions = Command::Products {
            category: Some("数码".to_string()),
            keyword: None,
            min: None,
            max: Some(Decimal::from(200)),
            sort: "price_asc".to_string(),
        }
        .into_actions()
        .await
        .unwrap();
        assert_eq!(
            names(&actions),
            vec![
                "navigate",
                "load_products",
                "set_category",
                "set_keyword",
                "set_price_range",
                "set_sort"
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_sort_is_rejected() {
        let result = Command::Products {
            category: None,
            keyword: None,
            min: None,
            max: None,
            sort: "cheapest".to_string(),
        }
        .into_actions()
        .await;
        assert!(matches!(result, Err(CliError::App(AppError::ClientValidation(_)))));
    }

    #[tokio::test]
    async fn test_decrement_loads_cart_first() {
        let actions = Command::Dec {
            line: CartLineId::new(3),
        }
        .into_actions()
        .await
        .unwrap();
        assert_eq!(names(&actions), vec!["load_cart", "decrement"]);
    }

    #[test]
    fn test_views() {
        assert_eq!(Command::Clear.view(), View::Cart);
        assert_eq!(Command::Pay { id: OrderId::new(1) }.view(), View::Orders);
        assert_eq!(Command::Logout.view(), View::Quiet);
    }
}
