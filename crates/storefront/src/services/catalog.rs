//! Product catalog: loading and client-side filtering.
//!
//! Filtering never mutates the loaded list. Every call to
//! [`CatalogFilter::apply`] starts again from the full server order.

use std::fmt;
use std::str::FromStr;

use grayshop_core::ProductId;
use rust_decimal::Decimal;
use tracing::instrument;

use crate::api::ApiClient;
use crate::error::{AppError, Result};
use crate::models::Product;

/// Product ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Server order.
    #[default]
    Recommended,
    PriceAsc,
    PriceDesc,
    /// Most recently updated first; products without a timestamp go last.
    Newest,
}

impl SortKey {
    /// Wire/CLI name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recommended => "recommended",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Newest => "newest",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" | "recommended" => Ok(Self::Recommended),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "newest" => Ok(Self::Newest),
            other => Err(AppError::ClientValidation(format!("未知的排序方式: {other}"))),
        }
    }
}

/// Catalog filter state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogFilter {
    /// `None` shows every category.
    pub category: Option<String>,
    pub keyword: String,
    /// Inclusive lower bound in major units.
    pub min_price: Option<Decimal>,
    /// Inclusive upper bound in major units.
    pub max_price: Option<Decimal>,
    pub sort: SortKey,
}

impl CatalogFilter {
    /// Back to "all categories, no keyword, no bounds, recommended".
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether `product` passes the category, keyword and price filters.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category
            && product.category != *category
        {
            return false;
        }

        let keyword = self.keyword.trim().to_lowercase();
        if !keyword.is_empty() {
            let haystack = format!(
                "{} {} {}",
                product.name, product.category, product.description
            )
            .to_lowercase();
            if !haystack.contains(&keyword) {
                return false;
            }
        }

        let price = product.price.to_major();
        self.min_price.is_none_or(|min| price >= min)
            && self.max_price.is_none_or(|max| price <= max)
    }

    /// Filter and sort `products`, leaving the input untouched.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let mut list: Vec<&Product> = products.iter().filter(|p| self.matches(p)).collect();

        // `sort_by` is stable, so ties keep server order.
        match self.sort {
            SortKey::Recommended => {}
            SortKey::PriceAsc => list.sort_by(|a, b| a.price.cmp(&b.price)),
            SortKey::PriceDesc => list.sort_by(|a, b| b.price.cmp(&a.price)),
            SortKey::Newest => list.sort_by(|a, b| match (a.last_update, b.last_update) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }),
        }

        list
    }
}

/// Distinct non-empty categories in first-seen order.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for product in products {
        let category = product.category.as_str();
        if !category.is_empty() && !seen.contains(&category) {
            seen.push(category);
        }
    }
    seen
}

/// Look up a loaded product by ID.
///
/// # Errors
///
/// Returns `AppError::ClientValidation` if no loaded product has that ID.
pub fn find_product(products: &[Product], id: ProductId) -> Result<&Product> {
    products
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| AppError::ClientValidation(format!("商品不存在: {id}")))
}

/// Loads the product list.
pub struct CatalogController<'a> {
    api: &'a ApiClient,
}

impl<'a> CatalogController<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Fetch the full product list in server order. No login required.
    ///
    /// # Errors
    ///
    /// Propagates API errors.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Vec<Product>> {
        let products = self.api.list_products().await?;
        tracing::info!(count = products.len(), "Loaded products");
        Ok(products)
    }
}
