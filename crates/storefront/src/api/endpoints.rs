//! Typed wrappers over every backend endpoint.

use grayshop_core::{CartLineId, Email, OrderId, Price, ProductId};
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{ApiClient, Request};
use crate::error::Result;
use crate::models::{CartLine, LoginResponse, Order, OrderPage, Product, User};

// =============================================================================
// Request payloads
// =============================================================================

#[derive(Serialize)]
struct LoginRequest<'a> {
    account: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    password: &'a str,
    email: &'a str,
    phone_num: &'a str,
}

#[derive(Serialize)]
struct AddToCartRequest {
    stock_id: ProductId,
    quantity: u32,
}

#[derive(Serialize)]
struct UpdateQuantityRequest {
    quantity: u32,
}

/// Validated sign-up details.
#[derive(Debug)]
pub struct RegisterForm {
    pub username: String,
    pub password: SecretString,
    pub email: Email,
    /// Optional; sent as an empty string when not given.
    pub phone_num: String,
}

/// Image attached to a new stock record.
#[derive(Debug, Clone)]
pub struct Picture {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// MIME type, e.g. `image/png`. Guessed by the server when absent.
    pub mime: Option<String>,
}

/// A product to publish through the admin endpoint.
#[derive(Debug, Clone)]
pub struct NewStock {
    pub name: String,
    pub price: Price,
    pub category: String,
    pub info: String,
    pub inventory: u32,
    pub picture: Option<Picture>,
}

impl NewStock {
    fn into_form(self) -> Result<Form> {
        let mut form = Form::new()
            .text("name", self.name)
            .text("price", self.price.minor().to_string())
            .text("category", self.category)
            .text("info", self.info)
            .text("inventory", self.inventory.to_string());

        if let Some(picture) = self.picture {
            let mut part = Part::bytes(picture.bytes).file_name(picture.file_name);
            if let Some(mime) = picture.mime {
                part = part.mime_str(&mime)?;
            }
            form = form.part("picture", part);
        }

        Ok(form)
    }
}

#[derive(Deserialize)]
struct Published {
    #[serde(default)]
    data: Option<Product>,
}

// =============================================================================
// Endpoints
// =============================================================================

impl ApiClient {
    /// `GET /api/products`, newest first as ordered by the server.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let products: Option<Vec<Product>> = self.fetch("/api/products", Request::get()).await?;
        Ok(products.unwrap_or_default())
    }

    /// `GET /api/me`.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<User> {
        self.fetch("/api/me", Request::get()).await
    }

    /// `POST /api/login`. The account may be a username, email or phone number.
    #[instrument(skip(self, password))]
    pub async fn login(&self, account: &str, password: &SecretString) -> Result<LoginResponse> {
        let request = Request::post().json(&LoginRequest {
            account,
            password: password.expose_secret(),
        })?;
        self.fetch("/api/login", request).await
    }

    /// `POST /api/register`.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn register(&self, form: &RegisterForm) -> Result<()> {
        let request = Request::post().json(&RegisterRequest {
            username: &form.username,
            password: form.password.expose_secret(),
            email: form.email.as_str(),
            phone_num: &form.phone_num,
        })?;
        self.call("/api/register", request).await?;
        Ok(())
    }

    /// `POST /api/admin/stocks` as a multipart form.
    ///
    /// Returns the created record when the server echoes it back.
    #[instrument(skip(self, stock), fields(name = %stock.name))]
    pub async fn publish_stock(&self, stock: NewStock) -> Result<Option<Product>> {
        let request = Request::post().multipart(stock.into_form()?);
        let published: Option<Published> = self.fetch("/api/admin/stocks", request).await?;
        Ok(published.and_then(|p| p.data))
    }

    /// `GET /api/cart`.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<Vec<CartLine>> {
        let lines: Option<Vec<CartLine>> = self.fetch("/api/cart", Request::get()).await?;
        Ok(lines.unwrap_or_default())
    }

    /// `POST /api/cart`. The server adds `quantity` to any existing line.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, stock_id: ProductId, quantity: u32) -> Result<()> {
        let request = Request::post().json(&AddToCartRequest { stock_id, quantity })?;
        self.call("/api/cart", request).await?;
        Ok(())
    }

    /// `PUT /api/cart/:id` with an absolute quantity.
    #[instrument(skip(self))]
    pub async fn update_cart_line(&self, id: CartLineId, quantity: u32) -> Result<()> {
        let request = Request::put().json(&UpdateQuantityRequest { quantity })?;
        self.call(&format!("/api/cart/{id}"), request).await?;
        Ok(())
    }

    /// `DELETE /api/cart/:id`.
    #[instrument(skip(self))]
    pub async fn delete_cart_line(&self, id: CartLineId) -> Result<()> {
        self.call(&format!("/api/cart/{id}"), Request::delete())
            .await?;
        Ok(())
    }

    /// `POST /api/orders`: turn the whole cart into a pending order.
    #[instrument(skip(self))]
    pub async fn create_order(&self) -> Result<()> {
        self.call("/api/orders", Request::post()).await?;
        Ok(())
    }

    /// `GET /api/orders?page=&page_size=`.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, page: u32, page_size: u32) -> Result<OrderPage> {
        let page: Option<OrderPage> = self
            .fetch(
                &format!("/api/orders?page={page}&page_size={page_size}"),
                Request::get(),
            )
            .await?;
        Ok(page.unwrap_or_default())
    }

    /// `GET /api/orders/:id` with items.
    #[instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order> {
        self.fetch(&format!("/api/orders/{id}"), Request::get())
            .await
    }

    /// `POST /api/orders/:id/pay`.
    #[instrument(skip(self))]
    pub async fn pay_order(&self, id: OrderId) -> Result<()> {
        self.call(&format!("/api/orders/{id}/pay"), Request::post())
            .await?;
        Ok(())
    }

    /// `POST /api/orders/:id/cancel`.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, id: OrderId) -> Result<()> {
        self.call(&format!("/api/orders/{id}/cancel"), Request::post())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_payload_field_names() {
        let json = serde_json::to_value(LoginRequest {
            account: "gray",
            password: "secret1",
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"account": "gray", "password": "secret1"}));
    }

    #[test]
    fn test_add_to_cart_payload() {
        let json = serde_json::to_value(AddToCartRequest {
            stock_id: ProductId::new(4),
            quantity: 1,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"stock_id": 4, "quantity": 1}));
    }

    #[test]
    fn test_published_without_data() {
        let published: Published = serde_json::from_str(r#"{"msg": "ok"}"#).unwrap();
        assert!(published.data.is_none());
    }
}
