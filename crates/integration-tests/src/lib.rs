//! Integration tests for the Grayshop storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p grayshop-integration-tests
//! ```
//!
//! Each test starts its own [`StubBackend`]: an in-memory axum app that
//! answers the same routes, JSON shapes and error bodies as the real shop
//! server, bound to an ephemeral port. Every request it receives is recorded
//! so tests can assert on exactly what the client sent.
//!
//! # Test Categories
//!
//! - `session` - Bearer header, 401 handling, login guard
//! - `cart_sync` - Request-then-reload cart cycle
//! - `order_flow` - Order list, detail, pay and cancel
//! - `catalog` - Product loading and client-side filtering
//! - `account` - Login, registration and stock publishing

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use grayshop_core::BearerToken;
use grayshop_storefront::api::ApiClient;
use grayshop_storefront::app::App;
use grayshop_storefront::config::StorefrontConfig;
use grayshop_storefront::navigation::{Navigator, Route};
use grayshop_storefront::token_store::{FileTokenStore, TokenStore};
use serde::Deserialize;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::sync::RwLock;

// =============================================================================
// Backend records
// =============================================================================

#[derive(Debug, Clone)]
pub struct Stock {
    pub id: u64,
    pub name: String,
    pub category: String,
    pub price: i64,
    pub inventory: i64,
    pub info: String,
    pub picture: String,
    pub last_update: Option<DateTime<Utc>>,
}

impl Stock {
    fn to_json(&self) -> Value {
        json!({
            "ID": self.id,
            "name": self.name,
            "price": self.price,
            "category": self.category,
            "last_update": self.last_update.map(|t| t.to_rfc3339()),
            "picture": self.picture,
            "info": self.info,
            "inventory": self.inventory,
            "Carts": null,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: u64,
    pub username: String,
    pub password: String,
    pub email: String,
    pub phone_num: String,
}

#[derive(Debug, Clone)]
pub struct CartRow {
    pub id: u64,
    pub user_id: u64,
    pub stock_id: u64,
    pub quantity: i64,
}

#[derive(Debug, Clone)]
pub struct OrderItemRow {
    pub stock_id: u64,
    pub name: String,
    pub price: i64,
    pub qty: i64,
}

#[derive(Debug, Clone)]
pub struct OrderRow {
    pub id: u64,
    pub user_id: u64,
    pub status: String,
    pub total_price: i64,
    pub items: Vec<OrderItemRow>,
}

impl OrderRow {
    fn to_json(&self, with_items: bool) -> Value {
        let items = if with_items {
            Value::Array(
                self.items
                    .iter()
                    .map(|it| {
                        json!({
                            "order_id": self.id,
                            "stock_id": it.stock_id,
                            "name": it.name,
                            "price": it.price,
                            "qty": it.qty,
                        })
                    })
                    .collect(),
            )
        } else {
            Value::Null
        };
        json!({
            "ID": self.id,
            "user_id": self.user_id,
            "status": self.status,
            "total_price": self.total_price,
            "items": items,
        })
    }
}

/// One request as seen by the backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    /// Path plus query string.
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

impl Recorded {
    /// `"METHOD /path"`, handy for asserting request sequences.
    #[must_use]
    pub fn line(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// A multipart upload received on `/api/admin/stocks`.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub fields: HashMap<String, String>,
    pub picture_name: Option<String>,
    pub picture_type: Option<String>,
    pub picture_len: usize,
}

#[derive(Debug, Default)]
pub struct BackendState {
    pub stocks: Vec<Stock>,
    pub users: Vec<Account>,
    pub sessions: HashMap<String, u64>,
    pub cart: Vec<CartRow>,
    pub orders: Vec<OrderRow>,
    pub requests: Vec<Recorded>,
    pub uploads: Vec<Upload>,
    /// Cart line whose delete fails with a 500.
    pub fail_delete: Option<u64>,
    /// Revoke every session when the `fail_delete` line is hit.
    pub expire_on_failed_delete: bool,
    /// Answer `GET /api/cart` and stock uploads with 200 and no body.
    pub empty_replies: bool,
    next_id: u64,
}

impl BackendState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn stock(&self, id: u64) -> Option<&Stock> {
        self.stocks.iter().find(|s| s.id == id)
    }
}

// =============================================================================
// StubBackend
// =============================================================================

/// In-memory shop server on an ephemeral port.
#[derive(Clone)]
pub struct StubBackend {
    state: Arc<RwLock<BackendState>>,
    base_url: String,
}

impl StubBackend {
    /// Bind to `127.0.0.1:0` and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub backend");
        let addr = listener.local_addr().expect("Failed to read local address");

        let backend = Self {
            state: Arc::new(RwLock::new(BackendState::default())),
            base_url: format!("http://{addr}"),
        };

        let app = router(backend.clone());
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Stub backend stopped");
        });

        backend
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Direct access to the backend tables.
    pub async fn state(&self) -> tokio::sync::RwLockWriteGuard<'_, BackendState> {
        self.state.write().await
    }

    /// Every request received so far, as `"METHOD /path"`.
    pub async fn request_lines(&self) -> Vec<String> {
        self.state.read().await.requests.iter().map(Recorded::line).collect()
    }

    pub async fn requests(&self) -> Vec<Recorded> {
        self.state.read().await.requests.clone()
    }

    pub async fn clear_requests(&self) {
        self.state.write().await.requests.clear();
    }

    pub async fn seed_stock(&self, name: &str, category: &str, price: i64, inventory: i64) -> u64 {
        let mut state = self.state.write().await;
        let id = state.next_id();
        state.stocks.push(Stock {
            id,
            name: name.to_string(),
            category: category.to_string(),
            price,
            inventory,
            info: String::new(),
            picture: String::new(),
            last_update: None,
        });
        id
    }

    pub async fn seed_user(&self, username: &str, password: &str, email: &str) -> u64 {
        let mut state = self.state.write().await;
        let id = state.next_id();
        state.users.push(Account {
            id,
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
            phone_num: String::new(),
        });
        id
    }

    /// Issue a session token for `user_id` without going through login.
    pub async fn issue_token(&self, user_id: u64) -> String {
        let token = format!("token-{user_id}");
        self.state
            .write()
            .await
            .sessions
            .insert(token.clone(), user_id);
        token
    }

    /// Invalidate every issued token.
    pub async fn revoke_all(&self) {
        self.state.write().await.sessions.clear();
    }

    pub async fn seed_cart(&self, user_id: u64, stock_id: u64, quantity: i64) -> u64 {
        let mut state = self.state.write().await;
        let id = state.next_id();
        state.cart.push(CartRow {
            id,
            user_id,
            stock_id,
            quantity,
        });
        id
    }

    pub async fn seed_order(&self, user_id: u64, status: &str, items: Vec<OrderItemRow>) -> u64 {
        let mut state = self.state.write().await;
        let id = state.next_id();
        let total_price = items.iter().map(|it| it.price * it.qty).sum();
        state.orders.push(OrderRow {
            id,
            user_id,
            status: status.to_string(),
            total_price,
            items,
        });
        id
    }
}

// =============================================================================
// Test context
// =============================================================================

/// A storefront client wired to a fresh stub backend and a temp token file.
pub struct TestContext {
    pub backend: StubBackend,
    pub tokens: Arc<FileTokenStore>,
    pub navigator: Navigator,
    pub api: ApiClient,
    _dir: TempDir,
}

impl TestContext {
    /// # Panics
    ///
    /// Panics if the backend or client cannot be set up.
    pub async fn new() -> Self {
        let backend = StubBackend::start().await;
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let tokens = Arc::new(FileTokenStore::new(dir.path().join("storage.json"), "token"));
        let navigator = Navigator::new(Route::Catalog);

        let config =
            StorefrontConfig::for_base_url(backend.base_url()).expect("Invalid stub base URL");
        let api = ApiClient::new(&config, tokens.clone(), navigator.clone())
            .expect("Failed to build API client");

        Self {
            backend,
            tokens,
            navigator,
            api,
            _dir: dir,
        }
    }

    /// Seed a user and store a valid token for them. Returns the user ID.
    ///
    /// # Panics
    ///
    /// Panics if the token cannot be stored.
    pub async fn sign_in(&self, username: &str) -> u64 {
        let user_id = self
            .backend
            .seed_user(username, "secret1", &format!("{username}@example.com"))
            .await;
        let token = self.backend.issue_token(user_id).await;
        let token = BearerToken::new(token).expect("Token is not blank");
        self.tokens.set(&token).expect("Failed to store token");
        user_id
    }

    /// An [`App`] sharing this context's client.
    #[must_use]
    pub fn app(&self) -> App {
        App::new(self.api.clone(), 20)
    }
}

// =============================================================================
// Routes
// =============================================================================

fn router(backend: StubBackend) -> Router {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/me", get(me))
        .route("/api/cart", get(get_cart).post(add_cart))
        .route("/api/cart/{id}", put(update_cart).delete(delete_cart))
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/{id}", get(order_detail))
        .route("/api/orders/{id}/pay", post(pay_order))
        .route("/api/orders/{id}/cancel", post(cancel_order))
        .route("/api/admin/stocks", post(create_stock))
        .route(
            "/api/empty",
            get(|| async { StatusCode::OK }).post(|| async { StatusCode::NO_CONTENT }),
        )
        .layer(middleware::from_fn_with_state(backend.clone(), record))
        .with_state(backend)
}

async fn record(State(backend): State<StubBackend>, request: Request, next: Next) -> Response {
    // Built in its own scope: `Body` is not `Sync`, so no borrow of the
    // request may live across the await below.
    let recorded = {
        let header_value = |name: header::HeaderName| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        Recorded {
            method: request.method().to_string(),
            path: request
                .uri()
                .path_and_query()
                .map_or_else(|| request.uri().path().to_string(), ToString::to_string),
            authorization: header_value(header::AUTHORIZATION),
            content_type: header_value(header::CONTENT_TYPE),
        }
    };
    backend.state.write().await.requests.push(recorded);
    next.run(request).await
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn ok() -> Response {
    reply(StatusCode::OK, json!({"msg": "ok"}))
}

fn authorize(state: &BackendState, headers: &HeaderMap) -> Result<u64, Response> {
    let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    else {
        return Err(reply(StatusCode::UNAUTHORIZED, json!({"msg": "未登录"})));
    };
    let Some(token) = value.strip_prefix("Bearer ") else {
        return Err(reply(StatusCode::UNAUTHORIZED, json!({"msg": "token 格式错误"})));
    };
    state
        .sessions
        .get(token)
        .copied()
        .ok_or_else(|| reply(StatusCode::UNAUTHORIZED, json!({"msg": "token 无效"})))
}

async fn list_products(State(backend): State<StubBackend>) -> Response {
    let state = backend.state.read().await;
    let mut stocks: Vec<&Stock> = state.stocks.iter().collect();
    stocks.sort_by(|a, b| b.id.cmp(&a.id));
    let list: Vec<Value> = stocks.into_iter().map(Stock::to_json).collect();
    reply(StatusCode::OK, Value::Array(list))
}

#[derive(Deserialize)]
struct RegisterReq {
    username: String,
    password: String,
    email: String,
    #[serde(default)]
    phone_num: String,
}

async fn register(State(backend): State<StubBackend>, Json(req): Json<RegisterReq>) -> Response {
    let mut state = backend.state.write().await;
    if state
        .users
        .iter()
        .any(|u| u.username == req.username || u.email == req.email)
    {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({"msg": "注册失败(可能重复)", "error": "Duplicate entry"}),
        );
    }
    let id = state.next_id();
    state.users.push(Account {
        id,
        username: req.username.clone(),
        password: req.password,
        email: req.email.clone(),
        phone_num: req.phone_num.clone(),
    });
    reply(
        StatusCode::OK,
        json!({
            "msg": "ok",
            "user": {"id": id, "username": req.username, "email": req.email, "phone_num": req.phone_num},
        }),
    )
}

#[derive(Deserialize)]
struct LoginReq {
    account: String,
    password: String,
}

async fn login(State(backend): State<StubBackend>, Json(req): Json<LoginReq>) -> Response {
    let mut state = backend.state.write().await;
    let Some(user) = state
        .users
        .iter()
        .find(|u| {
            u.username == req.account || u.email == req.account || u.phone_num == req.account
        })
        .filter(|u| u.password == req.password)
        .cloned()
    else {
        return reply(StatusCode::UNAUTHORIZED, json!({"msg": "账号或密码错误"}));
    };

    let token = format!("token-{}", user.id);
    state.sessions.insert(token.clone(), user.id);
    reply(
        StatusCode::OK,
        json!({"msg": "ok", "token": token, "user": {"id": user.id, "username": user.username}}),
    )
}

async fn me(State(backend): State<StubBackend>, headers: HeaderMap) -> Response {
    let state = backend.state.read().await;
    let user_id = match authorize(&state, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.users.iter().find(|u| u.id == user_id) {
        Some(user) => reply(
            StatusCode::OK,
            json!({"id": user.id, "username": user.username, "email": user.email}),
        ),
        None => reply(StatusCode::NOT_FOUND, json!({"msg": "用户不存在"})),
    }
}

async fn get_cart(State(backend): State<StubBackend>, headers: HeaderMap) -> Response {
    let state = backend.state.read().await;
    let user_id = match authorize(&state, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    if state.empty_replies {
        return StatusCode::OK.into_response();
    }
    let lines: Vec<Value> = state
        .cart
        .iter()
        .filter(|row| row.user_id == user_id)
        .filter_map(|row| {
            let stock = state.stock(row.stock_id)?;
            Some(json!({
                "ID": row.id,
                "user_id": row.user_id,
                "stock_id": row.stock_id,
                "quantity": row.quantity,
                "user": {"ID": 0, "username": ""},
                "stock": stock.to_json(),
            }))
        })
        .collect();
    reply(StatusCode::OK, Value::Array(lines))
}

#[derive(Deserialize)]
struct AddCartReq {
    stock_id: u64,
    #[serde(default)]
    quantity: i64,
}

async fn add_cart(
    State(backend): State<StubBackend>,
    headers: HeaderMap,
    Json(req): Json<AddCartReq>,
) -> Response {
    let mut state = backend.state.write().await;
    let user_id = match authorize(&state, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let quantity = req.quantity.max(1);
    let Some(inventory) = state.stock(req.stock_id).map(|s| s.inventory) else {
        return reply(StatusCode::NOT_FOUND, json!({"msg": "商品不存在"}));
    };

    if let Some(row) = state
        .cart
        .iter_mut()
        .find(|row| row.user_id == user_id && row.stock_id == req.stock_id)
    {
        if row.quantity + quantity > inventory {
            return reply(StatusCode::BAD_REQUEST, json!({"msg": "库存不足"}));
        }
        row.quantity += quantity;
        return ok();
    }

    if quantity > inventory {
        return reply(StatusCode::BAD_REQUEST, json!({"msg": "库存不足"}));
    }
    let id = state.next_id();
    state.cart.push(CartRow {
        id,
        user_id,
        stock_id: req.stock_id,
        quantity,
    });
    ok()
}

#[derive(Deserialize)]
struct UpdateCartReq {
    quantity: i64,
}

async fn update_cart(
    State(backend): State<StubBackend>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(req): Json<UpdateCartReq>,
) -> Response {
    let mut state = backend.state.write().await;
    let user_id = match authorize(&state, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    if req.quantity <= 0 {
        return reply(StatusCode::BAD_REQUEST, json!({"msg": "参数错误"}));
    }
    let Some(stock_id) = state
        .cart
        .iter()
        .find(|row| row.id == id && row.user_id == user_id)
        .map(|row| row.stock_id)
    else {
        return reply(StatusCode::NOT_FOUND, json!({"msg": "购物车项不存在"}));
    };
    let Some(inventory) = state.stock(stock_id).map(|s| s.inventory) else {
        return reply(StatusCode::NOT_FOUND, json!({"msg": "商品不存在"}));
    };
    if req.quantity > inventory {
        return reply(StatusCode::BAD_REQUEST, json!({"msg": "库存不足"}));
    }
    if let Some(row) = state.cart.iter_mut().find(|row| row.id == id) {
        row.quantity = req.quantity;
    }
    ok()
}

async fn delete_cart(
    State(backend): State<StubBackend>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    let mut state = backend.state.write().await;
    let user_id = match authorize(&state, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    if state.fail_delete == Some(id) {
        if state.expire_on_failed_delete {
            state.sessions.clear();
        }
        return reply(StatusCode::INTERNAL_SERVER_ERROR, json!({"msg": "删除失败"}));
    }
    state
        .cart
        .retain(|row| !(row.id == id && row.user_id == user_id));
    ok()
}

async fn create_order(State(backend): State<StubBackend>, headers: HeaderMap) -> Response {
    let mut state = backend.state.write().await;
    let user_id = match authorize(&state, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let rows: Vec<CartRow> = state
        .cart
        .iter()
        .filter(|row| row.user_id == user_id)
        .cloned()
        .collect();
    if rows.is_empty() {
        return reply(StatusCode::BAD_REQUEST, json!({"msg": "购物车为空"}));
    }

    let mut items = Vec::new();
    for row in &rows {
        let Some(stock) = state.stock(row.stock_id) else {
            return reply(StatusCode::BAD_REQUEST, json!({"msg": "下单失败", "error": "record not found"}));
        };
        if row.quantity > stock.inventory {
            return reply(
                StatusCode::BAD_REQUEST,
                json!({"msg": "下单失败", "error": format!("库存不足: {}", stock.name)}),
            );
        }
        items.push(OrderItemRow {
            stock_id: stock.id,
            name: stock.name.clone(),
            price: stock.price,
            qty: row.quantity,
        });
    }

    for item in &items {
        if let Some(stock) = state.stocks.iter_mut().find(|s| s.id == item.stock_id) {
            stock.inventory -= item.qty;
        }
    }
    let id = state.next_id();
    let total_price = items.iter().map(|it| it.price * it.qty).sum();
    state.orders.push(OrderRow {
        id,
        user_id,
        status: "pending".to_string(),
        total_price,
        items,
    });
    state.cart.retain(|row| row.user_id != user_id);
    ok()
}

async fn list_orders(
    State(backend): State<StubBackend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let state = backend.state.read().await;
    let user_id = match authorize(&state, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let page = query
        .get("page")
        .and_then(|p| p.parse::<usize>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1);
    let size = query
        .get("page_size")
        .and_then(|p| p.parse::<usize>().ok())
        .filter(|s| (1..=50).contains(s))
        .unwrap_or(10);

    let mut orders: Vec<&OrderRow> = state.orders.iter().filter(|o| o.user_id == user_id).collect();
    orders.sort_by(|a, b| b.id.cmp(&a.id));
    let total = orders.len();
    let list: Vec<Value> = orders
        .into_iter()
        .skip((page - 1) * size)
        .take(size)
        .map(|o| o.to_json(false))
        .collect();

    reply(
        StatusCode::OK,
        json!({"total": total, "page": page, "page_size": size, "list": list}),
    )
}

async fn order_detail(
    State(backend): State<StubBackend>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    let state = backend.state.read().await;
    let user_id = match authorize(&state, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    state
        .orders
        .iter()
        .find(|o| o.id == id && o.user_id == user_id)
        .map_or_else(
            || reply(StatusCode::NOT_FOUND, json!({"msg": "订单不存在"})),
            |o| reply(StatusCode::OK, o.to_json(true)),
        )
}

async fn pay_order(
    State(backend): State<StubBackend>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    let mut guard = backend.state.write().await;
    let state = &mut *guard;
    let user_id = match authorize(state, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Some(order) = state
        .orders
        .iter_mut()
        .find(|o| o.id == id && o.user_id == user_id)
    else {
        return reply(StatusCode::BAD_REQUEST, json!({"msg": "支付失败", "error": "record not found"}));
    };
    let status = order.status.clone();
    match status.as_str() {
        "paid" => ok(),
        "pending" => {
            order.status = "paid".to_string();
            ok()
        }
        other => reply(
            StatusCode::BAD_REQUEST,
            json!({"msg": "支付失败", "error": format!("当前状态不可支付: {other}")}),
        ),
    }
}

async fn cancel_order(
    State(backend): State<StubBackend>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    let mut guard = backend.state.write().await;
    let state = &mut *guard;
    let user_id = match authorize(state, &headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Some(order) = state
        .orders
        .iter_mut()
        .find(|o| o.id == id && o.user_id == user_id)
    else {
        return reply(StatusCode::BAD_REQUEST, json!({"msg": "取消失败", "error": "record not found"}));
    };
    let status = order.status.clone();
    match status.as_str() {
        "canceled" => ok(),
        "paid" => reply(
            StatusCode::BAD_REQUEST,
            json!({"msg": "取消失败", "error": "已支付订单不能直接取消"}),
        ),
        "pending" => {
            order.status = "canceled".to_string();
            let items = order.items.clone();
            for item in items {
                if let Some(stock) = state.stocks.iter_mut().find(|s| s.id == item.stock_id) {
                    stock.inventory += item.qty;
                }
            }
            ok()
        }
        other => reply(
            StatusCode::BAD_REQUEST,
            json!({"msg": "取消失败", "error": format!("当前状态不可取消: {other}")}),
        ),
    }
}

async fn create_stock(
    State(backend): State<StubBackend>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Err(response) = authorize(&*backend.state.read().await, &headers) {
        return response;
    }

    let mut upload = Upload::default();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "picture" {
            upload.picture_name = field.file_name().map(str::to_owned);
            upload.picture_type = field.content_type().map(str::to_owned);
            upload.picture_len = field.bytes().await.map_or(0, |b| b.len());
        } else {
            let value = field.text().await.unwrap_or_default();
            upload.fields.insert(name, value);
        }
    }

    let field = |key: &str| upload.fields.get(key).cloned().unwrap_or_default();
    let name = field("name");
    let price = field("price").parse::<i64>().unwrap_or(0);
    let inventory = field("inventory").parse::<i64>().unwrap_or(-1);
    if name.is_empty() || price <= 0 || inventory < 0 {
        return reply(StatusCode::BAD_REQUEST, json!({"msg": "参数错误"}));
    }

    let mut state = backend.state.write().await;
    let id = state.next_id();
    let stock = Stock {
        id,
        name,
        category: field("category"),
        price,
        inventory,
        info: field("info"),
        picture: upload
            .picture_name
            .as_ref()
            .map(|n| format!("/static/uploads/{n}"))
            .unwrap_or_default(),
        last_update: Some(Utc::now()),
    };
    let body = json!({"msg": "ok", "data": stock.to_json()});
    state.stocks.push(stock);
    state.uploads.push(upload);
    if state.empty_replies {
        return StatusCode::OK.into_response();
    }
    reply(StatusCode::OK, body)
}
