//! Grayshop storefront client library.
//!
//! Talks to the shop's REST backend: product catalog, a server-synced cart
//! and the order pay/cancel flow. Front-ends drive it through
//! [`app::App::dispatch`] and display [`render`] views of the resulting
//! [`state::AppState`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use grayshop_storefront::{api::ApiClient, app::{Action, App}, config::StorefrontConfig};
//! use grayshop_storefront::navigation::{Navigator, Route};
//! use grayshop_storefront::token_store::FileTokenStore;
//!
//! let config = StorefrontConfig::from_env()?;
//! let tokens = Arc::new(FileTokenStore::new(&config.token_file, &config.token_key));
//! let api = ApiClient::new(&config, tokens, Navigator::new(Route::Catalog))?;
//!
//! let mut app = App::new(api, config.page_size);
//! app.dispatch(Action::LoadProducts).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod render;
pub mod services;
pub mod state;
pub mod token_store;

pub use error::{AppError, Result};
