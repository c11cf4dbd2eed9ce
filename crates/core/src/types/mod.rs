//! Core types for Grayshop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod credential;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use credential::BearerToken;
pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use status::*;
