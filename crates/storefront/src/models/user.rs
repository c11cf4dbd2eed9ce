//! Account payloads.

use grayshop_core::UserId;
use serde::{Deserialize, Serialize};

/// The signed-in shopper, as returned by `/api/me` and `/api/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Successful `POST /api/login` body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}
