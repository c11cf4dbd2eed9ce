//! Bearer credential type.
//!
//! The token issued by `POST /api/login` is opaque to the client: it is
//! stored, attached to requests, and dropped when the server rejects it.

use core::fmt;

use secrecy::{ExposeSecret, SecretString};

/// Opaque bearer token asserting the shopper's identity.
///
/// `Debug` is redacted so the token never ends up in logs.
#[derive(Clone)]
pub struct BearerToken(SecretString);

impl BearerToken {
    /// Wrap a raw token string. Returns `None` for an empty or blank token.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return None;
        }
        Some(Self(SecretString::from(raw)))
    }

    /// The raw token value.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn authorization_value(&self) -> String {
        format!("Bearer {}", self.expose())
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}
