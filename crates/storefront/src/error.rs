//! Unified error handling with Sentry integration.
//!
//! Every controller returns `Result<T, AppError>`. The dispatcher turns each
//! error into a transient notice; none of them is fatal to the session.

use thiserror::Error;

use crate::token_store::StorageError;

/// Generic message used when the server gives no `msg` or `error` field.
pub const FALLBACK_SERVER_MESSAGE: &str = "请求失败";

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// The server answered 401. The credential has already been cleared
    /// and the shopper redirected to the login view.
    #[error("{}", .0.as_deref().unwrap_or("登录已失效，请重新登录"))]
    Unauthorized(Option<String>),

    /// Any other non-2xx response, carrying the server-supplied message.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Input rejected before any request was sent.
    #[error("{0}")]
    ClientValidation(String),

    /// A protected operation was attempted without a stored credential.
    #[error("请先登录")]
    NotLoggedIn,

    /// Transport failure (connection refused, DNS, TLS, ...).
    #[error("网络错误: {0}")]
    Http(#[from] reqwest::Error),

    /// The server sent a body that does not match the expected schema.
    #[error("响应解析失败: {0}")]
    Decode(#[from] serde_json::Error),

    /// An API path could not be joined onto the configured base URL.
    #[error("无效的请求地址: {0}")]
    Url(#[from] url::ParseError),

    /// Reading or writing the token store failed.
    #[error("本地存储错误: {0}")]
    Storage(#[from] StorageError),
}

impl AppError {
    /// Whether this error should be reported to Sentry.
    ///
    /// Server-side rejections and guard failures are expected user-facing
    /// outcomes; transport and schema failures are not.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Decode(_) | Self::Url(_) | Self::Storage(_)
        )
    }

    /// Whether the notice for this error should be suppressed.
    ///
    /// A missing login is already communicated by the redirect.
    #[must_use]
    pub const fn is_silent(&self) -> bool {
        matches!(self, Self::NotLoggedIn)
    }

    /// Capture the error to Sentry (if reportable) and log it.
    pub fn report(&self) {
        if self.is_reportable() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront action failed"
            );
        } else {
            tracing::debug!(error = %self, "Storefront action rejected");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after a successful login.
pub fn set_sentry_user(user_id: &impl ToString, username: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: username.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout or session expiry.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a shopper action.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, String)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb
            .data
            .insert((*key).to_string(), serde_json::Value::String(value.clone()));
    }

    sentry::add_breadcrumb(breadcrumb);
}
