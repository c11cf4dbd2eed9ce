//! Current view tracking.
//!
//! The browser build navigated with `location.href`. Here a route change is
//! a value swap that the front-end observes when it renders.

use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;

/// Top-level views of the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Route {
    /// Product grid, filters and cart drawer.
    #[default]
    Catalog,
    Login,
    Register,
    /// Order list and the open order detail.
    Orders,
    /// Stock publishing form.
    Admin,
}

impl Route {
    /// Path of the equivalent web page.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Catalog => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Orders => "/orders",
            Self::Admin => "/admin",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Shared handle on the current route.
///
/// Cloning is cheap; all clones observe the same route.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    current: Arc<RwLock<Route>>,
}

impl Navigator {
    /// Create a navigator starting at `route`.
    #[must_use]
    pub fn new(route: Route) -> Self {
        Self {
            current: Arc::new(RwLock::new(route)),
        }
    }

    /// The current route.
    pub async fn current(&self) -> Route {
        *self.current.read().await
    }

    /// Switch to `route`.
    pub async fn go(&self, route: Route) {
        let mut current = self.current.write().await;
        if *current != route {
            tracing::debug!(from = %*current, to = %route, "Navigating");
            *current = route;
        }
    }

    /// Send the shopper to the login view unless they are already there.
    ///
    /// Returns `true` if the route changed.
    pub async fn redirect_to_login(&self) -> bool {
        let mut current = self.current.write().await;
        if *current == Route::Login {
            return false;
        }
        tracing::info!(from = %*current, "Redirecting to login");
        *current = Route::Login;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_redirect_to_login_once() {
        let nav = Navigator::new(Route::Orders);
        assert!(nav.redirect_to_login().await);
        assert_eq!(nav.current().await, Route::Login);
        assert!(!nav.redirect_to_login().await);
    }

    #[tokio::test]
    async fn test_clones_share_route() {
        let nav = Navigator::default();
        let other = nav.clone();
        other.go(Route::Admin).await;
        assert_eq!(nav.current().await, Route::Admin);
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Catalog.path(), "/");
        assert_eq!(Route::Login.to_string(), "/login");
    }
}
