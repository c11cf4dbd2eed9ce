//! Account service: login, registration, logout and the current user.

use grayshop_core::{BearerToken, Email};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use super::ensure_login;
use crate::api::{ApiClient, RegisterForm};
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::models::User;
use crate::navigation::Route;

/// Minimum password length, in characters.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Sign-up form as typed by the shopper.
#[derive(Debug)]
pub struct Registration {
    pub username: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
    pub email: String,
    pub phone_num: String,
}

impl Registration {
    /// Check the form before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ClientValidation` with the first problem found.
    pub fn validate(self) -> Result<RegisterForm> {
        let username = self.username.trim().to_string();
        if username.is_empty() {
            return Err(AppError::ClientValidation("请输入用户名".to_string()));
        }

        validate_password(self.password.expose_secret())?;
        if self.password.expose_secret() != self.confirm_password.expose_secret() {
            return Err(AppError::ClientValidation("两次密码不一致".to_string()));
        }

        let email =
            Email::parse(&self.email).map_err(|e| AppError::ClientValidation(e.to_string()))?;

        Ok(RegisterForm {
            username,
            password: self.password,
            email,
            phone_num: self.phone_num.trim().to_string(),
        })
    }
}

/// Account operations.
pub struct AccountController<'a> {
    api: &'a ApiClient,
}

impl<'a> AccountController<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Log in with a username, email or phone number, store the token and
    /// go to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ClientValidation` for blank input,
    /// `AppError::Unauthorized` for wrong credentials, or any API error.
    #[instrument(skip(self, password))]
    pub async fn login(&self, account: &str, password: &SecretString) -> Result<User> {
        let account = account.trim();
        if account.is_empty() || password.expose_secret().is_empty() {
            return Err(AppError::ClientValidation("请输入账号和密码".to_string()));
        }

        let response = self.api.login(account, password).await?;
        let token = BearerToken::new(response.token).ok_or_else(|| {
            AppError::Decode(serde::de::Error::custom("login response carries no token"))
        })?;
        self.api.tokens().set(&token)?;

        set_sentry_user(&response.user.id, Some(&response.user.username));
        tracing::info!(user_id = %response.user.id, "Logged in");

        self.api.navigator().go(Route::Catalog).await;
        Ok(response.user)
    }

    /// Validate and submit a sign-up, then go to the login view.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ClientValidation` before any request when the form
    /// is invalid, or any API error.
    #[instrument(skip(self, registration), fields(username = %registration.username))]
    pub async fn register(&self, registration: Registration) -> Result<()> {
        let form = registration.validate()?;
        self.api.register(&form).await?;
        tracing::info!("Registered");
        self.api.navigator().go(Route::Login).await;
        Ok(())
    }

    /// Forget the token and go to the login view. Nothing is sent.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the token store cannot be written.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        self.api.tokens().clear()?;
        clear_sentry_user();
        self.api.navigator().go(Route::Login).await;
        Ok(())
    }

    /// The current user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotLoggedIn` without a credential, or any API error.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<User> {
        ensure_login(self.api).await?;
        let user = self.api.me().await?;
        set_sentry_user(&user.id, Some(&user.username));
        Ok(user)
    }
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::ClientValidation(format!(
            "密码至少 {MIN_PASSWORD_LENGTH} 位"
        )));
    }
    Ok(())
}
