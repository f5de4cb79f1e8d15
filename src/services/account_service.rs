//! Account service - registration, credential checks and user lookup.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::config::{DUPLICATE_EMAIL, DUPLICATE_USERNAME};
use crate::domain::{NewUser, Password, User};
use crate::errors::{AppError, AppResult, FormErrors};
use crate::infra::UserRepository;

/// Hash checked when the email is unknown, so a miss costs the same as a
/// wrong password.
static DUMMY_HASH: Lazy<String> = Lazy::new(|| {
    Password::new("userbase-timing-parity")
        .map(Password::into_string)
        .unwrap_or_default()
});

/// Account service trait for dependency injection.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an account.
    ///
    /// # Errors
    /// `AppError::Validation` keyed by `email` and/or `username` when either
    /// is taken, including when a concurrent registration wins the race
    /// between the check and the insert.
    async fn register(&self, new_user: NewUser) -> AppResult<User>;

    /// Check an email/password pair.
    ///
    /// # Errors
    /// `AppError::InvalidCredentials` for an unknown email, a wrong password
    /// or an inactive account, without saying which.
    async fn authenticate(&self, email: &str, password: &str) -> AppResult<User>;

    /// Load an account by id; `AppError::NotFound` if it does not exist.
    async fn get_user(&self, id: i32) -> AppResult<User>;
}

/// Concrete implementation of AccountService
pub struct AccountManager {
    users: Arc<dyn UserRepository>,
}

impl AccountManager {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl AccountService for AccountManager {
    async fn register(&self, new_user: NewUser) -> AppResult<User> {
        let NewUser {
            email,
            username,
            password,
        } = new_user;

        let mut taken = FormErrors::default();
        if self.users.find_by_email(&email).await?.is_some() {
            taken.add("email", DUPLICATE_EMAIL);
        }
        if self.users.find_by_username(&username).await?.is_some() {
            taken.add("username", DUPLICATE_USERNAME);
        }
        if !taken.is_empty() {
            tracing::debug!(email = %email, username = %username, "registration rejected, identity taken");
            return Err(AppError::Validation(taken));
        }

        let password_hash = Password::new(&password)?.into_string();

        match self.users.create(email, username, password_hash).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, username = %user.username, "user registered");
                Ok(user)
            }
            // Lost a race with a concurrent registration for the same identity
            Err(AppError::Conflict { field }) => {
                tracing::warn!(field = %field, "unique constraint rejected registration");
                Err(AppError::validation(field.clone(), duplicate_message(&field)))
            }
            Err(e) => Err(e),
        }
    }

    async fn authenticate(&self, email: &str, password: &str) -> AppResult<User> {
        let email = email.trim().to_lowercase();
        let user = self.users.find_by_email(&email).await?;

        let stored = match &user {
            Some(user) => Password::from_hash(user.password_hash.clone()),
            None => Password::from_hash(DUMMY_HASH.clone()),
        };
        let password_valid = stored.verify(password);

        match user {
            Some(user) if password_valid && user.is_active() => Ok(user),
            _ => {
                tracing::debug!(email = %email, "failed login attempt");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    async fn get_user(&self, id: i32) -> AppResult<User> {
        self.users.find_by_id(id).await?.ok_or(AppError::NotFound)
    }
}

fn duplicate_message(field: &str) -> &'static str {
    match field {
        "username" => DUPLICATE_USERNAME,
        _ => DUPLICATE_EMAIL,
    }
}
