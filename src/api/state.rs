//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{SessionStore, UserRepository};
use crate::services::{AccountManager, AccountService};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Registration, login and user lookup
    pub accounts: Arc<dyn AccountService>,
    /// Direct repository access (health checks)
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build the state, wiring an `AccountManager` over the repository.
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionStore>,
        config: Config,
    ) -> Self {
        Self {
            accounts: Arc::new(AccountManager::new(users.clone())),
            users,
            sessions,
            config: Arc::new(config),
        }
    }
}
