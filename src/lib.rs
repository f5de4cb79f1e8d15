//! Userbase - user registration and session-based login
//!
//! A server-rendered web application: visitors register with an email,
//! username and password, log in with a cookie session and may only see
//! their own profile.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and logic
//! - **services**: Application use cases and business logic
//! - **infra**: Database, repositories and session storage
//! - **api**: HTTP handlers, middleware, extractors and routes
//! - **views**: HTML rendering
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Seed an account
//! USERBASE_PASSWORD=changeme cargo run -- users create --email admin@example.com --username admin
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod views;

// Re-export commonly used types at crate root
pub use api::{create_router, AppState};
pub use config::Config;
pub use domain::{NewUser, Password, User};
pub use errors::{AppError, AppResult};
pub use infra::{MemorySessionStore, SessionStore, UserRepository};
