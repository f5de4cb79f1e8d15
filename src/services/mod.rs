//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on repository traits, never on
//! a concrete database.

mod account_service;

pub use account_service::{AccountManager, AccountService};
