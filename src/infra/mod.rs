//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and repositories
//! - Session storage (Redis or in-process)

pub mod cache;
pub mod db;
pub mod repositories;
pub mod session;

pub use cache::Cache;
pub use db::{Database, Migrator};
pub use repositories::{UserRepository, UserStore};
pub use session::{Flash, FlashCategory, MemorySessionStore, SessionData, SessionStore};

#[cfg(test)]
pub use repositories::MockUserRepository;
