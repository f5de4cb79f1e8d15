//! Repository layer - Data access abstraction
//!
//! Repositories hide the persistence details behind traits so services
//! can be exercised without a database.

pub(crate) mod entities;
mod user_repository;

pub use user_repository::{UserRepository, UserStore};

#[cfg(test)]
pub use user_repository::MockUserRepository;
