//! API middleware.

mod session;

pub use session::{session_middleware, SessionHandle};
