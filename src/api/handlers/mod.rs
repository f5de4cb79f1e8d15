//! HTTP request handlers.

pub mod auth_handler;
pub mod main_handler;
pub mod user_handler;

pub use auth_handler::auth_routes;
pub use main_handler::{health, main_routes, not_found};
pub use user_handler::user_routes;

use crate::api::middleware::SessionHandle;
use crate::domain::User;
use crate::views::PageContext;

/// Page context for a render; consumes the queued flashes.
pub(crate) async fn page_context(session: &SessionHandle, user: Option<User>) -> PageContext {
    PageContext {
        user,
        flashes: session.take_flashes().await,
        csrf_token: String::new(),
    }
}

/// Page context for a page with a form, carrying the CSRF token.
pub(crate) async fn form_context(session: &SessionHandle, user: Option<User>) -> PageContext {
    let mut ctx = page_context(session, user).await;
    ctx.csrf_token = session.csrf_token().await;
    ctx
}
