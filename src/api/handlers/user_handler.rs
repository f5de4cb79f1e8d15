//! Account pages.

use axum::{extract::Path, response::Html, routing::get, Router};

use super::page_context;
use crate::api::extractors::CurrentUser;
use crate::api::middleware::SessionHandle;
use crate::api::AppState;
use crate::errors::{AppError, AppResult};
use crate::views::pages;

/// Create user routes (all require login)
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/auth/profile/:id", get(profile))
}

/// Show the logged-in user's profile. Other users' profiles are forbidden.
pub async fn profile(
    CurrentUser(user): CurrentUser,
    session: SessionHandle,
    Path(id): Path<i32>,
) -> AppResult<Html<String>> {
    if id != user.id {
        tracing::warn!(user_id = user.id, requested = id, "profile access denied");
        return Err(AppError::Forbidden);
    }

    let ctx = page_context(&session, Some(user.clone())).await;
    Ok(Html(pages::profile(&ctx, &user)))
}
