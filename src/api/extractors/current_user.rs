//! Route-level access control.

use axum::{
    async_trait,
    extract::{FromRequestParts, OriginalUri},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};

use crate::api::middleware::SessionHandle;
use crate::api::AppState;
use crate::config::{FLASH_LOGIN_REQUIRED, LOGIN_PATH};
use crate::domain::User;
use crate::errors::{AppError, AppResult};
use crate::infra::FlashCategory;

/// The logged-in account; anonymous requests are sent to the login page.
///
/// ```rust,ignore
/// async fn secret(CurrentUser(user): CurrentUser) -> String {
///     user.username
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// The logged-in account, if any.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = SessionHandle::from_request_parts(parts, state).await?;
        Ok(Viewer(resolve_user(&session, state).await?))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = SessionHandle::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match resolve_user(&session, state)
            .await
            .map_err(IntoResponse::into_response)?
        {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                let uri = parts
                    .extensions
                    .get::<OriginalUri>()
                    .map(|uri| &uri.0)
                    .unwrap_or(&parts.uri);
                let path = uri
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_else(|| uri.path().to_string());
                tracing::debug!(path = %path, "login required");

                session
                    .flash(FlashCategory::Info, FLASH_LOGIN_REQUIRED)
                    .await;
                let target = format!("{}?next={}", LOGIN_PATH, encode_query_value(&path));
                Err(Redirect::to(&target).into_response())
            }
        }
    }
}

/// Map the session's user id to an active account. Stale ids are cleared.
async fn resolve_user(session: &SessionHandle, state: &AppState) -> AppResult<Option<User>> {
    let Some(user_id) = session.user_id().await else {
        return Ok(None);
    };

    match state.accounts.get_user(user_id).await {
        Ok(user) if user.is_active() => Ok(Some(user)),
        Ok(_) | Err(AppError::NotFound) => {
            tracing::info!(user_id, "dropping session of missing or inactive user");
            session.clear_user().await;
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Percent-encode a path for use as a query value.
fn encode_query_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
