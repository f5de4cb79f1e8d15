//! Cookie-backed session middleware.
//!
//! Loads the session named by the `userbase_session` cookie before the
//! handler runs and writes it back afterwards if the handler changed it.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{
        header::{InvalidHeaderValue, SET_COOKIE},
        request::Parts,
        HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tokio::sync::Mutex;

use crate::api::AppState;
use crate::config::{Config, SESSION_COOKIE_NAME};
use crate::errors::{AppError, AppResult};
use crate::infra::session::{new_csrf_token, new_session_id};
use crate::infra::{Flash, FlashCategory, SessionData};

/// The current request's session, shared between extractors and the
/// middleware.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<SessionState>>,
}

#[derive(Debug)]
struct SessionState {
    id: String,
    data: SessionData,
    /// A record exists in the store under `id`
    persisted: bool,
    /// The browser does not know `id` yet
    issue_cookie: bool,
    dirty: bool,
    /// Rotated-away id to delete from the store
    stale_id: Option<String>,
}

/// What the middleware must write once the handler is done.
#[derive(Debug)]
struct SessionCommit {
    id: String,
    data: SessionData,
    issue_cookie: bool,
    stale_id: Option<String>,
}

impl SessionHandle {
    fn existing(id: String, data: SessionData) -> Self {
        Self::from_state(SessionState {
            id,
            data,
            persisted: true,
            issue_cookie: false,
            dirty: false,
            stale_id: None,
        })
    }

    /// A new anonymous session. It is only stored once something is put in it.
    fn fresh() -> Self {
        Self::from_state(SessionState {
            id: new_session_id(),
            data: SessionData::default(),
            persisted: false,
            issue_cookie: true,
            dirty: false,
            stale_id: None,
        })
    }

    fn from_state(state: SessionState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub async fn user_id(&self) -> Option<i32> {
        self.inner.lock().await.data.user_id
    }

    /// Bind the session to an account under a new id.
    pub async fn login(&self, user_id: i32) {
        let mut state = self.inner.lock().await;
        state.rotate();
        state.data.user_id = Some(user_id);
    }

    /// Drop everything in the session and continue under a new id.
    pub async fn logout(&self) {
        let mut state = self.inner.lock().await;
        state.rotate();
        state.data = SessionData::default();
    }

    /// Forget a user id that no longer resolves to an active account.
    pub async fn clear_user(&self) {
        let mut state = self.inner.lock().await;
        if state.data.user_id.take().is_some() {
            state.dirty = true;
        }
    }

    pub async fn flash(&self, category: FlashCategory, message: impl Into<String>) {
        let mut state = self.inner.lock().await;
        state.data.flashes.push(Flash {
            category,
            message: message.into(),
        });
        state.dirty = true;
    }

    /// Remove and return the queued flashes.
    pub async fn take_flashes(&self) -> Vec<Flash> {
        let mut state = self.inner.lock().await;
        if state.data.flashes.is_empty() {
            return Vec::new();
        }
        state.dirty = true;
        std::mem::take(&mut state.data.flashes)
    }

    /// CSRF token for forms rendered in this session, created on first use.
    pub async fn csrf_token(&self) -> String {
        let mut state = self.inner.lock().await;
        if state.data.csrf_token.is_empty() {
            state.data.csrf_token = new_csrf_token();
            state.dirty = true;
        }
        state.data.csrf_token.clone()
    }

    /// Token a submitted form must match; never creates one.
    pub async fn expected_csrf_token(&self) -> Option<String> {
        let state = self.inner.lock().await;
        Some(state.data.csrf_token.clone()).filter(|token| !token.is_empty())
    }

    async fn commit(&self) -> Option<SessionCommit> {
        let mut state = self.inner.lock().await;
        if !state.dirty {
            return None;
        }
        state.dirty = false;
        state.persisted = true;
        let commit = SessionCommit {
            id: state.id.clone(),
            data: state.data.clone(),
            issue_cookie: state.issue_cookie,
            stale_id: state.stale_id.take(),
        };
        state.issue_cookie = false;
        Some(commit)
    }
}

impl SessionState {
    fn rotate(&mut self) {
        let previous = std::mem::replace(&mut self.id, new_session_id());
        if self.persisted {
            self.stale_id = Some(previous);
        }
        self.persisted = false;
        self.data.csrf_token = new_csrf_token();
        self.issue_cookie = true;
        self.dirty = true;
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionHandle
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionHandle>()
            .cloned()
            .ok_or_else(|| AppError::internal("session middleware is not installed"))
    }
}

/// Session middleware.
///
/// Attaches a [`SessionHandle`] to the request, then persists the session
/// and issues the cookie if the handler modified it.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(request.headers());
    let loaded = match jar.get(SESSION_COOKIE_NAME) {
        Some(cookie) => {
            let id = cookie.value().to_string();
            state.sessions.load(&id).await?.map(|data| (id, data))
        }
        None => None,
    };

    let session = match loaded {
        Some((id, data)) => SessionHandle::existing(id, data),
        None => SessionHandle::fresh(),
    };
    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;

    if let Some(commit) = session.commit().await {
        persist(&state, &commit).await?;
        if commit.issue_cookie {
            let cookie = session_cookie(&state.config, &commit.id)
                .map_err(|e| AppError::internal(format!("Invalid session cookie: {}", e)))?;
            response.headers_mut().append(SET_COOKIE, cookie);
        }
    }

    Ok(response)
}

async fn persist(state: &AppState, commit: &SessionCommit) -> AppResult<()> {
    if let Some(stale_id) = &commit.stale_id {
        state.sessions.destroy(stale_id).await?;
        tracing::debug!("session rotated");
    }
    state
        .sessions
        .save(&commit.id, &commit.data, state.config.session_ttl_seconds)
        .await
}

/// Build the `HttpOnly` cookie carrying the session id.
fn session_cookie(config: &Config, session_id: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds;
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={session_id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.session_cookie_secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}
