//! Shared helpers for router-level tests.
//!
//! The router runs against an in-memory user repository and the in-memory
//! session store, so no database or Redis is needed.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use tokio::sync::Mutex;
use tower::ServiceExt;

use userbase::config::{Config, SessionBackend, SESSION_COOKIE_NAME};
use userbase::errors::{AppError, AppResult};
use userbase::{create_router, AppState, MemorySessionStore, User, UserRepository};

// =============================================================================
// In-memory repository
// =============================================================================

/// User repository backed by a vector, enforcing the same unique columns as
/// the database.
#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<Vec<User>>,
    /// Pretend lookups miss, as when a concurrent registration commits
    /// between the check and the insert
    blind_lookups: AtomicBool,
}

impl InMemoryUsers {
    pub async fn count(&self) -> usize {
        self.users.lock().await.len()
    }

    pub async fn all(&self) -> Vec<User> {
        self.users.lock().await.clone()
    }

    pub fn set_blind_lookups(&self, blind: bool) {
        self.blind_lookups.store(blind, Ordering::SeqCst);
    }

    pub async fn deactivate(&self, id: i32) {
        if let Some(user) = self.users.lock().await.iter_mut().find(|u| u.id == id) {
            user.active = false;
        }
    }

    async fn find(&self, predicate: impl Fn(&User) -> bool) -> Option<User> {
        if self.blind_lookups.load(Ordering::SeqCst) {
            return None;
        }
        self.users.lock().await.iter().find(|u| predicate(u)).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        Ok(self.users.lock().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.find(|u| u.email == email).await)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.find(|u| u.username == username).await)
    }

    async fn create(
        &self,
        email: String,
        username: String,
        password_hash: String,
    ) -> AppResult<User> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email == email) {
            return Err(AppError::conflict("email"));
        }
        if users.iter().any(|u| u.username == username) {
            return Err(AppError::conflict("username"));
        }
        let user = User {
            id: users.len() as i32 + 1,
            email,
            username,
            password_hash,
            registered_on: Utc::now(),
            active: true,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

// =============================================================================
// Test client
// =============================================================================

/// A browser-like client: keeps the session cookie between requests.
pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUsers>,
    pub sessions: Arc<MemorySessionStore>,
    session_cookie: Option<String>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookie: Option<String>,
    pub body: String,
}

impl TestApp {
    /// App with CSRF checks off, so tests can post forms directly.
    pub fn new() -> Self {
        Self::with_config(Config {
            csrf_enabled: false,
            ..test_config()
        })
    }

    pub fn with_csrf() -> Self {
        Self::with_config(test_config())
    }

    fn with_config(config: Config) -> Self {
        let users = Arc::new(InMemoryUsers::default());
        let sessions = Arc::new(MemorySessionStore::new());
        let state = AppState::new(users.clone(), sessions.clone(), config);
        Self {
            router: create_router(state),
            users,
            sessions,
            session_cookie: None,
        }
    }

    /// Forget the session cookie, like a second browser.
    pub fn new_browser(&mut self) {
        self.session_cookie = None;
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_cookie.as_deref()
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = self
            .request_builder("GET", path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(key, value)| format!("{}={}", form_encode(key), form_encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        let request = self
            .request_builder("POST", path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// GET the redirect target of a response.
    pub async fn follow(&mut self, response: &TestResponse) -> TestResponse {
        let location = response
            .location
            .clone()
            .expect("response is not a redirect");
        self.get(&location).await
    }

    pub async fn register(&mut self, email: &str, username: &str, password: &str) -> TestResponse {
        self.post_form(
            "/auth/register",
            &[
                ("email", email),
                ("username", username),
                ("password", password),
                ("confirm", password),
            ],
        )
        .await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        self.post_form("/auth/login", &[("email", email), ("password", password)])
            .await
    }

    fn request_builder(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(id) = &self.session_cookie {
            builder = builder.header(header::COOKIE, format!("{}={}", SESSION_COOKIE_NAME, id));
        }
        builder
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let location = header_string(&response, header::LOCATION);
        let set_cookie = header_string(&response, header::SET_COOKIE);

        if let Some(cookie) = &set_cookie {
            let prefix = format!("{}=", SESSION_COOKIE_NAME);
            if let Some(rest) = cookie.strip_prefix(&prefix) {
                let id = rest.split(';').next().unwrap_or_default();
                self.session_cookie = Some(id.to_string());
            }
        }

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            location,
            set_cookie,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}

fn test_config() -> Config {
    Config {
        session_backend: SessionBackend::Memory,
        ..Config::default()
    }
}

fn header_string(
    response: &axum::http::Response<Body>,
    name: header::HeaderName,
) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn form_encode(value: &str) -> String {
    let mut encoded = String::new();
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'@' | b'/' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

/// Pull the CSRF token out of a rendered form.
pub fn csrf_token(html: &str) -> String {
    let marker = r#"name="csrf_token" value=""#;
    let start = html.find(marker).expect("form has no CSRF field") + marker.len();
    let end = html[start..].find('"').unwrap() + start;
    html[start..end].to_string()
}
