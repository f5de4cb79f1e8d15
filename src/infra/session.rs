//! Server-side session records.
//!
//! The browser only holds an opaque session id; everything else lives in a
//! [`SessionStore`] keyed by that id.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};
use uuid::Uuid;

use crate::errors::AppResult;

/// Visual category of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Success,
    Info,
    Danger,
}

impl FlashCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashCategory::Success => "success",
            FlashCategory::Info => "info",
            FlashCategory::Danger => "danger",
        }
    }
}

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

/// Everything stored for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// Logged-in account, if any
    #[serde(default)]
    pub user_id: Option<i32>,
    #[serde(default)]
    pub flashes: Vec<Flash>,
    #[serde(default)]
    pub csrf_token: String,
}

/// Generate an unguessable session id.
pub fn new_session_id() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Generate a CSRF token bound to one session.
pub fn new_csrf_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Storage for session records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a live session. Expired and unknown ids both yield `None`.
    async fn load(&self, session_id: &str) -> AppResult<Option<SessionData>>;

    /// Insert or replace a session, resetting its lifetime.
    async fn save(&self, session_id: &str, data: &SessionData, ttl_seconds: u64) -> AppResult<()>;

    async fn destroy(&self, session_id: &str) -> AppResult<()>;

    /// Check the backend is reachable.
    async fn ping(&self) -> AppResult<()>;
}

/// Process-local session store for development and tests.
///
/// Sessions are lost on restart and are not shared between processes.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, (SessionData, Instant)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired ones included until the next save.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, session_id: &str) -> AppResult<Option<SessionData>> {
        let now = Instant::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(session_id) {
                Some((data, expires_at)) if *expires_at > now => return Ok(Some(data.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired
        self.sessions.write().await.remove(session_id);
        Ok(None)
    }

    async fn save(&self, session_id: &str, data: &SessionData, ttl_seconds: u64) -> AppResult<()> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        // Sweep sessions nobody came back for
        let before = sessions.len();
        sessions.retain(|_, (_, expires_at)| *expires_at > now);
        let swept = before - sessions.len();
        if swept > 0 {
            tracing::debug!(swept, "expired sessions removed");
        }

        sessions.insert(
            session_id.to_string(),
            (data.clone(), now + Duration::from_secs(ttl_seconds)),
        );
        Ok(())
    }

    async fn destroy(&self, session_id: &str) -> AppResult<()> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logged_in(user_id: i32) -> SessionData {
        SessionData {
            user_id: Some(user_id),
            flashes: vec![Flash {
                category: FlashCategory::Success,
                message: "Welcome.".to_string(),
            }],
            csrf_token: new_csrf_token(),
        }
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = MemorySessionStore::new();
        let data = logged_in(3);

        store.save("abc", &data, 60).await.unwrap();

        assert_eq!(store.load("abc").await.unwrap(), Some(data));
        assert_eq!(store.load("unknown").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_session_is_dropped() {
        let store = MemorySessionStore::new();
        store.save("old", &logged_in(1), 0).await.unwrap();

        assert_eq!(store.load("old").await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_save_sweeps_expired_sessions() {
        let store = MemorySessionStore::new();
        for i in 0..100 {
            store
                .save(&format!("abandoned-{}", i), &SessionData::default(), 0)
                .await
                .unwrap();
        }

        store.save("live", &logged_in(1), 60).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.load("live").await.unwrap().map(|d| d.user_id), Some(Some(1)));
    }

    #[tokio::test]
    async fn test_destroy() {
        let store = MemorySessionStore::new();
        store.save("abc", &logged_in(1), 60).await.unwrap();

        store.destroy("abc").await.unwrap();

        assert_eq!(store.load("abc").await.unwrap(), None);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = new_session_id();
        let b = new_session_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_session_data_tolerates_missing_fields() {
        let data: SessionData = serde_json::from_str(r#"{"user_id":5}"#).unwrap();
        assert_eq!(data.user_id, Some(5));
        assert!(data.flashes.is_empty());
        assert!(data.csrf_token.is_empty());
    }

    #[test]
    fn test_flash_category_serializes_lowercase() {
        let json = serde_json::to_string(&FlashCategory::Danger).unwrap();
        assert_eq!(json, r#""danger""#);
        assert_eq!(FlashCategory::Info.as_str(), "info");
    }
}
