//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_REDIS_URL, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DEFAULT_SESSION_TTL_SECONDS, SESSION_BACKEND_MEMORY, SESSION_BACKEND_REDIS,
};

/// Where session records are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Redis,
    Memory,
}

impl SessionBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            SESSION_BACKEND_REDIS => Some(Self::Redis),
            SESSION_BACKEND_MEMORY => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub session_backend: SessionBackend,
    pub session_ttl_seconds: u64,
    /// Mark the session cookie `Secure` (only when served over HTTPS)
    pub session_cookie_secure: bool,
    pub csrf_enabled: bool,
    pub server_host: String,
    pub server_port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("session_backend", &self.session_backend)
            .field("session_ttl_seconds", &self.session_ttl_seconds)
            .field("session_cookie_secure", &self.session_cookie_secure)
            .field("csrf_enabled", &self.csrf_enabled)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            session_backend: SessionBackend::Redis,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            session_cookie_secure: false,
            csrf_enabled: true,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables fall back to the defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let session_backend = match env::var("SESSION_BACKEND") {
            Ok(value) => SessionBackend::parse(&value).unwrap_or_else(|| {
                tracing::warn!(value = %value, "unknown SESSION_BACKEND, using redis");
                SessionBackend::Redis
            }),
            Err(_) => defaults.session_backend,
        };

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            session_backend,
            session_ttl_seconds: parse_var("SESSION_TTL_SECONDS")
                .unwrap_or(defaults.session_ttl_seconds),
            session_cookie_secure: parse_bool("SESSION_COOKIE_SECURE")
                .unwrap_or(defaults.session_cookie_secure),
            csrf_enabled: parse_bool("CSRF_ENABLED").unwrap_or(defaults.csrf_enabled),
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn parse_bool(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server_port, DEFAULT_SERVER_PORT);
        assert_eq!(config.session_backend, SessionBackend::Redis);
        assert!(config.csrf_enabled);
        assert!(!config.session_cookie_secure);
        assert_eq!(config.server_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_session_backend_parse() {
        assert_eq!(SessionBackend::parse("redis"), Some(SessionBackend::Redis));
        assert_eq!(SessionBackend::parse(" Memory "), Some(SessionBackend::Memory));
        assert_eq!(SessionBackend::parse("sqlite"), None);
    }

    #[test]
    fn test_debug_redacts_urls() {
        let config = Config::default();
        let printed = format!("{:?}", config);
        assert!(printed.contains("[REDACTED]"));
        assert!(!printed.contains("postgres://"));
        assert!(!printed.contains("redis://"));
    }
}
