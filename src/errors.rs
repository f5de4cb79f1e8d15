//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic conversion into an HTML error page.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::views;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Invalid credentials")]
    InvalidCredentials,

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    /// A unique column rejected the write (`email` or `username`)
    #[error("{field} already exists")]
    Conflict { field: String },

    // Validation
    #[error("Form validation failed")]
    Validation(FormErrors),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    // External service errors
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("Session store error")]
    Cache(#[from] redis::RedisError),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    /// Get HTTP status code
    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Cache(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get user-facing message (hides internal details)
    fn user_message(&self) -> String {
        match self {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Validation(errors) => errors.summary(),

            // Hide details for internal errors
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred.".to_string()
            }
            AppError::Cache(e) => {
                tracing::error!("Session store error: {:?}", e);
                "An internal error occurred.".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred.".to_string()
            }

            _ => format!("{}.", self),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let page = views::pages::error_page(status, &self.user_message());
        (status, Html(page)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    /// Single-field validation failure.
    pub fn validation(field: impl Into<String>, msg: impl Into<String>) -> Self {
        let mut errors = FormErrors::default();
        errors.add(field, msg);
        AppError::Validation(errors)
    }

    pub fn conflict(field: impl Into<String>) -> Self {
        AppError::Conflict {
            field: field.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

/// Field-keyed form errors, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The message displayed next to a field.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn merge(&mut self, other: FormErrors) {
        for (field, messages) in other.fields {
            self.fields.entry(field).or_default().extend(messages);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// Collect `validator` failures. A failed `required` check hides the
    /// other messages of its field.
    pub fn from_validation(errors: &validator::ValidationErrors) -> Self {
        let mut collected = Self::default();
        for (field, errs) in errors.field_errors() {
            let required = errs.iter().find(|e| e.code == "required");
            let shown: Vec<&validator::ValidationError> = match required {
                Some(e) => vec![e],
                None => errs.iter().collect(),
            };
            for e in shown {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                collected.add(field.to_string(), message);
            }
        }
        collected
    }

    /// One line per field, used when errors reach the generic error page.
    fn summary(&self) -> String {
        self.iter()
            .filter_map(|(field, messages)| {
                messages.first().map(|m| format!("{}: {}", field, m))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::conflict("email").status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::internal("boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let message = AppError::internal("connection string leaked").user_message();
        assert!(!message.contains("connection string"));
    }

    #[test]
    fn test_form_errors_first_and_merge() {
        let mut errors = FormErrors::default();
        errors.add("email", "Invalid email address.");
        errors.add("email", "Field must be between 6 and 40 characters long.");
        assert_eq!(errors.first("email"), Some("Invalid email address."));
        assert_eq!(errors.first("username"), None);

        let mut other = FormErrors::default();
        other.add("username", "Username must be unique.");
        errors.merge(other);
        assert_eq!(errors.first("username"), Some("Username must be unique."));
        assert_eq!(errors.iter().count(), 2);
    }

    #[test]
    fn test_validation_constructor() {
        match AppError::validation("password", "too short") {
            AppError::Validation(errors) => {
                assert_eq!(errors.first("password"), Some("too short"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_error_page_response() {
        let response = AppError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
