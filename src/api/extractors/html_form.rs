//! Form extractor - deserialization, validation and CSRF check in one step.

use std::borrow::Cow;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Form,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use validator::{Validate, ValidationError};

use crate::api::middleware::SessionHandle;
use crate::api::AppState;
use crate::config::{CSRF_FIELD, CSRF_INVALID};
use crate::errors::{AppError, FormErrors};

/// Forms that carry the session's CSRF token.
pub trait CsrfProtected {
    fn csrf_token(&self) -> &str;
}

/// A submitted HTML form and the problems found with it.
///
/// Unlike a rejecting extractor, invalid input still reaches the handler so
/// the form can be rendered again with the messages next to each field.
pub struct HtmlForm<T> {
    pub data: T,
    pub errors: FormErrors,
}

#[async_trait]
impl<T> FromRequest<AppState> for HtmlForm<T>
where
    T: DeserializeOwned + Validate + CsrfProtected + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = req.extensions().get::<SessionHandle>().cloned();

        let Form(data) = Form::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let mut errors = match data.validate() {
            Ok(()) => FormErrors::default(),
            Err(e) => FormErrors::from_validation(&e),
        };

        if state.config.csrf_enabled {
            let expected = match &session {
                Some(session) => session.expected_csrf_token().await,
                None => None,
            };
            if expected.as_deref() != Some(data.csrf_token()) {
                tracing::warn!("form rejected, CSRF token mismatch");
                errors.add(CSRF_FIELD, CSRF_INVALID);
            }
        }

        Ok(HtmlForm { data, errors })
    }
}

/// Validator for fields that must not be blank.
pub fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some(Cow::Borrowed("This field is required."));
        return Err(error);
    }
    Ok(())
}

/// Deserialize a text field with surrounding whitespace removed, so the
/// length rules see the value that gets stored.
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Padded {
        #[serde(deserialize_with = "trimmed")]
        name: String,
    }

    #[test]
    fn test_trimmed() {
        let padded: Padded = serde_json::from_str(r#"{"name":"  ab  "}"#).unwrap();
        assert_eq!(padded.name, "ab");
    }

    #[test]
    fn test_required() {
        assert!(required("x").is_ok());
        let error = required("   ").unwrap_err();
        assert_eq!(error.code, "required");
    }
}
