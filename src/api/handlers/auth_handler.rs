//! Authentication handlers: registration, login and logout.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use validator::Validate;

use super::form_context;
use crate::api::extractors::{required, trimmed, CsrfProtected, CurrentUser, HtmlForm, Viewer};
use crate::api::middleware::SessionHandle;
use crate::api::AppState;
use crate::config::{
    FLASH_INVALID_LOGIN, FLASH_LOGGED_OUT, FLASH_REGISTERED, FLASH_WELCOME, HOME_PATH, LOGIN_PATH,
    LOGOUT_PATH, REGISTER_PATH,
};
use crate::domain::NewUser;
use crate::errors::{AppError, AppResult, FormErrors};
use crate::infra::FlashCategory;
use crate::views::forms::{self, FormValues};

/// Registration form
#[derive(Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterForm {
    #[serde(deserialize_with = "trimmed")]
    #[validate(
        custom(function = "required"),
        email(message = "Invalid email address."),
        length(min = 6, max = 40, message = "Field must be between 6 and 40 characters long.")
    )]
    pub email: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(
        custom(function = "required"),
        length(min = 3, max = 25, message = "Field must be between 3 and 25 characters long.")
    )]
    pub username: String,
    #[validate(
        custom(function = "required"),
        length(min = 6, max = 25, message = "Field must be between 6 and 25 characters long.")
    )]
    pub password: String,
    #[validate(
        custom(function = "required"),
        must_match(other = "password", message = "Passwords must match.")
    )]
    pub confirm: String,
    pub csrf_token: String,
}

impl CsrfProtected for RegisterForm {
    fn csrf_token(&self) -> &str {
        &self.csrf_token
    }
}

/// Login form
#[derive(Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginForm {
    #[serde(deserialize_with = "trimmed")]
    #[validate(custom(function = "required"), email(message = "Invalid email address."))]
    pub email: String,
    #[validate(custom(function = "required"))]
    pub password: String,
    /// Where to go after logging in
    pub next: String,
    pub csrf_token: String,
}

impl CsrfProtected for LoginForm {
    fn csrf_token(&self) -> &str {
        &self.csrf_token
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginQuery {
    pub next: String,
}

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(REGISTER_PATH, get(register_page).post(register))
        .route(LOGIN_PATH, get(login_page).post(login))
        .route(LOGOUT_PATH, get(logout))
}

/// Show the registration form
pub async fn register_page(Viewer(viewer): Viewer, session: SessionHandle) -> Html<String> {
    let ctx = form_context(&session, viewer).await;
    Html(forms::register_form(
        &ctx,
        &FormValues::default(),
        &FormErrors::default(),
    ))
}

/// Register a new user and log them in
pub async fn register(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    session: SessionHandle,
    HtmlForm {
        data: form,
        mut errors,
    }: HtmlForm<RegisterForm>,
) -> AppResult<Response> {
    if errors.is_empty() {
        let new_user = NewUser::new(&form.email, &form.username, &form.password);
        match state.accounts.register(new_user).await {
            Ok(user) => {
                session.login(user.id).await;
                session
                    .flash(FlashCategory::Success, FLASH_REGISTERED)
                    .await;
                tracing::info!(user_id = user.id, "registration complete, session started");
                return Ok(Redirect::to(HOME_PATH).into_response());
            }
            Err(AppError::Validation(found)) => errors.merge(found),
            Err(e) => return Err(e),
        }
    }

    let ctx = form_context(&session, viewer).await;
    let values = FormValues {
        email: &form.email,
        username: &form.username,
        next: "",
    };
    Ok(Html(forms::register_form(&ctx, &values, &errors)).into_response())
}

/// Show the login form
pub async fn login_page(
    Viewer(viewer): Viewer,
    session: SessionHandle,
    Query(query): Query<LoginQuery>,
) -> Html<String> {
    let ctx = form_context(&session, viewer).await;
    let values = FormValues {
        next: &query.next,
        ..Default::default()
    };
    Html(forms::login_form(&ctx, &values, &FormErrors::default()))
}

/// Check credentials and start a session
pub async fn login(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    session: SessionHandle,
    HtmlForm { data: form, errors }: HtmlForm<LoginForm>,
) -> AppResult<Response> {
    if errors.is_empty() {
        match state.accounts.authenticate(&form.email, &form.password).await {
            Ok(user) => {
                session.login(user.id).await;
                session.flash(FlashCategory::Success, FLASH_WELCOME).await;
                tracing::info!(user_id = user.id, "user logged in");
                return Ok(Redirect::to(safe_next(&form.next)).into_response());
            }
            Err(AppError::InvalidCredentials) => {
                session
                    .flash(FlashCategory::Danger, FLASH_INVALID_LOGIN)
                    .await;
            }
            Err(e) => return Err(e),
        }
    }

    let values = FormValues {
        email: &form.email,
        username: "",
        next: &form.next,
    };
    let ctx = form_context(&session, viewer).await;
    Ok(Html(forms::login_form(&ctx, &values, &errors)).into_response())
}

/// End the session
pub async fn logout(CurrentUser(user): CurrentUser, session: SessionHandle) -> Redirect {
    session.logout().await;
    session.flash(FlashCategory::Info, FLASH_LOGGED_OUT).await;
    tracing::info!(user_id = user.id, "user logged out");
    Redirect::to(HOME_PATH)
}

/// Accept only same-site absolute paths as a post-login target.
fn safe_next(next: &str) -> &str {
    let is_local = next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && !next.chars().any(char::is_control);
    if is_local {
        next
    } else {
        HOME_PATH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_form(email: &str, username: &str, password: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            confirm: confirm.to_string(),
            csrf_token: String::new(),
        }
    }

    fn errors_of(form: &RegisterForm) -> FormErrors {
        match form.validate() {
            Ok(()) => FormErrors::default(),
            Err(e) => FormErrors::from_validation(&e),
        }
    }

    #[test]
    fn test_valid_registration_form() {
        let form = register_form("ann@example.com", "ann", "secret1", "secret1");
        assert!(errors_of(&form).is_empty());
    }

    #[test]
    fn test_passwords_must_match() {
        let form = register_form("ann@example.com", "ann", "secret1", "secret2");
        assert_eq!(errors_of(&form).first("confirm"), Some("Passwords must match."));
    }

    #[test]
    fn test_field_lengths() {
        let form = register_form("ann@example.com", "an", "12345", "12345");
        let errors = errors_of(&form);
        assert_eq!(
            errors.first("username"),
            Some("Field must be between 3 and 25 characters long.")
        );
        assert_eq!(
            errors.first("password"),
            Some("Field must be between 6 and 25 characters long.")
        );
    }

    #[test]
    fn test_invalid_email() {
        let form = register_form("not-an-email", "ann", "secret1", "secret1");
        assert_eq!(errors_of(&form).first("email"), Some("Invalid email address."));
    }

    #[test]
    fn test_blank_fields_report_required_only() {
        let errors = errors_of(&RegisterForm::default());
        assert_eq!(errors.first("email"), Some("This field is required."));
        assert_eq!(errors.first("confirm"), Some("This field is required."));
        assert_eq!(errors.iter().map(|(_, m)| m.len()).max(), Some(1));
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next("/auth/profile/1"), "/auth/profile/1");
        assert_eq!(safe_next(""), HOME_PATH);
        assert_eq!(safe_next("https://evil.example"), HOME_PATH);
        assert_eq!(safe_next("//evil.example"), HOME_PATH);
        assert_eq!(safe_next("/\\evil.example"), HOME_PATH);
    }
}
