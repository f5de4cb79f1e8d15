//! Registration and login forms.

use super::{escape, layout, PageContext};
use crate::config::{CSRF_FIELD, LOGIN_PATH, REGISTER_PATH};
use crate::errors::FormErrors;

/// Register/login page input values echoed back on re-render.
/// Passwords are never echoed.
#[derive(Debug, Clone, Default)]
pub struct FormValues<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub next: &'a str,
}

pub fn register_form(ctx: &PageContext, values: &FormValues<'_>, errors: &FormErrors) -> String {
    let content = format!(
        r#"<h1>Please Register</h1>
<form method="post" action="{REGISTER_PATH}">
{csrf}{form_error}
{email}
{username}
{password}
{confirm}
<button type="submit">Register</button>
</form>
<p>Already have an account? <a href="{LOGIN_PATH}">Log in</a>.</p>"#,
        csrf = csrf_input(ctx),
        form_error = form_error(errors),
        email = field("email", "Email", "email", values.email, errors),
        username = field("username", "Username", "text", values.username, errors),
        password = field("password", "Password", "password", "", errors),
        confirm = field("confirm", "Confirm password", "password", "", errors),
    );
    layout("Register", ctx, &content)
}

pub fn login_form(ctx: &PageContext, values: &FormValues<'_>, errors: &FormErrors) -> String {
    let content = format!(
        r#"<h1>Please Login</h1>
<form method="post" action="{LOGIN_PATH}">
{csrf}{form_error}
<input type="hidden" name="next" value="{next}">
{email}
{password}
<button type="submit">Login</button>
</form>
<p>Need an account? <a href="{REGISTER_PATH}">Register</a>.</p>"#,
        csrf = csrf_input(ctx),
        form_error = form_error(errors),
        next = escape(values.next),
        email = field("email", "Email", "email", values.email, errors),
        password = field("password", "Password", "password", "", errors),
    );
    layout("Login", ctx, &content)
}

fn csrf_input(ctx: &PageContext) -> String {
    format!(
        r#"<input type="hidden" name="{CSRF_FIELD}" value="{}">"#,
        escape(&ctx.csrf_token)
    )
}

/// Errors not tied to a visible field.
fn form_error(errors: &FormErrors) -> String {
    match errors.first(CSRF_FIELD) {
        Some(message) => format!("\n<p class=\"error\">{}</p>", escape(message)),
        None => String::new(),
    }
}

fn field(name: &str, label: &str, kind: &str, value: &str, errors: &FormErrors) -> String {
    let error = errors
        .first(name)
        .map(|message| format!("\n<span class=\"error\">{}</span>", escape(message)))
        .unwrap_or_default();
    format!(
        r#"<p>
<label for="{name}">{label}</label>
<input type="{kind}" id="{name}" name="{name}" value="{value}">{error}
</p>"#,
        value = escape(value),
    )
}
