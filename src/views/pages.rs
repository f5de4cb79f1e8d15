//! Static and account pages.

use axum::http::StatusCode;

use super::{escape, layout, PageContext};
use crate::config::REGISTER_PATH;
use crate::domain::User;

pub fn home(ctx: &PageContext) -> String {
    let greeting = match &ctx.user {
        Some(user) => format!("<p>Hello, {}!</p>", escape(&user.username)),
        None => format!(
            r#"<p>New here? <a href="{REGISTER_PATH}">Create an account</a>.</p>"#
        ),
    };
    layout("Home", ctx, &format!("<h1>Welcome!</h1>\n{greeting}"))
}

pub fn about(ctx: &PageContext) -> String {
    layout(
        "About",
        ctx,
        "<h1>About</h1>\n<p>Register an account, log in and view your profile.</p>",
    )
}

pub fn profile(ctx: &PageContext, user: &User) -> String {
    let content = format!(
        r#"<h1>Your Profile</h1>
<dl>
<dt>Username</dt><dd>{username}</dd>
<dt>Email</dt><dd>{email}</dd>
<dt>Registered on</dt><dd>{registered_on}</dd>
</dl>"#,
        username = escape(&user.username),
        email = escape(&user.email),
        registered_on = user.registered_on.format("%Y-%m-%d %H:%M UTC"),
    );
    layout("Profile", ctx, &content)
}

pub fn not_found(ctx: &PageContext) -> String {
    layout(
        "Not Found",
        ctx,
        "<h1>404 Not Found</h1>\n<p>Sorry, there is nothing here.</p>",
    )
}

/// Standalone error page, rendered without the session.
pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    let content = format!(
        "<h1>{code} {title}</h1>\n<p>{message}</p>",
        code = status.as_u16(),
        message = escape(message),
    );
    layout(title, &PageContext::default(), &content)
}
