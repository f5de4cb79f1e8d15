//! Server-rendered HTML.
//!
//! Pages are assembled with `format!`; every value that came from a user
//! goes through [`escape`] first.

pub mod forms;
pub mod pages;

use crate::config::{LOGIN_PATH, LOGOUT_PATH};
use crate::domain::User;
use crate::infra::Flash;

/// Per-request data shared by every page.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    /// Logged-in account, drives the navigation links
    pub user: Option<User>,
    /// Flashes consumed for this render
    pub flashes: Vec<Flash>,
    pub csrf_token: String,
}

/// Escape text for HTML element content and quoted attribute values.
pub fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Wrap page content in the shared document layout.
pub fn layout(title: &str, ctx: &PageContext, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Userbase</title>
</head>
<body>
<nav>
<ul>
<li><a href="/">Home</a></li>
<li><a href="/about">About</a></li>
{nav}
</ul>
</nav>
<main>
{flashes}
{content}
</main>
</body>
</html>
"#,
        title = escape(title),
        nav = navigation(ctx.user.as_ref()),
        flashes = flashes(&ctx.flashes),
        content = content,
    )
}

fn navigation(user: Option<&User>) -> String {
    match user {
        Some(user) => {
            let email = escape(&user.email);
            format!(
                r#"<li><a href="{profile}">Profile</a></li>
<li><a href="{LOGOUT_PATH}">Logout</a></li>
<li><span><a href="mailto:{email}">{email}</a></span></li>"#,
                profile = user.profile_path(),
            )
        }
        None => format!(r#"<li><a href="{LOGIN_PATH}">Register/Login</a></li>"#),
    }
}

fn flashes(flashes: &[Flash]) -> String {
    flashes
        .iter()
        .map(|flash| {
            format!(
                r#"<div class="flash flash-{}">{}</div>"#,
                flash.category.as_str(),
                escape(&flash.message)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::FlashCategory;
    use chrono::Utc;

    fn user() -> User {
        User {
            id: 12,
            email: "ann@example.com".to_string(),
            username: "ann".to_string(),
            password_hash: String::new(),
            registered_on: Utc::now(),
            active: true,
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<script>alert("x" & 'y')</script>"#),
            "&lt;script&gt;alert(&quot;x&quot; &amp; &#x27;y&#x27;)&lt;/script&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_anonymous_navigation() {
        let html = layout("Home", &PageContext::default(), "");
        assert!(html.contains(r#"<a href="/auth/login">Register/Login</a>"#));
        assert!(!html.contains("Logout"));
    }

    #[test]
    fn test_logged_in_navigation() {
        let ctx = PageContext {
            user: Some(user()),
            ..Default::default()
        };
        let html = layout("Home", &ctx, "");
        assert!(html.contains(r#"<a href="/auth/profile/12">Profile</a>"#));
        assert!(html.contains(r#"<a href="/auth/logout">Logout</a>"#));
        assert!(html.contains(
            r#"<span><a href="mailto:ann@example.com">ann@example.com</a></span>"#
        ));
        assert!(!html.contains("Register/Login"));
    }

    #[test]
    fn test_flashes_rendered_with_category() {
        let ctx = PageContext {
            flashes: vec![Flash {
                category: FlashCategory::Danger,
                message: "Bad <input>".to_string(),
            }],
            ..Default::default()
        };
        let html = layout("Login", &ctx, "");
        assert!(html.contains(r#"<div class="flash flash-danger">Bad &lt;input&gt;</div>"#));
    }
}
