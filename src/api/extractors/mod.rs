//! Custom extractors.

mod current_user;
mod html_form;

pub use current_user::{CurrentUser, Viewer};
pub use html_form::{required, trimmed, CsrfProtected, HtmlForm};
