//! Public pages and health check.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Json},
    routing::get,
    Router,
};
use serde::Serialize;

use super::page_context;
use crate::api::extractors::Viewer;
use crate::api::middleware::SessionHandle;
use crate::api::AppState;
use crate::errors::AppResult;
use crate::views::pages;

/// Create public page routes
pub fn main_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
}

pub async fn home(Viewer(viewer): Viewer, session: SessionHandle) -> Html<String> {
    let ctx = page_context(&session, viewer).await;
    Html(pages::home(&ctx))
}

pub async fn about(Viewer(viewer): Viewer, session: SessionHandle) -> Html<String> {
    let ctx = page_context(&session, viewer).await;
    Html(pages::about(&ctx))
}

/// Fallback for unknown paths
pub async fn not_found(
    Viewer(viewer): Viewer,
    session: SessionHandle,
) -> AppResult<(StatusCode, Html<String>)> {
    let ctx = page_context(&session, viewer).await;
    Ok((StatusCode::NOT_FOUND, Html(pages::not_found(&ctx))))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

/// Individual service health status
#[derive(Serialize)]
struct ServiceHealth {
    database: ServiceStatus,
    sessions: ServiceStatus,
}

/// Service status
#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServiceStatus {
    fn from_result<T>(result: AppResult<T>) -> Self {
        match result {
            Ok(_) => Self {
                status: "healthy",
                error: None,
            },
            Err(e) => Self {
                status: "unhealthy",
                error: Some(e.to_string()),
            },
        }
    }

    fn is_healthy(&self) -> bool {
        self.error.is_none()
    }
}

/// Health check of the database and the session store
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = ServiceStatus::from_result(state.users.ping().await);
    let sessions = ServiceStatus::from_result(state.sessions.ping().await);

    let all_healthy = database.is_healthy() && sessions.is_healthy();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" },
        services: ServiceHealth { database, sessions },
    };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
