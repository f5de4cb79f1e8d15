//! Serve command - Starts the HTTP server.

use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::{Config, SessionBackend};
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, Database, MemorySessionStore, SessionStore, UserRepository, UserStore};

/// Execute the serve command
pub async fn execute(args: ServeArgs, mut config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    if let Some(host) = args.host {
        config.server_host = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }

    // Initialize database (applies pending migrations)
    let db = Database::connect(&config).await?;
    let users: Arc<dyn UserRepository> = Arc::new(UserStore::new(db.get_connection()));

    let sessions: Arc<dyn SessionStore> = match config.session_backend {
        SessionBackend::Redis => Arc::new(Cache::try_connect(&config).await?),
        SessionBackend::Memory => {
            tracing::warn!("Using in-memory sessions; they are lost on restart");
            Arc::new(MemorySessionStore::new())
        }
    };

    if !config.csrf_enabled {
        tracing::warn!("CSRF protection is disabled");
    }

    let addr = config.server_addr();
    let app = create_router(AppState::new(users, sessions, config));

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}
