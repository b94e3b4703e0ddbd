//! # HTTP Server for Label Templates and Printing
//!
//! JSON API over the template store, label rendering, bulk generation and
//! the job log.
//!
//! ## Usage
//!
//! ```bash
//! pulselabel serve --listen 0.0.0.0:8080 --device /dev/rfcomm0 --templates ./templates
//! ```
//!
//! ## Routes
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | `/api/fields` | draggable field types |
//! | GET | `/api/templates` | saved template summaries |
//! | GET, PUT, DELETE | `/api/templates/:name` | one template |
//! | POST | `/api/labels/preview` | render to PNG |
//! | POST | `/api/labels/print` | render and print |
//! | POST | `/api/bulk/validate` | import and validate records |
//! | POST | `/api/bulk/generate` | validate, render (and print) a batch |
//! | GET | `/api/jobs` | generation job log |
//! | GET | `/api/jobs/export` | job log as CSV |

mod handlers;
mod state;

pub use state::{AppState, ServerConfig};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::LabelError;

/// Request body limit for bulk uploads.
const BULK_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Build the API router around shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/fields", get(handlers::fields::list))
        .route("/api/templates", get(handlers::templates::list))
        .route(
            "/api/templates/:name",
            get(handlers::templates::load)
                .put(handlers::templates::save)
                .delete(handlers::templates::delete),
        )
        .route("/api/labels/preview", post(handlers::labels::preview))
        .route("/api/labels/print", post(handlers::labels::print))
        .route(
            "/api/bulk/validate",
            post(handlers::bulk::validate).layer(DefaultBodyLimit::max(BULK_BODY_LIMIT)),
        )
        .route(
            "/api/bulk/generate",
            post(handlers::bulk::generate).layer(DefaultBodyLimit::max(BULK_BODY_LIMIT)),
        )
        .route("/api/jobs", get(handlers::jobs::list))
        .route("/api/jobs/export", get(handlers::jobs::export))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ```no_run
/// use pulselabel::printer::PrinterConfig;
/// use pulselabel::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), pulselabel::error::LabelError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     device_path: "/dev/rfcomm0".to_string(),
///     template_dir: Some("templates".into()),
///     printer: PrinterConfig::TSP650II,
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), LabelError> {
    let state = Arc::new(AppState::new(config.clone())?);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            LabelError::Transport(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    info!(
        listen = %config.listen_addr,
        device = %config.device_path,
        printer = config.printer.name,
        templates = ?config.template_dir,
        "label server listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| LabelError::Transport(format!("Server error: {}", e)))?;

    Ok(())
}
