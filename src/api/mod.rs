//! Daycare REST API
//!
//! HTTP API layer, built with Axum.
//!
//! # Endpoints
//!
//! ## Children
//! - `GET /api/v1/children` - List the roster
//! - `POST /api/v1/children` - Add a child
//! - `POST /api/v1/children/import` - Import a roster CSV
//!
//! ## Attendance
//! - `GET /api/v1/attendance/today` - Today's marks
//! - `GET /api/v1/attendance/board` - Whole roster with marks, reports and themes
//! - `GET /api/v1/attendance/summary` - Marked / total counts
//! - `PUT /api/v1/attendance/:child` - Mark present or absent
//!
//! ## Reports
//! - `GET /api/v1/reports/available` - Children who still need a report
//! - `GET /api/v1/reports/draft/:child` - Prefill for a new report
//! - `POST /api/v1/reports` - Submit a report
//! - `GET /api/v1/reports?date=YYYY-MM-DD` - Reports for a date
//! - `GET /api/v1/reports/:id` - Open a report for editing
//! - `PATCH /api/v1/reports/:id` - Save an edit
//!
//! ## Themes
//! - `GET /api/v1/themes` - Tags, today's themes and today's note
//! - `POST /api/v1/themes/tags` - Add a tag
//! - `DELETE /api/v1/themes/tags/:tag` - Remove a tag
//! - `PUT /api/v1/themes/day` - Set today's themes
//! - `PUT /api/v1/themes/note` - Save the common parents note
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use daycare::api::{serve, ApiConfig, AppState};
//! use daycare::domain::{AttendanceSettings, SystemClock};
//! use daycare::store::{open_store, StoreConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = open_store(&StoreConfig::default())?;
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(
//!         store,
//!         Arc::new(SystemClock::local()),
//!         AttendanceSettings::default(),
//!         config.clone(),
//!     );
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Roster
        .route(
            "/children",
            get(routes::children::list_children).post(routes::children::add_child),
        )
        .route("/children/import", post(routes::children::import_children))
        // Attendance
        .route("/attendance/today", get(routes::attendance::today))
        .route("/attendance/board", get(routes::attendance::board))
        .route("/attendance/summary", get(routes::attendance::summary))
        .route("/attendance/:child", put(routes::attendance::mark))
        // Reports
        .route("/reports/available", get(routes::reports::available))
        .route("/reports/draft/:child", get(routes::reports::draft))
        .route(
            "/reports",
            get(routes::reports::list).post(routes::reports::submit),
        )
        .route(
            "/reports/:id",
            get(routes::reports::open).patch(routes::reports::update),
        )
        // Themes
        .route("/themes", get(routes::themes::get_themes))
        .route("/themes/tags", post(routes::themes::add_tag))
        .route("/themes/tags/:tag", delete(routes::themes::remove_tag))
        .route("/themes/day", put(routes::themes::set_day_themes))
        .route("/themes/note", put(routes::themes::save_note))
        .layer(DefaultBodyLimit::max(state.config.max_body_size));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Daycare API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Daycare API shut down gracefully");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
