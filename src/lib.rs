//! # Daycare
//!
//! Administration service for a small daycare: staff mark attendance each
//! morning, file one daily report per child for the parents, and keep the
//! week's theme tags and a common parents note up to date.
//!
//! ## Modules
//!
//! - [`store`]: Document store over the `kidsInfo`, `attendance`,
//!   `dailyReports` and `appConfig` collections
//! - [`domain`]: Roster, attendance board, daily reports and theme config
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//! - [`telemetry`]: Tracing setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use daycare::domain::*;
//! use daycare::store::MemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store: Arc<dyn daycare::store::DocumentStore> = Arc::new(MemoryStore::new());
//!     let clock: Arc<dyn Clock> = Arc::new(SystemClock::local());
//!
//!     let roster = RosterService::new(Arc::clone(&store));
//!     roster
//!         .add(NewChild {
//!             name: "Alice".into(),
//!             email: "alice.parent@example.com".into(),
//!             email2: None,
//!         })
//!         .await?;
//!
//!     let board = AttendanceBoard::new(
//!         Arc::clone(&store),
//!         roster,
//!         clock,
//!         AttendanceSettings::default(),
//!     );
//!     board.mark("Alice", AttendanceStatus::Present).await?;
//!
//!     println!("{:?}", board.summary().await?);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod domain;
pub mod store;
pub mod telemetry;

// Re-export top-level types for convenience
pub use store::{
    open_store, Collection, DateRange, Document, DocumentStore, MemoryStore, SqliteStore,
    StoreBackend, StoreError, StoreResult,
};

pub use domain::{
    AttendanceBoard, AttendanceError, AttendanceSettings, AttendanceStatus, Child, Clock,
    DailyReport, ReportError, ReportService, RosterService, SystemClock, ThemeConfig,
    ThemeConfigService, ThemeError,
};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{Config, ConfigError, ConfigSource, LoggingConfig};
