//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::domain::{
    AttendanceBoard, AttendanceSettings, Clock, ReportService, RosterService, ThemeConfigService,
};
use crate::store::DocumentStore;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Backing document store
    pub store: Arc<dyn DocumentStore>,
    pub roster: RosterService,
    pub attendance: AttendanceBoard,
    pub reports: ReportService,
    pub themes: Arc<ThemeConfigService>,
    /// Source of "today" for every handler
    pub clock: Arc<dyn Clock>,
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Wire the domain services over one store and clock
    pub fn new(
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        attendance: AttendanceSettings,
        config: ApiConfig,
    ) -> Self {
        let roster = RosterService::new(Arc::clone(&store));
        let attendance = AttendanceBoard::new(
            Arc::clone(&store),
            roster.clone(),
            Arc::clone(&clock),
            attendance,
        );
        let themes = Arc::new(ThemeConfigService::new(Arc::clone(&store), Arc::clone(&clock)));
        let reports = ReportService::new(
            Arc::clone(&store),
            roster.clone(),
            attendance.clone(),
            Arc::clone(&themes),
            Arc::clone(&clock),
        );

        Self {
            store,
            roster,
            attendance,
            reports,
            themes,
            clock,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addr() {
        assert_eq!(ApiConfig::new("0.0.0.0", 9000).addr(), "0.0.0.0:9000");
        assert_eq!(ApiConfig::default().addr(), "127.0.0.1:8080");
    }
}
