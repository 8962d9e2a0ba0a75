//! API Route Handlers
//!
//! Each module contains handlers for a specific API resource.

pub mod attendance;
pub mod children;
pub mod health;
pub mod reports;
pub mod themes;
