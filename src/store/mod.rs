//! Daycare Document Store
//!
//! Schema-less JSON documents grouped into the four collections the app uses:
//!
//! - **types**: `Collection`, `Document`, `DateRange` and patch helpers
//! - **traits**: the `DocumentStore` seam every service talks to
//! - **sqlite**: durable backend on SQLite
//! - **memory**: in-process backend for tests and throwaway runs
//! - **backend**: backend selection from configuration
//! - **error**: Error types
//!
//! # Access patterns
//!
//! ```text
//! appConfig/themeOfTheWeek   point read / create-or-merge
//! attendance, dailyReports   range query on `date` over [startOfDay, endOfDay)
//! kidsInfo                   unfiltered scan
//! attendance/<day>           atomic field upsert of attendance.<child>
//! dailyReports/<day>:<child> create-unique, then partial merges
//! ```

pub mod backend;
pub mod error;
pub mod memory;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use backend::{open_store, StoreBackend, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::DocumentStore;
pub use types::{Collection, DateRange, Document, DATE_FIELD};
