//! Store backend selection

use crate::store::error::StoreResult;
use crate::store::memory::MemoryStore;
use crate::store::sqlite::SqliteStore;
use crate::store::traits::DocumentStore;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Which document store implementation to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("Unknown store backend: {}. Use sqlite or memory", other)),
        }
    }
}

/// Configuration for the document store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Directory holding the SQLite database
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            data_dir: PathBuf::from("daycare_data"),
        }
    }
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    pub fn memory() -> Self {
        Self {
            backend: StoreBackend::Memory,
            ..Default::default()
        }
    }
}

/// Open the configured store
pub fn open_store(config: &StoreConfig) -> StoreResult<Arc<dyn DocumentStore>> {
    match config.backend {
        StoreBackend::Sqlite => {
            tracing::info!(data_dir = ?config.data_dir, "Using SQLite document store");
            Ok(Arc::new(SqliteStore::open(&config.data_dir)?))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory document store; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::Collection;
    use tempfile::tempdir;

    #[test]
    fn test_parse_backend() {
        assert_eq!("SQLite".parse::<StoreBackend>(), Ok(StoreBackend::Sqlite));
        assert_eq!("memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert!("redis".parse::<StoreBackend>().is_err());
    }

    #[tokio::test]
    async fn test_open_sqlite_backend() {
        let dir = tempdir().unwrap();
        let store = open_store(&StoreConfig::new(dir.path())).unwrap();
        store.ping().await.unwrap();
        assert!(store.list(Collection::KidsInfo).await.unwrap().is_empty());
        assert!(dir.path().join(crate::store::sqlite::DATABASE_FILE).exists());
    }
}
