//! SQLite-backed document store
//!
//! Documents live in one table keyed by `(collection, id)` with the JSON body
//! stored as text. The `date` field is projected into an indexed `date_ms`
//! column on every write so range queries use SQLite's B-tree.
//!
//! Each mutating call runs in a single transaction under the connection
//! mutex, so field-level upserts from concurrent requests never interleave.

use crate::store::error::{StoreError, StoreResult};
use crate::store::traits::DocumentStore;
use crate::store::types::{
    date_field_ms, merge_top_level, require_object, set_path, Collection, DateRange, Document,
};
use async_trait::async_trait;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// File name of the database inside the data directory
pub const DATABASE_FILE: &str = "daycare.db";

pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Create or open the store under `data_dir`
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(DATABASE_FILE);

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            ",
        )?;

        Self::setup_schema(&conn)?;
        tracing::debug!(path = ?path, "Opened SQLite document store");

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path),
        })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::setup_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Path of the database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn setup_schema(conn: &Connection) -> StoreResult<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                data TEXT NOT NULL,
                date_ms INTEGER,
                PRIMARY KEY (collection, id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_collection_date ON documents(collection, date_ms)",
            [],
        )?;

        Ok(())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Lock(format!("Connection mutex poisoned: {}", e)))
    }
}

fn read_doc(conn: &Connection, collection: Collection, id: &str) -> StoreResult<Option<Value>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT data FROM documents WHERE collection = ? AND id = ?",
            params![collection.name(), id],
            |row| row.get(0),
        )
        .optional()?;

    match raw {
        Some(text) => Ok(Some(serde_json::from_str(&text)?)),
        None => Ok(None),
    }
}

fn write_doc(conn: &Connection, collection: Collection, id: &str, data: &Value) -> StoreResult<()> {
    let text = serde_json::to_string(data)?;
    conn.execute(
        "INSERT INTO documents (collection, id, data, date_ms) VALUES (?, ?, ?, ?)
         ON CONFLICT(collection, id) DO UPDATE SET data = excluded.data, date_ms = excluded.date_ms",
        params![collection.name(), id, text, date_field_ms(data)],
    )?;
    Ok(())
}

fn collect_documents(
    stmt: &mut rusqlite::Statement<'_>,
    params: impl rusqlite::Params,
) -> StoreResult<Vec<Document>> {
    let rows = stmt.query_map(params, |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut docs = Vec::new();
    for row in rows {
        let (id, text) = row?;
        docs.push(Document::new(id, serde_json::from_str(&text)?));
    }
    Ok(docs)
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        let conn = self.lock()?;
        Ok(read_doc(&conn, collection, id)?.map(|data| Document::new(id, data)))
    }

    async fn list(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare_cached("SELECT id, data FROM documents WHERE collection = ? ORDER BY id")?;
        collect_documents(&mut stmt, params![collection.name()])
    }

    async fn query_range(
        &self,
        collection: Collection,
        range: DateRange,
    ) -> StoreResult<Vec<Document>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, data FROM documents
             WHERE collection = ? AND date_ms >= ? AND date_ms < ?
             ORDER BY date_ms, id",
        )?;
        collect_documents(
            &mut stmt,
            params![collection.name(), range.start_ms, range.end_ms],
        )
    }

    async fn create(&self, collection: Collection, data: Value) -> StoreResult<Document> {
        let data = Value::Object(require_object(data)?);
        let id = uuid::Uuid::new_v4().to_string();

        let conn = self.lock()?;
        write_doc(&conn, collection, &id, &data)?;
        Ok(Document::new(id, data))
    }

    async fn create_unique(
        &self,
        collection: Collection,
        id: &str,
        data: Value,
    ) -> StoreResult<Document> {
        let data = Value::Object(require_object(data)?);

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        if read_doc(&tx, collection, id)?.is_some() {
            return Err(StoreError::AlreadyExists {
                collection,
                id: id.to_string(),
            });
        }
        write_doc(&tx, collection, id, &data)?;
        tx.commit()?;

        Ok(Document::new(id, data))
    }

    async fn merge(
        &self,
        collection: Collection,
        id: &str,
        patch: Map<String, Value>,
    ) -> StoreResult<Document> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut current = read_doc(&tx, collection, id)?.ok_or_else(|| StoreError::NotFound {
            collection,
            id: id.to_string(),
        })?;

        merge_top_level(&mut current, patch)?;
        write_doc(&tx, collection, id, &current)?;
        tx.commit()?;

        Ok(Document::new(id, current))
    }

    async fn set_merge(
        &self,
        collection: Collection,
        id: &str,
        patch: Map<String, Value>,
    ) -> StoreResult<Document> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut current =
            read_doc(&tx, collection, id)?.unwrap_or_else(|| Value::Object(Map::new()));

        merge_top_level(&mut current, patch)?;
        write_doc(&tx, collection, id, &current)?;
        tx.commit()?;

        Ok(Document::new(id, current))
    }

    async fn upsert_field(
        &self,
        collection: Collection,
        id: &str,
        path: &[&str],
        value: Value,
        seed: Value,
    ) -> StoreResult<Document> {
        let seed = Value::Object(require_object(seed)?);

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut current = read_doc(&tx, collection, id)?.unwrap_or(seed);

        set_path(&mut current, path, value)?;
        write_doc(&tx, collection, id, &current)?;
        tx.commit()?;

        Ok(Document::new(id, current))
    }

    async fn ping(&self) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = SqliteStore::open(dir.path()).unwrap();
            store
                .create_unique(Collection::KidsInfo, "alice", json!({"name": "Alice"}))
                .await
                .unwrap();
        }

        let store = SqliteStore::open(dir.path()).unwrap();
        let doc = store.get(Collection::KidsInfo, "alice").await.unwrap().unwrap();
        assert_eq!(doc.data["name"], "Alice");
        assert_eq!(store.path().unwrap(), dir.path().join(DATABASE_FILE));
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .create_unique(Collection::KidsInfo, "x", json!({"a": 1}))
            .await
            .unwrap();
        store
            .create_unique(Collection::AppConfig, "x", json!({"b": 2}))
            .await
            .unwrap();

        assert_eq!(store.list(Collection::KidsInfo).await.unwrap().len(), 1);
        let cfg = store.get(Collection::AppConfig, "x").await.unwrap().unwrap();
        assert_eq!(cfg.data, json!({"b": 2}));
    }

    #[tokio::test]
    async fn test_query_range_uses_date_column() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .create_unique(
                Collection::DailyReports,
                "late",
                json!({"date": "2026-10-14T17:30:00-04:00"}),
            )
            .await
            .unwrap();
        store
            .create_unique(
                Collection::DailyReports,
                "next",
                json!({"date": "2026-10-15T00:10:00-04:00"}),
            )
            .await
            .unwrap();
        store
            .create_unique(Collection::DailyReports, "undated", json!({"notes": "x"}))
            .await
            .unwrap();

        let day = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let offset = FixedOffset::west_opt(4 * 3600).unwrap();
        let docs = store
            .query_range(Collection::DailyReports, DateRange::for_day(day, offset))
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "late");
    }

    #[tokio::test]
    async fn test_merge_updates_date_projection() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .create_unique(
                Collection::DailyReports,
                "r",
                json!({"date": "2026-10-14T09:00:00Z", "notes": "a"}),
            )
            .await
            .unwrap();

        let patch = require_object(json!({"date": "2026-10-20T09:00:00Z"})).unwrap();
        store.merge(Collection::DailyReports, "r", patch).await.unwrap();

        let utc = FixedOffset::east_opt(0).unwrap();
        let old_day = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let new_day = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let old = store
            .query_range(Collection::DailyReports, DateRange::for_day(old_day, utc))
            .await
            .unwrap();
        let new = store
            .query_range(Collection::DailyReports, DateRange::for_day(new_day, utc))
            .await
            .unwrap();
        assert!(old.is_empty());
        assert_eq!(new[0].data["notes"], "a");
    }

    #[tokio::test]
    async fn test_upsert_field_seeds_then_updates() {
        let store = SqliteStore::open_in_memory().unwrap();
        let seed = json!({"date": "2026-10-14T08:00:00Z", "attendance": {}});

        store
            .upsert_field(
                Collection::Attendance,
                "2026-10-14",
                &["attendance", "Alice"],
                json!({"status": "present"}),
                seed.clone(),
            )
            .await
            .unwrap();
        let doc = store
            .upsert_field(
                Collection::Attendance,
                "2026-10-14",
                &["attendance", "Bob"],
                json!({"status": "absent"}),
                seed,
            )
            .await
            .unwrap();

        assert_eq!(doc.data["attendance"]["Alice"]["status"], "present");
        assert_eq!(doc.data["attendance"]["Bob"]["status"], "absent");
        assert_eq!(doc.data["date"], "2026-10-14T08:00:00Z");
    }

    #[tokio::test]
    async fn test_create_unique_conflict_leaves_original() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .create_unique(Collection::DailyReports, "k", json!({"v": 1}))
            .await
            .unwrap();
        let err = store
            .create_unique(Collection::DailyReports, "k", json!({"v": 2}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));

        let doc = store.get(Collection::DailyReports, "k").await.unwrap().unwrap();
        assert_eq!(doc.data["v"], 1);
        store.ping().await.unwrap();
    }
}
