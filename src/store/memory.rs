//! In-memory document store
//!
//! Same semantics as the SQLite backend, held behind a Tokio `RwLock`.
//! Every mutation happens under a single write guard.

use crate::store::error::{StoreError, StoreResult};
use crate::store::traits::DocumentStore;
use crate::store::types::{
    date_field_ms, merge_top_level, require_object, set_path, Collection, DateRange, Document,
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

type CollectionData = BTreeMap<String, Value>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, CollectionData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub async fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map(|c| c.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&collection)
            .and_then(|c| c.get(id))
            .map(|data| Document::new(id, data.clone())))
    }

    async fn list(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&collection)
            .map(|c| {
                c.iter()
                    .map(|(id, data)| Document::new(id.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn query_range(
        &self,
        collection: Collection,
        range: DateRange,
    ) -> StoreResult<Vec<Document>> {
        let guard = self.collections.read().await;
        let mut matches: Vec<(i64, Document)> = guard
            .get(&collection)
            .map(|c| {
                c.iter()
                    .filter_map(|(id, data)| {
                        let ts = date_field_ms(data)?;
                        range
                            .contains(ts)
                            .then(|| (ts, Document::new(id.clone(), data.clone())))
                    })
                    .collect()
            })
            .unwrap_or_default();

        // BTreeMap iteration already orders ties by id
        matches.sort_by_key(|(ts, _)| *ts);
        Ok(matches.into_iter().map(|(_, doc)| doc).collect())
    }

    async fn create(&self, collection: Collection, data: Value) -> StoreResult<Document> {
        let data = Value::Object(require_object(data)?);
        let id = uuid::Uuid::new_v4().to_string();

        let mut guard = self.collections.write().await;
        guard
            .entry(collection)
            .or_default()
            .insert(id.clone(), data.clone());
        Ok(Document::new(id, data))
    }

    async fn create_unique(
        &self,
        collection: Collection,
        id: &str,
        data: Value,
    ) -> StoreResult<Document> {
        let data = Value::Object(require_object(data)?);

        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection).or_default();
        if docs.contains_key(id) {
            return Err(StoreError::AlreadyExists {
                collection,
                id: id.to_string(),
            });
        }
        docs.insert(id.to_string(), data.clone());
        Ok(Document::new(id, data))
    }

    async fn merge(
        &self,
        collection: Collection,
        id: &str,
        patch: Map<String, Value>,
    ) -> StoreResult<Document> {
        let mut guard = self.collections.write().await;
        let current = guard
            .get_mut(&collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })?;

        merge_top_level(current, patch)?;
        Ok(Document::new(id, current.clone()))
    }

    async fn set_merge(
        &self,
        collection: Collection,
        id: &str,
        patch: Map<String, Value>,
    ) -> StoreResult<Document> {
        let mut guard = self.collections.write().await;
        let current = guard
            .entry(collection)
            .or_default()
            .entry(id.to_string())
            .or_insert_with(|| Value::Object(Map::new()));

        merge_top_level(current, patch)?;
        Ok(Document::new(id, current.clone()))
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

        let mut guard = self.collections.write().await;
        let current = guard
            .entry(collection)
            .or_default()
            .entry(id.to_string())
            .or_insert(seed);

        set_path(current, path, value)?;
        Ok(Document::new(id, current.clone()))
    }

    async fn ping(&self) -> StoreResult<()> {
        let _guard = self.collections.read().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryStore::new();
        let doc = store
            .create(Collection::KidsInfo, json!({"name": "Alice"}))
            .await
            .unwrap();

        let fetched = store.get(Collection::KidsInfo, &doc.id).await.unwrap().unwrap();
        assert_eq!(fetched.data["name"], "Alice");
        assert_eq!(store.len(Collection::KidsInfo).await, 1);
        assert!(store.get(Collection::Attendance, &doc.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_non_object() {
        let store = MemoryStore::new();
        let result = store.create(Collection::KidsInfo, json!("Alice")).await;
        assert!(matches!(result, Err(StoreError::NotAnObject(_))));
    }

    #[tokio::test]
    async fn test_create_unique_conflict() {
        let store = MemoryStore::new();
        store
            .create_unique(Collection::DailyReports, "k", json!({"v": 1}))
            .await
            .unwrap();
        let second = store
            .create_unique(Collection::DailyReports, "k", json!({"v": 2}))
            .await;
        assert!(matches!(second, Err(StoreError::AlreadyExists { .. })));

        let doc = store.get(Collection::DailyReports, "k").await.unwrap().unwrap();
        assert_eq!(doc.data["v"], 1);
    }

    #[tokio::test]
    async fn test_merge_requires_existing() {
        let store = MemoryStore::new();
        let patch = require_object(json!({"a": 1})).unwrap();
        let result = store.merge(Collection::DailyReports, "missing", patch).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_set_merge_upserts() {
        let store = MemoryStore::new();
        store
            .set_merge(
                Collection::AppConfig,
                "cfg",
                require_object(json!({"theme": ["Colors"]})).unwrap(),
            )
            .await
            .unwrap();
        let doc = store
            .set_merge(
                Collection::AppConfig,
                "cfg",
                require_object(json!({"themeOfTheDay": []})).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(doc.data, json!({"theme": ["Colors"], "themeOfTheDay": []}));
    }

    #[tokio::test]
    async fn test_query_range_half_open() {
        let store = MemoryStore::new();
        for (id, date) in [
            ("before", "2026-10-13T23:59:59Z"),
            ("start", "2026-10-14T00:00:00Z"),
            ("noon", "2026-10-14T12:00:00Z"),
            ("end", "2026-10-15T00:00:00Z"),
        ] {
            store
                .create_unique(Collection::DailyReports, id, json!({"date": date}))
                .await
                .unwrap();
        }

        let day = chrono::NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let utc = chrono::FixedOffset::east_opt(0).unwrap();
        let docs = store
            .query_range(Collection::DailyReports, DateRange::for_day(day, utc))
            .await
            .unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["start", "noon"]);
    }

    #[tokio::test]
    async fn test_concurrent_field_upserts_keep_all_entries() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for i in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let name = format!("child{}", i);
                store
                    .upsert_field(
                        Collection::Attendance,
                        "2026-10-14",
                        &["attendance", &name],
                        json!({"status": "present"}),
                        json!({"date": "2026-10-14T08:00:00Z", "attendance": {}}),
                    )
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let doc = store.get(Collection::Attendance, "2026-10-14").await.unwrap().unwrap();
        assert_eq!(doc.data["attendance"].as_object().unwrap().len(), 20);
    }
}
