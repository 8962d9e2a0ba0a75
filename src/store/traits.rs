//! Document store trait
//!
//! Every component reads and writes through this seam. Implementations must
//! make each mutating call atomic with respect to concurrent callers: a
//! field-level upsert never loses a sibling field written by another caller.

use crate::store::error::StoreResult;
use crate::store::types::{Collection, DateRange, Document};
use async_trait::async_trait;
use serde_json::{Map, Value};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point read
    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>>;

    /// Unfiltered collection scan, ordered by id
    async fn list(&self, collection: Collection) -> StoreResult<Vec<Document>>;

    /// Documents whose `date` field falls within `[range.start, range.end)`,
    /// ordered by date
    async fn query_range(
        &self,
        collection: Collection,
        range: DateRange,
    ) -> StoreResult<Vec<Document>>;

    /// Create a document under a generated id
    async fn create(&self, collection: Collection, data: Value) -> StoreResult<Document>;

    /// Create a document under a caller-chosen key; fails with
    /// `AlreadyExists` if the key is taken
    async fn create_unique(
        &self,
        collection: Collection,
        id: &str,
        data: Value,
    ) -> StoreResult<Document>;

    /// Partial update of top-level fields; fails with `NotFound` if absent
    async fn merge(
        &self,
        collection: Collection,
        id: &str,
        patch: Map<String, Value>,
    ) -> StoreResult<Document>;

    /// Create-or-merge of top-level fields
    async fn set_merge(
        &self,
        collection: Collection,
        id: &str,
        patch: Map<String, Value>,
    ) -> StoreResult<Document>;

    /// Set one nested field, creating the document from `seed` if absent
    async fn upsert_field(
        &self,
        collection: Collection,
        id: &str,
        path: &[&str],
        value: Value,
        seed: Value,
    ) -> StoreResult<Document>;

    /// Cheap liveness check
    async fn ping(&self) -> StoreResult<()>;
}
