//! In-memory store implementations for testing and development

use crate::associations::model::{Association, AssociationQuery};
use crate::associations::store::AssociationStore;
use crate::core::field::FieldSpec;
use crate::core::store::{ResourceStore, StoreError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

/// In-memory resource store for one kind.
///
/// Rows live in a `BTreeMap` behind an `RwLock`; ids are assigned from an
/// atomic counter starting at 1. Cloning shares the underlying rows, so a
/// test can keep a handle for direct inspection after handing the store to
/// the builder.
///
/// Create and save enforce the declared schema: required fields must be
/// present on create (`MissingValue`) and submitted keys must be declared
/// (`InvalidValue`) — which is exactly the error split the CRUD handlers
/// translate for clients.
#[derive(Clone)]
pub struct InMemoryResourceStore {
    fields: Arc<Vec<FieldSpec>>,
    rows: Arc<RwLock<BTreeMap<i64, Map<String, Value>>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryResourceStore {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self {
            fields: Arc::new(fields),
            rows: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Number of rows physically present, soft-deleted ones included
    pub fn row_count(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    fn validate_keys(&self, content: &Map<String, Value>) -> Result<(), StoreError> {
        for key in content.keys() {
            if !self.fields.iter().any(|field| &field.name == key) {
                return Err(StoreError::InvalidValue {
                    field: key.clone(),
                    message: "unknown field".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceStore for InMemoryResourceStore {
    fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    async fn find(&self, query: &Map<String, Value>) -> Result<Vec<Value>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|e| StoreError::backend(format!("failed to acquire read lock: {}", e)))?;

        Ok(rows
            .values()
            .filter(|row| {
                query
                    .iter()
                    .all(|(key, value)| row.get(key).unwrap_or(&Value::Null) == value)
            })
            .map(|row| Value::Object(row.clone()))
            .collect())
    }

    async fn get(&self, id: i64) -> Result<Value, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|e| StoreError::backend(format!("failed to acquire read lock: {}", e)))?;

        rows.get(&id)
            .map(|row| Value::Object(row.clone()))
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, content: Map<String, Value>) -> Result<Value, StoreError> {
        self.validate_keys(&content)?;

        for field in self.fields.iter().filter(|field| field.required) {
            let value = content.get(&field.name);
            if value.is_none() || value == Some(&Value::Null) {
                return Err(StoreError::MissingValue {
                    field: field.name.clone(),
                });
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut row = content;
        row.insert("id".to_string(), Value::from(id));

        let mut rows = self
            .rows
            .write()
            .map_err(|e| StoreError::backend(format!("failed to acquire write lock: {}", e)))?;
        rows.insert(id, row.clone());

        Ok(Value::Object(row))
    }

    async fn save(&self, id: i64, content: Map<String, Value>) -> Result<Value, StoreError> {
        self.validate_keys(&content)?;

        let mut rows = self
            .rows
            .write()
            .map_err(|e| StoreError::backend(format!("failed to acquire write lock: {}", e)))?;

        let row = rows.get_mut(&id).ok_or(StoreError::NotFound)?;
        for (key, value) in content {
            row.insert(key, value);
        }

        Ok(Value::Object(row.clone()))
    }

    async fn remove(&self, id: i64) -> Result<(), StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|e| StoreError::backend(format!("failed to acquire write lock: {}", e)))?;

        rows.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

/// In-memory association store.
///
/// A plain row list behind an `RwLock` — the in-memory analogue of a single
/// polymorphic join table. Cloning shares the rows.
#[derive(Clone, Default)]
pub struct InMemoryAssociationStore {
    rows: Arc<RwLock<Vec<Association>>>,
}

impl InMemoryAssociationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently stored
    pub fn row_count(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }
}

#[async_trait]
impl AssociationStore for InMemoryAssociationStore {
    async fn create(&self, association: Association) -> Result<Association, StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|e| StoreError::backend(format!("failed to acquire write lock: {}", e)))?;

        rows.push(association.clone());
        Ok(association)
    }

    async fn find(&self, query: &AssociationQuery) -> Result<Vec<Association>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|e| StoreError::backend(format!("failed to acquire read lock: {}", e)))?;

        Ok(rows.iter().filter(|row| row.matches(query)).cloned().collect())
    }

    async fn remove(&self, query: &AssociationQuery) -> Result<usize, StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|e| StoreError::backend(format!("failed to acquire write lock: {}", e)))?;

        let before = rows.len();
        rows.retain(|row| !row.matches(query));
        Ok(before - rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn widget_store() -> InMemoryResourceStore {
        InMemoryResourceStore::new(vec![
            FieldSpec::new("id"),
            FieldSpec::new("name").required(),
            FieldSpec::new("secret").server_only(),
            FieldSpec::new("deleted"),
        ])
    }

    fn content(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = widget_store();

        let first = store.create(content(json!({"name": "a"}))).await.unwrap();
        let second = store.create(content(json!({"name": "b"}))).await.unwrap();

        assert_eq!(first["id"], 1);
        assert_eq!(second["id"], 2);
    }

    #[tokio::test]
    async fn test_create_missing_required_field() {
        let store = widget_store();

        let err = store.create(content(json!({"secret": "x"}))).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingValue { field } if field == "name"));
    }

    #[tokio::test]
    async fn test_create_rejects_undeclared_field() {
        let store = widget_store();

        let err = store
            .create(content(json!({"name": "a", "rogue": 1})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidValue { field, .. } if field == "rogue"));
    }

    #[tokio::test]
    async fn test_get_and_not_found() {
        let store = widget_store();
        store.create(content(json!({"name": "a"}))).await.unwrap();

        assert_eq!(store.get(1).await.unwrap()["name"], "a");
        assert!(matches!(store.get(99).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_find_matches_all_query_fields() {
        let store = widget_store();
        store.create(content(json!({"name": "a"}))).await.unwrap();
        store.create(content(json!({"name": "b"}))).await.unwrap();

        let all = store.find(&Map::new()).await.unwrap();
        assert_eq!(all.len(), 2);

        let named = store.find(&content(json!({"name": "b"}))).await.unwrap();
        assert_eq!(named.len(), 1);
        assert_eq!(named[0]["id"], 2);

        let none = store
            .find(&content(json!({"name": "b", "id": 1})))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_save_merges_content() {
        let store = widget_store();
        store.create(content(json!({"name": "a"}))).await.unwrap();

        let updated = store
            .save(1, content(json!({"deleted": true})))
            .await
            .unwrap();

        assert_eq!(updated["name"], "a");
        assert_eq!(updated["deleted"], true);
        assert_eq!(store.row_count(), 1);
    }

    #[tokio::test]
    async fn test_save_unknown_id() {
        let store = widget_store();
        let err = store.save(5, content(json!({"name": "x"}))).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_remove_is_physical() {
        let store = widget_store();
        store.create(content(json!({"name": "a"}))).await.unwrap();

        store.remove(1).await.unwrap();
        assert_eq!(store.row_count(), 0);
        assert!(matches!(store.get(1).await, Err(StoreError::NotFound)));
        assert!(matches!(store.remove(1).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_clone_shares_rows() {
        let store = widget_store();
        let handle = store.clone();

        store.create(content(json!({"name": "a"}))).await.unwrap();
        assert_eq!(handle.row_count(), 1);
    }

    #[tokio::test]
    async fn test_association_store_round_trip() {
        let store = InMemoryAssociationStore::new();
        store
            .create(Association::new("baz", 1, "bazfoo", "foo", 1))
            .await
            .unwrap();
        store
            .create(Association::new("baz", 1, "bazqux", "qux", 3))
            .await
            .unwrap();
        store
            .create(Association::new("baz", 2, "bazfoo", "foo", 1))
            .await
            .unwrap();

        let base = store.find(&AssociationQuery::for_base("baz", 1)).await.unwrap();
        assert_eq!(base.len(), 2);

        let relation = store
            .find(&AssociationQuery::for_base("baz", 1).relation("bazfoo"))
            .await
            .unwrap();
        assert_eq!(relation.len(), 1);
        assert_eq!(relation[0].related_id, 1);
    }

    #[tokio::test]
    async fn test_association_remove_returns_count() {
        let store = InMemoryAssociationStore::new();
        store
            .create(Association::new("baz", 1, "bazfoo", "foo", 1))
            .await
            .unwrap();

        let query = AssociationQuery::for_base("baz", 1).relation("bazfoo").related(1);
        assert_eq!(store.remove(&query).await.unwrap(), 1);
        assert_eq!(store.remove(&query).await.unwrap(), 0);
        assert_eq!(store.row_count(), 0);
    }

    #[tokio::test]
    async fn test_association_store_does_not_dedupe() {
        // idempotency lives in the create operation, not the store
        let store = InMemoryAssociationStore::new();
        let row = Association::new("baz", 1, "bazfoo", "foo", 1);

        store.create(row.clone()).await.unwrap();
        store.create(row).await.unwrap();
        assert_eq!(store.row_count(), 2);
    }
}
