//! Named-relation accessor resolution
//!
//! Resource kinds may expose pre-wired relations ("the bazfoo of a baz") in
//! addition to the generic association mechanism. Each relation is an entry
//! in an explicit descriptor table mapping the relation name to a
//! `RelationAccessor` — no runtime string-to-method synthesis. A lookup miss
//! (unknown relation, or a verb the accessor does not support) is a
//! "relation does not exist" condition for the caller, never a panic.

use crate::core::store::StoreError;
use async_trait::async_trait;
use axum::http::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// The three operations a relation exposes, keyed by HTTP verb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationVerb {
    /// GET — list the related items
    Get,
    /// POST — attach a related item
    Set,
    /// DELETE — detach a related item
    Remove,
}

impl RelationVerb {
    /// Map an HTTP method onto a relation operation.
    ///
    /// Verbs outside GET/POST/DELETE have no relation semantics and yield
    /// `None`.
    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(RelationVerb::Get),
            Method::POST => Some(RelationVerb::Set),
            Method::DELETE => Some(RelationVerb::Remove),
            _ => None,
        }
    }
}

/// Operations available on one named relation of a resource kind.
///
/// Implementations close over whatever backs the relation (a foreign-key
/// column, a join table, another service). `related_kind` names the kind of
/// the items the accessor produces so responses can be filtered with that
/// kind's field metadata.
#[async_trait]
pub trait RelationAccessor: Send + Sync {
    /// Kind name of the related items
    fn related_kind(&self) -> &str;

    /// Whether this accessor implements the given operation
    fn supports(&self, _verb: RelationVerb) -> bool {
        true
    }

    /// List the items related to `base_id`
    async fn get(&self, base_id: i64) -> Result<Vec<Value>, StoreError>;

    /// Attach the related item to `base_id`
    async fn set(&self, base_id: i64, related: &Value) -> Result<(), StoreError>;

    /// Detach the related item from `base_id`
    async fn remove(&self, base_id: i64, related_id: i64) -> Result<(), StoreError>;
}

/// Relation descriptor table for one resource kind
#[derive(Default, Clone)]
pub struct RelationTable {
    accessors: HashMap<String, Arc<dyn RelationAccessor>>,
}

impl RelationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an accessor under a relation name
    pub fn insert(&mut self, relation: impl Into<String>, accessor: Arc<dyn RelationAccessor>) {
        self.accessors.insert(relation.into(), accessor);
    }

    /// Resolve a verb + relation name to an accessor.
    ///
    /// `None` when the relation is unknown or the accessor does not support
    /// the verb; callers translate this to 404.
    pub fn resolve(
        &self,
        verb: RelationVerb,
        relation: &str,
    ) -> Option<Arc<dyn RelationAccessor>> {
        self.accessors
            .get(relation)
            .filter(|accessor| accessor.supports(verb))
            .cloned()
    }

    /// Relation names registered on this table
    pub fn relation_names(&self) -> Vec<&str> {
        self.accessors.keys().map(|s| s.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }
}
