//! Store traits connecting the framework to external persistence

use crate::core::field::FieldSpec;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Errors reported by resource and association stores.
///
/// Handlers inspect this taxonomy to pick a client-facing response: `NotFound`
/// maps to 404, `MissingValue` to the required-field response, `InvalidValue`
/// to 400, and `Backend` is logged with context and surfaced as an opaque 500.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested row does not exist
    #[error("not found")]
    NotFound,

    /// A required field was absent on create
    #[error("{field} is required")]
    MissingValue { field: String },

    /// A field value was rejected by the store
    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Any other store failure; never shown to clients verbatim
    #[error("{message}")]
    Backend { message: String },
}

impl StoreError {
    /// Shorthand for an unclassified backend failure
    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend {
            message: message.into(),
        }
    }
}

/// Capability set a resource kind's store must provide.
///
/// One implementation per resource kind, registered under the kind's name.
/// Instances are opaque JSON objects carrying an integer `id`; the store also
/// declares its field metadata so responses can be filtered.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Declared fields of this kind, in response order
    fn fields(&self) -> &[FieldSpec];

    /// Whether a field name is declared on this kind
    fn has_field(&self, name: &str) -> bool {
        self.fields().iter().any(|f| f.name == name)
    }

    /// Find all instances whose fields equal every key/value in `query`.
    /// An empty query matches everything.
    async fn find(&self, query: &Map<String, Value>) -> Result<Vec<Value>, StoreError>;

    /// Fetch one instance by id; `NotFound` when absent
    async fn get(&self, id: i64) -> Result<Value, StoreError>;

    /// Persist a new instance from submitted content, assigning an id
    async fn create(&self, content: Map<String, Value>) -> Result<Value, StoreError>;

    /// Merge submitted content into an existing instance and persist it
    async fn save(&self, id: i64, content: Map<String, Value>) -> Result<Value, StoreError>;

    /// Physically remove an instance; `NotFound` when absent
    async fn remove(&self, id: i64) -> Result<(), StoreError>;
}
