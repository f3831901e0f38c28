//! Join-table abstraction behind the association operations

use crate::associations::model::{Association, AssociationQuery};
use crate::core::store::StoreError;
use async_trait::async_trait;

/// Storage seam for association rows.
///
/// The store is deliberately dumb: it writes, matches, and removes rows.
/// Idempotency of creation is enforced a level up by the association
/// operations, which check for existing rows before writing — two concurrent
/// creates for the same edge can therefore both land (accepted weakness; see
/// the create operation's docs).
#[async_trait]
pub trait AssociationStore: Send + Sync {
    /// Append one edge row
    async fn create(&self, association: Association) -> Result<Association, StoreError>;

    /// All rows matching the query, by any subset of fields
    async fn find(&self, query: &AssociationQuery) -> Result<Vec<Association>, StoreError>;

    /// Remove all rows matching the query, returning how many went away
    async fn remove(&self, query: &AssociationQuery) -> Result<usize, StoreError>;
}
