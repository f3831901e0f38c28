//! Server construction: registry, state, routing, builder

pub mod builder;
pub mod registry;
pub mod router;

pub use builder::ApiBuilder;
pub use registry::{ResourceKind, ResourceRegistry};

use crate::associations::store::AssociationStore;
use crate::config::ApiConfig;
use crate::core::access::{AccessPolicy, AccessRequest};
use crate::core::error::ApiError;
use crate::core::store::StoreError;
use axum::http::Method;
use std::sync::Arc;

/// Application state shared across handlers.
///
/// One value per server instance; everything inside is immutable after
/// build, so multiple instances can coexist in a process.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ResourceRegistry>,
    pub associations: Arc<dyn AssociationStore>,
    pub config: Arc<ApiConfig>,
    pub access: Arc<dyn AccessPolicy>,
}

impl AppState {
    /// Resolve a kind name, mapping a miss to the 404 taxonomy
    pub fn kind(&self, name: &str) -> Result<Arc<registry::ResourceKind>, ApiError> {
        self.registry.kind(name).ok_or_else(|| ApiError::UnknownKind {
            kind: name.to_string(),
        })
    }

    /// Run the access hook; a denial becomes 401
    pub fn check_access(
        &self,
        method: &Method,
        kind: &str,
        id: Option<i64>,
        relation: Option<&str>,
    ) -> Result<(), ApiError> {
        let request = AccessRequest {
            method,
            kind,
            id,
            relation,
        };

        if self.access.allow(&request) {
            Ok(())
        } else {
            tracing::info!(kind, ?id, ?relation, "access denied");
            Err(ApiError::AccessDenied)
        }
    }

    /// The configured soft-delete field, when soft deletion is active
    pub fn soft_field(&self) -> Option<&str> {
        self.config.delete.soft_field()
    }
}

/// Parse a path id segment. Non-numeric ids are a 404, not a 400: the path
/// simply names a resource that cannot exist.
pub(crate) fn parse_resource_id(kind: &str, raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| {
        tracing::info!(kind, id = raw, "resource id did not parse as an integer");
        ApiError::ResourceNotFound {
            kind: kind.to_string(),
            id: None,
        }
    })
}

/// Translate a store failure on a specific resource. `NotFound` keeps its
/// meaning; everything else is logged with context and flattened to an
/// opaque internal error.
pub(crate) fn store_failure(
    kind: &str,
    id: Option<i64>,
    operation: &str,
    err: StoreError,
) -> ApiError {
    match err {
        StoreError::NotFound => ApiError::ResourceNotFound {
            kind: kind.to_string(),
            id,
        },
        other => {
            tracing::error!(kind, ?id, operation, error = %other, "store operation failed");
            ApiError::Internal
        }
    }
}
