//! ApiBuilder for fluent construction of server instances

use crate::associations::store::AssociationStore;
use crate::config::ApiConfig;
use crate::core::access::{AccessPolicy, AllowAll};
use crate::core::relation::{RelationAccessor, RelationTable};
use crate::core::store::ResourceStore;
use crate::server::registry::{ResourceKind, ResourceRegistry};
use crate::server::router::build_routes;
use crate::server::AppState;
use anyhow::Result;
use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder assembling one API server instance.
///
/// All configuration is collected here and frozen into an immutable
/// `AppState` at build time; there is no process-global state, so several
/// instances with different registries or delete modes can run side by side.
///
/// # Example
///
/// ```ignore
/// let app = ApiBuilder::new()
///     .with_config(ApiConfig::default())
///     .with_association_store(InMemoryAssociationStore::new())
///     .register_resource("foo", foo_store)
///     .register_resource("baz", baz_store)
///     .build()?;
/// ```
pub struct ApiBuilder {
    config: ApiConfig,
    access: Arc<dyn AccessPolicy>,
    associations: Option<Arc<dyn AssociationStore>>,
    stores: Vec<(String, Arc<dyn ResourceStore>)>,
    relations: HashMap<String, RelationTable>,
}

impl ApiBuilder {
    pub fn new() -> Self {
        Self {
            config: ApiConfig::default(),
            access: Arc::new(AllowAll),
            associations: None,
            stores: Vec::new(),
            relations: HashMap::new(),
        }
    }

    /// Replace the default configuration
    pub fn with_config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Install the per-request access predicate (default: allow everything)
    pub fn with_access_policy(mut self, policy: impl AccessPolicy + 'static) -> Self {
        self.access = Arc::new(policy);
        self
    }

    /// Set the association store (required)
    pub fn with_association_store(mut self, store: impl AssociationStore + 'static) -> Self {
        self.associations = Some(Arc::new(store));
        self
    }

    /// Register a resource kind under its URL name
    pub fn register_resource(
        mut self,
        name: impl Into<String>,
        store: impl ResourceStore + 'static,
    ) -> Self {
        self.stores.push((name.into(), Arc::new(store)));
        self
    }

    /// Declare a named relation on an already-registered kind
    pub fn register_relation(
        mut self,
        kind: &str,
        relation: impl Into<String>,
        accessor: impl RelationAccessor + 'static,
    ) -> Result<Self> {
        if !self.stores.iter().any(|(name, _)| name == kind) {
            anyhow::bail!("cannot register relation on unknown kind '{}'", kind);
        }

        self.relations
            .entry(kind.to_string())
            .or_default()
            .insert(relation, Arc::new(accessor));
        Ok(self)
    }

    /// Freeze the collected configuration into an `AppState`
    fn build_state(mut self) -> Result<AppState> {
        let associations = self.associations.take().ok_or_else(|| {
            anyhow::anyhow!("AssociationStore is required. Call .with_association_store()")
        })?;

        let mut registry = ResourceRegistry::new();
        for (name, store) in self.stores {
            let relations = self.relations.remove(&name).unwrap_or_default();
            registry.register(ResourceKind {
                name,
                store,
                relations,
            });
        }

        Ok(AppState {
            registry: Arc::new(registry),
            associations,
            config: Arc::new(self.config),
            access: self.access,
        })
    }

    /// Build the final router
    pub fn build(self) -> Result<Router> {
        let state = self.build_state()?;
        Ok(build_routes(state))
    }

    /// Serve the application with graceful shutdown on SIGINT/SIGTERM
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
