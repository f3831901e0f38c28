//! # restforge
//!
//! A generic REST-API generator for Rust: point it at a set of resource
//! stores and get CRUD endpoints plus a dynamic association mechanism,
//! without writing per-resource code.
//!
//! ## Features
//!
//! - **Schema-agnostic CRUD**: resources are opaque JSON driven by field
//!   metadata the store declares
//! - **Polymorphic associations**: many-to-many relations between arbitrary
//!   kinds over a single join table, with idempotent creation
//! - **Hypermedia links**: HAL-style `_links` on responses
//! - **Named relations**: explicit per-kind relation tables for pre-wired
//!   accessors
//! - **Soft or hard deletion**: configurable per server instance
//! - **Access hook**: a per-request predicate; denial is a 401
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use restforge::prelude::*;
//!
//! let foo_store = InMemoryResourceStore::new(vec![
//!     FieldSpec::new("id"),
//!     FieldSpec::new("name").required(),
//!     FieldSpec::new("secret").server_only(),
//!     FieldSpec::new("deleted"),
//! ]);
//!
//! let app = ApiBuilder::new()
//!     .with_association_store(InMemoryAssociationStore::new())
//!     .register_resource("foo", foo_store)
//!     .build()?;
//!
//! // POST /api/foo, GET /api/foo/1, POST /api/foo/1/associate/bar, ...
//! ```

pub mod associations;
pub mod config;
pub mod core;
pub mod resources;
pub mod server;
pub mod storage;

/// Install a tracing subscriber honoring `RUST_LOG`.
///
/// Convenience for binaries and examples; libraries embedding restforge
/// normally install their own subscriber instead.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        access::{AccessPolicy, AccessRequest, AllowAll, PolicyFn},
        error::{ApiError, ErrorResponse},
        field::FieldSpec,
        filter::filter_resource,
        hypermedia::{append_links, self_link_type},
        relation::{RelationAccessor, RelationTable, RelationVerb},
        store::{ResourceStore, StoreError},
    };

    // === Associations ===
    pub use crate::associations::{Association, AssociationQuery, AssociationStore};

    // === Config ===
    pub use crate::config::{ApiConfig, DeleteMode};

    // === Server ===
    pub use crate::server::{ApiBuilder, AppState, ResourceKind, ResourceRegistry};

    // === Storage ===
    pub use crate::storage::{InMemoryAssociationStore, InMemoryResourceStore};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Map, Value, json};

    // === Axum ===
    pub use axum::{
        Router,
        extract::{Path, State},
        http::{Method, StatusCode},
    };
}
