//! Core module containing fundamental traits and types for the framework

pub mod access;
pub mod error;
pub mod field;
pub mod filter;
pub mod hypermedia;
pub mod relation;
pub mod store;

pub use access::{AccessPolicy, AccessRequest, AllowAll, PolicyFn};
pub use error::{ApiError, ErrorResponse};
pub use field::FieldSpec;
pub use filter::filter_resource;
pub use hypermedia::{append_links, self_link_type};
pub use relation::{RelationAccessor, RelationTable, RelationVerb};
pub use store::{ResourceStore, StoreError};
