//! Field metadata declared by resource stores

use serde::{Deserialize, Serialize};

/// Metadata for a single declared field of a resource kind.
///
/// Stores describe their schema to the framework through a list of
/// `FieldSpec`s. The framework never interprets field values itself; it only
/// uses the flags:
/// - `server_only`: the field is stripped from every response
/// - `required`: the store rejects creation without it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name as it appears on resource instances
    pub name: String,

    /// Never returned to clients
    #[serde(default)]
    pub server_only: bool,

    /// The store reports a missing-value error when absent on create
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    /// Declare a public, optional field
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            server_only: false,
            required: false,
        }
    }

    /// Mark the field as server-only
    pub fn server_only(mut self) -> Self {
        self.server_only = true;
        self
    }

    /// Mark the field as required on create
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}
