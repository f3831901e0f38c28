//! The polymorphic association row

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One directed, typed edge between two resources.
///
/// Endpoints are referenced by a kind-name tag plus an integer id instead of
/// real foreign keys, which is what lets a single table hold edges between
/// arbitrary kinds. Tags are validated against the resource registry when the
/// edge is written; nothing prevents a store from deleting an endpoint later,
/// so readers must handle dangling tags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Association {
    /// Kind of the resource the edge starts at
    pub base_type: String,

    /// Id of the resource the edge starts at
    pub base_id: i64,

    /// The relationship name (e.g. "bazfoo")
    ///
    /// A free-form string, not an enum, so any relationship can be expressed
    /// without touching the framework.
    pub relation_name: String,

    /// Kind of the resource the edge points to
    pub related_type: String,

    /// Id of the resource the edge points to
    pub related_id: i64,

    /// When this edge was written; takes no part in identity
    pub created_at: DateTime<Utc>,
}

impl Association {
    pub fn new(
        base_type: impl Into<String>,
        base_id: i64,
        relation_name: impl Into<String>,
        related_type: impl Into<String>,
        related_id: i64,
    ) -> Self {
        Self {
            base_type: base_type.into(),
            base_id,
            relation_name: relation_name.into(),
            related_type: related_type.into(),
            related_id,
            created_at: Utc::now(),
        }
    }

    /// Whether this row matches every field the query constrains
    pub fn matches(&self, query: &AssociationQuery) -> bool {
        query
            .base_type
            .as_ref()
            .is_none_or(|v| &self.base_type == v)
            && query.base_id.is_none_or(|v| self.base_id == v)
            && query
                .relation_name
                .as_ref()
                .is_none_or(|v| &self.relation_name == v)
            && query
                .related_type
                .as_ref()
                .is_none_or(|v| &self.related_type == v)
            && query.related_id.is_none_or(|v| self.related_id == v)
    }
}

/// Subset query over association rows.
///
/// Every field is optional; unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssociationQuery {
    pub base_type: Option<String>,
    pub base_id: Option<i64>,
    pub relation_name: Option<String>,
    pub related_type: Option<String>,
    pub related_id: Option<i64>,
}

impl AssociationQuery {
    /// All edges starting at one resource
    pub fn for_base(base_type: impl Into<String>, base_id: i64) -> Self {
        Self {
            base_type: Some(base_type.into()),
            base_id: Some(base_id),
            ..Self::default()
        }
    }

    /// Constrain to one relation name
    pub fn relation(mut self, relation_name: impl Into<String>) -> Self {
        self.relation_name = Some(relation_name.into());
        self
    }

    /// Constrain to one related id
    pub fn related(mut self, related_id: i64) -> Self {
        self.related_id = Some(related_id);
        self
    }
}
