//! Resource registry mapping kind names to their capability sets

use crate::core::relation::RelationTable;
use crate::core::store::ResourceStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Everything the framework knows about one resource kind: its store (and
/// through it, its field metadata) plus its named-relation table.
pub struct ResourceKind {
    /// Kind name as it appears in URLs
    pub name: String,

    /// The external store backing this kind
    pub store: Arc<dyn ResourceStore>,

    /// Pre-wired named relations of this kind
    pub relations: RelationTable,
}

/// Registry of all resource kinds served by one instance.
///
/// Built once at startup and immutable afterwards; handlers resolve kinds
/// through it instead of free-form dynamic lookup, and the association
/// operations use it to validate type tags before writing edges.
#[derive(Default)]
pub struct ResourceRegistry {
    kinds: HashMap<String, Arc<ResourceKind>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind. A repeated name replaces the earlier entry.
    pub fn register(&mut self, kind: ResourceKind) {
        self.kinds.insert(kind.name.clone(), Arc::new(kind));
    }

    /// Resolve a kind by name
    pub fn kind(&self, name: &str) -> Option<Arc<ResourceKind>> {
        self.kinds.get(name).cloned()
    }

    /// Whether a kind name is registered (type-tag validation)
    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    /// All registered kind names
    pub fn kind_names(&self) -> Vec<&str> {
        self.kinds.keys().map(|s| s.as_str()).collect()
    }
}
