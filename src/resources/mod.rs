//! Resource CRUD and named-relation handlers

pub mod handlers;
pub mod relations;

pub use handlers::{
    create_resource, delete_resource, get_resource, list_resources, update_resource,
};
pub use relations::{
    add_relation, get_relation, get_relation_item, remove_relation, remove_relation_without_id,
};
