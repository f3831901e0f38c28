//! Generic association subsystem: a polymorphic join table plus the
//! operations that drive it

pub mod handlers;
pub mod model;
pub mod store;

pub use handlers::{create_associations, list_associations, remove_association};
pub use model::{Association, AssociationQuery};
pub use store::AssociationStore;
