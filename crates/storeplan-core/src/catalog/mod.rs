//! Schema catalog for storeplan.
//!
//! The catalog describes record shapes, key paths, stores and indexes, and
//! the immutable [`SchemaModel`] snapshots threaded through a migration plan.

pub mod key_path;
mod schema;
mod shape;
mod store;

pub use key_path::{
    evaluate, evaluate_multi_entry, path_exists, resolve, resolve_path, KeyPath, Resolution,
    ResolvedField,
};
pub use schema::{SchemaLayout, SchemaModel, StoreLayout};
pub use shape::{Field, Fields, ObjectShape, Shape};
pub use store::{IndexDef, IndexDescriptor, StoreDef, StoreDescriptor};
