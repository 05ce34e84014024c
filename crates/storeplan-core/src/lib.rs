//! Storeplan Core - Schema model, validator, and migration planner.
//!
//! This crate models the structural schema of a versioned key-value store
//! (stores, key paths, indexes, record shapes) and turns a sequence of
//! versions into a validated list of actions for a storage executor.

pub mod catalog;
pub mod config;
pub mod error;
pub mod migration;
pub mod validator;

pub use catalog::{
    IndexDef, IndexDescriptor, KeyPath, SchemaLayout, SchemaModel, Shape, StoreDef,
    StoreDescriptor, StoreLayout,
};
pub use config::{PlanConfig, SameNameRename};
pub use error::{KeyViolation, MigrationError, NameKind, Result, SchemaError, SchemaResult};
pub use migration::{
    Action, MigrationPlan, MigrationStep, Operation, OperationKind, Transform, VersionBuilder,
};
pub use validator::Applied;

/// Re-export key and range types.
pub use storeplan_proto as proto;
