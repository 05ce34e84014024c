//! Migration planning.
//!
//! This module provides:
//! - Operations and the actions they emit
//! - A per-version builder that validates operations in order
//! - Versioned plans with strictly increasing versions
//! - Replay of emitted actions over a structural layout

mod action;
mod builder;
mod operation;
mod plan;
mod replay;

pub use action::{Action, Transform};
pub use builder::{Failure, VersionBuilder};
pub use operation::{Operation, OperationKind};
pub use plan::{MigrationPlan, MigrationStep};
pub use replay::replay;
