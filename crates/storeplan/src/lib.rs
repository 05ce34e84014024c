//! Storeplan - Versioned schema migrations for key-value stores.
//!
//! Describe each version of a store layout as a list of operations; the
//! planner validates them against the schema built so far and records the
//! actions a storage executor has to run.
//!
//! # Quick Start
//!
//! ```
//! use storeplan::prelude::*;
//!
//! # fn main() -> Result<(), MigrationError> {
//! let plan = MigrationPlan::new()
//!     .version(1, |v| {
//!         v.create_store(
//!             StoreDef::new("users", Shape::object()
//!                 .with_field("id", Shape::Number)
//!                 .with_field("email", Shape::String))
//!             .with_key_path("id"),
//!         )?
//!         .create_index("users", IndexDef::new("byEmail", "email").with_unique())?;
//!         Ok(())
//!     })?;
//!
//! for step in plan.pending_steps(None) {
//!     println!("v{}: {} actions", step.version, step.actions.len());
//! }
//! # Ok(())
//! # }
//! ```

pub use storeplan_core::{catalog, config, error, migration, validator};
pub use storeplan_core::{
    Action, IndexDef, KeyPath, MigrationError, MigrationPlan, MigrationStep, PlanConfig,
    SameNameRename, SchemaError, SchemaModel, Shape, StoreDef, Transform, VersionBuilder,
};
pub use storeplan_proto::{Key, KeyRange, RangeBuilder};

/// Re-export key and range types.
pub use storeplan_proto as proto;

/// Commonly used types.
pub mod prelude {
    pub use storeplan_core::catalog::{IndexDef, KeyPath, SchemaModel, Shape, StoreDef};
    pub use storeplan_core::config::{PlanConfig, SameNameRename};
    pub use storeplan_core::error::{MigrationError, SchemaError};
    pub use storeplan_core::migration::{Action, MigrationPlan, MigrationStep, Transform};
    pub use storeplan_proto::{Key, KeyRange, RangeBuilder};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use serde_json::json;

    #[test]
    fn test_prelude_builds_a_plan() {
        let plan = MigrationPlan::new()
            .version(1, |v| {
                v.create_store(
                    StoreDef::new(
                        "users",
                        Shape::object()
                            .with_field("id", Shape::Number)
                            .with_field("email", Shape::String),
                    )
                    .with_key_path("id"),
                )?
                .create_index("users", IndexDef::new("byEmail", "email").with_unique())?;
                Ok(())
            })
            .unwrap();

        let step = &plan.pending_steps(None)[0];
        assert_eq!(
            serde_json::to_value(&step.actions[0]).unwrap(),
            json!({
                "kind": "create-store",
                "storeName": "users",
                "keyPath": "id",
                "autoIncrement": false
            })
        );
    }

    #[test]
    fn test_prelude_range() {
        let range = KeyRange::builder()
            .greater_or_equal(Key::from(1))
            .less_than(Key::from(10))
            .build()
            .unwrap();
        assert!(!range.is_unbounded());
    }
}
