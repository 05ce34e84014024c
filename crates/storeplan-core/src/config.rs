//! Plan configuration.

use serde::{Deserialize, Serialize};

/// How renaming a store or index to its current name is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SameNameRename {
    /// Accept it and emit no action.
    #[default]
    NoOp,
    /// Reject it as a duplicate name.
    Reject,
}

/// Configuration for building a migration plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Reject a first version that is zero or negative.
    pub require_positive_first_version: bool,

    /// Treatment of renames to the current name.
    pub same_name_rename: SameNameRename,

    /// Emit a debug event for every applied operation.
    pub log_operations: bool,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            require_positive_first_version: false,
            same_name_rename: SameNameRename::NoOp,
            log_operations: true,
        }
    }
}

impl PlanConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the first version to be positive.
    pub fn with_positive_first_version(mut self) -> Self {
        self.require_positive_first_version = true;
        self
    }

    /// Set how same-name renames are treated.
    pub fn with_same_name_rename(mut self, policy: SameNameRename) -> Self {
        self.same_name_rename = policy;
        self
    }

    /// Enable or disable per-operation debug events.
    pub fn log_operations(mut self, enabled: bool) -> Self {
        self.log_operations = enabled;
        self
    }
}
