//! Versioned migration plans.
//!
//! A plan is an ordered list of steps, one per version, each holding the
//! actions an executor applies to move a store from the previous version.
//! Versions strictly increase and every step is validated against the model
//! the earlier steps produce.

use super::action::Action;
use super::builder::VersionBuilder;
use crate::catalog::SchemaModel;
use crate::config::PlanConfig;
use crate::error::{MigrationError, Result, SchemaResult};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// The actions of a single version.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationStep {
    /// Version reached once the actions are applied.
    pub version: i64,
    /// Actions in submission order.
    pub actions: Vec<Action>,
}

impl MigrationStep {
    /// Check if this step emits no actions.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// A migration plan under construction.
#[derive(Debug, Clone, Default)]
pub struct MigrationPlan {
    steps: Vec<MigrationStep>,
    model: SchemaModel,
    config: PlanConfig,
}

impl MigrationPlan {
    /// Create an empty plan with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty plan with a custom configuration.
    pub fn with_config(config: PlanConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Add a version.
    ///
    /// `build` receives a builder seeded with the current model. If any of
    /// its operations is rejected, or it returns an error, the version is
    /// discarded and the plan is left exactly as it was.
    #[instrument(skip(self, build))]
    pub fn add_version<F>(&mut self, version: i64, build: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut VersionBuilder) -> SchemaResult<()>,
    {
        self.check_version(version)?;

        let mut builder = VersionBuilder::new(version, self.model.clone(), self.config.clone());
        let outcome = build(&mut builder);
        let (model, actions, attempted, failure) = builder.into_parts();

        if let Some(failure) = failure {
            warn!(
                version,
                index = failure.index,
                operation = %failure.operation,
                "Version discarded"
            );
            return Err(MigrationError::Rejected {
                version,
                index: failure.index,
                operation: Some(failure.operation),
                source: failure.error,
            });
        }
        if let Err(source) = outcome {
            warn!(version, error = %source, "Version discarded by its builder");
            return Err(MigrationError::Rejected {
                version,
                index: attempted,
                operation: None,
                source,
            });
        }

        info!(
            version,
            actions = actions.len(),
            stores = model.len(),
            "Version added"
        );
        self.model = model;
        self.steps.push(MigrationStep { version, actions });
        Ok(self)
    }

    /// Owned form of [`add_version`](Self::add_version), for chaining.
    pub fn version<F>(mut self, version: i64, build: F) -> Result<Self>
    where
        F: FnOnce(&mut VersionBuilder) -> SchemaResult<()>,
    {
        self.add_version(version, build)?;
        Ok(self)
    }

    fn check_version(&self, version: i64) -> Result<()> {
        match self.latest_version() {
            Some(previous) if version <= previous => Err(MigrationError::VersionOrder {
                previous,
                attempted: version,
            }),
            None if self.config.require_positive_first_version && version <= 0 => {
                Err(MigrationError::NonPositiveVersion { version })
            }
            _ => Ok(()),
        }
    }

    /// Steps in version order.
    pub fn steps(&self) -> &[MigrationStep] {
        &self.steps
    }

    /// Highest version in the plan.
    pub fn latest_version(&self) -> Option<i64> {
        self.steps.last().map(|step| step.version)
    }

    /// Model after the last accepted version.
    pub fn model(&self) -> &SchemaModel {
        &self.model
    }

    /// Active configuration.
    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// Check if no version has been added.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total number of actions across all steps.
    pub fn action_count(&self) -> usize {
        self.steps.iter().map(|step| step.actions.len()).sum()
    }

    /// Steps an executor still has to run, given the installed version.
    ///
    /// `None` means nothing is installed yet, so every step is pending.
    pub fn pending_steps(&self, installed: Option<i64>) -> &[MigrationStep] {
        match installed {
            Some(installed) => {
                let start = self.steps.partition_point(|step| step.version <= installed);
                &self.steps[start..]
            }
            None => &self.steps,
        }
    }

    /// Consume the plan, returning its steps.
    pub fn into_steps(self) -> Vec<MigrationStep> {
        self.steps
    }
}
