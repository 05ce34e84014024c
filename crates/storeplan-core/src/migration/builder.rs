//! Per-version operation builder.

use super::action::{Action, Transform};
use super::operation::{Operation, OperationKind};
use crate::catalog::{IndexDef, SchemaModel, Shape, StoreDef};
use crate::config::PlanConfig;
use crate::error::{SchemaError, SchemaResult};
use crate::validator;
use tracing::{debug, warn};

/// The first rejected operation of a version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Zero-based position of the operation.
    pub index: usize,
    /// Kind of the operation.
    pub operation: OperationKind,
    /// Why it was rejected.
    pub error: SchemaError,
}

/// Collects the operations of one version.
///
/// Each operation is validated against the model left by the previous one.
/// After the first rejection the builder refuses everything else with
/// [`SchemaError::StepAborted`], and the plan discards the whole version.
#[derive(Debug)]
pub struct VersionBuilder {
    version: i64,
    model: SchemaModel,
    actions: Vec<Action>,
    attempted: usize,
    failure: Option<Failure>,
    config: PlanConfig,
}

impl VersionBuilder {
    pub(crate) fn new(version: i64, model: SchemaModel, config: PlanConfig) -> Self {
        Self {
            version,
            model,
            actions: Vec::new(),
            attempted: 0,
            failure: None,
            config,
        }
    }

    /// Version being built.
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Model after the operations accepted so far.
    pub fn model(&self) -> &SchemaModel {
        &self.model
    }

    /// Actions emitted so far.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Number of operations submitted, including rejected ones.
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    /// First rejection, if any.
    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    /// Validate and apply one operation.
    pub fn apply(&mut self, operation: Operation) -> SchemaResult<&mut Self> {
        let index = self.attempted;
        self.attempted += 1;

        if self.failure.is_some() {
            return Err(SchemaError::StepAborted {
                version: self.version,
            });
        }

        let kind = operation.kind();
        let store = operation.store_name().to_string();
        match validator::apply(&self.model, operation, &self.config) {
            Ok(applied) => {
                if self.config.log_operations {
                    debug!(
                        version = self.version,
                        index,
                        operation = %kind,
                        store = %store,
                        emitted = applied.action.is_some(),
                        "Operation applied"
                    );
                }
                self.model = applied.model;
                self.actions.extend(applied.action);
                Ok(self)
            }
            Err(error) => {
                warn!(
                    version = self.version,
                    index,
                    operation = %kind,
                    store = %store,
                    error = %error,
                    "Operation rejected"
                );
                self.failure = Some(Failure {
                    index,
                    operation: kind,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    /// Create a store.
    pub fn create_store(&mut self, def: StoreDef) -> SchemaResult<&mut Self> {
        self.apply(Operation::CreateStore(def))
    }

    /// Delete a store.
    pub fn delete_store(&mut self, name: impl Into<String>) -> SchemaResult<&mut Self> {
        self.apply(Operation::DeleteStore { name: name.into() })
    }

    /// Rename a store.
    pub fn rename_store(
        &mut self,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> SchemaResult<&mut Self> {
        self.apply(Operation::RenameStore {
            old_name: old_name.into(),
            new_name: new_name.into(),
        })
    }

    /// Create an index.
    pub fn create_index(
        &mut self,
        store: impl Into<String>,
        index: IndexDef,
    ) -> SchemaResult<&mut Self> {
        self.apply(Operation::CreateIndex {
            store: store.into(),
            index,
        })
    }

    /// Delete an index.
    pub fn delete_index(
        &mut self,
        store: impl Into<String>,
        index: impl Into<String>,
    ) -> SchemaResult<&mut Self> {
        self.apply(Operation::DeleteIndex {
            store: store.into(),
            index: index.into(),
        })
    }

    /// Rename an index.
    pub fn rename_index(
        &mut self,
        store: impl Into<String>,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> SchemaResult<&mut Self> {
        self.apply(Operation::RenameIndex {
            store: store.into(),
            old_name: old_name.into(),
            new_name: new_name.into(),
        })
    }

    /// Transform every record of a store.
    pub fn transform_store(
        &mut self,
        store: impl Into<String>,
        transform: Transform,
    ) -> SchemaResult<&mut Self> {
        self.apply(Operation::TransformStore {
            store: store.into(),
            transform,
        })
    }

    /// Merge a shape change into a store.
    pub fn update_schema(
        &mut self,
        store: impl Into<String>,
        delta: impl Into<Shape>,
    ) -> SchemaResult<&mut Self> {
        self.apply(Operation::UpdateSchema {
            store: store.into(),
            delta: delta.into(),
        })
    }

    pub(crate) fn into_parts(self) -> (SchemaModel, Vec<Action>, usize, Option<Failure>) {
        (self.model, self.actions, self.attempted, self.failure)
    }
}
