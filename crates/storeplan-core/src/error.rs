//! Core error types.

use crate::catalog::KeyPath;
use crate::migration::OperationKind;
use thiserror::Error;

/// The kind of schema object a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    /// An object store.
    Store,
    /// An index within a store.
    Index,
}

impl std::fmt::Display for NameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameKind::Store => write!(f, "store"),
            NameKind::Index => write!(f, "index"),
        }
    }
}

/// Why a key path is not acceptable where it is used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyViolation {
    /// A path segment does not exist in the shape.
    #[error("path does not exist in the record shape")]
    Unresolvable,

    /// The path resolves to something that is not a valid key.
    #[error("resolved type {resolved} is not a valid key")]
    NotAKey {
        /// Rendered resolved type.
        resolved: String,
    },

    /// The path may be absent, which a primary key cannot be.
    #[error("resolved type {resolved} may be absent")]
    Optional {
        /// Rendered resolved type.
        resolved: String,
    },

    /// Auto-increment keys are numbers.
    #[error("resolved type {resolved} does not accept generated numbers")]
    NotNumber {
        /// Rendered resolved type.
        resolved: String,
    },

    /// Auto-increment keys are scalar.
    #[error("composite key paths cannot be auto-incremented")]
    CompositeAutoIncrement,

    /// Auto-increment keys are written into a field of the record.
    #[error("the empty key path cannot be auto-incremented")]
    EmptyAutoIncrement,

    /// Multi-entry indexes take a single path.
    #[error("composite key paths cannot be multi-entry")]
    CompositeMultiEntry,

    /// Multi-entry path is an array, but its elements are not keys.
    #[error("resolved type {resolved} is an array of invalid key elements")]
    InvalidElements {
        /// Rendered resolved type.
        resolved: String,
    },

    /// Multi-entry path is neither a key nor an array.
    #[error("resolved type {resolved} is neither a key nor an array of keys")]
    NotKeyOrArray {
        /// Rendered resolved type.
        resolved: String,
    },

    /// A composite key path with no paths.
    #[error("composite key path must list at least one path")]
    EmptyComposite,
}

fn on_store(store: &Option<String>) -> String {
    store
        .as_ref()
        .map(|store| format!(" on store '{store}'"))
        .unwrap_or_default()
}

fn index_of(index: &Option<String>) -> String {
    index
        .as_ref()
        .map(|index| format!("index '{index}' of "))
        .unwrap_or_default()
}

/// Rejection of a single schema operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A store or index with this name already exists.
    #[error("{kind} '{name}' already exists{}", on_store(.store))]
    DuplicateName {
        /// Store or index.
        kind: NameKind,
        /// The conflicting name.
        name: String,
        /// Owning store, for indexes.
        store: Option<String>,
    },

    /// A store or index with this name does not exist.
    #[error("{kind} '{name}' does not exist{}", on_store(.store))]
    UnknownName {
        /// Store or index.
        kind: NameKind,
        /// The missing name.
        name: String,
        /// Owning store, for indexes.
        store: Option<String>,
    },

    /// A key path does not resolve to a valid key.
    #[error("invalid key path {path} for {}store '{store}': {violation}", index_of(.index))]
    InvalidKeyPath {
        /// Store the path belongs to.
        store: String,
        /// Index the path belongs to, if not the primary key.
        index: Option<String>,
        /// The offending path.
        path: KeyPath,
        /// What is wrong with it.
        violation: KeyViolation,
    },

    /// Auto-increment cannot be used with this key path.
    #[error("auto-increment store '{store}' cannot use key path {path}: {violation}")]
    AutoIncrementConstraint {
        /// Store being created.
        store: String,
        /// The offending path.
        path: KeyPath,
        /// What is wrong with it.
        violation: KeyViolation,
    },

    /// Multi-entry cannot be used with this key path.
    #[error("multi-entry index '{index}' on store '{store}' cannot use key path {path}: {violation}")]
    MultiEntryConstraint {
        /// Owning store.
        store: String,
        /// Index being created.
        index: String,
        /// The offending path.
        path: KeyPath,
        /// What is wrong with it.
        violation: KeyViolation,
    },

    /// A shape change breaks the store's primary key.
    #[error("shape change invalidates primary key {path} of store '{store}': {violation}")]
    TransformInvalidatesKey {
        /// Affected store.
        store: String,
        /// The primary key path.
        path: KeyPath,
        /// What is wrong with it under the new shape.
        violation: KeyViolation,
    },

    /// A shape change breaks an existing index.
    #[error("shape change invalidates index '{index}' of store '{store}' on {path}: {violation}")]
    TransformInvalidatesIndex {
        /// Affected store.
        store: String,
        /// First index that no longer validates.
        index: String,
        /// The index key path.
        path: KeyPath,
        /// What is wrong with it under the new shape.
        violation: KeyViolation,
    },

    /// An earlier operation of this version already failed.
    #[error("version {version} was aborted by an earlier rejected operation")]
    StepAborted {
        /// The aborted version.
        version: i64,
    },
}

impl SchemaError {
    pub(crate) fn duplicate_store(name: &str) -> Self {
        SchemaError::DuplicateName {
            kind: NameKind::Store,
            name: name.to_string(),
            store: None,
        }
    }

    pub(crate) fn unknown_store(name: &str) -> Self {
        SchemaError::UnknownName {
            kind: NameKind::Store,
            name: name.to_string(),
            store: None,
        }
    }

    pub(crate) fn duplicate_index(store: &str, name: &str) -> Self {
        SchemaError::DuplicateName {
            kind: NameKind::Index,
            name: name.to_string(),
            store: Some(store.to_string()),
        }
    }

    pub(crate) fn unknown_index(store: &str, name: &str) -> Self {
        SchemaError::UnknownName {
            kind: NameKind::Index,
            name: name.to_string(),
            store: Some(store.to_string()),
        }
    }
}

fn operation_label(operation: &Option<OperationKind>) -> String {
    operation
        .map(|kind| format!(" ({kind})"))
        .unwrap_or_default()
}

/// Plan-level errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationError {
    /// Versions must strictly increase.
    #[error("version {attempted} must be greater than the previous version {previous}")]
    VersionOrder {
        /// Last version recorded in the plan.
        previous: i64,
        /// Version that was attempted.
        attempted: i64,
    },

    /// The first version must be positive under the active configuration.
    #[error("first version must be positive, got {version}")]
    NonPositiveVersion {
        /// Version that was attempted.
        version: i64,
    },

    /// An operation inside a version was rejected.
    #[error("version {version}, operation #{index}{} rejected: {source}", operation_label(.operation))]
    Rejected {
        /// Version being built.
        version: i64,
        /// Zero-based position of the operation within the version.
        index: usize,
        /// Kind of the rejected operation, when it came from the builder.
        operation: Option<OperationKind>,
        /// Why it was rejected.
        #[source]
        source: SchemaError,
    },
}

impl MigrationError {
    /// The operation-level rejection, if any.
    pub fn schema_error(&self) -> Option<&SchemaError> {
        match self {
            MigrationError::Rejected { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for single operations.
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;

/// Result type for plan building.
pub type Result<T> = std::result::Result<T, MigrationError>;
