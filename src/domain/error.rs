//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Violations of the record structure detected while building a hierarchy.
///
/// These are data-integrity defects of the upstream record source. The builder
/// never repairs them: no node is dropped or attached somewhere else.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("duplicate record id: {0}")]
    DuplicateId(String),

    #[error("record {id} references unknown parent: {parent_id}")]
    MissingParent { id: String, parent_id: String },

    #[error("record {0} references itself as parent")]
    SelfReference(String),

    #[error("cycle detected in hierarchy: {0}")]
    Cycle(String),

    #[error("record #{index}: invalid field '{field}': {reason}")]
    InvalidField {
        index: usize,
        field: String,
        reason: String,
    },
}

/// Misconfigured layout extents.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{axis} extent must be positive after insets, got {extent}")]
    NonPositiveExtent { axis: &'static str, extent: f64 },

    #[error("{axis} extent is not a finite number: {extent}")]
    NonFiniteExtent { axis: &'static str, extent: f64 },

    #[error("invalid {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// Domain errors represent business logic violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("{0}")]
    Structure(#[from] StructureError),

    #[error("{0}")]
    Config(#[from] ConfigError),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
