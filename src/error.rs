//! Error types shared by validation, import and export.

use thiserror::Error;

use crate::validation::{EntityKind, ValidationReport};

/// Failure reported by an external repository collaborator (factory or namespace registry).
///
/// The core never retries these; they are passed through to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The factory refused to create a template
    #[error("Failed to create {0} template: {1}")]
    TemplateCreation(&'static str, String),

    /// The namespace registry rejected a prefix/URI pair
    #[error("Failed to register namespace \"{prefix}\" => \"{uri}\": {reason}")]
    NamespaceRegistration {
        prefix: String,
        uri: String,
        reason: String,
    },
}

/// Errors raised by the node type import/export entry points.
#[derive(Debug, Error)]
pub enum NodeTypeError {
    /// The YAML text could not be parsed into a value tree
    #[error("Parse error: {0}")]
    Parse(String),

    /// The document is not the expected nested mapping (e.g. `node_types` is missing)
    #[error("Invalid document structure: {0}")]
    Structure(String),

    /// One full validation pass found violations; every message is kept in document order
    #[error("{0}")]
    InvalidConfiguration(ValidationReport),

    /// A single field failed while importing without a prior validation pass
    #[error("Invalid {kind} field \"{key}\": {message}")]
    InvalidField {
        kind: EntityKind,
        key: String,
        message: String,
    },

    /// A definition object has no name to key it by
    #[error("Cannot export unnamed {0}")]
    Unnamed(EntityKind),

    /// Two definitions in one collection carry the same qualified name
    #[error("Cannot export duplicate {kind} \"{name}\"")]
    Duplicate { kind: EntityKind, name: String },

    /// Rendering the exported structure as YAML failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An external collaborator failed
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<serde_yaml::Error> for NodeTypeError {
    fn from(e: serde_yaml::Error) -> Self {
        NodeTypeError::Parse(e.to_string())
    }
}

impl NodeTypeError {
    /// The aggregated validation report, if this error carries one
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            NodeTypeError::InvalidConfiguration(report) => Some(report),
            _ => None,
        }
    }
}

/// Result type for node type operations.
pub type NodeTypeResult<T> = Result<T, NodeTypeError>;
