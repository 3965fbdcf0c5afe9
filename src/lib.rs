//! Node Type YAML - schema-driven mapping between YAML documents and
//! content-repository node type definitions
//!
//! Provides:
//! - Value validators and a field table describing every legal key
//! - Whole-document validation that reports every problem at once
//! - Import of validated documents into repository definition templates
//! - Export of definition templates back to canonical YAML
//! - In-memory repository collaborators for use without a live repository

pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod validation;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::ImportConfig;
pub use error::{NodeTypeError, NodeTypeResult, RepositoryError};
pub use export::NodeTypeExporter;
pub use import::NodeTypeImporter;
pub use models::enums::*;
pub use models::{
    ItemDefinitionTemplate, MemoryNamespaceRegistry, MemoryNodeTypeManager, NamespaceRegistry,
    NodeDefinitionTemplate, NodeTypeManager, NodeTypeTemplate, PropertyDefinitionTemplate,
    ScalarValue,
};
pub use validation::{DocumentValidator, EntityKind, FieldTable, ValidationReport, Violation};
