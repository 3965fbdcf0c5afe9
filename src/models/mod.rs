//! Models module
//!
//! Defines the definition objects the importer populates and the exporter reads:
//! - Enumerated domains (on-parent-version actions, property types, query operators)
//! - Repository collaborator traits (factory, namespace registry, templates)
//! - In-memory implementations of those traits

pub mod enums;
pub mod memory;
pub mod repository;
pub mod value;

pub use enums::*;
pub use memory::{
    MemoryNamespaceRegistry, MemoryNodeDefinition, MemoryNodeType, MemoryNodeTypeManager,
    MemoryPropertyDefinition,
};
pub use repository::{
    ItemDefinitionTemplate, NamespaceRegistry, NodeDefinitionTemplate, NodeTypeManager,
    NodeTypeTemplate, PropertyDefinitionTemplate,
};
pub use value::ScalarValue;
