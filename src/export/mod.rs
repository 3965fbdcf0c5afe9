//! Export functionality
//!
//! Reads node type templates back into the canonical YAML document shape.

pub mod node_type;

pub use node_type::NodeTypeExporter;
