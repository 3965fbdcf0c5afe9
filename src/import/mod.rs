//! Import functionality
//!
//! Turns node type YAML documents into definition templates created by a
//! repository's [`NodeTypeManager`](crate::models::NodeTypeManager).

pub mod node_type;

pub use node_type::NodeTypeImporter;
