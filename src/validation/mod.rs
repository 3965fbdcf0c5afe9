//! Validation functionality
//!
//! Provides validation logic for node type documents:
//! - Value validators (shape checks on single values)
//! - The field table (legal keys per entity kind, with setters and getters)
//! - The document validator (collects every violation in one pass)

pub mod engine;
pub mod fields;
pub mod report;
pub mod validators;

pub use engine::DocumentValidator;
pub use fields::{EntityKind, FieldRole, FieldTable, RuleInfo};
pub use report::{ValidationReport, Violation};
pub use validators::{EnumDomain, ValueKind, ValueRule};
