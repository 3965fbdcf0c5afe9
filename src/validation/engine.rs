//! Document validation
//!
//! Walks a parsed document against the [`FieldTable`] and collects every
//! violation before deciding pass or fail. Only structural problems (a root
//! that is not a mapping, a missing `node_types` key) stop the walk early.

use std::ops::ControlFlow;

use serde_yaml::{Mapping, Value};
use tracing::debug;

use super::fields::{EntityKind, FieldRole, FieldTable};
use super::report::{ValidationReport, Violation};
use super::validators::describe_value;
use crate::error::NodeTypeError;

/// Validates node type documents against a field table.
#[derive(Debug, Clone, Copy)]
pub struct DocumentValidator {
    table: &'static FieldTable,
}

impl Default for DocumentValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentValidator {
    /// Create a validator over the process-wide field table
    pub fn new() -> Self {
        Self {
            table: FieldTable::global(),
        }
    }

    /// Create a validator over a specific table
    pub fn with_table(table: &'static FieldTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'static FieldTable {
        self.table
    }

    /// Validate a whole document and return every violation found.
    ///
    /// # Arguments
    ///
    /// * `document` - Parsed YAML document
    ///
    /// # Returns
    ///
    /// The report (empty when valid), or a structure error when the document is
    /// not a mapping holding `node_types`.
    ///
    /// # Example
    ///
    /// ```
    /// use nodetype_yaml::validation::DocumentValidator;
    ///
    /// let doc: serde_yaml::Value = serde_yaml::from_str(
    ///     "node_types:\n  article:\n    mixin: yes please\n    colour: red\n",
    /// ).unwrap();
    /// let report = DocumentValidator::new().validate(&doc).unwrap();
    /// assert_eq!(report.len(), 2);
    /// ```
    pub fn validate(&self, document: &Value) -> Result<ValidationReport, NodeTypeError> {
        let root = document_root(self.table, document)?;

        let mut report = ValidationReport::new();
        let _ = self.walk_mapping(EntityKind::Document, root, &mut |violation| {
            report.push(violation);
            ControlFlow::Continue(())
        });

        debug!(violations = report.len(), "Validated node type document");
        Ok(report)
    }

    /// Validate a whole document, raising the aggregated error when anything is wrong
    pub fn check(&self, document: &Value) -> Result<(), NodeTypeError> {
        self.validate(document)?.into_result()
    }

    /// Validate one entity spec (and everything nested under it)
    pub fn validate_entity(&self, kind: EntityKind, spec: &Value) -> ValidationReport {
        let mut report = ValidationReport::new();
        let _ = self.walk_spec(kind, "", spec, &mut |violation| {
            report.push(violation);
            ControlFlow::Continue(())
        });
        report
    }

    /// First violation in one entity spec, in walk order.
    ///
    /// The walk stops as soon as a violation is found.
    pub fn first_violation(&self, kind: EntityKind, spec: &Value) -> Option<Violation> {
        let mut found = None;
        let _ = self.walk_spec(kind, "", spec, &mut |violation| {
            found = Some(violation);
            ControlFlow::Break(())
        });
        found
    }

    fn walk_spec(
        &self,
        kind: EntityKind,
        name: &str,
        spec: &Value,
        sink: &mut dyn FnMut(Violation) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        match spec {
            Value::Null => ControlFlow::Continue(()),
            Value::Mapping(mapping) => self.walk_mapping(kind, mapping, sink),
            other => sink(Violation::InvalidValue {
                kind,
                key: name.to_string(),
                reason: format!("should be a \"mapping\", found a {}", describe_value(other)),
            }),
        }
    }

    // This entity's own keys first, then each nested collection in table order
    fn walk_mapping(
        &self,
        kind: EntityKind,
        mapping: &Mapping,
        sink: &mut dyn FnMut(Violation) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        let mut nested: Vec<(&'static str, EntityKind, &Mapping)> = Vec::new();

        for (key, value) in mapping {
            let Some(key) = key.as_str() else {
                sink(Violation::InvalidValue {
                    kind,
                    key: key_label(key),
                    reason: format!("Keys must be strings, found a {}", describe_value(key)),
                })?;
                continue;
            };

            let Some(info) = self.table.rule(kind, key) else {
                sink(Violation::UnknownKey {
                    kind,
                    key: key.to_string(),
                    legal: self.table.legal_fields(kind),
                })?;
                continue;
            };

            if let Err(reason) = info.rule.check(value) {
                sink(Violation::InvalidValue {
                    kind,
                    key: key.to_string(),
                    reason,
                })?;
                continue;
            }

            if let (FieldRole::Nested(child), Value::Mapping(entries)) = (info.role, value) {
                nested.push((info.name, child, entries));
            }
        }

        for info in self.table.entries(kind) {
            let FieldRole::Nested(_) = info.role else {
                continue;
            };
            for (_, child, entries) in nested.iter().filter(|(name, _, _)| *name == info.name) {
                self.walk_entries(*child, entries, sink)?;
            }
        }

        ControlFlow::Continue(())
    }

    fn walk_entries(
        &self,
        kind: EntityKind,
        entries: &Mapping,
        sink: &mut dyn FnMut(Violation) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        for (name, spec) in entries {
            match name.as_str() {
                Some(name) => self.walk_spec(kind, name, spec, sink)?,
                None => sink(Violation::InvalidValue {
                    kind,
                    key: key_label(name),
                    reason: format!("Names must be strings, found a {}", describe_value(name)),
                })?,
            }
        }
        ControlFlow::Continue(())
    }
}

/// The root mapping of a document, or a structure error when it is not a
/// mapping holding every nested collection the document kind declares
pub(crate) fn document_root<'d>(
    table: &FieldTable,
    document: &'d Value,
) -> Result<&'d Mapping, NodeTypeError> {
    let root = document.as_mapping().ok_or_else(|| {
        NodeTypeError::Structure(format!(
            "document root should be a mapping, found a {}",
            describe_value(document)
        ))
    })?;
    for (key, _) in table.document().nested_rules() {
        if !root.contains_key(key) {
            return Err(NodeTypeError::Structure(format!(
                "document has no \"{}\" key",
                key
            )));
        }
    }
    Ok(root)
}

fn key_label(key: &Value) -> String {
    match key {
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => describe_value(other).to_string(),
    }
}
