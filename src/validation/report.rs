//! Validation report
//!
//! A report is the ordered list of every violation found in one validation
//! pass. It is created fresh per document and is empty when the document is valid.

use serde::Serialize;

use super::fields::EntityKind;
use crate::error::NodeTypeError;

/// One problem found while walking a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Violation {
    /// A key that is not in the field table for its entity kind
    UnknownKey {
        kind: EntityKind,
        key: String,
        legal: Vec<&'static str>,
    },
    /// A known key whose value failed its validator
    InvalidValue {
        kind: EntityKind,
        key: String,
        reason: String,
    },
}

impl Violation {
    /// The offending key
    pub fn key(&self) -> &str {
        match self {
            Violation::UnknownKey { key, .. } | Violation::InvalidValue { key, .. } => key,
        }
    }

    /// Entity kind the key was found on
    pub fn kind(&self) -> EntityKind {
        match self {
            Violation::UnknownKey { kind, .. } | Violation::InvalidValue { kind, .. } => *kind,
        }
    }

    /// What is wrong, without the key
    pub fn reason(&self) -> String {
        match self {
            Violation::UnknownKey { legal, .. } => {
                format!("unknown key, must be one of \"{}\"", legal.join(", "))
            }
            Violation::InvalidValue { reason, .. } => reason.clone(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::UnknownKey { key, legal, .. } => write!(
                f,
                "Unknown key \"{}\", must be one of \"{}\"",
                key,
                legal.join(", ")
            ),
            Violation::InvalidValue { key, reason, .. } => {
                write!(f, "Value for key \"{}\" is not valid: {}", key, reason)
            }
        }
    }
}

/// Ordered violations from one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// True when no violation was recorded
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    /// Rendered messages, in document order
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.to_string()).collect()
    }

    /// `(field name, message)` pairs, in document order
    pub fn entries(&self) -> Vec<(String, String)> {
        self.violations
            .iter()
            .map(|v| (v.key().to_string(), v.to_string()))
            .collect()
    }

    /// Turn a non-empty report into the aggregated configuration error
    pub fn into_result(self) -> Result<(), NodeTypeError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(NodeTypeError::InvalidConfiguration(self))
        }
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid configuration: \n\n - {}", self.messages().join("\n - "))
    }
}

impl<'a> IntoIterator for &'a ValidationReport {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_messages() {
        let unknown = Violation::UnknownKey {
            kind: EntityKind::Document,
            key: "extra".to_string(),
            legal: vec!["namespaces", "node_types"],
        };
        assert_eq!(
            unknown.to_string(),
            "Unknown key \"extra\", must be one of \"namespaces, node_types\""
        );

        let invalid = Violation::InvalidValue {
            kind: EntityKind::NodeType,
            key: "mixin".to_string(),
            reason: "should be a \"boolean\", found a string".to_string(),
        };
        assert_eq!(
            invalid.to_string(),
            "Value for key \"mixin\" is not valid: should be a \"boolean\", found a string"
        );
        assert_eq!(invalid.kind(), EntityKind::NodeType);
    }

    #[test]
    fn test_report_aggregates_in_order() {
        let mut report = ValidationReport::new();
        assert!(report.is_valid());
        assert!(report.clone().into_result().is_ok());

        report.push(Violation::InvalidValue {
            kind: EntityKind::Child,
            key: "a".to_string(),
            reason: "first".to_string(),
        });
        report.push(Violation::InvalidValue {
            kind: EntityKind::Child,
            key: "b".to_string(),
            reason: "second".to_string(),
        });

        assert_eq!(report.len(), 2);
        assert_eq!(report.entries()[1].0, "b");
        assert_eq!(
            report.to_string(),
            "Invalid configuration: \n\n - Value for key \"a\" is not valid: first\n - Value for key \"b\" is not valid: second"
        );

        let err = report.into_result().unwrap_err();
        assert_eq!(err.report().map(|r| r.len()), Some(2));
    }
}
