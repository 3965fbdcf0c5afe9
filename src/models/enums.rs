//! Enumerated domains used by node type definitions
//!
//! Each domain is a closed set of canonical names with a fixed repository code.
//! The same tables drive validation (`enumerated_name`), the import transform
//! (name to value) and the export reverse lookup (value to name).

use serde::{Deserialize, Serialize};

/// A closed domain of named constants.
pub trait EnumeratedName: Copy + PartialEq + Sized + 'static {
    /// Human readable domain label used in error messages
    const DOMAIN: &'static str;

    /// Every member, in canonical order
    const ALL: &'static [Self];

    /// Canonical (normalized) constant name
    fn name(self) -> &'static str;

    /// Name written back by the exporter
    fn canonical(self) -> &'static str {
        self.name()
    }

    /// Normalize raw input before comparing it with canonical names
    fn normalize(raw: &str) -> String {
        raw.trim().to_uppercase()
    }

    /// Resolve a raw name, case-insensitively
    fn from_name(raw: &str) -> Option<Self> {
        let normalized = Self::normalize(raw);
        Self::ALL.iter().copied().find(|v| v.name() == normalized)
    }

    /// All canonical names, in canonical order
    fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|v| v.name()).collect()
    }
}

/// What happens to an item when its parent node is versioned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OnParentVersionAction {
    #[default]
    Copy,
    Version,
    Initialize,
    Compute,
    Ignore,
    Abort,
}

impl OnParentVersionAction {
    /// Repository code of this action
    pub fn code(self) -> i64 {
        match self {
            OnParentVersionAction::Copy => 1,
            OnParentVersionAction::Version => 2,
            OnParentVersionAction::Initialize => 3,
            OnParentVersionAction::Compute => 4,
            OnParentVersionAction::Ignore => 5,
            OnParentVersionAction::Abort => 6,
        }
    }

    /// Reverse lookup from a repository code
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.code() == code)
    }
}

impl EnumeratedName for OnParentVersionAction {
    const DOMAIN: &'static str = "on parent version action";
    const ALL: &'static [Self] = &[
        OnParentVersionAction::Copy,
        OnParentVersionAction::Version,
        OnParentVersionAction::Initialize,
        OnParentVersionAction::Compute,
        OnParentVersionAction::Ignore,
        OnParentVersionAction::Abort,
    ];

    fn name(self) -> &'static str {
        match self {
            OnParentVersionAction::Copy => "COPY",
            OnParentVersionAction::Version => "VERSION",
            OnParentVersionAction::Initialize => "INITIALIZE",
            OnParentVersionAction::Compute => "COMPUTE",
            OnParentVersionAction::Ignore => "IGNORE",
            OnParentVersionAction::Abort => "ABORT",
        }
    }
}

impl std::fmt::Display for OnParentVersionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Value type a property definition requires
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PropertyType {
    #[default]
    String,
    Binary,
    Long,
    Double,
    Date,
    Boolean,
    Name,
    Path,
    Reference,
    WeakReference,
    Uri,
    Decimal,
    Undefined,
}

impl PropertyType {
    /// Repository code of this type
    pub fn code(self) -> i64 {
        match self {
            PropertyType::Undefined => 0,
            PropertyType::String => 1,
            PropertyType::Binary => 2,
            PropertyType::Long => 3,
            PropertyType::Double => 4,
            PropertyType::Date => 5,
            PropertyType::Boolean => 6,
            PropertyType::Name => 7,
            PropertyType::Path => 8,
            PropertyType::Reference => 9,
            PropertyType::WeakReference => 10,
            PropertyType::Uri => 11,
            PropertyType::Decimal => 12,
        }
    }

    /// Reverse lookup from a repository code
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.code() == code)
    }
}

impl EnumeratedName for PropertyType {
    const DOMAIN: &'static str = "property type";
    const ALL: &'static [Self] = &[
        PropertyType::String,
        PropertyType::Binary,
        PropertyType::Long,
        PropertyType::Double,
        PropertyType::Date,
        PropertyType::Boolean,
        PropertyType::Name,
        PropertyType::Path,
        PropertyType::Reference,
        PropertyType::WeakReference,
        PropertyType::Uri,
        PropertyType::Decimal,
        PropertyType::Undefined,
    ];

    fn name(self) -> &'static str {
        match self {
            PropertyType::String => "STRING",
            PropertyType::Binary => "BINARY",
            PropertyType::Long => "LONG",
            PropertyType::Double => "DOUBLE",
            PropertyType::Date => "DATE",
            PropertyType::Boolean => "BOOLEAN",
            PropertyType::Name => "NAME",
            PropertyType::Path => "PATH",
            PropertyType::Reference => "REFERENCE",
            PropertyType::WeakReference => "WEAKREFERENCE",
            PropertyType::Uri => "URI",
            PropertyType::Decimal => "DECIMAL",
            PropertyType::Undefined => "UNDEFINED",
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Comparison operator a property may declare as usable in queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryOperator {
    EqualTo,
    NotEqualTo,
    LessThan,
    LessThanOrEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    Like,
}

impl QueryOperator {
    /// Repository constant of this operator, e.g. `jcr.operator.equal.to`
    pub fn as_str(self) -> &'static str {
        match self {
            QueryOperator::EqualTo => "jcr.operator.equal.to",
            QueryOperator::NotEqualTo => "jcr.operator.not.equal.to",
            QueryOperator::LessThan => "jcr.operator.less.than",
            QueryOperator::LessThanOrEqualTo => "jcr.operator.less.than.or.equal.to",
            QueryOperator::GreaterThan => "jcr.operator.greater.than",
            QueryOperator::GreaterThanOrEqualTo => "jcr.operator.greater.than.or.equal.to",
            QueryOperator::Like => "jcr.operator.like",
        }
    }
}

impl EnumeratedName for QueryOperator {
    const DOMAIN: &'static str = "query operator";
    const ALL: &'static [Self] = &[
        QueryOperator::EqualTo,
        QueryOperator::NotEqualTo,
        QueryOperator::LessThan,
        QueryOperator::LessThanOrEqualTo,
        QueryOperator::GreaterThan,
        QueryOperator::GreaterThanOrEqualTo,
        QueryOperator::Like,
    ];

    fn name(self) -> &'static str {
        match self {
            QueryOperator::EqualTo => "JCR_OPERATOR_EQUAL_TO",
            QueryOperator::NotEqualTo => "JCR_OPERATOR_NOT_EQUAL_TO",
            QueryOperator::LessThan => "JCR_OPERATOR_LESS_THAN",
            QueryOperator::LessThanOrEqualTo => "JCR_OPERATOR_LESS_THAN_OR_EQUAL_TO",
            QueryOperator::GreaterThan => "JCR_OPERATOR_GREATER_THAN",
            QueryOperator::GreaterThanOrEqualTo => "JCR_OPERATOR_GREATER_THAN_OR_EQUAL_TO",
            QueryOperator::Like => "JCR_OPERATOR_LIKE",
        }
    }

    fn canonical(self) -> &'static str {
        self.as_str()
    }

    // `jcr.operator.equal.to` and `JCR_OPERATOR_EQUAL_TO` name the same constant
    fn normalize(raw: &str) -> String {
        raw.trim().to_uppercase().replace('.', "_")
    }
}

impl std::fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
