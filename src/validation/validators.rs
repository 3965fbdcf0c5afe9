//! Value validators
//!
//! Pure predicates that check the shape of one parsed YAML value. Each returns
//! `Ok(())` or a human readable reason; the caller adds the field name.
//! None of them depend on the entity being validated.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::Value;

use crate::models::enums::{EnumeratedName, OnParentVersionAction, PropertyType, QueryOperator};

/// Namespace prefixes: an XML NCName without dots at the start
static PREFIX_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("prefix pattern is valid"));

/// Runtime shape of a parsed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Boolean,
    Sequence,
    Mapping,
    /// String, number or boolean
    Scalar,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::String => write!(f, "string"),
            ValueKind::Boolean => write!(f, "boolean"),
            ValueKind::Sequence => write!(f, "array"),
            ValueKind::Mapping => write!(f, "mapping"),
            ValueKind::Scalar => write!(f, "scalar"),
        }
    }
}

/// Fixed domains accepted by [`enumerated_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumDomain {
    OnParentVersion,
    PropertyType,
    QueryOperator,
}

impl EnumDomain {
    /// Domain label used in failure reasons
    pub fn label(self) -> &'static str {
        match self {
            EnumDomain::OnParentVersion => OnParentVersionAction::DOMAIN,
            EnumDomain::PropertyType => PropertyType::DOMAIN,
            EnumDomain::QueryOperator => QueryOperator::DOMAIN,
        }
    }

    /// Every legal name, in canonical order
    pub fn names(self) -> Vec<&'static str> {
        match self {
            EnumDomain::OnParentVersion => OnParentVersionAction::names(),
            EnumDomain::PropertyType => PropertyType::names(),
            EnumDomain::QueryOperator => QueryOperator::names(),
        }
    }

    /// Whether a raw name resolves to a member of this domain
    pub fn accepts(self, raw: &str) -> bool {
        match self {
            EnumDomain::OnParentVersion => OnParentVersionAction::from_name(raw).is_some(),
            EnumDomain::PropertyType => PropertyType::from_name(raw).is_some(),
            EnumDomain::QueryOperator => QueryOperator::from_name(raw).is_some(),
        }
    }
}

/// Short description of a value's shape, for error messages
pub fn describe_value(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "array",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Whether a value is an atomic scalar (string, number or boolean)
pub fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

/// The value's runtime shape must be exactly `kind`.
pub fn type_exact(kind: ValueKind, value: &Value) -> Result<(), String> {
    let ok = match kind {
        ValueKind::String => value.is_string(),
        ValueKind::Boolean => value.is_bool(),
        ValueKind::Sequence => value.is_sequence(),
        ValueKind::Mapping => value.is_mapping(),
        ValueKind::Scalar => is_scalar(value),
    };
    if ok {
        Ok(())
    } else {
        Err(format!(
            "should be a \"{}\", found a {}",
            kind,
            describe_value(value)
        ))
    }
}

/// The value must be a list whose elements are all scalars.
///
/// # Example
///
/// ```
/// use nodetype_yaml::validation::validators::scalar_array;
///
/// let ok: serde_yaml::Value = serde_yaml::from_str(r#"["nt:base", 2, true]"#).unwrap();
/// assert!(scalar_array(&ok).is_ok());
///
/// let bad: serde_yaml::Value = serde_yaml::from_str(r#"["nt:base", [nested]]"#).unwrap();
/// assert_eq!(
///     scalar_array(&bad).unwrap_err(),
///     "The value at index 1 is not a scalar value"
/// );
/// ```
pub fn scalar_array(value: &Value) -> Result<(), String> {
    let items = value
        .as_sequence()
        .ok_or_else(|| "Value is not an array".to_string())?;

    let errors: Vec<String> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| !is_scalar(item))
        .map(|(idx, _)| format!("The value at index {} is not a scalar value", idx))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("\n"))
    }
}

/// The value must be a list whose elements are all strings.
pub fn string_array(value: &Value) -> Result<(), String> {
    let items = value
        .as_sequence()
        .ok_or_else(|| "Value is not an array".to_string())?;

    let errors: Vec<String> = items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            type_exact(ValueKind::String, item)
                .err()
                .map(|reason| format!("Index {}: {}", idx, reason))
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("\n"))
    }
}

/// Either a bare scalar or a list of scalars.
pub fn scalar_or_scalar_array(value: &Value) -> Result<(), String> {
    if is_scalar(value) {
        return Ok(());
    }
    if value.is_sequence() {
        return scalar_array(value);
    }
    Err(format!(
        "should be a scalar or an array of scalars, found a {}",
        describe_value(value)
    ))
}

/// The value, once normalized, must name a member of `domain`.
///
/// # Example
///
/// ```
/// use nodetype_yaml::validation::validators::{enumerated_name, EnumDomain};
///
/// let copy = serde_yaml::Value::String("copy".into());
/// assert!(enumerated_name(EnumDomain::OnParentVersion, &copy).is_ok());
///
/// let bogus = serde_yaml::Value::String("archive".into());
/// let reason = enumerated_name(EnumDomain::OnParentVersion, &bogus).unwrap_err();
/// assert!(reason.contains("COPY, VERSION, INITIALIZE, COMPUTE, IGNORE, ABORT"));
/// ```
pub fn enumerated_name(domain: EnumDomain, value: &Value) -> Result<(), String> {
    let raw = value.as_str().ok_or_else(|| {
        format!(
            "{} must be given by name, found a {}",
            capitalize(domain.label()),
            describe_value(value)
        )
    })?;

    if domain.accepts(raw) {
        Ok(())
    } else {
        Err(format!(
            "Unknown {} \"{}\", should be one of {}",
            domain.label(),
            raw,
            domain.names().join(", ")
        ))
    }
}

/// A list in which every element names a member of `domain`.
pub fn enumerated_name_array(domain: EnumDomain, value: &Value) -> Result<(), String> {
    let items = value
        .as_sequence()
        .ok_or_else(|| "Value is not an array".to_string())?;

    let errors: Vec<String> = items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            enumerated_name(domain, item)
                .err()
                .map(|reason| format!("Index {}: {}", idx, reason))
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("\n"))
    }
}

/// A namespace prefix: a string shaped like an XML name.
pub fn namespace_prefix(value: &Value) -> Result<(), String> {
    let prefix = value.as_str().ok_or_else(|| {
        format!(
            "should be a \"string\", found a {}",
            describe_value(value)
        )
    })?;
    if PREFIX_REGEX.is_match(prefix) {
        Ok(())
    } else {
        Err(format!("\"{}\" is not a valid namespace prefix", prefix))
    }
}

/// A mapping from namespace prefix to URI string. Null stands for no namespaces.
pub fn namespace_map(value: &Value) -> Result<(), String> {
    if value.is_null() {
        return Ok(());
    }
    let mapping = value
        .as_mapping()
        .ok_or_else(|| format!("should be a mapping of prefix to URI, found a {}", describe_value(value)))?;

    let mut errors = Vec::new();
    for (prefix, uri) in mapping {
        match prefix.as_str() {
            Some(p) if PREFIX_REGEX.is_match(p) => {
                if !uri.is_string() {
                    errors.push(format!(
                        "The URI for prefix \"{}\" should be a string, found a {}",
                        p,
                        describe_value(uri)
                    ));
                }
            }
            Some(p) => errors.push(format!("\"{}\" is not a valid namespace prefix", p)),
            None => errors.push(format!(
                "Namespace prefixes must be strings, found a {}",
                describe_value(prefix)
            )),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("\n"))
    }
}

/// A collection of named entries: a mapping, or null for an empty one.
pub fn collection(value: &Value) -> Result<(), String> {
    if value.is_null() {
        Ok(())
    } else {
        type_exact(ValueKind::Mapping, value)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// A value rule as data: which validator applies to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRule {
    Type(ValueKind),
    StringArray,
    ScalarOrScalarArray,
    Enumerated(EnumDomain),
    EnumeratedArray(EnumDomain),
    NamespacePrefix,
    NamespaceMap,
    /// Named entries of a nested kind
    Collection,
}

impl ValueRule {
    /// Run the validator this rule names
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match *self {
            ValueRule::Type(kind) => type_exact(kind, value),
            ValueRule::StringArray => string_array(value),
            ValueRule::ScalarOrScalarArray => scalar_or_scalar_array(value),
            ValueRule::Enumerated(domain) => enumerated_name(domain, value),
            ValueRule::EnumeratedArray(domain) => enumerated_name_array(domain, value),
            ValueRule::NamespacePrefix => namespace_prefix(value),
            ValueRule::NamespaceMap => namespace_map(value),
            ValueRule::Collection => collection(value),
        }
    }

    /// Expected shape, for field documentation
    pub fn describe(&self) -> String {
        match self {
            ValueRule::Type(kind) => kind.to_string(),
            ValueRule::StringArray => "array of strings".to_string(),
            ValueRule::ScalarOrScalarArray => "scalar or array of scalars".to_string(),
            ValueRule::Enumerated(domain) => {
                format!("{} ({})", domain.label(), domain.names().join(" | "))
            }
            ValueRule::EnumeratedArray(domain) => format!("array of {} names", domain.label()),
            ValueRule::NamespacePrefix => "namespace prefix".to_string(),
            ValueRule::NamespaceMap => "mapping of prefix to URI".to_string(),
            ValueRule::Collection => "mapping of name to definition".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_type_exact() {
        assert!(type_exact(ValueKind::Boolean, &yaml("true")).is_ok());
        assert!(type_exact(ValueKind::String, &yaml("nt:base")).is_ok());
        assert!(type_exact(ValueKind::Sequence, &yaml("[a]")).is_ok());
        assert!(type_exact(ValueKind::Scalar, &yaml("3.5")).is_ok());

        let err = type_exact(ValueKind::Boolean, &yaml("'yes please'")).unwrap_err();
        assert_eq!(err, "should be a \"boolean\", found a string");
        assert!(type_exact(ValueKind::Scalar, &yaml("~")).is_err());
    }

    #[test]
    fn test_scalar_array_reports_every_bad_index() {
        assert_eq!(scalar_array(&yaml("foo")).unwrap_err(), "Value is not an array");
        let err = scalar_array(&yaml("[{a: 1}, ok, [x]]")).unwrap_err();
        assert_eq!(
            err,
            "The value at index 0 is not a scalar value\nThe value at index 2 is not a scalar value"
        );
        assert!(scalar_array(&yaml("[]")).is_ok());
    }

    #[test]
    fn test_string_array_rejects_other_scalars() {
        assert!(string_array(&yaml("['nt:base', mix:referenceable]")).is_ok());
        assert_eq!(
            string_array(&yaml("[nt:base, 42, true]")).unwrap_err(),
            "Index 1: should be a \"string\", found a number\nIndex 2: should be a \"string\", found a boolean"
        );
        assert_eq!(string_array(&yaml("nt:base")).unwrap_err(), "Value is not an array");
        assert_eq!(ValueRule::StringArray.describe(), "array of strings");
    }

    #[test]
    fn test_scalar_or_scalar_array() {
        assert!(scalar_or_scalar_array(&yaml("'Default Value'")).is_ok());
        assert!(scalar_or_scalar_array(&yaml("[1, 2]")).is_ok());
        assert!(scalar_or_scalar_array(&yaml("{a: b}")).is_err());
        assert!(scalar_or_scalar_array(&yaml("[[1]]")).is_err());
    }

    #[test]
    fn test_enumerated_name_property_type() {
        assert!(enumerated_name(EnumDomain::PropertyType, &yaml("String")).is_ok());
        assert!(enumerated_name(EnumDomain::PropertyType, &yaml("weakreference")).is_ok());

        let err = enumerated_name(EnumDomain::PropertyType, &yaml("banana")).unwrap_err();
        assert_eq!(
            err,
            "Unknown property type \"banana\", should be one of STRING, BINARY, LONG, DOUBLE, \
             DATE, BOOLEAN, NAME, PATH, REFERENCE, WEAKREFERENCE, URI, DECIMAL, UNDEFINED"
        );

        let err = enumerated_name(EnumDomain::PropertyType, &yaml("1")).unwrap_err();
        assert!(err.starts_with("Property type must be given by name"));
    }

    #[test]
    fn test_enumerated_name_array() {
        assert!(
            enumerated_name_array(
                EnumDomain::QueryOperator,
                &yaml("[jcr.operator.equal.to, JCR_OPERATOR_LIKE]")
            )
            .is_ok()
        );
        let err = enumerated_name_array(EnumDomain::QueryOperator, &yaml("[jcr.operator.like, near]"))
            .unwrap_err();
        assert!(err.starts_with("Index 1: Unknown query operator \"near\""));
    }

    #[test]
    fn test_namespace_validators() {
        assert!(namespace_prefix(&yaml("test")).is_ok());
        assert!(namespace_prefix(&yaml("'1abc'")).is_err());
        assert!(namespace_map(&yaml("{test: 'http://www.example.com/test'}")).is_ok());

        let err = namespace_map(&yaml("{'bad prefix': 'http://x', ok: 5}")).unwrap_err();
        assert!(err.contains("\"bad prefix\" is not a valid namespace prefix"));
        assert!(err.contains("The URI for prefix \"ok\" should be a string"));
        assert!(namespace_map(&yaml("[a, b]")).is_err());
    }

    #[test]
    fn test_null_collections_are_empty() {
        assert!(collection(&yaml("~")).is_ok());
        assert!(collection(&yaml("{comment: ~}")).is_ok());
        assert_eq!(
            collection(&yaml("[comment]")).unwrap_err(),
            "should be a \"mapping\", found a array"
        );
        assert!(namespace_map(&yaml("~")).is_ok());
    }

    #[test]
    fn test_rule_dispatch() {
        let rule = ValueRule::Enumerated(EnumDomain::OnParentVersion);
        assert!(rule.check(&yaml("IGNORE")).is_ok());
        assert!(rule.describe().contains("COPY | VERSION"));
        assert_eq!(ValueRule::Type(ValueKind::Sequence).describe(), "array");
    }
}
