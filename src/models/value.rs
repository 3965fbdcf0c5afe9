//! Scalar values carried by property definitions (default values).

use serde_yaml::Value;

/// An atomic YAML scalar: string, integer, float or boolean.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl ScalarValue {
    /// Convert a parsed YAML value, returning `None` for null, sequences and mappings
    pub fn from_yaml(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(ScalarValue::String(s.clone())),
            Value::Bool(b) => Some(ScalarValue::Boolean(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(ScalarValue::Integer(i))
                } else {
                    n.as_f64().map(ScalarValue::Float)
                }
            }
            _ => None,
        }
    }

    /// Render back into a YAML value
    pub fn to_yaml(&self) -> Value {
        match self {
            ScalarValue::String(s) => Value::String(s.clone()),
            ScalarValue::Integer(i) => Value::Number((*i).into()),
            ScalarValue::Float(f) => Value::Number((*f).into()),
            ScalarValue::Boolean(b) => Value::Bool(*b),
        }
    }
}

impl std::fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarValue::String(s) => f.write_str(s),
            ScalarValue::Integer(i) => write!(f, "{}", i),
            ScalarValue::Float(v) => write!(f, "{}", v),
            ScalarValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::String(s.to_string())
    }
}
