//! Field table
//!
//! The single source of truth for which keys each entity kind accepts, how each
//! value is validated, and how it is written to (and read back from) a definition
//! template. The table is built once by [`FieldTable::configure`] and shared
//! read-only through [`FieldTable::global`].
//!
//! Canonical document shape: names are mapping keys, never embedded `name` fields.
//!
//! ```yaml
//! namespaces:
//!   test: http://www.example.com/test
//! node_types:
//!   article:
//!     namespace: test
//!     abstract: true
//!     children:
//!       comment: { on_parent_version: COPY }
//!     properties:
//!       title: { required_type: STRING }
//! ```

use once_cell::sync::Lazy;
use serde::Serialize;
use serde_yaml::Value;
use thiserror::Error;
use tracing::debug;

use super::validators::{EnumDomain, ValueKind, ValueRule};
use crate::error::RepositoryError;
use crate::models::enums::{EnumeratedName, OnParentVersionAction, PropertyType, QueryOperator};
use crate::models::repository::{
    ItemDefinitionTemplate, NamespaceRegistry, NodeDefinitionTemplate, NodeTypeTemplate,
    PropertyDefinitionTemplate,
};
use crate::models::value::ScalarValue;

static FIELD_TABLE: Lazy<FieldTable> = Lazy::new(FieldTable::configure);

/// The four entity kinds a document is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Document,
    NodeType,
    Child,
    Property,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Document,
        EntityKind::NodeType,
        EntityKind::Child,
        EntityKind::Property,
    ];

    /// Parse a kind name as typed on a command line (`node-type`, `node_type`, ...)
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().replace('-', "_").as_str() {
            "document" => Some(EntityKind::Document),
            "node_type" | "nodetype" => Some(EntityKind::NodeType),
            "child" | "children" => Some(EntityKind::Child),
            "property" | "properties" => Some(EntityKind::Property),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Document => write!(f, "document"),
            EntityKind::NodeType => write!(f, "node type"),
            EntityKind::Child => write!(f, "child node definition"),
            EntityKind::Property => write!(f, "property definition"),
        }
    }
}

/// What a field does beyond being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Written through the rule's setter, if it has one
    Value,
    /// Namespace prefix applied to the entity's name
    Namespace,
    /// Mapping of name to nested entity specs of the given kind
    Nested(EntityKind),
}

/// Failure while applying a setter.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Transform a raw value and write it to the target.
pub type Setter<T> = fn(&mut T, &Value) -> Result<(), FieldError>;

/// Read a field back from the target; `None` means the field is omitted.
pub type Getter<T> = fn(&T) -> Option<Value>;

/// One legal key of one entity kind.
pub struct FieldRule<T: ?Sized> {
    pub name: &'static str,
    pub rule: ValueRule,
    pub role: FieldRole,
    pub setter: Option<Setter<T>>,
    pub getter: Option<Getter<T>>,
}

impl<T: ?Sized> FieldRule<T> {
    /// Kind-agnostic view of this rule
    pub fn info(&self) -> RuleInfo {
        RuleInfo {
            name: self.name,
            rule: self.rule,
            role: self.role,
            has_setter: self.setter.is_some(),
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for FieldRule<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRule")
            .field("name", &self.name)
            .field("rule", &self.rule)
            .field("role", &self.role)
            .field("setter", &self.setter.is_some())
            .field("getter", &self.getter.is_some())
            .finish()
    }
}

/// Kind-agnostic description of a field rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleInfo {
    pub name: &'static str,
    pub rule: ValueRule,
    pub role: FieldRole,
    pub has_setter: bool,
}

/// The ordered rules of one entity kind, targeting template type `T`.
pub struct FieldSet<T: ?Sized> {
    kind: EntityKind,
    rules: Vec<FieldRule<T>>,
}

impl<T: ?Sized> std::fmt::Debug for FieldSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSet")
            .field("kind", &self.kind)
            .field("rules", &self.rules)
            .finish()
    }
}

impl<T: ?Sized> FieldSet<T> {
    fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            rules: Vec::new(),
        }
    }

    fn field(mut self, name: &'static str, rule: ValueRule, setter: Setter<T>, getter: Getter<T>) -> Self {
        self.rules.push(FieldRule {
            name,
            rule,
            role: FieldRole::Value,
            setter: Some(setter),
            getter: Some(getter),
        });
        self
    }

    // Legal and validated, but never written anywhere
    fn accepted(mut self, name: &'static str, rule: ValueRule) -> Self {
        self.rules.push(FieldRule {
            name,
            rule,
            role: FieldRole::Value,
            setter: None,
            getter: None,
        });
        self
    }

    fn namespace(mut self, name: &'static str) -> Self {
        self.rules.push(FieldRule {
            name,
            rule: ValueRule::NamespacePrefix,
            role: FieldRole::Namespace,
            setter: None,
            getter: None,
        });
        self
    }

    fn nested(mut self, name: &'static str, kind: EntityKind) -> Self {
        self.rules.push(FieldRule {
            name,
            rule: ValueRule::Collection,
            role: FieldRole::Nested(kind),
            setter: None,
            getter: None,
        });
        self
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Rules in registration order
    pub fn rules(&self) -> &[FieldRule<T>] {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&FieldRule<T>> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Legal key names, sorted alphabetically
    pub fn legal_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.rules.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names
    }

    /// The key holding this entity's namespace prefix, if it has one
    pub fn namespace_key(&self) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|r| r.role == FieldRole::Namespace)
            .map(|r| r.name)
    }

    /// Keys holding nested entities, in registration order
    pub fn nested_rules(&self) -> impl Iterator<Item = (&'static str, EntityKind)> + '_ {
        self.rules.iter().filter_map(|r| match r.role {
            FieldRole::Nested(kind) => Some((r.name, kind)),
            _ => None,
        })
    }
}

/// Registry of every legal field for every entity kind.
#[derive(Debug)]
pub struct FieldTable {
    document: FieldSet<dyn NamespaceRegistry>,
    node_type: FieldSet<dyn NodeTypeTemplate>,
    child: FieldSet<dyn NodeDefinitionTemplate>,
    property: FieldSet<dyn PropertyDefinitionTemplate>,
}

impl FieldTable {
    /// The process-wide table, built on first use
    pub fn global() -> &'static FieldTable {
        &FIELD_TABLE
    }

    /// Build the table: every legal key of every entity kind with its rule
    pub fn configure() -> Self {
        let boolean = ValueRule::Type(ValueKind::Boolean);
        let string = ValueRule::Type(ValueKind::String);

        let document = FieldSet::<dyn NamespaceRegistry>::new(EntityKind::Document)
            .field(
                "namespaces",
                ValueRule::NamespaceMap,
                register_namespaces,
                |registry| {
                    let namespaces = registry.namespaces();
                    if namespaces.is_empty() {
                        return None;
                    }
                    Some(Value::Mapping(
                        namespaces
                            .into_iter()
                            .map(|(prefix, uri)| (Value::String(prefix), Value::String(uri)))
                            .collect(),
                    ))
                },
            )
            .nested("node_types", EntityKind::NodeType);

        let node_type = FieldSet::<dyn NodeTypeTemplate>::new(EntityKind::NodeType)
            .namespace("namespace")
            .field(
                "abstract",
                boolean,
                |t, v| {
                    t.set_abstract(to_bool(v)?);
                    Ok(())
                },
                |t| Some(Value::Bool(t.is_abstract())),
            )
            .field(
                "mixin",
                boolean,
                |t, v| {
                    t.set_mixin(to_bool(v)?);
                    Ok(())
                },
                |t| Some(Value::Bool(t.is_mixin())),
            )
            .field(
                "orderable_child_nodes",
                boolean,
                |t, v| {
                    t.set_orderable_child_nodes(to_bool(v)?);
                    Ok(())
                },
                |t| Some(Value::Bool(t.has_orderable_child_nodes())),
            )
            .field(
                "queryable",
                boolean,
                |t, v| {
                    t.set_queryable(to_bool(v)?);
                    Ok(())
                },
                |t| Some(Value::Bool(t.is_queryable())),
            )
            .field(
                "primary_item_name",
                string,
                |t, v| {
                    t.set_primary_item_name(to_string(v)?);
                    Ok(())
                },
                |t| t.primary_item_name().map(|n| Value::String(n.to_string())),
            )
            .field(
                "declared_super_type_names",
                ValueRule::StringArray,
                |t, v| {
                    t.set_declared_super_type_names(to_string_list(v)?);
                    Ok(())
                },
                |t| Some(string_list(t.declared_super_type_names())),
            )
            // Node types have no auto-created flag; kept legal so older documents still validate
            .accepted("auto_created", boolean)
            .nested("children", EntityKind::Child)
            .nested("properties", EntityKind::Property);

        let child = FieldSet::<dyn NodeDefinitionTemplate>::new(EntityKind::Child)
            .namespace("namespace")
            .field(
                "auto_created",
                boolean,
                set_auto_created::<dyn NodeDefinitionTemplate>,
                get_auto_created::<dyn NodeDefinitionTemplate>,
            )
            .field(
                "mandatory",
                boolean,
                set_mandatory::<dyn NodeDefinitionTemplate>,
                get_mandatory::<dyn NodeDefinitionTemplate>,
            )
            .field(
                "protected",
                boolean,
                set_protected::<dyn NodeDefinitionTemplate>,
                get_protected::<dyn NodeDefinitionTemplate>,
            )
            .field(
                "on_parent_version",
                ValueRule::Enumerated(EnumDomain::OnParentVersion),
                set_on_parent_version::<dyn NodeDefinitionTemplate>,
                get_on_parent_version::<dyn NodeDefinitionTemplate>,
            )
            .field(
                "default_primary_type",
                string,
                |t, v| {
                    t.set_default_primary_type_name(to_string(v)?);
                    Ok(())
                },
                |t| {
                    t.default_primary_type_name()
                        .map(|n| Value::String(n.to_string()))
                },
            )
            .field(
                "same_name_siblings",
                boolean,
                |t, v| {
                    t.set_same_name_siblings(to_bool(v)?);
                    Ok(())
                },
                |t| Some(Value::Bool(t.allows_same_name_siblings())),
            )
            .field(
                "required_primary_types",
                ValueRule::StringArray,
                |t, v| {
                    t.set_required_primary_type_names(to_string_list(v)?);
                    Ok(())
                },
                |t| Some(string_list(t.required_primary_type_names())),
            );

        let property = FieldSet::<dyn PropertyDefinitionTemplate>::new(EntityKind::Property)
            .namespace("namespace")
            .field(
                "auto_created",
                boolean,
                set_auto_created::<dyn PropertyDefinitionTemplate>,
                get_auto_created::<dyn PropertyDefinitionTemplate>,
            )
            .field(
                "mandatory",
                boolean,
                set_mandatory::<dyn PropertyDefinitionTemplate>,
                get_mandatory::<dyn PropertyDefinitionTemplate>,
            )
            .field(
                "multiple",
                boolean,
                |t, v| {
                    t.set_multiple(to_bool(v)?);
                    Ok(())
                },
                |t| Some(Value::Bool(t.is_multiple())),
            )
            .field(
                "protected",
                boolean,
                set_protected::<dyn PropertyDefinitionTemplate>,
                get_protected::<dyn PropertyDefinitionTemplate>,
            )
            .field(
                "on_parent_version",
                ValueRule::Enumerated(EnumDomain::OnParentVersion),
                set_on_parent_version::<dyn PropertyDefinitionTemplate>,
                get_on_parent_version::<dyn PropertyDefinitionTemplate>,
            )
            .field(
                "required_type",
                ValueRule::Enumerated(EnumDomain::PropertyType),
                |t, v| {
                    t.set_required_type(to_enum::<PropertyType>(v)?);
                    Ok(())
                },
                |t| Some(Value::String(t.required_type().canonical().to_string())),
            )
            .field(
                "value_constraints",
                ValueRule::StringArray,
                |t, v| {
                    t.set_value_constraints(to_string_list(v)?);
                    Ok(())
                },
                |t| Some(string_list(t.value_constraints())),
            )
            .field(
                "default_values",
                ValueRule::ScalarOrScalarArray,
                |t, v| {
                    t.set_default_values(to_scalar_list(v)?);
                    Ok(())
                },
                |t| {
                    Some(Value::Sequence(
                        t.default_values().iter().map(ScalarValue::to_yaml).collect(),
                    ))
                },
            )
            .field(
                "available_query_operators",
                ValueRule::EnumeratedArray(EnumDomain::QueryOperator),
                |t, v| {
                    t.set_available_query_operators(to_enum_list::<QueryOperator>(v)?);
                    Ok(())
                },
                |t| {
                    Some(Value::Sequence(
                        t.available_query_operators()
                            .iter()
                            .map(|op| Value::String(op.canonical().to_string()))
                            .collect(),
                    ))
                },
            )
            .field(
                "full_text_searchable",
                boolean,
                |t, v| {
                    t.set_full_text_searchable(to_bool(v)?);
                    Ok(())
                },
                |t| Some(Value::Bool(t.is_full_text_searchable())),
            )
            .field(
                "query_orderable",
                boolean,
                |t, v| {
                    t.set_query_orderable(to_bool(v)?);
                    Ok(())
                },
                |t| Some(Value::Bool(t.is_query_orderable())),
            );

        Self {
            document,
            node_type,
            child,
            property,
        }
    }

    pub fn document(&self) -> &FieldSet<dyn NamespaceRegistry> {
        &self.document
    }

    pub fn node_type(&self) -> &FieldSet<dyn NodeTypeTemplate> {
        &self.node_type
    }

    pub fn child(&self) -> &FieldSet<dyn NodeDefinitionTemplate> {
        &self.child
    }

    pub fn property(&self) -> &FieldSet<dyn PropertyDefinitionTemplate> {
        &self.property
    }

    /// Every rule of a kind, in registration order
    pub fn entries(&self, kind: EntityKind) -> Vec<RuleInfo> {
        match kind {
            EntityKind::Document => self.document.rules().iter().map(FieldRule::info).collect(),
            EntityKind::NodeType => self.node_type.rules().iter().map(FieldRule::info).collect(),
            EntityKind::Child => self.child.rules().iter().map(FieldRule::info).collect(),
            EntityKind::Property => self.property.rules().iter().map(FieldRule::info).collect(),
        }
    }

    /// Legal key names of a kind, sorted alphabetically
    pub fn legal_fields(&self, kind: EntityKind) -> Vec<&'static str> {
        match kind {
            EntityKind::Document => self.document.legal_names(),
            EntityKind::NodeType => self.node_type.legal_names(),
            EntityKind::Child => self.child.legal_names(),
            EntityKind::Property => self.property.legal_names(),
        }
    }

    /// `(key, expected shape)` pairs for documenting a kind, in registration order
    pub fn describe(&self, kind: EntityKind) -> Vec<(&'static str, String)> {
        self.entries(kind)
            .into_iter()
            .map(|info| {
                let shape = match info.role {
                    FieldRole::Nested(nested) => format!("mapping of name to {}", nested),
                    FieldRole::Namespace => info.rule.describe(),
                    FieldRole::Value if !info.has_setter => {
                        format!("{} (accepted, ignored)", info.rule.describe())
                    }
                    FieldRole::Value => info.rule.describe(),
                };
                (info.name, shape)
            })
            .collect()
    }

    /// Look up one rule of a kind
    pub fn rule(&self, kind: EntityKind, name: &str) -> Option<RuleInfo> {
        match kind {
            EntityKind::Document => self.document.rule(name).map(FieldRule::info),
            EntityKind::NodeType => self.node_type.rule(name).map(FieldRule::info),
            EntityKind::Child => self.child.rule(name).map(FieldRule::info),
            EntityKind::Property => self.property.rule(name).map(FieldRule::info),
        }
    }
}

fn register_namespaces(
    registry: &mut (dyn NamespaceRegistry + 'static),
    value: &Value,
) -> Result<(), FieldError> {
    if value.is_null() {
        return Ok(());
    }
    let mapping = value
        .as_mapping()
        .ok_or_else(|| FieldError::Invalid("expected a mapping of prefix to URI".to_string()))?;

    for (prefix, uri) in mapping {
        let (Some(prefix), Some(uri)) = (prefix.as_str(), uri.as_str()) else {
            return Err(FieldError::Invalid(
                "namespace prefixes and URIs must be strings".to_string(),
            ));
        };
        debug!(prefix, uri, "Registering namespace");
        registry.register_namespace(prefix, uri)?;
    }
    Ok(())
}

fn set_auto_created<T: ItemDefinitionTemplate + ?Sized>(t: &mut T, v: &Value) -> Result<(), FieldError> {
    t.set_auto_created(to_bool(v)?);
    Ok(())
}

fn get_auto_created<T: ItemDefinitionTemplate + ?Sized>(t: &T) -> Option<Value> {
    Some(Value::Bool(t.is_auto_created()))
}

fn set_mandatory<T: ItemDefinitionTemplate + ?Sized>(t: &mut T, v: &Value) -> Result<(), FieldError> {
    t.set_mandatory(to_bool(v)?);
    Ok(())
}

fn get_mandatory<T: ItemDefinitionTemplate + ?Sized>(t: &T) -> Option<Value> {
    Some(Value::Bool(t.is_mandatory()))
}

fn set_protected<T: ItemDefinitionTemplate + ?Sized>(t: &mut T, v: &Value) -> Result<(), FieldError> {
    t.set_protected(to_bool(v)?);
    Ok(())
}

fn get_protected<T: ItemDefinitionTemplate + ?Sized>(t: &T) -> Option<Value> {
    Some(Value::Bool(t.is_protected()))
}

fn set_on_parent_version<T: ItemDefinitionTemplate + ?Sized>(
    t: &mut T,
    v: &Value,
) -> Result<(), FieldError> {
    t.set_on_parent_version(to_enum::<OnParentVersionAction>(v)?);
    Ok(())
}

fn get_on_parent_version<T: ItemDefinitionTemplate + ?Sized>(t: &T) -> Option<Value> {
    Some(Value::String(t.on_parent_version().canonical().to_string()))
}

fn to_bool(v: &Value) -> Result<bool, FieldError> {
    v.as_bool()
        .ok_or_else(|| FieldError::Invalid(format!("expected a boolean, found {:?}", v)))
}

fn to_string(v: &Value) -> Result<String, FieldError> {
    v.as_str()
        .map(str::to_string)
        .ok_or_else(|| FieldError::Invalid(format!("expected a string, found {:?}", v)))
}

fn to_string_list(v: &Value) -> Result<Vec<String>, FieldError> {
    let items = v
        .as_sequence()
        .ok_or_else(|| FieldError::Invalid(format!("expected an array, found {:?}", v)))?;
    items.iter().map(to_string).collect()
}

fn to_scalar_list(v: &Value) -> Result<Vec<ScalarValue>, FieldError> {
    let scalar = |item: &Value| {
        ScalarValue::from_yaml(item)
            .ok_or_else(|| FieldError::Invalid(format!("expected a scalar, found {:?}", item)))
    };
    match v {
        Value::Sequence(items) => items.iter().map(scalar).collect(),
        other => Ok(vec![scalar(other)?]),
    }
}

fn to_enum<E: EnumeratedName>(v: &Value) -> Result<E, FieldError> {
    v.as_str().and_then(E::from_name).ok_or_else(|| {
        FieldError::Invalid(format!(
            "unknown {} {:?}, should be one of {}",
            E::DOMAIN,
            v,
            E::names().join(", ")
        ))
    })
}

fn to_enum_list<E: EnumeratedName>(v: &Value) -> Result<Vec<E>, FieldError> {
    let items = v
        .as_sequence()
        .ok_or_else(|| FieldError::Invalid(format!("expected an array, found {:?}", v)))?;
    items.iter().map(to_enum::<E>).collect()
}

fn string_list(items: &[String]) -> Value {
    Value::Sequence(items.iter().map(|s| Value::String(s.clone())).collect())
}
