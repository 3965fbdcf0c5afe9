//! Node type exporter
//!
//! Reads populated definition templates back into the canonical document shape,
//! ready to be written with `serde_yaml`. Keys follow field table order so an
//! exported document is stable across runs.

use std::collections::{HashMap, HashSet};

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::{NodeTypeError, NodeTypeResult};
use crate::models::repository::{
    NamespaceRegistry, NodeDefinitionTemplate, NodeTypeTemplate, PropertyDefinitionTemplate,
};
use crate::validation::fields::{FieldRole, FieldSet};
use crate::validation::{EntityKind, FieldTable};

/// Exporter for generating node type documents from definition templates
#[derive(Debug, Clone, Copy)]
pub struct NodeTypeExporter {
    table: &'static FieldTable,
}

impl Default for NodeTypeExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTypeExporter {
    /// Create a new exporter over the process-wide field table
    pub fn new() -> Self {
        Self {
            table: FieldTable::global(),
        }
    }

    /// Export one node type as a `{local name: spec}` fragment.
    ///
    /// # Arguments
    ///
    /// * `node_type` - The populated node type template
    ///
    /// # Returns
    ///
    /// A mapping with a single entry keyed by the node type's local name
    ///
    /// # Example
    ///
    /// ```rust
    /// use nodetype_yaml::export::NodeTypeExporter;
    /// use nodetype_yaml::models::{MemoryNodeType, NodeTypeTemplate};
    ///
    /// let mut article = MemoryNodeType::default();
    /// article.set_name("test:article".to_string());
    /// article.set_mixin(true);
    ///
    /// let fragment = NodeTypeExporter::new().export(&article).unwrap();
    /// let spec = &fragment["article"];
    /// assert_eq!(spec["namespace"].as_str(), Some("test"));
    /// assert_eq!(spec["mixin"].as_bool(), Some(true));
    /// assert!(spec.get("children").is_none());
    /// ```
    pub fn export(&self, node_type: &(dyn NodeTypeTemplate + 'static)) -> NodeTypeResult<Mapping> {
        let entry = self.export_node_type(node_type)?;
        let mut fragment = Mapping::new();
        fragment.insert(Value::String(entry.local), Value::Mapping(entry.spec));
        Ok(fragment)
    }

    /// Export a whole document: registry namespaces plus every node type.
    pub fn export_document(
        &self,
        registry: &(dyn NamespaceRegistry + 'static),
        node_types: &[Box<dyn NodeTypeTemplate>],
    ) -> NodeTypeResult<Value> {
        let document = export_entity(self.table.document(), registry, None, &mut |kind| {
            let mut entries = Vec::new();
            if kind == EntityKind::NodeType {
                for node_type in node_types {
                    entries.push(self.export_node_type(&**node_type)?);
                }
            }
            Ok(Some(key_entries(self.table.node_type(), entries)?))
        })?;

        debug!(node_types = node_types.len(), "Exported node type document");
        Ok(Value::Mapping(document))
    }

    /// Render an exported document as YAML text
    pub fn to_yaml(&self, document: &Value) -> NodeTypeResult<String> {
        serde_yaml::to_string(document).map_err(|e| {
            NodeTypeError::Serialization(format!("Failed to serialize node types: {}", e))
        })
    }

    fn export_node_type(
        &self,
        node_type: &(dyn NodeTypeTemplate + 'static),
    ) -> NodeTypeResult<ExportedEntry> {
        let name = node_type
            .name()
            .ok_or(NodeTypeError::Unnamed(EntityKind::NodeType))?;
        let (prefix, _) = split_name(name);

        let spec = export_entity(self.table.node_type(), node_type, prefix, &mut |kind| {
            let entries = match kind {
                EntityKind::Child => {
                    let mut entries = Vec::new();
                    for child in node_type.node_definition_templates() {
                        entries.push(self.export_child(&**child, prefix)?);
                    }
                    key_entries(self.table.child(), entries)?
                }
                EntityKind::Property => {
                    let mut entries = Vec::new();
                    for property in node_type.property_definition_templates() {
                        entries.push(self.export_property(&**property, prefix)?);
                    }
                    key_entries(self.table.property(), entries)?
                }
                _ => Mapping::new(),
            };
            Ok((!entries.is_empty()).then_some(entries))
        })?;

        Ok(ExportedEntry::new(EntityKind::NodeType, name, spec))
    }

    fn export_child(
        &self,
        child: &(dyn NodeDefinitionTemplate + 'static),
        parent_prefix: Option<&str>,
    ) -> NodeTypeResult<ExportedEntry> {
        let name = child.name().ok_or(NodeTypeError::Unnamed(EntityKind::Child))?;
        let (prefix, _) = split_name(name);
        let spec = export_entity(
            self.table.child(),
            child,
            own_prefix(prefix, parent_prefix),
            &mut |_| Ok(None),
        )?;
        Ok(ExportedEntry::new(EntityKind::Child, name, spec))
    }

    fn export_property(
        &self,
        property: &(dyn PropertyDefinitionTemplate + 'static),
        parent_prefix: Option<&str>,
    ) -> NodeTypeResult<ExportedEntry> {
        let name = property
            .name()
            .ok_or(NodeTypeError::Unnamed(EntityKind::Property))?;
        let (prefix, _) = split_name(name);
        let spec = export_entity(
            self.table.property(),
            property,
            own_prefix(prefix, parent_prefix),
            &mut |_| Ok(None),
        )?;
        Ok(ExportedEntry::new(EntityKind::Property, name, spec))
    }
}

/// One exported definition before it is keyed into its collection
struct ExportedEntry {
    kind: EntityKind,
    name: String,
    local: String,
    spec: Mapping,
}

impl ExportedEntry {
    fn new(kind: EntityKind, name: &str, spec: Mapping) -> Self {
        let (_, local) = split_name(name);
        Self {
            kind,
            name: name.to_string(),
            local: local.to_string(),
            spec,
        }
    }
}

/// Key a collection of exported definitions by local name.
///
/// When two definitions share a local name, each prefixed one is keyed by its
/// qualified name instead and loses its namespace field, so the collection
/// still imports back to the same set of names. Two definitions with the same
/// qualified name cannot both be kept and fail the export.
fn key_entries<T: ?Sized>(set: &FieldSet<T>, entries: Vec<ExportedEntry>) -> NodeTypeResult<Mapping> {
    let mut seen = HashSet::new();
    let mut locals: HashMap<&str, usize> = HashMap::new();
    for entry in &entries {
        if !seen.insert(entry.name.as_str()) {
            return Err(NodeTypeError::Duplicate {
                kind: entry.kind,
                name: entry.name.clone(),
            });
        }
        *locals.entry(entry.local.as_str()).or_default() += 1;
    }
    let shared: HashSet<String> = locals
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(local, _)| local.to_string())
        .collect();

    let mut keyed = Mapping::new();
    for mut entry in entries {
        let qualified = entry.name != entry.local;
        let key = if qualified && shared.contains(&entry.local) {
            if let Some(namespace) = set.namespace_key() {
                entry.spec.remove(namespace);
            }
            entry.name
        } else {
            entry.local
        };
        keyed.insert(Value::String(key), Value::Mapping(entry.spec));
    }
    Ok(keyed)
}

/// Build one entity's spec in field table order.
///
/// `nested` yields the mapping for a nested collection, or `None` to omit the key.
fn export_entity<T: ?Sized>(
    set: &FieldSet<T>,
    target: &T,
    namespace: Option<&str>,
    nested: &mut dyn FnMut(EntityKind) -> NodeTypeResult<Option<Mapping>>,
) -> NodeTypeResult<Mapping> {
    let mut spec = Mapping::new();
    for rule in set.rules() {
        let value = match rule.role {
            FieldRole::Namespace => namespace.map(|prefix| Value::String(prefix.to_string())),
            FieldRole::Value => rule.getter.and_then(|get| get(target)),
            FieldRole::Nested(kind) => nested(kind)?.map(Value::Mapping),
        };
        if let Some(value) = value {
            spec.insert(Value::String(rule.name.to_string()), value);
        }
    }
    Ok(spec)
}

/// Split `prefix:local` on the first colon
fn split_name(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) if !prefix.is_empty() => (Some(prefix), local),
        _ => (None, name),
    }
}

// A child or property only states its namespace when it differs from the node type's
fn own_prefix<'p>(prefix: Option<&'p str>, parent: Option<&str>) -> Option<&'p str> {
    if prefix == parent { None } else { prefix }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{PropertyType, QueryOperator};
    use crate::models::memory::{
        MemoryNamespaceRegistry, MemoryNodeDefinition, MemoryNodeType, MemoryPropertyDefinition,
    };
    use crate::models::repository::ItemDefinitionTemplate;
    use crate::models::value::ScalarValue;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("test:article"), (Some("test"), "article"));
        assert_eq!(split_name("article"), (None, "article"));
        assert_eq!(split_name(":article"), (None, ":article"));
    }

    #[test]
    fn test_export_emits_enum_names() {
        let mut title = MemoryPropertyDefinition::default();
        title.set_name("test:title".to_string());
        title.set_required_type(PropertyType::WeakReference);
        title.set_available_query_operators(vec![QueryOperator::Like]);
        title.set_default_values(vec![ScalarValue::Integer(3)]);

        let mut note = MemoryNodeDefinition::default();
        note.set_name("boo:note".to_string());

        let mut article = MemoryNodeType::default();
        article.set_name("test:article".to_string());
        article.append_property_definition_template(Box::new(title));
        article.append_node_definition_template(Box::new(note));

        let fragment = NodeTypeExporter::new().export(&article).unwrap();
        let spec = &fragment["article"];

        let title = &spec["properties"]["title"];
        assert!(title.get("namespace").is_none());
        assert_eq!(title["required_type"], yaml("WEAKREFERENCE"));
        assert_eq!(title["available_query_operators"], yaml("[jcr.operator.like]"));
        assert_eq!(title["default_values"], yaml("[3]"));
        assert_eq!(title["on_parent_version"], yaml("COPY"));

        assert_eq!(spec["children"]["note"]["namespace"], yaml("boo"));
        assert!(spec.get("primary_item_name").is_none());
        assert!(spec.get("auto_created").is_none());
    }

    #[test]
    fn test_export_key_order_follows_table() {
        let mut article = MemoryNodeType::default();
        article.set_name("article".to_string());
        let fragment = NodeTypeExporter::new().export(&article).unwrap();
        let keys: Vec<&str> = fragment["article"]
            .as_mapping()
            .unwrap()
            .keys()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(
            keys,
            vec![
                "abstract",
                "mixin",
                "orderable_child_nodes",
                "queryable",
                "declared_super_type_names"
            ]
        );
    }

    #[test]
    fn test_unnamed_template_is_an_error() {
        let article = MemoryNodeType::default();
        let err = NodeTypeExporter::new().export(&article).unwrap_err();
        assert!(matches!(err, NodeTypeError::Unnamed(EntityKind::NodeType)));
    }

    #[test]
    fn test_export_document_and_yaml() {
        let mut registry = MemoryNamespaceRegistry::new();
        registry
            .register_namespace("test", "http://www.example.com/test")
            .unwrap();
        let mut article = MemoryNodeType::default();
        article.set_name("test:article".to_string());
        let node_types: Vec<Box<dyn NodeTypeTemplate>> = vec![Box::new(article)];

        let exporter = NodeTypeExporter::new();
        let document = exporter.export_document(&registry, &node_types).unwrap();
        assert_eq!(
            document["namespaces"]["test"].as_str(),
            Some("http://www.example.com/test")
        );
        assert!(document["node_types"]["article"].is_mapping());

        let text = exporter.to_yaml(&document).unwrap();
        assert!(text.starts_with("namespaces:\n  test: http://www.example.com/test\nnode_types:\n"));
    }

    #[test]
    fn test_shared_local_name_keys_by_qualified_name() {
        let mut article = MemoryNodeType::default();
        article.set_name("test:article".to_string());
        for name in ["test:comment", "boo:comment", "note"] {
            let mut child = MemoryNodeDefinition::default();
            child.set_name(name.to_string());
            article.append_node_definition_template(Box::new(child));
        }

        let fragment = NodeTypeExporter::new().export(&article).unwrap();
        let children = fragment["article"]["children"].as_mapping().unwrap();
        let keys: Vec<&str> = children.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["test:comment", "boo:comment", "note"]);
        assert!(children["boo:comment"].get("namespace").is_none());
    }

    #[test]
    fn test_duplicate_qualified_name_is_an_error() {
        let mut article = MemoryNodeType::default();
        article.set_name("article".to_string());
        for _ in 0..2 {
            let mut title = MemoryPropertyDefinition::default();
            title.set_name("test:title".to_string());
            article.append_property_definition_template(Box::new(title));
        }

        let err = NodeTypeExporter::new().export(&article).unwrap_err();
        assert!(matches!(
            err,
            NodeTypeError::Duplicate { kind: EntityKind::Property, .. }
        ));
        assert_eq!(err.to_string(), "Cannot export duplicate property definition \"test:title\"");
    }

    #[test]
    fn test_empty_document_keeps_node_types_key() {
        let registry = MemoryNamespaceRegistry::new();
        let document = NodeTypeExporter::new()
            .export_document(&registry, &[])
            .unwrap();
        assert_eq!(document, yaml("node_types: {}"));
    }
}
