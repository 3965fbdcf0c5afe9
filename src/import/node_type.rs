//! Node type importer
//!
//! Builds node type templates from YAML documents. Whole documents are validated
//! first and the factory is never called when the report is not empty; single
//! definitions are checked eagerly and abort on the first bad field.

use serde_yaml::{Mapping, Value};
use tracing::{debug, info, warn};

use crate::config::ImportConfig;
use crate::error::{NodeTypeError, NodeTypeResult};
use crate::models::repository::{
    NamespaceRegistry, NodeDefinitionTemplate, NodeTypeManager, NodeTypeTemplate,
    PropertyDefinitionTemplate,
};
use crate::validation::engine::document_root;
use crate::validation::fields::{FieldError, FieldRole, FieldSet};
use crate::validation::{DocumentValidator, EntityKind, FieldTable};

/// Imports node type definitions into a repository.
pub struct NodeTypeImporter<'a> {
    manager: &'a dyn NodeTypeManager,
    registry: &'a mut (dyn NamespaceRegistry + 'static),
    config: ImportConfig,
    validator: DocumentValidator,
}

impl<'a> NodeTypeImporter<'a> {
    /// Create a new importer over a template factory and a namespace registry
    pub fn new(
        manager: &'a dyn NodeTypeManager,
        registry: &'a mut (dyn NamespaceRegistry + 'static),
    ) -> Self {
        Self {
            manager,
            registry,
            config: ImportConfig::default(),
            validator: DocumentValidator::new(),
        }
    }

    /// Replace the import configuration
    pub fn with_config(mut self, config: ImportConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    fn table(&self) -> &'static FieldTable {
        self.validator.table()
    }

    /// Import every node type of a YAML document.
    ///
    /// # Arguments
    ///
    /// * `yaml_content` - Document text with `namespaces` and `node_types` keys
    ///
    /// # Returns
    ///
    /// The populated node type templates, in document order
    ///
    /// # Example
    ///
    /// ```rust
    /// use nodetype_yaml::import::NodeTypeImporter;
    /// use nodetype_yaml::models::{
    ///     ItemDefinitionTemplate, MemoryNamespaceRegistry, MemoryNodeTypeManager, NodeTypeTemplate,
    /// };
    ///
    /// let manager = MemoryNodeTypeManager::new();
    /// let mut registry = MemoryNamespaceRegistry::new();
    /// let yaml = r#"
    /// namespaces:
    ///   test: http://www.example.com/test
    /// node_types:
    ///   article:
    ///     namespace: test
    ///     properties:
    ///       title:
    ///         required_type: STRING
    /// "#;
    ///
    /// let node_types = NodeTypeImporter::new(&manager, &mut registry)
    ///     .import_str(yaml)
    ///     .unwrap();
    /// assert_eq!(node_types[0].name(), Some("test:article"));
    /// assert_eq!(node_types[0].property_definition_templates()[0].name(), Some("test:title"));
    /// ```
    pub fn import_str(&mut self, yaml_content: &str) -> NodeTypeResult<Vec<Box<dyn NodeTypeTemplate>>> {
        let document: Value = serde_yaml::from_str(yaml_content)?;
        self.import_document(&document)
    }

    /// Import every node type of a parsed document.
    ///
    /// The whole document is validated first. When any violation is found the
    /// aggregated error is returned and no namespace or template is touched.
    pub fn import_document(
        &mut self,
        document: &Value,
    ) -> NodeTypeResult<Vec<Box<dyn NodeTypeTemplate>>> {
        self.validator.check(document)?;
        let table = self.table();
        let root = document_root(table, document)?;

        if self.config.register_namespaces {
            apply_fields(table.document(), &mut *self.registry, root)?;
        }

        let mut node_types = Vec::new();
        for (key, kind) in table.document().nested_rules() {
            let Some(entries) = root.get(key).and_then(Value::as_mapping) else {
                continue;
            };
            for (name, spec) in entries {
                let name = entry_name(kind, name)?;
                node_types.push(self.build_node_type(name, spec)?);
            }
        }

        info!(node_types = node_types.len(), "Imported node type document");
        Ok(node_types)
    }

    /// Import a document holding exactly one `name: spec` entry.
    ///
    /// # Example
    ///
    /// ```rust
    /// use nodetype_yaml::import::NodeTypeImporter;
    /// use nodetype_yaml::models::{MemoryNamespaceRegistry, MemoryNodeTypeManager};
    ///
    /// let manager = MemoryNodeTypeManager::new();
    /// let mut registry = MemoryNamespaceRegistry::new();
    /// let mut importer = NodeTypeImporter::new(&manager, &mut registry);
    ///
    /// let err = importer
    ///     .import_node_type_str("article:\n  mixin: true\n  colour: red\n")
    ///     .unwrap_err();
    /// assert!(err.to_string().contains("colour"));
    /// assert_eq!(manager.templates_created(), 0);
    /// ```
    pub fn import_node_type_str(&mut self, yaml_content: &str) -> NodeTypeResult<Box<dyn NodeTypeTemplate>> {
        let document: Value = serde_yaml::from_str(yaml_content)?;
        let entries = document.as_mapping().ok_or_else(|| {
            NodeTypeError::Structure("a node type definition should be a mapping".to_string())
        })?;

        let mut iter = entries.iter();
        match (iter.next(), iter.next()) {
            (Some((name, spec)), None) => {
                let name = entry_name(EntityKind::NodeType, name)?;
                self.import_node_type(name, spec)
            }
            _ => Err(NodeTypeError::Structure(format!(
                "expected exactly one node type definition, found {}",
                entries.len()
            ))),
        }
    }

    /// Import one node type spec without a prior validation pass.
    ///
    /// The spec is checked first and the first bad key or value, at any depth,
    /// aborts the import before any template is created.
    pub fn import_node_type(&mut self, name: &str, spec: &Value) -> NodeTypeResult<Box<dyn NodeTypeTemplate>> {
        if !(spec.is_null() || spec.is_mapping()) {
            return Err(NodeTypeError::Structure(format!(
                "node type \"{}\" should be a mapping",
                name
            )));
        }
        if let Some(violation) = self.validator.first_violation(EntityKind::NodeType, spec) {
            return Err(NodeTypeError::InvalidField {
                kind: violation.kind(),
                key: violation.key().to_string(),
                message: violation.reason(),
            });
        }
        self.build_node_type(name, spec)
    }

    fn build_node_type(&self, name: &str, spec: &Value) -> NodeTypeResult<Box<dyn NodeTypeTemplate>> {
        let table = self.table();
        let spec = spec.as_mapping();
        let prefix = own_namespace(table.node_type(), spec);

        let mut template = self.manager.create_node_type_template()?;
        template.set_name(qualify(prefix, name));
        debug!(name = template.name(), "Created node type template");

        let Some(spec) = spec else {
            return Ok(template);
        };
        apply_fields(table.node_type(), &mut *template, spec)?;

        for (key, kind) in table.node_type().nested_rules() {
            let Some(entries) = spec.get(key).and_then(Value::as_mapping) else {
                continue;
            };
            for (entry, entry_spec) in entries {
                let entry = entry_name(kind, entry)?;
                match kind {
                    EntityKind::Child => {
                        let child = self.build_child(entry, entry_spec, prefix)?;
                        template.append_node_definition_template(child);
                    }
                    EntityKind::Property => {
                        let property = self.build_property(entry, entry_spec, prefix)?;
                        template.append_property_definition_template(property);
                    }
                    other => {
                        return Err(NodeTypeError::Structure(format!(
                            "a node type cannot contain a {}",
                            other
                        )));
                    }
                }
            }
        }

        Ok(template)
    }

    fn build_child(
        &self,
        name: &str,
        spec: &Value,
        parent_prefix: Option<&str>,
    ) -> NodeTypeResult<Box<dyn NodeDefinitionTemplate>> {
        let set = self.table().child();
        let spec = spec.as_mapping();
        let prefix = self.item_prefix(name, own_namespace(set, spec), parent_prefix);

        let mut template = self.manager.create_node_definition_template()?;
        template.set_name(qualify(prefix, name));
        if let Some(spec) = spec {
            apply_fields(set, &mut *template, spec)?;
        }
        debug!(name = template.name(), "Created child node definition template");
        Ok(template)
    }

    fn build_property(
        &self,
        name: &str,
        spec: &Value,
        parent_prefix: Option<&str>,
    ) -> NodeTypeResult<Box<dyn PropertyDefinitionTemplate>> {
        let set = self.table().property();
        let spec = spec.as_mapping();
        let prefix = self.item_prefix(name, own_namespace(set, spec), parent_prefix);

        let mut template = self.manager.create_property_definition_template()?;
        template.set_name(qualify(prefix, name));
        if let Some(spec) = spec {
            apply_fields(set, &mut *template, spec)?;
        }
        debug!(name = template.name(), "Created property definition template");
        Ok(template)
    }

    // An entry keyed by an already qualified name never inherits
    fn item_prefix<'p>(
        &self,
        name: &str,
        own: Option<&'p str>,
        parent: Option<&'p str>,
    ) -> Option<&'p str> {
        match own {
            Some(prefix) => Some(prefix),
            None if self.config.inherit_namespace && !is_qualified(name) => parent,
            None => None,
        }
    }
}

/// Apply every present field that has a setter, in document order
fn apply_fields<T: ?Sized>(set: &FieldSet<T>, target: &mut T, spec: &Mapping) -> NodeTypeResult<()> {
    for (key, value) in spec {
        let Some(rule) = key.as_str().and_then(|k| set.rule(k)) else {
            continue;
        };
        if rule.role != FieldRole::Value {
            continue;
        }
        match rule.setter {
            Some(setter) => setter(target, value).map_err(|e| match e {
                FieldError::Invalid(message) => NodeTypeError::InvalidField {
                    kind: set.kind(),
                    key: rule.name.to_string(),
                    message,
                },
                FieldError::Repository(e) => NodeTypeError::Repository(e),
            })?,
            None => warn!(
                kind = %set.kind(),
                key = rule.name,
                "Field is accepted but has no effect"
            ),
        }
    }
    Ok(())
}

fn own_namespace<'v, T: ?Sized>(set: &FieldSet<T>, spec: Option<&'v Mapping>) -> Option<&'v str> {
    let key = set.namespace_key()?;
    spec?.get(key)?.as_str()
}

fn qualify(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, name),
        _ => name.to_string(),
    }
}

fn is_qualified(name: &str) -> bool {
    matches!(name.split_once(':'), Some((prefix, _)) if !prefix.is_empty())
}

fn entry_name(kind: EntityKind, name: &Value) -> NodeTypeResult<&str> {
    name.as_str()
        .ok_or_else(|| NodeTypeError::Structure(format!("{} names must be strings", kind)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{OnParentVersionAction, PropertyType};
    use crate::models::memory::{MemoryNamespaceRegistry, MemoryNodeTypeManager};
    use crate::models::repository::ItemDefinitionTemplate;

    #[test]
    fn test_qualify() {
        assert_eq!(qualify(Some("test"), "article"), "test:article");
        assert_eq!(qualify(None, "article"), "article");
        assert_eq!(qualify(Some(""), "article"), "article");
    }

    #[test]
    fn test_namespace_inheritance() {
        let yaml = r#"
node_types:
  article:
    namespace: test
    children:
      comment: ~
      note:
        namespace: boo
    properties:
      title:
        required_type: date
"#;
        let manager = MemoryNodeTypeManager::new();
        let mut registry = MemoryNamespaceRegistry::new();
        let node_types = NodeTypeImporter::new(&manager, &mut registry)
            .import_str(yaml)
            .unwrap();

        let article = &node_types[0];
        let children = article.node_definition_templates();
        assert_eq!(children[0].name(), Some("test:comment"));
        assert_eq!(children[1].name(), Some("boo:note"));
        assert_eq!(children[0].on_parent_version(), OnParentVersionAction::Copy);
        let title = &article.property_definition_templates()[0];
        assert_eq!(title.name(), Some("test:title"));
        assert_eq!(title.required_type(), PropertyType::Date);
    }

    #[test]
    fn test_qualified_entry_does_not_inherit() {
        let yaml = "node_types:\n  article:\n    namespace: test\n    properties:\n      boo:title: ~\n";
        let manager = MemoryNodeTypeManager::new();
        let mut registry = MemoryNamespaceRegistry::new();
        let node_types = NodeTypeImporter::new(&manager, &mut registry)
            .import_str(yaml)
            .unwrap();
        let title = &node_types[0].property_definition_templates()[0];
        assert_eq!(title.name(), Some("boo:title"));
        assert!(is_qualified("boo:title"));
        assert!(!is_qualified(":title"));
    }

    #[test]
    fn test_inheritance_can_be_disabled() {
        let yaml = "node_types:\n  article:\n    namespace: test\n    children:\n      comment: ~\n";
        let manager = MemoryNodeTypeManager::new();
        let mut registry = MemoryNamespaceRegistry::new();
        let node_types = NodeTypeImporter::new(&manager, &mut registry)
            .with_config(ImportConfig::new().with_inherit_namespace(false))
            .import_str(yaml)
            .unwrap();
        assert_eq!(node_types[0].name(), Some("test:article"));
        assert_eq!(node_types[0].node_definition_templates()[0].name(), Some("comment"));
    }

    #[test]
    fn test_namespace_registration_can_be_disabled() {
        let yaml = "namespaces:\n  test: http://www.example.com/test\nnode_types: {}\n";
        let manager = MemoryNodeTypeManager::new();
        let mut registry = MemoryNamespaceRegistry::new();
        let node_types = NodeTypeImporter::new(&manager, &mut registry)
            .with_config(ImportConfig::new().with_register_namespaces(false))
            .import_str(yaml)
            .unwrap();
        assert!(node_types.is_empty());
        assert!(registry.registrations().is_empty());
    }

    #[test]
    fn test_single_definition_requires_one_entry() {
        let manager = MemoryNodeTypeManager::new();
        let mut registry = MemoryNamespaceRegistry::new();
        let mut importer = NodeTypeImporter::new(&manager, &mut registry);

        let err = importer
            .import_node_type_str("article: {}\nblog: {}\n")
            .unwrap_err();
        assert!(matches!(err, NodeTypeError::Structure(_)));

        let err = importer.import_node_type_str("article: 3\n").unwrap_err();
        assert!(matches!(err, NodeTypeError::Structure(_)));
    }

    #[test]
    fn test_single_definition_reports_nested_field() {
        let manager = MemoryNodeTypeManager::new();
        let mut registry = MemoryNamespaceRegistry::new();
        let err = NodeTypeImporter::new(&manager, &mut registry)
            .import_node_type_str(
                "article:\n  properties:\n    title:\n      required_type: banana\n",
            )
            .unwrap_err();
        match err {
            NodeTypeError::InvalidField { kind, key, message } => {
                assert_eq!(kind, EntityKind::Property);
                assert_eq!(key, "required_type");
                assert!(message.contains("Unknown property type \"banana\""));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(manager.templates_created(), 0);
    }
}
