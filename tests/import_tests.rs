//! Import module tests

use nodetype_yaml::import::NodeTypeImporter;
use nodetype_yaml::models::{
    ItemDefinitionTemplate, MemoryNamespaceRegistry, MemoryNodeTypeManager, NamespaceRegistry,
    NodeDefinitionTemplate, NodeTypeTemplate, OnParentVersionAction, PropertyDefinitionTemplate,
    PropertyType, QueryOperator, ScalarValue,
};
use nodetype_yaml::{EntityKind, ImportConfig, NodeTypeError, RepositoryError};

const ARTICLE: &str = include_str!("fixtures/article.yaml");
const UNKNOWN_KEYS: &str = include_str!("fixtures/unknown_keys.yaml");

mod document_import_tests {
    use super::*;

    #[test]
    fn test_import_article_scenario() {
        let yaml = r#"
node_types:
  article:
    abstract: true
    mixin: false
    children:
      comment:
        auto_created: true
        on_parent_version: "COPY"
        same_name_siblings: true
"#;
        let manager = MemoryNodeTypeManager::new();
        let mut registry = MemoryNamespaceRegistry::new();
        let node_types = NodeTypeImporter::new(&manager, &mut registry)
            .import_str(yaml)
            .unwrap();

        assert_eq!(node_types.len(), 1);
        let article = &node_types[0];
        assert_eq!(article.name(), Some("article"));
        assert!(article.is_abstract());
        assert!(!article.is_mixin());

        let children = article.node_definition_templates();
        assert_eq!(children.len(), 1);
        let comment = &children[0];
        assert_eq!(comment.name(), Some("comment"));
        assert!(comment.is_auto_created());
        assert_eq!(comment.on_parent_version(), OnParentVersionAction::Copy);
        assert_eq!(comment.on_parent_version().code(), 1);
        assert!(comment.allows_same_name_siblings());

        assert_eq!(manager.node_types_created(), 1);
        assert_eq!(manager.node_definitions_created(), 1);
        assert_eq!(manager.property_definitions_created(), 0);
    }

    #[test]
    fn test_import_full_fixture() {
        let manager = MemoryNodeTypeManager::new();
        let mut registry = MemoryNamespaceRegistry::new();
        let node_types = NodeTypeImporter::new(&manager, &mut registry)
            .import_str(ARTICLE)
            .unwrap();

        let names: Vec<_> = node_types.iter().map(|nt| nt.name()).collect();
        assert_eq!(names, vec![Some("test:article"), Some("note")]);

        let article = &node_types[0];
        assert!(article.has_orderable_child_nodes());
        assert_eq!(article.primary_item_name(), Some("title"));
        assert_eq!(
            article.declared_super_type_names(),
            ["nt:base", "mix:referenceable"]
        );

        let children = article.node_definition_templates();
        assert_eq!(children[0].name(), Some("test:comment"));
        assert_eq!(children[0].default_primary_type_name(), Some("nt:unstructured"));
        assert_eq!(children[0].required_primary_type_names(), ["nt:base"]);
        assert_eq!(children[1].name(), Some("boo:attachment"));
        assert!(children[1].is_mandatory());
        assert_eq!(children[1].on_parent_version(), OnParentVersionAction::Version);

        let properties = article.property_definition_templates();
        let title = &properties[0];
        assert_eq!(title.name(), Some("test:title"));
        assert_eq!(title.required_type(), PropertyType::String);
        assert_eq!(title.value_constraints(), ["foobar.*"]);
        assert_eq!(title.default_values(), [ScalarValue::from("Default Value")]);
        assert_eq!(
            title.available_query_operators(),
            [QueryOperator::EqualTo, QueryOperator::Like]
        );
        assert!(title.is_full_text_searchable());

        let rating = &properties[1];
        assert_eq!(rating.name(), Some("boo:rating"));
        assert_eq!(rating.required_type().code(), 3);
        assert!(rating.is_multiple());
        assert_eq!(
            rating.default_values(),
            [ScalarValue::Integer(1), ScalarValue::Integer(5)]
        );
    }

    #[test]
    fn test_namespaces_registered_in_document_order() {
        let manager = MemoryNodeTypeManager::new();
        let mut registry = MemoryNamespaceRegistry::new();
        NodeTypeImporter::new(&manager, &mut registry)
            .import_str(ARTICLE)
            .unwrap();

        assert_eq!(
            registry.registrations(),
            [
                ("test".to_string(), "http://www.example.com/test".to_string()),
                ("boo".to_string(), "http://www.example.com/boo".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalid_document_never_reaches_repository() {
        let manager = MemoryNodeTypeManager::new();
        let mut registry = MemoryNamespaceRegistry::new();
        let err = NodeTypeImporter::new(&manager, &mut registry)
            .import_str(UNKNOWN_KEYS)
            .unwrap_err();

        let report = err.report().expect("aggregated report");
        assert_eq!(report.len(), 2);
        assert_eq!(report.violations()[0].key(), "invalid1");
        assert_eq!(report.violations()[1].key(), "invalid4");
        assert_eq!(report.violations()[1].kind(), EntityKind::Child);

        assert_eq!(manager.templates_created(), 0);
        assert!(registry.registrations().is_empty());
    }

    #[test]
    fn test_parse_error() {
        let manager = MemoryNodeTypeManager::new();
        let mut registry = MemoryNamespaceRegistry::new();
        let err = NodeTypeImporter::new(&manager, &mut registry)
            .import_str("node_types: [unclosed")
            .unwrap_err();
        assert!(matches!(err, NodeTypeError::Parse(_)));
    }

    #[test]
    fn test_factory_failure_propagates_unchanged() {
        let manager = MemoryNodeTypeManager::rejecting("session is read-only");
        let mut registry = MemoryNamespaceRegistry::new();
        let err = NodeTypeImporter::new(&manager, &mut registry)
            .import_str(ARTICLE)
            .unwrap_err();

        match err {
            NodeTypeError::Repository(RepositoryError::TemplateCreation(what, reason)) => {
                assert_eq!(what, "node type");
                assert_eq!(reason, "session is read-only");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_registry_failure_propagates_unchanged() {
        struct LockedRegistry;

        impl NamespaceRegistry for LockedRegistry {
            fn register_namespace(&mut self, prefix: &str, uri: &str) -> Result<(), RepositoryError> {
                Err(RepositoryError::NamespaceRegistration {
                    prefix: prefix.to_string(),
                    uri: uri.to_string(),
                    reason: "registry is locked".to_string(),
                })
            }

            fn namespaces(&self) -> Vec<(String, String)> {
                Vec::new()
            }
        }

        let manager = MemoryNodeTypeManager::new();
        let mut registry = LockedRegistry;
        let err = NodeTypeImporter::new(&manager, &mut registry)
            .import_str(ARTICLE)
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to register namespace \"test\" => \"http://www.example.com/test\": registry is locked"
        );
        assert_eq!(manager.templates_created(), 0);
    }

    #[test]
    fn test_null_collections_import_as_empty() {
        let yaml = "namespaces: ~\nnode_types:\n  article:\n    children: ~\n    properties: ~\n";
        let manager = MemoryNodeTypeManager::new();
        let mut registry = MemoryNamespaceRegistry::new();
        let node_types = NodeTypeImporter::new(&manager, &mut registry)
            .import_str(yaml)
            .unwrap();

        assert_eq!(node_types.len(), 1);
        assert!(node_types[0].node_definition_templates().is_empty());
        assert!(node_types[0].property_definition_templates().is_empty());
        assert!(registry.registrations().is_empty());
    }

    #[test]
    fn test_skip_namespace_registration() {
        let manager = MemoryNodeTypeManager::new();
        let mut registry = MemoryNamespaceRegistry::new();
        let config = ImportConfig::from_yaml("register_namespaces: false\n").unwrap();
        let node_types = NodeTypeImporter::new(&manager, &mut registry)
            .with_config(config)
            .import_str(ARTICLE)
            .unwrap();
        assert_eq!(node_types.len(), 2);
        assert!(registry.registrations().is_empty());
    }
}

mod single_definition_tests {
    use super::*;

    #[test]
    fn test_import_single_definition() {
        let yaml = r#"
article:
  namespace: test
  queryable: true
  properties:
    title:
      required_type: date
      default_values: now
"#;
        let manager = MemoryNodeTypeManager::new();
        let mut registry = MemoryNamespaceRegistry::new();
        let article = NodeTypeImporter::new(&manager, &mut registry)
            .import_node_type_str(yaml)
            .unwrap();

        assert_eq!(article.name(), Some("test:article"));
        assert!(article.is_queryable());
        let title = &article.property_definition_templates()[0];
        assert_eq!(title.required_type(), PropertyType::Date);
        assert_eq!(title.default_values(), [ScalarValue::from("now")]);
    }

    #[test]
    fn test_first_bad_field_aborts_before_any_template() {
        let yaml = r#"
article:
  abstract: true
  children:
    comment:
      on_parent_version: sometimes
  properties:
    title:
      required_type: banana
"#;
        let manager = MemoryNodeTypeManager::new();
        let mut registry = MemoryNamespaceRegistry::new();
        let err = NodeTypeImporter::new(&manager, &mut registry)
            .import_node_type_str(yaml)
            .unwrap_err();

        match err {
            NodeTypeError::InvalidField { kind, key, message } => {
                assert_eq!(kind, EntityKind::Child);
                assert_eq!(key, "on_parent_version");
                assert!(message.starts_with("Unknown on parent version action \"sometimes\""));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(manager.templates_created(), 0);
    }

    #[test]
    fn test_null_spec_builds_bare_node_type() {
        let manager = MemoryNodeTypeManager::new();
        let mut registry = MemoryNamespaceRegistry::new();
        let article = NodeTypeImporter::new(&manager, &mut registry)
            .import_node_type("article", &serde_yaml::Value::Null)
            .unwrap();
        assert_eq!(article.name(), Some("article"));
        assert!(article.node_definition_templates().is_empty());
    }
}
