//! Repository collaborator interfaces
//!
//! The importer and exporter never own definition objects: templates are created
//! by a [`NodeTypeManager`] supplied by the caller, populated through the setters
//! below, and read back through the matching getters.

use super::enums::{OnParentVersionAction, PropertyType, QueryOperator};
use super::value::ScalarValue;
use crate::error::RepositoryError;

/// Accessors shared by child node and property definitions.
pub trait ItemDefinitionTemplate: std::fmt::Debug {
    fn name(&self) -> Option<&str>;
    fn set_name(&mut self, name: String);

    fn is_auto_created(&self) -> bool;
    fn set_auto_created(&mut self, auto_created: bool);

    fn is_mandatory(&self) -> bool;
    fn set_mandatory(&mut self, mandatory: bool);

    fn is_protected(&self) -> bool;
    fn set_protected(&mut self, protected: bool);

    fn on_parent_version(&self) -> OnParentVersionAction;
    fn set_on_parent_version(&mut self, action: OnParentVersionAction);
}

/// A child node definition under construction.
pub trait NodeDefinitionTemplate: ItemDefinitionTemplate {
    fn required_primary_type_names(&self) -> &[String];
    fn set_required_primary_type_names(&mut self, names: Vec<String>);

    fn default_primary_type_name(&self) -> Option<&str>;
    fn set_default_primary_type_name(&mut self, name: String);

    fn allows_same_name_siblings(&self) -> bool;
    fn set_same_name_siblings(&mut self, allowed: bool);
}

/// A property definition under construction.
pub trait PropertyDefinitionTemplate: ItemDefinitionTemplate {
    fn required_type(&self) -> PropertyType;
    fn set_required_type(&mut self, required_type: PropertyType);

    fn value_constraints(&self) -> &[String];
    fn set_value_constraints(&mut self, constraints: Vec<String>);

    fn default_values(&self) -> &[ScalarValue];
    fn set_default_values(&mut self, values: Vec<ScalarValue>);

    fn is_multiple(&self) -> bool;
    fn set_multiple(&mut self, multiple: bool);

    fn available_query_operators(&self) -> &[QueryOperator];
    fn set_available_query_operators(&mut self, operators: Vec<QueryOperator>);

    fn is_full_text_searchable(&self) -> bool;
    fn set_full_text_searchable(&mut self, searchable: bool);

    fn is_query_orderable(&self) -> bool;
    fn set_query_orderable(&mut self, orderable: bool);
}

/// A node type definition under construction, owning its child and property templates.
pub trait NodeTypeTemplate: std::fmt::Debug {
    fn name(&self) -> Option<&str>;
    fn set_name(&mut self, name: String);

    fn is_abstract(&self) -> bool;
    fn set_abstract(&mut self, is_abstract: bool);

    fn is_mixin(&self) -> bool;
    fn set_mixin(&mut self, mixin: bool);

    fn has_orderable_child_nodes(&self) -> bool;
    fn set_orderable_child_nodes(&mut self, orderable: bool);

    fn is_queryable(&self) -> bool;
    fn set_queryable(&mut self, queryable: bool);

    fn primary_item_name(&self) -> Option<&str>;
    fn set_primary_item_name(&mut self, name: String);

    fn declared_super_type_names(&self) -> &[String];
    fn set_declared_super_type_names(&mut self, names: Vec<String>);

    fn node_definition_templates(&self) -> &[Box<dyn NodeDefinitionTemplate>];
    fn append_node_definition_template(&mut self, template: Box<dyn NodeDefinitionTemplate>);

    fn property_definition_templates(&self) -> &[Box<dyn PropertyDefinitionTemplate>];
    fn append_property_definition_template(
        &mut self,
        template: Box<dyn PropertyDefinitionTemplate>,
    );
}

/// Factory for empty definition templates.
pub trait NodeTypeManager {
    fn create_node_type_template(&self) -> Result<Box<dyn NodeTypeTemplate>, RepositoryError>;

    fn create_node_definition_template(
        &self,
    ) -> Result<Box<dyn NodeDefinitionTemplate>, RepositoryError>;

    fn create_property_definition_template(
        &self,
    ) -> Result<Box<dyn PropertyDefinitionTemplate>, RepositoryError>;
}

/// Prefix to URI registry of the target repository.
pub trait NamespaceRegistry {
    /// Register one prefix/URI pair
    fn register_namespace(&mut self, prefix: &str, uri: &str) -> Result<(), RepositoryError>;

    /// Currently known prefix/URI pairs, one per prefix
    fn namespaces(&self) -> Vec<(String, String)>;
}
