//! In-memory repository collaborators
//!
//! Plain data implementations of the template traits plus a counting factory and
//! a recording namespace registry. Useful for normalizing documents without a
//! live repository, and for asserting what the importer did.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::enums::{OnParentVersionAction, PropertyType, QueryOperator};
use super::repository::{
    ItemDefinitionTemplate, NamespaceRegistry, NodeDefinitionTemplate, NodeTypeManager,
    NodeTypeTemplate, PropertyDefinitionTemplate,
};
use super::value::ScalarValue;
use crate::error::RepositoryError;

/// Fields common to child node and property definitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDefinition {
    pub name: Option<String>,
    pub auto_created: bool,
    pub mandatory: bool,
    pub protected: bool,
    pub on_parent_version: OnParentVersionAction,
}

macro_rules! impl_item_definition {
    ($ty:ty) => {
        impl ItemDefinitionTemplate for $ty {
            fn name(&self) -> Option<&str> {
                self.item.name.as_deref()
            }
            fn set_name(&mut self, name: String) {
                self.item.name = Some(name);
            }
            fn is_auto_created(&self) -> bool {
                self.item.auto_created
            }
            fn set_auto_created(&mut self, auto_created: bool) {
                self.item.auto_created = auto_created;
            }
            fn is_mandatory(&self) -> bool {
                self.item.mandatory
            }
            fn set_mandatory(&mut self, mandatory: bool) {
                self.item.mandatory = mandatory;
            }
            fn is_protected(&self) -> bool {
                self.item.protected
            }
            fn set_protected(&mut self, protected: bool) {
                self.item.protected = protected;
            }
            fn on_parent_version(&self) -> OnParentVersionAction {
                self.item.on_parent_version
            }
            fn set_on_parent_version(&mut self, action: OnParentVersionAction) {
                self.item.on_parent_version = action;
            }
        }
    };
}

/// In-memory child node definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryNodeDefinition {
    pub item: ItemDefinition,
    pub required_primary_type_names: Vec<String>,
    pub default_primary_type_name: Option<String>,
    pub same_name_siblings: bool,
}

impl_item_definition!(MemoryNodeDefinition);

impl NodeDefinitionTemplate for MemoryNodeDefinition {
    fn required_primary_type_names(&self) -> &[String] {
        &self.required_primary_type_names
    }
    fn set_required_primary_type_names(&mut self, names: Vec<String>) {
        self.required_primary_type_names = names;
    }
    fn default_primary_type_name(&self) -> Option<&str> {
        self.default_primary_type_name.as_deref()
    }
    fn set_default_primary_type_name(&mut self, name: String) {
        self.default_primary_type_name = Some(name);
    }
    fn allows_same_name_siblings(&self) -> bool {
        self.same_name_siblings
    }
    fn set_same_name_siblings(&mut self, allowed: bool) {
        self.same_name_siblings = allowed;
    }
}

/// In-memory property definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryPropertyDefinition {
    pub item: ItemDefinition,
    pub required_type: PropertyType,
    pub value_constraints: Vec<String>,
    pub default_values: Vec<ScalarValue>,
    pub multiple: bool,
    pub available_query_operators: Vec<QueryOperator>,
    pub full_text_searchable: bool,
    pub query_orderable: bool,
}

impl_item_definition!(MemoryPropertyDefinition);

impl PropertyDefinitionTemplate for MemoryPropertyDefinition {
    fn required_type(&self) -> PropertyType {
        self.required_type
    }
    fn set_required_type(&mut self, required_type: PropertyType) {
        self.required_type = required_type;
    }
    fn value_constraints(&self) -> &[String] {
        &self.value_constraints
    }
    fn set_value_constraints(&mut self, constraints: Vec<String>) {
        self.value_constraints = constraints;
    }
    fn default_values(&self) -> &[ScalarValue] {
        &self.default_values
    }
    fn set_default_values(&mut self, values: Vec<ScalarValue>) {
        self.default_values = values;
    }
    fn is_multiple(&self) -> bool {
        self.multiple
    }
    fn set_multiple(&mut self, multiple: bool) {
        self.multiple = multiple;
    }
    fn available_query_operators(&self) -> &[QueryOperator] {
        &self.available_query_operators
    }
    fn set_available_query_operators(&mut self, operators: Vec<QueryOperator>) {
        self.available_query_operators = operators;
    }
    fn is_full_text_searchable(&self) -> bool {
        self.full_text_searchable
    }
    fn set_full_text_searchable(&mut self, searchable: bool) {
        self.full_text_searchable = searchable;
    }
    fn is_query_orderable(&self) -> bool {
        self.query_orderable
    }
    fn set_query_orderable(&mut self, orderable: bool) {
        self.query_orderable = orderable;
    }
}

/// In-memory node type definition.
#[derive(Debug, Default)]
pub struct MemoryNodeType {
    pub name: Option<String>,
    pub is_abstract: bool,
    pub mixin: bool,
    pub orderable_child_nodes: bool,
    pub queryable: bool,
    pub primary_item_name: Option<String>,
    pub declared_super_type_names: Vec<String>,
    pub children: Vec<Box<dyn NodeDefinitionTemplate>>,
    pub properties: Vec<Box<dyn PropertyDefinitionTemplate>>,
}

impl NodeTypeTemplate for MemoryNodeType {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }
    fn is_abstract(&self) -> bool {
        self.is_abstract
    }
    fn set_abstract(&mut self, is_abstract: bool) {
        self.is_abstract = is_abstract;
    }
    fn is_mixin(&self) -> bool {
        self.mixin
    }
    fn set_mixin(&mut self, mixin: bool) {
        self.mixin = mixin;
    }
    fn has_orderable_child_nodes(&self) -> bool {
        self.orderable_child_nodes
    }
    fn set_orderable_child_nodes(&mut self, orderable: bool) {
        self.orderable_child_nodes = orderable;
    }
    fn is_queryable(&self) -> bool {
        self.queryable
    }
    fn set_queryable(&mut self, queryable: bool) {
        self.queryable = queryable;
    }
    fn primary_item_name(&self) -> Option<&str> {
        self.primary_item_name.as_deref()
    }
    fn set_primary_item_name(&mut self, name: String) {
        self.primary_item_name = Some(name);
    }
    fn declared_super_type_names(&self) -> &[String] {
        &self.declared_super_type_names
    }
    fn set_declared_super_type_names(&mut self, names: Vec<String>) {
        self.declared_super_type_names = names;
    }
    fn node_definition_templates(&self) -> &[Box<dyn NodeDefinitionTemplate>] {
        &self.children
    }
    fn append_node_definition_template(&mut self, template: Box<dyn NodeDefinitionTemplate>) {
        self.children.push(template);
    }
    fn property_definition_templates(&self) -> &[Box<dyn PropertyDefinitionTemplate>] {
        &self.properties
    }
    fn append_property_definition_template(
        &mut self,
        template: Box<dyn PropertyDefinitionTemplate>,
    ) {
        self.properties.push(template);
    }
}

/// Factory producing in-memory templates, counting every creation.
#[derive(Debug, Default)]
pub struct MemoryNodeTypeManager {
    node_types: AtomicUsize,
    node_definitions: AtomicUsize,
    property_definitions: AtomicUsize,
    rejection: Option<String>,
}

impl MemoryNodeTypeManager {
    /// Create a new manager
    pub fn new() -> Self {
        Self::default()
    }

    /// A manager whose factory calls all fail with the given reason
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            rejection: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Number of node type templates created so far
    pub fn node_types_created(&self) -> usize {
        self.node_types.load(Ordering::Relaxed)
    }

    /// Number of child node definition templates created so far
    pub fn node_definitions_created(&self) -> usize {
        self.node_definitions.load(Ordering::Relaxed)
    }

    /// Number of property definition templates created so far
    pub fn property_definitions_created(&self) -> usize {
        self.property_definitions.load(Ordering::Relaxed)
    }

    /// Total number of factory calls that produced a template
    pub fn templates_created(&self) -> usize {
        self.node_types_created() + self.node_definitions_created() + self.property_definitions_created()
    }

    fn check(&self, what: &'static str) -> Result<(), RepositoryError> {
        match &self.rejection {
            Some(reason) => Err(RepositoryError::TemplateCreation(what, reason.clone())),
            None => Ok(()),
        }
    }
}

impl NodeTypeManager for MemoryNodeTypeManager {
    fn create_node_type_template(&self) -> Result<Box<dyn NodeTypeTemplate>, RepositoryError> {
        self.check("node type")?;
        self.node_types.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(MemoryNodeType::default()))
    }

    fn create_node_definition_template(
        &self,
    ) -> Result<Box<dyn NodeDefinitionTemplate>, RepositoryError> {
        self.check("node definition")?;
        self.node_definitions.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(MemoryNodeDefinition::default()))
    }

    fn create_property_definition_template(
        &self,
    ) -> Result<Box<dyn PropertyDefinitionTemplate>, RepositoryError> {
        self.check("property definition")?;
        self.property_definitions.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(MemoryPropertyDefinition::default()))
    }
}

/// Namespace registry that records every registration call in order.
#[derive(Debug, Clone, Default)]
pub struct MemoryNamespaceRegistry {
    registrations: Vec<(String, String)>,
}

impl MemoryNamespaceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `register_namespace` call, in call order, duplicates included
    pub fn registrations(&self) -> &[(String, String)] {
        &self.registrations
    }

    /// URI currently bound to a prefix
    pub fn uri(&self, prefix: &str) -> Option<&str> {
        self.registrations
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }
}

impl NamespaceRegistry for MemoryNamespaceRegistry {
    fn register_namespace(&mut self, prefix: &str, uri: &str) -> Result<(), RepositoryError> {
        self.registrations.push((prefix.to_string(), uri.to_string()));
        Ok(())
    }

    fn namespaces(&self) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = Vec::new();
        for (prefix, uri) in &self.registrations {
            match out.iter_mut().find(|(p, _)| p == prefix) {
                Some(entry) => entry.1 = uri.clone(),
                None => out.push((prefix.clone(), uri.clone())),
            }
        }
        out
    }
}
