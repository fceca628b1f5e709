use crate::error::{Result, XMLGeneratorError};
use crate::fetch_elements::{fetch_attributes, fetch_elements};
use crate::fetch_types::{TypeResolution, fetch_types, resolve_type};
use crate::generate_schema::{generate_schema, parse_document};
use crate::schema_node::{NodeId, QualifiedName, SchemaTree};
use indexmap::{IndexMap, IndexSet};
use roxmltree::Document;
use tracing::debug;

/// Lookup tables over one schema document
///
/// Built once when a schema is loaded and read-only afterwards, so a single
/// index can be shared between concurrent generation calls.
#[derive(Debug, Clone)]
pub struct SchemaIndex {
    tree: SchemaTree,
    prefix: Option<String>,
    elements: IndexMap<String, NodeId>,
    complex_types: IndexMap<String, NodeId>,
    simple_types: IndexMap<String, NodeId>,
    attributes: IndexMap<String, NodeId>,
    referenced_element_names: IndexSet<String>,
}

impl SchemaIndex {
    /// Parse `xsd_string` and index it
    pub fn parse(xsd_string: &str) -> Result<Self> {
        let document = parse_document(xsd_string)?;
        SchemaIndex::build(&document)
    }

    /// Index an already parsed schema document
    ///
    /// Fails with [`XMLGeneratorError::SchemaStructureError`] if the root is not an
    /// XML Schema `schema` element or the schema defines no elements or types.
    pub fn build(document: &Document) -> Result<Self> {
        let parsed = generate_schema(document)?;
        let tree = parsed.tree;

        let element_tables = fetch_elements(&tree)?;
        let type_tables = fetch_types(&tree);
        let attributes = fetch_attributes(&tree);

        if element_tables.elements.is_empty()
            && type_tables.complex_types.is_empty()
            && type_tables.simple_types.is_empty()
        {
            return Err(XMLGeneratorError::SchemaStructureError(
                "No element, complexType or simpleType definitions found".to_string(),
            ));
        }

        debug!(
            elements = element_tables.elements.len(),
            complex_types = type_tables.complex_types.len(),
            simple_types = type_tables.simple_types.len(),
            referenced = element_tables.referenced.len(),
            "indexed schema"
        );

        Ok(SchemaIndex {
            tree,
            prefix: parsed.prefix,
            elements: element_tables.elements,
            complex_types: type_tables.complex_types,
            simple_types: type_tables.simple_types,
            attributes,
            referenced_element_names: element_tables.referenced,
        })
    }

    pub fn tree(&self) -> &SchemaTree {
        &self.tree
    }

    /// Prefix the document binds to the XML Schema namespace, `None` for the default namespace
    pub fn schema_prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn element(&self, name: &str) -> Option<NodeId> {
        self.elements.get(name).copied()
    }

    pub fn complex_type(&self, name: &str) -> Option<NodeId> {
        self.complex_types.get(name).copied()
    }

    pub fn simple_type(&self, name: &str) -> Option<NodeId> {
        self.simple_types.get(name).copied()
    }

    pub fn attribute(&self, name: &str) -> Option<NodeId> {
        self.attributes.get(name).copied()
    }

    /// Element declarations in document order, global declarations first
    pub fn elements(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.elements.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn complex_types(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.complex_types
            .iter()
            .map(|(name, id)| (name.as_str(), *id))
    }

    pub fn simple_types(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.simple_types.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn is_referenced(&self, name: &str) -> bool {
        self.referenced_element_names.contains(name)
    }

    pub fn referenced_element_names(&self) -> impl Iterator<Item = &str> {
        self.referenced_element_names.iter().map(String::as_str)
    }

    pub fn resolve_type(&self, qname: &QualifiedName) -> TypeResolution {
        resolve_type(qname, &self.complex_types, &self.simple_types)
    }
}
