use crate::error::{Result, XMLGeneratorError};
use crate::schema_node::{
    AttributeUse, MaxOccurs, NodeId, NodeKind, Occurs, QualifiedName, SchemaNode, SchemaTree,
    XSD_NAMESPACE,
};
use roxmltree::{Document, Node};
use tracing::{debug, trace, warn};

/// Schema document converted into the generator's own node tree
pub(crate) struct ParsedSchema {
    pub(crate) tree: SchemaTree,
    /// Prefix bound to the schema namespace on the root, `None` when it is the default namespace
    pub(crate) prefix: Option<String>,
}

pub(crate) fn parse_document(xsd_string: &str) -> Result<Document<'_>> {
    Ok(Document::parse(xsd_string)?)
}

/// Check the root of `document` is an XML schema and convert it
///
/// Namespace prefixes are resolved here, once: every `type`, `ref`, `base`,
/// `itemType` and `memberTypes` value in the resulting tree carries the
/// namespace its prefix was bound to.
pub(crate) fn generate_schema(document: &Document) -> Result<ParsedSchema> {
    let root = document.root_element();
    let tag = root.tag_name();

    if tag.name() != "schema" {
        return Err(XMLGeneratorError::SchemaStructureError(format!(
            "root element is '{}', expected 'schema'",
            tag.name()
        )));
    }

    if tag.namespace() != Some(XSD_NAMESPACE) {
        return Err(XMLGeneratorError::SchemaStructureError(format!(
            "root element is not in the XML Schema namespace ({XSD_NAMESPACE})"
        )));
    }

    let prefix = root
        .namespaces()
        .find(|namespace| namespace.uri() == XSD_NAMESPACE)
        .and_then(|namespace| namespace.name())
        .map(str::to_string);
    debug!(prefix = ?prefix, "found XML Schema namespace");

    let mut tree = SchemaTree::new();
    map_node(&mut tree, root, None);

    Ok(ParsedSchema { tree, prefix })
}

fn map_node(tree: &mut SchemaTree, node: Node, parent: Option<NodeId>) {
    let tag = node.tag_name();
    if tag.namespace() != Some(XSD_NAMESPACE) {
        return;
    }

    let Some(kind) = NodeKind::from_local_name(tag.name()) else {
        match tag.name() {
            "annotation" | "whiteSpace" | "totalDigits" | "fractionDigits" => {}
            other => warn!("Skipping unsupported schema construct '{}'", other),
        }
        return;
    };

    let mut schema_node = SchemaNode::new(kind, parent);
    schema_node.name = get_attribute(node, "name");
    schema_node.reference = get_qname(node, "ref");
    schema_node.type_name = get_qname(node, "type");
    schema_node.base = get_qname(node, "base");
    schema_node.item_type = get_qname(node, "itemType");
    schema_node.member_types = node
        .attribute("memberTypes")
        .map(|members| {
            members
                .split_whitespace()
                .map(|member| resolve_qname(node, member))
                .collect()
        })
        .unwrap_or_default();
    schema_node.value = node.attribute("value").map(str::to_string);
    schema_node.fixed = node.attribute("fixed").map(str::to_string);
    schema_node.occurs = get_occurs(node);
    schema_node.attribute_use = get_attribute_use(node);

    trace!(kind = ?kind, name = ?schema_node.name, "mapped schema node");
    let id = tree.push(schema_node);

    for child in node.children().filter(Node::is_element) {
        map_node(tree, child, Some(id));
    }
}

fn get_attribute(node: Node, name: &str) -> Option<String> {
    node.attribute(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn get_qname(node: Node, name: &str) -> Option<QualifiedName> {
    get_attribute(node, name).map(|value| resolve_qname(node, &value))
}

fn resolve_qname(node: Node, value: &str) -> QualifiedName {
    let (prefix, local) = match value.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, value),
    };

    QualifiedName {
        prefix: prefix.map(str::to_string),
        local: local.to_string(),
        namespace: node.lookup_namespace_uri(prefix).map(str::to_string),
    }
}

fn get_occurs(node: Node) -> Occurs {
    let mut occurs = Occurs::default();

    if let Some(min) = node.attribute("minOccurs") {
        match min.trim().parse::<usize>() {
            Ok(value) => occurs.min = value,
            Err(_) => warn!("Ignoring malformed minOccurs '{}'", min),
        }
    }

    if let Some(max) = node.attribute("maxOccurs") {
        let max = max.trim();
        if max == "unbounded" {
            occurs.max = MaxOccurs::Unbounded;
        } else {
            match max.parse::<usize>() {
                Ok(value) => occurs.max = MaxOccurs::Bounded(value),
                Err(_) => warn!("Ignoring malformed maxOccurs '{}'", max),
            }
        }
    }

    occurs
}

fn get_attribute_use(node: Node) -> AttributeUse {
    match node.attribute("use").map(str::trim) {
        Some("required") => AttributeUse::Required,
        Some("prohibited") => AttributeUse::Prohibited,
        _ => AttributeUse::Optional,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xsd: &str) -> Result<ParsedSchema> {
        let document = parse_document(xsd)?;
        generate_schema(&document)
    }

    #[test]
    fn test_prefix_discovery() {
        let prefixed = parse(
            r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema">
                 <xsd:element name="a" type="xsd:string"/>
               </xsd:schema>"#,
        )
        .unwrap();
        assert_eq!(prefixed.prefix.as_deref(), Some("xsd"));

        let default = parse(
            r#"<schema xmlns="http://www.w3.org/2001/XMLSchema">
                 <element name="a" type="string"/>
               </schema>"#,
        )
        .unwrap();
        assert_eq!(default.prefix, None);

        let element = default.tree.children(default.tree.root()).next().unwrap();
        let type_name = default.tree.node(element).type_name.clone().unwrap();
        assert!(type_name.in_schema_namespace());
        assert_eq!(type_name.local, "string");
    }

    #[test]
    fn test_wrong_root() {
        let result = parse(r#"<grammar xmlns="http://relaxng.org/ns/structure/1.0"/>"#);
        assert!(matches!(
            result,
            Err(XMLGeneratorError::SchemaStructureError(_))
        ));

        let result = parse(r#"<schema><element name="a"/></schema>"#);
        assert!(matches!(
            result,
            Err(XMLGeneratorError::SchemaStructureError(_))
        ));
    }

    #[test]
    fn test_malformed_xml() {
        let result = parse("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
        assert!(matches!(result, Err(XMLGeneratorError::XSDParserError(_))));
    }

    #[test]
    fn test_occurs_and_use() {
        let parsed = parse(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:complexType name="T">
                   <xs:sequence>
                     <xs:element name="a" type="xs:string" minOccurs="0" maxOccurs="unbounded"/>
                     <xs:element name="b" type="xs:string" maxOccurs="3"/>
                   </xs:sequence>
                   <xs:attribute name="id" type="xs:int" use="required"/>
                 </xs:complexType>
               </xs:schema>"#,
        )
        .unwrap();
        let tree = &parsed.tree;
        let complex = tree.first_child(tree.root(), NodeKind::ComplexType).unwrap();
        let sequence = tree.first_child(complex, NodeKind::Sequence).unwrap();
        let elements: Vec<_> = tree.children(sequence).collect();

        assert_eq!(
            tree.node(elements[0]).occurs,
            Occurs {
                min: 0,
                max: MaxOccurs::Unbounded
            }
        );
        assert_eq!(
            tree.node(elements[1]).occurs,
            Occurs {
                min: 1,
                max: MaxOccurs::Bounded(3)
            }
        );

        let attribute = tree.first_child(complex, NodeKind::Attribute).unwrap();
        assert_eq!(tree.node(attribute).attribute_use, AttributeUse::Required);
    }

    #[test]
    fn test_annotations_are_dropped() {
        let parsed = parse(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:annotation><xs:documentation>Example</xs:documentation></xs:annotation>
                 <xs:element name="a" type="xs:string"/>
               </xs:schema>"#,
        )
        .unwrap();

        assert_eq!(parsed.tree.len(), 2);
    }
}
