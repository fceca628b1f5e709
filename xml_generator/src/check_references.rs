//! Circular reference detection over the schema's reference graph.
//!
//! Generation never relies on a recursion cutoff to terminate: a schema is only
//! accepted once every global element, named complex type and named simple
//! type has been walked without reaching itself.

use crate::error::{Result, XMLGeneratorError};
use crate::fetch_types::TypeResolution;
use crate::schema_index::SchemaIndex;
use crate::schema_node::{NodeId, NodeKind, QualifiedName, SchemaTree};
use indexmap::IndexSet;
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// A node of the reference graph
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// Named element declaration
    Element(String),
    /// Named complex or simple type
    Type(String),
    /// Anonymous complex type declared inside the named element
    InlineIn(String),
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Element(name) => write!(f, "element:{name}"),
            Identity::Type(name) => write!(f, "type:{name}"),
            Identity::InlineIn(name) => write!(f, "inline-in:{name}"),
        }
    }
}

/// Chain of references from the start of a search to the repeated definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencePath(Vec<Identity>);

impl ReferencePath {
    pub fn identities(&self) -> &[Identity] {
        &self.0
    }
}

impl From<Vec<Identity>> for ReferencePath {
    fn from(identities: Vec<Identity>) -> Self {
        ReferencePath(identities)
    }
}

impl fmt::Display for ReferencePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(Identity::to_string).collect();
        write!(f, "{}", parts.join(" -> "))
    }
}

type Visit = std::result::Result<(), ReferencePath>;

/// Fail with [`XMLGeneratorError::CircularReferenceError`] if any definition in
/// the index can reach itself
pub fn check_circular_references(index: &SchemaIndex) -> Result<()> {
    let mut checker = ReferenceChecker::new(index);
    checker
        .check_all()
        .map_err(XMLGeneratorError::CircularReferenceError)?;

    debug!("no circular references found");
    Ok(())
}

struct ReferenceChecker<'a> {
    index: &'a SchemaIndex,
    tree: &'a SchemaTree,
    path: IndexSet<Identity>,
    // Fully explored without finding a cycle, no need to walk again
    clean: HashSet<Identity>,
}

impl<'a> ReferenceChecker<'a> {
    fn new(index: &'a SchemaIndex) -> Self {
        ReferenceChecker {
            index,
            tree: index.tree(),
            path: IndexSet::new(),
            clean: HashSet::new(),
        }
    }

    fn check_all(&mut self) -> Visit {
        let tree = self.tree;
        let index = self.index;

        for (name, id) in index.elements() {
            if tree.is_global(id) {
                self.visit_global_element(name, id)?;
            }
        }

        for (name, id) in index.complex_types() {
            self.visit_named_type(name, id)?;
        }

        for (name, id) in index.simple_types() {
            self.visit_named_type(name, id)?;
        }

        Ok(())
    }

    // Returns false when the identity is already known to be acyclic
    fn enter(&mut self, identity: Identity) -> std::result::Result<bool, ReferencePath> {
        if self.path.contains(&identity) {
            let mut path: Vec<Identity> = self.path.iter().cloned().collect();
            path.push(identity);
            return Err(ReferencePath(path));
        }

        if self.clean.contains(&identity) {
            return Ok(false);
        }

        self.path.insert(identity);
        Ok(true)
    }

    fn leave(&mut self) {
        if let Some(identity) = self.path.pop() {
            self.clean.insert(identity);
        }
    }

    fn visit_global_element(&mut self, name: &str, id: NodeId) -> Visit {
        if self.enter(Identity::Element(name.to_string()))? {
            self.visit_element_body(id, Some(name))?;
            self.leave();
        }

        Ok(())
    }

    fn visit_named_type(&mut self, name: &str, id: NodeId) -> Visit {
        let tree = self.tree;
        if self.enter(Identity::Type(name.to_string()))? {
            match tree.node(id).kind {
                NodeKind::SimpleType => self.visit_simple_body(id)?,
                _ => self.visit_complex_body(id)?,
            }
            self.leave();
        }

        Ok(())
    }

    fn visit_element(&mut self, id: NodeId) -> Visit {
        let tree = self.tree;
        let node = tree.node(id);

        if let Some(reference) = &node.reference {
            if let Some(target) = self.index.element(&reference.local) {
                return self.visit_global_element(&reference.local, target);
            }
            return Ok(());
        }

        match &node.name {
            Some(name) if tree.is_global(id) => self.visit_global_element(name, id),
            _ => self.visit_element_body(id, None),
        }
    }

    fn visit_element_body(&mut self, id: NodeId, owner: Option<&str>) -> Visit {
        let tree = self.tree;
        if let Some(type_name) = &tree.node(id).type_name {
            self.visit_type_ref(type_name)?;
        }

        if let Some(complex) = tree.first_child(id, NodeKind::ComplexType) {
            match owner {
                Some(owner) => {
                    if self.enter(Identity::InlineIn(owner.to_string()))? {
                        self.visit_complex_body(complex)?;
                        self.leave();
                    }
                }
                None => self.visit_complex_body(complex)?,
            }
        }

        if let Some(simple) = tree.first_child(id, NodeKind::SimpleType) {
            self.visit_simple_body(simple)?;
        }

        Ok(())
    }

    fn visit_type_ref(&mut self, qname: &QualifiedName) -> Visit {
        let tree = self.tree;
        match self.index.resolve_type(qname) {
            TypeResolution::Complex(id) | TypeResolution::Simple(id) => {
                let name = tree.node(id).label();
                self.visit_named_type(&name, id)
            }
            TypeResolution::Builtin(_) | TypeResolution::Unresolved(_) => Ok(()),
        }
    }

    // Complex types, model groups and extension bodies share one walk
    fn visit_complex_body(&mut self, id: NodeId) -> Visit {
        let tree = self.tree;
        let children: Vec<NodeId> = tree.children(id).collect();

        for child in children {
            match tree.node(child).kind {
                NodeKind::Element => self.visit_element(child)?,
                NodeKind::Sequence | NodeKind::Choice | NodeKind::All => {
                    self.visit_complex_body(child)?
                }
                NodeKind::Attribute => self.visit_attribute(child)?,
                NodeKind::SimpleContent => self.visit_derivation(child, true)?,
                NodeKind::ComplexContent => self.visit_derivation(child, false)?,
                _ => {}
            }
        }

        Ok(())
    }

    // `extension` always builds on its base; a complex content `restriction` restates the content
    fn visit_derivation(&mut self, content: NodeId, simple_content: bool) -> Visit {
        let tree = self.tree;
        let derivations: Vec<NodeId> = tree.children(content).collect();

        for derivation in derivations {
            let node = tree.node(derivation);
            let follow_base = match node.kind {
                NodeKind::Extension => true,
                NodeKind::Restriction => simple_content,
                _ => continue,
            };

            if follow_base {
                if let Some(base) = &node.base {
                    self.visit_type_ref(base)?;
                }
            }
            self.visit_complex_body(derivation)?;
        }

        Ok(())
    }

    fn visit_attribute(&mut self, id: NodeId) -> Visit {
        let tree = self.tree;
        let node = tree.node(id);

        if let Some(reference) = &node.reference {
            if let Some(target) = self.index.attribute(&reference.local) {
                if target != id {
                    return self.visit_attribute(target);
                }
            }
            return Ok(());
        }

        if let Some(type_name) = &node.type_name {
            self.visit_type_ref(type_name)?;
        }

        if let Some(simple) = tree.first_child(id, NodeKind::SimpleType) {
            self.visit_simple_body(simple)?;
        }

        Ok(())
    }

    fn visit_simple_body(&mut self, id: NodeId) -> Visit {
        let tree = self.tree;
        let children: Vec<NodeId> = tree.children(id).collect();

        for child in children {
            let node = tree.node(child);
            let mut targets: Vec<&QualifiedName> = vec![];

            match node.kind {
                NodeKind::Restriction => targets.extend(node.base.as_ref()),
                NodeKind::List => targets.extend(node.item_type.as_ref()),
                NodeKind::Union => targets.extend(node.member_types.iter()),
                _ => continue,
            }

            for target in targets {
                self.visit_type_ref(target)?;
            }

            let inline: Vec<NodeId> = self
                .tree
                .children_of_kind(child, NodeKind::SimpleType)
                .collect();
            for simple in inline {
                self.visit_simple_body(simple)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(xsd: &str) -> Result<()> {
        let index = SchemaIndex::parse(xsd).unwrap();
        check_circular_references(&index)
    }

    fn cycle_path(xsd: &str) -> Vec<String> {
        match check(xsd) {
            Err(XMLGeneratorError::CircularReferenceError(path)) => {
                path.identities().iter().map(Identity::to_string).collect()
            }
            other => panic!("expected a circular reference, got {other:?}"),
        }
    }

    #[test]
    fn test_self_reference_through_named_type() {
        let path = cycle_path(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:element name="Node" type="NodeType"/>
                 <xs:complexType name="NodeType">
                   <xs:sequence>
                     <xs:element name="value" type="xs:string"/>
                     <xs:element ref="Node" minOccurs="0"/>
                   </xs:sequence>
                 </xs:complexType>
               </xs:schema>"#,
        );

        assert_eq!(path, vec!["element:Node", "type:NodeType", "element:Node"]);
    }

    #[test]
    fn test_self_reference_through_inline_type() {
        let path = cycle_path(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:element name="Folder">
                   <xs:complexType>
                     <xs:choice>
                       <xs:sequence>
                         <xs:element ref="Folder" maxOccurs="unbounded"/>
                       </xs:sequence>
                     </xs:choice>
                   </xs:complexType>
                 </xs:element>
               </xs:schema>"#,
        );

        assert_eq!(
            path,
            vec!["element:Folder", "inline-in:Folder", "element:Folder"]
        );
    }

    #[test]
    fn test_type_containing_itself() {
        let path = cycle_path(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:complexType name="Tree">
                   <xs:sequence>
                     <xs:element name="child" type="Tree" minOccurs="0"/>
                   </xs:sequence>
                 </xs:complexType>
               </xs:schema>"#,
        );

        assert_eq!(path, vec!["type:Tree", "type:Tree"]);
    }

    #[test]
    fn test_simple_type_chain_cycle() {
        let result = check(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:simpleType name="A"><xs:restriction base="B"/></xs:simpleType>
                 <xs:simpleType name="B"><xs:restriction base="A"/></xs:simpleType>
                 <xs:element name="value" type="A"/>
               </xs:schema>"#,
        );

        assert!(matches!(
            result,
            Err(XMLGeneratorError::CircularReferenceError(_))
        ));
    }

    #[test]
    fn test_extension_cycle() {
        let result = check(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:complexType name="Base">
                   <xs:sequence><xs:element name="more" type="Derived" minOccurs="0"/></xs:sequence>
                 </xs:complexType>
                 <xs:complexType name="Derived">
                   <xs:complexContent>
                     <xs:extension base="Base"/>
                   </xs:complexContent>
                 </xs:complexType>
               </xs:schema>"#,
        );

        assert!(matches!(
            result,
            Err(XMLGeneratorError::CircularReferenceError(_))
        ));
    }

    #[test]
    fn test_shared_type_is_not_a_cycle() {
        let result = check(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:element name="Order">
                   <xs:complexType>
                     <xs:sequence>
                       <xs:element name="billing" type="Address"/>
                       <xs:element name="shipping" type="Address"/>
                       <xs:element ref="Note"/>
                       <xs:element ref="Note"/>
                     </xs:sequence>
                   </xs:complexType>
                 </xs:element>
                 <xs:element name="Note" type="xs:string"/>
                 <xs:complexType name="Address">
                   <xs:sequence><xs:element name="Street" type="xs:string"/></xs:sequence>
                 </xs:complexType>
               </xs:schema>"#,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn test_local_element_named_like_its_parent() {
        let result = check(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:element name="Item">
                   <xs:complexType>
                     <xs:sequence>
                       <xs:element name="Item">
                         <xs:complexType>
                           <xs:sequence><xs:element name="Label" type="xs:string"/></xs:sequence>
                         </xs:complexType>
                       </xs:element>
                     </xs:sequence>
                   </xs:complexType>
                 </xs:element>
               </xs:schema>"#,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn test_dangling_reference_is_not_a_cycle() {
        let result = check(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:element name="Root">
                   <xs:complexType>
                     <xs:sequence><xs:element ref="Missing"/></xs:sequence>
                   </xs:complexType>
                 </xs:element>
               </xs:schema>"#,
        );

        assert!(result.is_ok());
    }
}
