use crate::element_generator::ContentGenerator;
use crate::error::{Result, XMLGeneratorError};
use crate::fake_values::ValueSynthesizer;
use crate::fetch_types::TypeResolution;
use crate::generate::BuiltinType;
use crate::restriction::{ConstraintRecord, restriction_facets};
use crate::schema_node::{NodeId, NodeKind, QualifiedName};
use indexmap::IndexMap;
use quick_xml::escape::partial_escape;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::warn;
use xml_builder::XMLElement;

/// Attributes, text and child elements collected for one output element
///
/// Derived types write over what their base produced, so attributes are keyed
/// by name and the text is replaced rather than appended.
#[derive(Default)]
pub(crate) struct ElementContent {
    pub(crate) attributes: IndexMap<String, String>,
    pub(crate) text: Option<String>,
    pub(crate) children: Vec<XMLElement>,
}

impl ElementContent {
    pub(crate) fn into_element(self, name: &str) -> Result<XMLElement> {
        let mut element = XMLElement::new(name);
        for (attribute, value) in &self.attributes {
            element.add_attribute(attribute, value);
        }

        if self.children.is_empty() {
            // xml-builder writes text verbatim, only attribute values are escaped
            if let Some(text) = self.text {
                element
                    .add_text(partial_escape(&text).into_owned())
                    .map_err(|err| XMLGeneratorError::XMLBuilderError(err.to_string()))?;
            }
            return Ok(element);
        }

        for child in self.children {
            element
                .add_child(child)
                .map_err(|err| XMLGeneratorError::XMLBuilderError(err.to_string()))?;
        }

        Ok(element)
    }
}

// Number of items generated for a `list` simple type
const LIST_ITEMS: std::ops::RangeInclusive<usize> = 1..=3;

enum UnionMember<'t> {
    Named(&'t QualifiedName),
    Inline(NodeId),
}

impl<R: Rng, S: ValueSynthesizer> ContentGenerator<'_, R, S> {
    /// Expand a complex type body into `content`
    ///
    /// Also used for the `extension`/`restriction` of complex content, which
    /// carry the same children as a complex type. Attributes come first, then
    /// derived content, then every `sequence`, every `choice` and every `all`.
    pub(crate) fn fill_type(
        &mut self,
        id: NodeId,
        content: &mut ElementContent,
        depth: usize,
    ) -> Result<()> {
        let index = self.index;
        let tree = index.tree();

        for attribute in tree.children_of_kind(id, NodeKind::Attribute) {
            self.fill_attribute(attribute, &mut content.attributes);
        }

        for child in tree.children(id) {
            match tree.node(child).kind {
                NodeKind::SimpleContent => self.fill_simple_content(child, content, depth)?,
                NodeKind::ComplexContent => self.fill_complex_content(child, content, depth)?,
                _ => {}
            }
        }

        for kind in [NodeKind::Sequence, NodeKind::Choice, NodeKind::All] {
            for group in tree.children_of_kind(id, kind) {
                self.generate_group(group, &mut content.children, depth + 1)?;
            }
        }

        Ok(())
    }

    fn fill_simple_content(
        &mut self,
        id: NodeId,
        content: &mut ElementContent,
        depth: usize,
    ) -> Result<()> {
        let index = self.index;
        let tree = index.tree();

        for derivation in tree.children(id) {
            let node = tree.node(derivation);
            let base = node.base.as_ref();
            let complex_base = match base.map(|base| index.resolve_type(base)) {
                Some(TypeResolution::Complex(base_id)) => Some(base_id),
                _ => None,
            };

            match node.kind {
                NodeKind::Extension => match (complex_base, base) {
                    (Some(base_id), _) => self.fill_type(base_id, content, depth)?,
                    (None, Some(base)) => {
                        content.text = Some(self.type_value(base, ConstraintRecord::default()));
                    }
                    (None, None) => content.text = Some(self.synthesizer.word(self.rng)),
                },
                NodeKind::Restriction => {
                    // Attributes are inherited, the text is restated under the new facets
                    if let Some(base_id) = complex_base {
                        self.fill_type(base_id, content, depth)?;
                    }
                    content.text =
                        Some(self.restriction_value(derivation, ConstraintRecord::default()));
                }
                _ => continue,
            }

            for attribute in tree.children_of_kind(derivation, NodeKind::Attribute) {
                self.fill_attribute(attribute, &mut content.attributes);
            }
        }

        Ok(())
    }

    fn fill_complex_content(
        &mut self,
        id: NodeId,
        content: &mut ElementContent,
        depth: usize,
    ) -> Result<()> {
        let index = self.index;
        let tree = index.tree();

        for derivation in tree.children(id) {
            let node = tree.node(derivation);
            match node.kind {
                NodeKind::Extension => {
                    if let Some(base) = &node.base {
                        match index.resolve_type(base) {
                            TypeResolution::Complex(base_id) => {
                                self.fill_type(base_id, content, depth)?
                            }
                            TypeResolution::Unresolved(name) if !base.in_schema_namespace() => {
                                warn!(base = %name, "unresolved base type, extending nothing");
                            }
                            _ => {}
                        }
                    }
                    self.fill_type(derivation, content, depth)?;
                }
                NodeKind::Restriction => self.fill_type(derivation, content, depth)?,
                _ => {}
            }
        }

        Ok(())
    }

    /// Literal for a type reference; `constraints` come from a derived type
    /// and win over the facets of the referenced type
    pub(crate) fn type_value(&mut self, qname: &QualifiedName, constraints: ConstraintRecord) -> String {
        let index = self.index;
        match index.resolve_type(qname) {
            TypeResolution::Builtin(builtin) => self.builtin_value(builtin, &constraints),
            TypeResolution::Simple(id) => self.simple_type_value(id, constraints),
            TypeResolution::Complex(id) => self.complex_text_value(id, constraints),
            TypeResolution::Unresolved(name) => {
                if !constraints.enumeration.is_empty() || constraints.pattern.is_some() {
                    return self.builtin_value(BuiltinType::String, &constraints);
                }
                warn!(type_name = %name, "unresolved type, emitting a word");
                self.synthesizer.word(self.rng)
            }
        }
    }

    /// Walk a simple type down its restriction chain to one literal
    pub(crate) fn simple_type_value(&mut self, id: NodeId, derived: ConstraintRecord) -> String {
        let index = self.index;
        let tree = index.tree();

        for child in tree.children(id) {
            match tree.node(child).kind {
                NodeKind::Restriction => return self.restriction_value(child, derived),
                NodeKind::List => return self.list_value(child, derived),
                NodeKind::Union => return self.union_value(child, derived),
                _ => {}
            }
        }

        self.synthesizer.word(self.rng)
    }

    fn restriction_value(&mut self, id: NodeId, derived: ConstraintRecord) -> String {
        let index = self.index;
        let tree = index.tree();

        let mut constraints = restriction_facets(tree, id);
        constraints.overlay(derived);

        if let Some(base) = &tree.node(id).base {
            return self.type_value(base, constraints);
        }

        match tree.first_child(id, NodeKind::SimpleType) {
            Some(inline) => self.simple_type_value(inline, constraints),
            None => self.builtin_value(BuiltinType::String, &constraints),
        }
    }

    fn list_value(&mut self, id: NodeId, derived: ConstraintRecord) -> String {
        if let Some(value) = derived.enumeration.choose(self.rng) {
            return value.clone();
        }

        let index = self.index;
        let tree = index.tree();
        let node = tree.node(id);
        let count = self.rng.random_range(LIST_ITEMS);

        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            let item = match (&node.item_type, tree.first_child(id, NodeKind::SimpleType)) {
                (Some(item_type), _) => self.type_value(item_type, ConstraintRecord::default()),
                (None, Some(inline)) => {
                    self.simple_type_value(inline, ConstraintRecord::default())
                }
                (None, None) => self.synthesizer.word(self.rng),
            };
            items.push(item);
        }

        items.join(" ")
    }

    fn union_value(&mut self, id: NodeId, derived: ConstraintRecord) -> String {
        if let Some(value) = derived.enumeration.choose(self.rng) {
            return value.clone();
        }

        let index = self.index;
        let tree = index.tree();
        let mut members: Vec<UnionMember> = tree
            .node(id)
            .member_types
            .iter()
            .map(UnionMember::Named)
            .collect();
        members.extend(
            tree.children_of_kind(id, NodeKind::SimpleType)
                .map(UnionMember::Inline),
        );

        if members.is_empty() {
            return self.synthesizer.word(self.rng);
        }

        match &members[self.rng.random_range(0..members.len())] {
            UnionMember::Named(qname) => self.type_value(qname, ConstraintRecord::default()),
            UnionMember::Inline(inline) => {
                self.simple_type_value(*inline, ConstraintRecord::default())
            }
        }
    }

    // Text of a complex type with simple content, used when it is a restriction base
    fn complex_text_value(&mut self, id: NodeId, constraints: ConstraintRecord) -> String {
        let index = self.index;
        let tree = index.tree();

        let derivation = tree
            .first_child(id, NodeKind::SimpleContent)
            .and_then(|content| {
                tree.children(content).find(|child| {
                    matches!(
                        tree.node(*child).kind,
                        NodeKind::Extension | NodeKind::Restriction
                    )
                })
            });

        let Some(derivation) = derivation else {
            return self.synthesizer.word(self.rng);
        };

        let node = tree.node(derivation);
        match (node.kind, &node.base) {
            (NodeKind::Restriction, _) => self.restriction_value(derivation, constraints),
            (_, Some(base)) => self.type_value(base, constraints),
            (_, None) => self.synthesizer.word(self.rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GeneratorConfig;
    use crate::element_generator::ContentGenerator;
    use crate::fake_values::FakeSynthesizer;
    use crate::generate_output::render;
    use crate::schema_index::SchemaIndex;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    fn generate(xsd: &str, root: &str, seed: u64) -> String {
        let index = SchemaIndex::parse(xsd).unwrap();
        let config = GeneratorConfig::default();
        let mut rng = XorShiftRng::seed_from_u64(seed);
        let mut generator = ContentGenerator::new(&index, &config, &FakeSynthesizer, &mut rng);

        render(generator.generate_root(root).unwrap()).unwrap()
    }

    #[test]
    fn test_simple_type_chain() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:simpleType name="Grade">
              <xs:restriction base="xs:integer">
                <xs:minInclusive value="1"/>
                <xs:maxInclusive value="10"/>
              </xs:restriction>
            </xs:simpleType>
            <xs:simpleType name="PassGrade">
              <xs:restriction base="Grade">
                <xs:minInclusive value="6"/>
              </xs:restriction>
            </xs:simpleType>
            <xs:element name="Result" type="PassGrade"/>
          </xs:schema>"#;

        for seed in 0..100 {
            let output = generate(xsd, "Result", seed);
            let document = roxmltree::Document::parse(&output).unwrap();
            let value: i64 = document.root_element().text().unwrap().parse().unwrap();
            assert!((6..=10).contains(&value), "{value}");
        }
    }

    #[test]
    fn test_list_and_union() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:simpleType name="Sizes">
              <xs:list itemType="xs:positiveInteger"/>
            </xs:simpleType>
            <xs:simpleType name="Flag">
              <xs:union memberTypes="xs:boolean">
                <xs:simpleType>
                  <xs:restriction base="xs:string">
                    <xs:enumeration value="unknown"/>
                  </xs:restriction>
                </xs:simpleType>
              </xs:union>
            </xs:simpleType>
            <xs:element name="Item">
              <xs:complexType>
                <xs:sequence>
                  <xs:element name="Sizes" type="Sizes"/>
                  <xs:element name="Flag" type="Flag"/>
                </xs:sequence>
              </xs:complexType>
            </xs:element>
          </xs:schema>"#;

        for seed in 0..50 {
            let output = generate(xsd, "Item", seed);
            let document = roxmltree::Document::parse(&output).unwrap();
            let root = document.root_element();

            let sizes = root
                .children()
                .find(|node| node.has_tag_name("Sizes"))
                .and_then(|node| node.text())
                .unwrap();
            let items: Vec<&str> = sizes.split(' ').collect();
            assert!((1..=3).contains(&items.len()));
            assert!(items.iter().all(|item| item.parse::<u64>().is_ok()));

            let flag = root
                .children()
                .find(|node| node.has_tag_name("Flag"))
                .and_then(|node| node.text())
                .unwrap();
            assert!(["true", "false", "unknown"].contains(&flag), "{flag}");
        }
    }

    #[test]
    fn test_simple_content_extension() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="Price">
              <xs:complexType>
                <xs:simpleContent>
                  <xs:extension base="xs:decimal">
                    <xs:attribute name="currency" type="xs:string" use="required" fixed="EUR"/>
                  </xs:extension>
                </xs:simpleContent>
              </xs:complexType>
            </xs:element>
          </xs:schema>"#;

        let output = generate(xsd, "Price", 3);
        let document = roxmltree::Document::parse(&output).unwrap();
        let root = document.root_element();

        assert_eq!(root.attribute("currency"), Some("EUR"));
        let price: f64 = root.text().unwrap().parse().unwrap();
        assert!((1.0..=1000.0).contains(&price));
    }

    #[test]
    fn test_simple_content_restriction_of_complex_base() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:complexType name="Measure">
              <xs:simpleContent>
                <xs:extension base="xs:string">
                  <xs:attribute name="unit" type="xs:string" use="required"/>
                </xs:extension>
              </xs:simpleContent>
            </xs:complexType>
            <xs:complexType name="Length">
              <xs:simpleContent>
                <xs:restriction base="Measure">
                  <xs:enumeration value="short"/>
                  <xs:enumeration value="long"/>
                </xs:restriction>
              </xs:simpleContent>
            </xs:complexType>
            <xs:element name="Length" type="Length"/>
          </xs:schema>"#;

        for seed in 0..20 {
            let output = generate(xsd, "Length", seed);
            let document = roxmltree::Document::parse(&output).unwrap();
            let root = document.root_element();

            assert!(root.attribute("unit").is_some());
            assert!(["short", "long"].contains(&root.text().unwrap()));
        }
    }

    #[test]
    fn test_complex_content_extension() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:complexType name="Party">
              <xs:sequence>
                <xs:element name="Name" type="xs:string"/>
              </xs:sequence>
              <xs:attribute name="id" type="xs:ID" use="required"/>
            </xs:complexType>
            <xs:complexType name="Customer">
              <xs:complexContent>
                <xs:extension base="Party">
                  <xs:sequence>
                    <xs:element name="Email" type="xs:string"/>
                  </xs:sequence>
                  <xs:attribute name="tier" type="xs:string" use="prohibited"/>
                </xs:extension>
              </xs:complexContent>
            </xs:complexType>
            <xs:element name="Customer" type="Customer"/>
          </xs:schema>"#;

        let output = generate(xsd, "Customer", 5);
        let document = roxmltree::Document::parse(&output).unwrap();
        let root = document.root_element();

        let names: Vec<&str> = root
            .children()
            .filter(|node| node.is_element())
            .map(|node| node.tag_name().name())
            .collect();
        assert_eq!(names, vec!["Name", "Email"]);
        assert!(root.attribute("id").is_some());
        assert!(root.attribute("tier").is_none());
    }

    #[test]
    fn test_complex_content_restriction() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:complexType name="Full">
              <xs:sequence>
                <xs:element name="A" type="xs:string"/>
                <xs:element name="B" type="xs:string" minOccurs="0"/>
              </xs:sequence>
            </xs:complexType>
            <xs:complexType name="Reduced">
              <xs:complexContent>
                <xs:restriction base="Full">
                  <xs:sequence>
                    <xs:element name="A" type="xs:string"/>
                  </xs:sequence>
                </xs:restriction>
              </xs:complexContent>
            </xs:complexType>
            <xs:element name="Reduced" type="Reduced"/>
          </xs:schema>"#;

        let output = generate(xsd, "Reduced", 8);
        let document = roxmltree::Document::parse(&output).unwrap();
        let names: Vec<&str> = document
            .root_element()
            .children()
            .filter(|node| node.is_element())
            .map(|node| node.tag_name().name())
            .collect();

        assert_eq!(names, vec!["A"]);
    }
}
