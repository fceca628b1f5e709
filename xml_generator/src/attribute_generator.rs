use crate::element_generator::ContentGenerator;
use crate::fake_values::ValueSynthesizer;
use crate::restriction::ConstraintRecord;
use crate::schema_node::{AttributeUse, NodeId, NodeKind};
use indexmap::IndexMap;
use rand::Rng;
use tracing::warn;

impl<R: Rng, S: ValueSynthesizer> ContentGenerator<'_, R, S> {
    /// Decide whether the attribute at `id` is emitted and record its value
    ///
    /// `use` and `fixed` are read from the declaration site first, a `ref`
    /// target only supplies the type. A prohibited attribute removes any value
    /// a base type already produced.
    pub(crate) fn fill_attribute(&mut self, id: NodeId, attributes: &mut IndexMap<String, String>) {
        let index = self.index;
        let tree = index.tree();
        let node = tree.node(id);

        let (name, declaration) = match (&node.reference, &node.name) {
            (Some(reference), _) => (reference.local.as_str(), index.attribute(&reference.local)),
            (None, Some(name)) => (name.as_str(), Some(id)),
            (None, None) => {
                warn!("attribute without name or ref skipped");
                return;
            }
        };

        match node.attribute_use {
            AttributeUse::Prohibited => {
                attributes.shift_remove(name);
                return;
            }
            AttributeUse::Required => {}
            AttributeUse::Optional => {
                let probability = self.config.optional_attribute_probability;
                let probability = if probability.is_nan() {
                    0.5
                } else {
                    probability.clamp(0.0, 1.0)
                };
                if !self.rng.random_bool(probability) {
                    return;
                }
            }
        }

        let fixed = node
            .fixed
            .as_ref()
            .or_else(|| declaration.and_then(|target| tree.node(target).fixed.as_ref()));

        let value = match (fixed, declaration) {
            (Some(fixed), _) => fixed.clone(),
            (None, Some(target)) => self.attribute_value(target),
            (None, None) => {
                warn!(attribute = name, "dangling attribute reference, emitting a word");
                self.synthesizer.word(self.rng)
            }
        };

        attributes.insert(name.to_string(), value);
    }

    // Same dispatch as a leaf element: named type, inline simple type, any text
    fn attribute_value(&mut self, id: NodeId) -> String {
        let index = self.index;
        let tree = index.tree();

        if let Some(type_name) = &tree.node(id).type_name {
            return self.type_value(type_name, ConstraintRecord::default());
        }

        match tree.first_child(id, NodeKind::SimpleType) {
            Some(simple) => self.simple_type_value(simple, ConstraintRecord::default()),
            None => self.synthesizer.word(self.rng),
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

    const BADGE: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
        <xs:attribute name="lang" type="xs:language"/>
        <xs:element name="Badge">
          <xs:complexType>
            <xs:attribute name="serial" type="xs:positiveInteger" use="required"/>
            <xs:attribute name="colour">
              <xs:simpleType>
                <xs:restriction base="xs:string">
                  <xs:enumeration value="red"/>
                  <xs:enumeration value="blue"/>
                </xs:restriction>
              </xs:simpleType>
            </xs:attribute>
            <xs:attribute ref="lang" use="required"/>
            <xs:attribute ref="issuer" use="required"/>
            <xs:attribute name="legacy" type="xs:string" use="prohibited"/>
          </xs:complexType>
        </xs:element>
      </xs:schema>"#;

    fn generate(config: &GeneratorConfig, seed: u64) -> String {
        let index = SchemaIndex::parse(BADGE).unwrap();
        let mut rng = XorShiftRng::seed_from_u64(seed);
        let mut generator = ContentGenerator::new(&index, config, &FakeSynthesizer, &mut rng);

        render(generator.generate_root("Badge").unwrap()).unwrap()
    }

    #[test]
    fn test_attribute_rules() {
        let config = GeneratorConfig::default();
        let mut with_colour = 0;

        for seed in 0..200 {
            let output = generate(&config, seed);
            let document = roxmltree::Document::parse(&output).unwrap();
            let root = document.root_element();

            let serial: u64 = root.attribute("serial").unwrap().parse().unwrap();
            assert!(serial >= 1);
            assert_eq!(root.attribute("lang"), Some("en"));
            assert!(!root.attribute("issuer").unwrap().is_empty());
            assert!(root.attribute("legacy").is_none());

            if let Some(colour) = root.attribute("colour") {
                assert!(colour == "red" || colour == "blue");
                with_colour += 1;
            }
        }

        assert!(with_colour > 0 && with_colour < 200, "{with_colour}");
    }

    #[test]
    fn test_optional_probability_bounds() {
        let never = GeneratorConfig::default().with_optional_attribute_probability(0.0);
        let always = GeneratorConfig::default().with_optional_attribute_probability(1.0);

        for seed in 0..20 {
            let output = generate(&never, seed);
            let document = roxmltree::Document::parse(&output).unwrap();
            assert!(document.root_element().attribute("colour").is_none());

            let output = generate(&always, seed);
            let document = roxmltree::Document::parse(&output).unwrap();
            assert!(document.root_element().attribute("colour").is_some());
        }
    }
}
