use crate::config::GeneratorConfig;
use crate::error::{Result, XMLGeneratorError};
use crate::fake_values::ValueSynthesizer;
use crate::fetch_types::TypeResolution;
use crate::generate::{BuiltinType, resolve_builtin};
use crate::restriction::ConstraintRecord;
use crate::schema_index::SchemaIndex;
use crate::schema_node::{MaxOccurs, NodeId, NodeKind, Occurs};
use crate::type_generator::ElementContent;
use rand::Rng;
use tracing::{trace, warn};
use xml_builder::XMLElement;

/// Recursive engine turning schema nodes into output elements
///
/// Borrows the index read-only and owns nothing but the random source, so one
/// index can back any number of generators.
pub(crate) struct ContentGenerator<'a, R: Rng, S: ValueSynthesizer> {
    pub(crate) index: &'a SchemaIndex,
    pub(crate) config: &'a GeneratorConfig,
    pub(crate) synthesizer: &'a S,
    pub(crate) rng: &'a mut R,
}

impl<'a, R: Rng, S: ValueSynthesizer> ContentGenerator<'a, R, S> {
    pub(crate) fn new(
        index: &'a SchemaIndex,
        config: &'a GeneratorConfig,
        synthesizer: &'a S,
        rng: &'a mut R,
    ) -> Self {
        ContentGenerator {
            index,
            config,
            synthesizer,
            rng,
        }
    }

    /// Generate the document element; the root is emitted exactly once
    pub(crate) fn generate_root(&mut self, name: &str) -> Result<XMLElement> {
        let index = self.index;
        let id = index
            .element(name)
            .ok_or_else(|| XMLGeneratorError::NoRootElement(Some(name.to_string())))?;

        self.generate_element(id, 0)
    }

    /// Emit every occurrence of an element particle into `children`
    ///
    /// Occurrence bounds are taken from the particle itself, so a `ref` site
    /// controls how often the referenced element repeats.
    pub(crate) fn generate_element_particle(
        &mut self,
        id: NodeId,
        children: &mut Vec<XMLElement>,
        depth: usize,
    ) -> Result<()> {
        let index = self.index;
        let count = self.occurrences(index.tree().node(id).occurs);

        for _ in 0..count {
            let child = self.generate_element(id, depth)?;
            children.push(child);
        }

        Ok(())
    }

    /// Generate one instance of the element declared or referenced at `id`
    pub(crate) fn generate_element(&mut self, id: NodeId, depth: usize) -> Result<XMLElement> {
        let index = self.index;
        let node = index.tree().node(id);

        let Some(reference) = &node.reference else {
            return self.generate_declared_element(id, depth);
        };

        match index.element(&reference.local) {
            Some(target) => self.generate_declared_element(target, depth),
            None => {
                warn!(reference = %reference, "dangling element reference, emitting text leaf");
                let content = ElementContent {
                    text: Some(self.synthesizer.word(self.rng)),
                    ..Default::default()
                };
                content.into_element(&reference.local)
            }
        }
    }

    fn generate_declared_element(&mut self, id: NodeId, depth: usize) -> Result<XMLElement> {
        let index = self.index;
        let tree = index.tree();
        let node = tree.node(id);

        let name = node.name.as_deref().ok_or_else(|| {
            XMLGeneratorError::SchemaStructureError(
                "Element does not have a name or a reference".to_string(),
            )
        })?;

        if depth > self.config.max_depth {
            return Err(XMLGeneratorError::RecursionLimitExceeded {
                element: name.to_string(),
                depth: self.config.max_depth,
            });
        }
        trace!(element = name, depth, "generating element");

        let mut content = self.element_content(id, depth)?;
        if let Some(fixed) = &node.fixed {
            content.children.clear();
            content.text = Some(fixed.clone());
        }

        content.into_element(name)
    }

    // Dispatch order: named type, inline complex type, inline simple type, empty
    fn element_content(&mut self, id: NodeId, depth: usize) -> Result<ElementContent> {
        let index = self.index;
        let tree = index.tree();
        let node = tree.node(id);
        let mut content = ElementContent::default();

        if let Some(type_name) = &node.type_name {
            match index.resolve_type(type_name) {
                TypeResolution::Builtin(builtin) => {
                    let constraints = ConstraintRecord::default();
                    content.text = Some(self.builtin_value(builtin, &constraints));
                }
                TypeResolution::Complex(type_id) => self.fill_type(type_id, &mut content, depth)?,
                TypeResolution::Simple(type_id) => {
                    content.text =
                        Some(self.simple_type_value(type_id, ConstraintRecord::default()));
                }
                TypeResolution::Unresolved(name) => {
                    warn!(type_name = %name, "unresolved element type, emitting a word");
                    content.text = Some(self.synthesizer.word(self.rng));
                }
            }
        } else if let Some(complex) = tree.first_child(id, NodeKind::ComplexType) {
            self.fill_type(complex, &mut content, depth)?;
        } else if let Some(simple) = tree.first_child(id, NodeKind::SimpleType) {
            content.text = Some(self.simple_type_value(simple, ConstraintRecord::default()));
        }

        Ok(content)
    }

    pub(crate) fn builtin_value(
        &mut self,
        builtin: BuiltinType,
        constraints: &ConstraintRecord,
    ) -> String {
        resolve_builtin(builtin, constraints, self.config, self.synthesizer, self.rng)
    }

    /// Number of instances to emit for a particle
    ///
    /// `unbounded` is replaced by a ceiling drawn from the configured range,
    /// never below `minOccurs`. Both bounds are capped at `max_occurrences`.
    pub(crate) fn occurrences(&mut self, occurs: Occurs) -> usize {
        let limit = self.config.max_occurrences;
        let min = if occurs.min > limit {
            warn!(
                min_occurs = occurs.min,
                limit, "minOccurs above the occurrence limit, capping"
            );
            limit
        } else {
            occurs.min
        };

        let ceiling = match occurs.max {
            MaxOccurs::Bounded(max) => max,
            MaxOccurs::Unbounded => {
                let (low, high) = (
                    *self.config.unbounded_ceiling.start(),
                    *self.config.unbounded_ceiling.end(),
                );
                if low < high {
                    self.rng.random_range(low..=high)
                } else {
                    low
                }
            }
        };

        let ceiling = ceiling.min(limit).max(min);
        self.rng.random_range(min..=ceiling)
    }
}
