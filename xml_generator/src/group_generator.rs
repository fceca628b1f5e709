use crate::element_generator::ContentGenerator;
use crate::error::Result;
use crate::fake_values::ValueSynthesizer;
use crate::schema_node::{NodeId, NodeKind};
use rand::Rng;
use tracing::trace;
use xml_builder::XMLElement;

impl<R: Rng, S: ValueSynthesizer> ContentGenerator<'_, R, S> {
    /// Expand a `sequence`, `choice` or `all` group into `children`
    ///
    /// The group's own occurrence bounds apply; each instance of a `choice`
    /// picks one particle uniformly, `sequence` and `all` emit every particle
    /// in document order.
    pub(crate) fn generate_group(
        &mut self,
        id: NodeId,
        children: &mut Vec<XMLElement>,
        depth: usize,
    ) -> Result<()> {
        let index = self.index;
        let tree = index.tree();
        let group = tree.node(id);

        let particles: Vec<NodeId> = tree
            .children(id)
            .filter(|child| {
                let kind = tree.node(*child).kind;
                kind == NodeKind::Element || kind.is_model_group()
            })
            .collect();

        let count = self.occurrences(group.occurs);
        trace!(group = ?group.kind, count, "expanding model group");

        for _ in 0..count {
            match group.kind {
                NodeKind::Choice => {
                    if particles.is_empty() {
                        continue;
                    }
                    let particle = particles[self.rng.random_range(0..particles.len())];
                    self.generate_particle(particle, children, depth)?;
                }
                _ => {
                    for particle in &particles {
                        self.generate_particle(*particle, children, depth)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn generate_particle(
        &mut self,
        id: NodeId,
        children: &mut Vec<XMLElement>,
        depth: usize,
    ) -> Result<()> {
        let index = self.index;
        match index.tree().node(id).kind {
            NodeKind::Element => self.generate_element_particle(id, children, depth),
            _ => self.generate_group(id, children, depth),
        }
    }
}
