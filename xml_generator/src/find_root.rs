use crate::fetch_types::TypeResolution;
use crate::schema_index::SchemaIndex;
use crate::schema_node::{NodeId, NodeKind};
use tracing::debug;

fn is_complex(index: &SchemaIndex, id: NodeId) -> bool {
    let node = index.tree().node(id);
    if let Some(type_name) = &node.type_name {
        return matches!(index.resolve_type(type_name), TypeResolution::Complex(_));
    }

    index.tree().first_child(id, NodeKind::ComplexType).is_some()
}

/// Choose the element to use as the document root
///
/// Preference order:
/// 1. a global element nothing references, complex-typed ones first;
/// 2. any element nothing references;
/// 3. the first element of the index, when every element is referenced.
///
/// Returns `None` only when the schema declares no elements.
pub fn find_root_element(index: &SchemaIndex) -> Option<&str> {
    let independent: Vec<(&str, NodeId)> = index
        .elements()
        .filter(|(name, _)| !index.is_referenced(name))
        .collect();

    let global: Vec<(&str, NodeId)> = independent
        .iter()
        .copied()
        .filter(|(_, id)| index.tree().is_global(*id))
        .collect();

    if global.len() > 1 {
        debug!(
            "Multiple independent root elements found: {:?}",
            global.iter().map(|(name, _)| *name).collect::<Vec<_>>()
        );
    }

    let root = global
        .iter()
        .find(|(_, id)| is_complex(index, *id))
        .or_else(|| global.first())
        .or_else(|| independent.first())
        .map(|(name, _)| *name)
        .or_else(|| index.elements().next().map(|(name, _)| name));

    debug!(root = ?root, "selected root element");
    root
}
