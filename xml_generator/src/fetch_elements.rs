use crate::error::{Result, XMLGeneratorError};
use crate::schema_node::{NodeId, NodeKind, SchemaTree};
use indexmap::{IndexMap, IndexSet};

/// Element declarations by name, with global declarations taking precedence
/// over local ones of the same name, plus every name used as a `ref`
pub(crate) struct ElementTables {
    pub(crate) elements: IndexMap<String, NodeId>,
    pub(crate) referenced: IndexSet<String>,
}

pub(crate) fn fetch_elements(tree: &SchemaTree) -> Result<ElementTables> {
    let mut elements = IndexMap::new();
    let mut referenced = IndexSet::new();

    for id in tree.children_of_kind(tree.root(), NodeKind::Element) {
        let name = get_element_name(tree, id)?;
        if let Some(name) = name {
            elements.entry(name.to_string()).or_insert(id);
        }
    }

    for id in tree.descendants(tree.root()) {
        if tree.node(id).kind != NodeKind::Element {
            continue;
        }

        match get_element_name(tree, id)? {
            Some(name) => {
                elements.entry(name.to_string()).or_insert(id);
            }
            None => {
                if let Some(reference) = &tree.node(id).reference {
                    referenced.insert(reference.local.clone());
                }
            }
        }
    }

    Ok(ElementTables {
        elements,
        referenced,
    })
}

/// Global attribute declarations, the targets of attribute `ref`s
pub(crate) fn fetch_attributes(tree: &SchemaTree) -> IndexMap<String, NodeId> {
    tree.children_of_kind(tree.root(), NodeKind::Attribute)
        .filter_map(|id| tree.node(id).name.clone().map(|name| (name, id)))
        .collect()
}

// `Ok(None)` for a reference
fn get_element_name(tree: &SchemaTree, id: NodeId) -> Result<Option<&str>> {
    let node = tree.node(id);
    match (&node.name, &node.reference) {
        (Some(_), Some(reference)) => Err(XMLGeneratorError::SchemaStructureError(format!(
            "element declares both a name and a reference to '{reference}'"
        ))),
        (None, None) => Err(XMLGeneratorError::SchemaStructureError(
            "element does not have a name or a reference".to_string(),
        )),
        (Some(name), None) => Ok(Some(name.as_str())),
        (None, Some(_)) => Ok(None),
    }
}
