use crate::generate::BuiltinType;
use crate::schema_node::{NodeId, NodeKind, QualifiedName, SchemaTree};
use indexmap::IndexMap;

/// What a `type`, `base`, `itemType` or `memberTypes` reference points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeResolution {
    Builtin(BuiltinType),
    Complex(NodeId),
    Simple(NodeId),
    /// Dangling reference, generated as generic text
    Unresolved(String),
}

pub(crate) struct TypeTables {
    pub(crate) complex_types: IndexMap<String, NodeId>,
    pub(crate) simple_types: IndexMap<String, NodeId>,
}

pub(crate) fn fetch_types(tree: &SchemaTree) -> TypeTables {
    let mut complex_types = IndexMap::new();
    let mut simple_types = IndexMap::new();

    for id in tree.descendants(tree.root()) {
        let node = tree.node(id);
        let Some(name) = &node.name else {
            continue;
        };

        match node.kind {
            NodeKind::ComplexType => {
                complex_types.entry(name.clone()).or_insert(id);
            }
            NodeKind::SimpleType => {
                simple_types.entry(name.clone()).or_insert(id);
            }
            _ => {}
        }
    }

    TypeTables {
        complex_types,
        simple_types,
    }
}

/// Resolve a type reference against the built-in table and the named types
///
/// A name bound to the schema namespace is a built-in. Unqualified names, or
/// names in another namespace, are looked up among the schema's own types
/// first and fall back to the built-in of the same local name, so `string`
/// and `xs:string` behave identically.
pub(crate) fn resolve_type(
    qname: &QualifiedName,
    complex_types: &IndexMap<String, NodeId>,
    simple_types: &IndexMap<String, NodeId>,
) -> TypeResolution {
    let builtin = BuiltinType::from_local_name(&qname.local);

    if qname.in_schema_namespace() {
        if let Some(builtin) = builtin {
            return TypeResolution::Builtin(builtin);
        }
    }

    if let Some(id) = complex_types.get(&qname.local) {
        return TypeResolution::Complex(*id);
    }

    if let Some(id) = simple_types.get(&qname.local) {
        return TypeResolution::Simple(*id);
    }

    match builtin {
        Some(builtin) => TypeResolution::Builtin(builtin),
        None => TypeResolution::Unresolved(qname.to_string()),
    }
}
