use std::fmt;

/// Namespace of the XML Schema language itself
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Handle to a node stored in a [`SchemaTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Schema constructs understood by the generator
///
/// Anything else in the schema namespace (annotations, named groups, wildcards,
/// identity constraints) is dropped while the tree is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Schema,
    Element,
    Attribute,
    ComplexType,
    SimpleType,
    SimpleContent,
    ComplexContent,
    Sequence,
    Choice,
    All,
    Restriction,
    Extension,
    List,
    Union,
    Facet(FacetKind),
}

/// Constraining facets collected into a
/// [`ConstraintRecord`](crate::restriction::ConstraintRecord)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacetKind {
    Enumeration,
    Pattern,
    Length,
    MinLength,
    MaxLength,
    MinInclusive,
    MaxInclusive,
    MinExclusive,
    MaxExclusive,
}

impl NodeKind {
    /// Map the local name of a schema-namespace tag to its kind
    pub fn from_local_name(name: &str) -> Option<NodeKind> {
        let kind = match name {
            "schema" => NodeKind::Schema,
            "element" => NodeKind::Element,
            "attribute" => NodeKind::Attribute,
            "complexType" => NodeKind::ComplexType,
            "simpleType" => NodeKind::SimpleType,
            "simpleContent" => NodeKind::SimpleContent,
            "complexContent" => NodeKind::ComplexContent,
            "sequence" => NodeKind::Sequence,
            "choice" => NodeKind::Choice,
            "all" => NodeKind::All,
            "restriction" => NodeKind::Restriction,
            "extension" => NodeKind::Extension,
            "list" => NodeKind::List,
            "union" => NodeKind::Union,
            "enumeration" => NodeKind::Facet(FacetKind::Enumeration),
            "pattern" => NodeKind::Facet(FacetKind::Pattern),
            "length" => NodeKind::Facet(FacetKind::Length),
            "minLength" => NodeKind::Facet(FacetKind::MinLength),
            "maxLength" => NodeKind::Facet(FacetKind::MaxLength),
            "minInclusive" => NodeKind::Facet(FacetKind::MinInclusive),
            "maxInclusive" => NodeKind::Facet(FacetKind::MaxInclusive),
            "minExclusive" => NodeKind::Facet(FacetKind::MinExclusive),
            "maxExclusive" => NodeKind::Facet(FacetKind::MaxExclusive),
            _ => return None,
        };

        Some(kind)
    }

    /// `sequence`, `choice` or `all`
    pub fn is_model_group(&self) -> bool {
        matches!(self, NodeKind::Sequence | NodeKind::Choice | NodeKind::All)
    }
}

/// A `prefix:local` reference with its prefix already resolved against the
/// namespace declarations in scope where it was written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub prefix: Option<String>,
    pub local: String,
    pub namespace: Option<String>,
}

impl QualifiedName {
    pub fn in_schema_namespace(&self) -> bool {
        self.namespace.as_deref() == Some(XSD_NAMESPACE)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxOccurs {
    Bounded(usize),
    Unbounded,
}

/// Occurrence bounds of a particle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    pub min: usize,
    pub max: MaxOccurs,
}

impl Default for Occurs {
    fn default() -> Self {
        Occurs {
            min: 1,
            max: MaxOccurs::Bounded(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeUse {
    #[default]
    Optional,
    Required,
    Prohibited,
}

/// One schema construct with its attributes already interpreted
#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub kind: NodeKind,
    pub name: Option<String>,
    pub reference: Option<QualifiedName>,
    pub type_name: Option<QualifiedName>,
    pub base: Option<QualifiedName>,
    pub item_type: Option<QualifiedName>,
    pub member_types: Vec<QualifiedName>,
    /// `value` of a facet
    pub value: Option<String>,
    pub occurs: Occurs,
    pub attribute_use: AttributeUse,
    pub fixed: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl SchemaNode {
    pub(crate) fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        SchemaNode {
            kind,
            name: None,
            reference: None,
            type_name: None,
            base: None,
            item_type: None,
            member_types: vec![],
            value: None,
            occurs: Occurs::default(),
            attribute_use: AttributeUse::default(),
            fixed: None,
            parent,
            children: vec![],
        }
    }

    /// Name used in diagnostics: the declared name, then the reference, then the kind
    pub fn label(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }

        if let Some(reference) = &self.reference {
            return reference.local.clone();
        }

        format!("{:?}", self.kind)
    }
}

/// Arena holding every supported node of one schema document
#[derive(Debug, Clone)]
pub struct SchemaTree {
    nodes: Vec<SchemaNode>,
}

impl SchemaTree {
    pub(crate) fn new() -> Self {
        SchemaTree { nodes: vec![] }
    }

    pub(crate) fn push(&mut self, node: SchemaNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        if let Some(parent) = node.parent {
            self.nodes[parent.0].children.push(id);
        }
        self.nodes.push(node);

        id
    }

    /// The `schema` node; the first one pushed
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id.0].children.iter().copied()
    }

    pub fn children_of_kind(&self, id: NodeId, kind: NodeKind) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .filter(move |child| self.node(*child).kind == kind)
    }

    pub fn first_child(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children_of_kind(id, kind).next()
    }

    /// All nodes below `id` in document order, `id` excluded
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut output = vec![];
        let mut stack: Vec<NodeId> = self.nodes[id.0].children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            output.push(next);
            stack.extend(self.nodes[next.0].children.iter().rev().copied());
        }

        output
    }

    /// Whether the node is a direct child of the `schema` element
    pub fn is_global(&self, id: NodeId) -> bool {
        self.node(id).parent == Some(self.root())
    }
}
