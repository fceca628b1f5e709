//! Constraint extraction: the value-space restrictions attached to a schema node.

use crate::schema_node::{FacetKind, NodeId, NodeKind, SchemaTree};

/// Restrictions gathered from the `restriction` elements below one schema node
///
/// Every field is independent and optional. Numeric bounds are kept as the
/// literal facet text; the value resolver decides how to read them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintRecord {
    pub enumeration: Vec<String>,
    pub pattern: Option<String>,
    pub length: Option<usize>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min_inclusive: Option<String>,
    pub max_inclusive: Option<String>,
    pub min_exclusive: Option<String>,
    pub max_exclusive: Option<String>,
}

impl ConstraintRecord {
    pub fn is_empty(&self) -> bool {
        *self == ConstraintRecord::default()
    }

    /// Apply `other` on top of `self`, fields set in `other` win
    pub fn overlay(&mut self, other: ConstraintRecord) {
        if !other.enumeration.is_empty() {
            self.enumeration = other.enumeration;
        }
        if other.pattern.is_some() {
            self.pattern = other.pattern;
        }
        self.length = other.length.or(self.length);
        self.min_length = other.min_length.or(self.min_length);
        self.max_length = other.max_length.or(self.max_length);
        self.min_inclusive = other.min_inclusive.or(self.min_inclusive.take());
        self.max_inclusive = other.max_inclusive.or(self.max_inclusive.take());
        self.min_exclusive = other.min_exclusive.or(self.min_exclusive.take());
        self.max_exclusive = other.max_exclusive.or(self.max_exclusive.take());
        self.settle();
    }

    // An enumeration is the stronger constraint, never keep a pattern next to one
    fn settle(&mut self) {
        if !self.enumeration.is_empty() {
            self.pattern = None;
        }
    }
}

/// Collect the facets of every `restriction` at or below `node`
///
/// Facets of the same kind found in several restrictions are resolved
/// last-wins in document order; an enumeration replaces the one of an
/// earlier restriction rather than extending it.
///
/// This is the flat view offered to library callers. Generation walks
/// derivation chains one restriction at a time with [`restriction_facets`],
/// so facets of a nested type never reach the value of its parent.
pub fn extract_constraints(tree: &SchemaTree, node: NodeId) -> ConstraintRecord {
    collect_facets(tree, tree.descendants(node))
}

/// Facets declared directly on one `restriction`, nested types excluded
pub fn restriction_facets(tree: &SchemaTree, restriction: NodeId) -> ConstraintRecord {
    collect_facets(tree, tree.children(restriction))
}

fn collect_facets(tree: &SchemaTree, ids: impl IntoIterator<Item = NodeId>) -> ConstraintRecord {
    let mut record = ConstraintRecord::default();
    let mut enumeration_owner = None;

    for id in ids {
        let facet_node = tree.node(id);
        let NodeKind::Facet(facet) = facet_node.kind else {
            continue;
        };
        let Some(parent) = facet_node.parent else {
            continue;
        };
        if tree.node(parent).kind != NodeKind::Restriction {
            continue;
        }
        let Some(value) = facet_node.value.clone() else {
            continue;
        };

        match facet {
            FacetKind::Enumeration => {
                if enumeration_owner != Some(parent) {
                    record.enumeration.clear();
                    enumeration_owner = Some(parent);
                }
                record.enumeration.push(value);
            }
            FacetKind::Pattern => record.pattern = Some(value),
            FacetKind::Length => record.length = parse_length(&value).or(record.length),
            FacetKind::MinLength => record.min_length = parse_length(&value).or(record.min_length),
            FacetKind::MaxLength => record.max_length = parse_length(&value).or(record.max_length),
            FacetKind::MinInclusive => record.min_inclusive = Some(value),
            FacetKind::MaxInclusive => record.max_inclusive = Some(value),
            FacetKind::MinExclusive => record.min_exclusive = Some(value),
            FacetKind::MaxExclusive => record.max_exclusive = Some(value),
        }
    }

    record.settle();
    record
}

fn parse_length(value: &str) -> Option<usize> {
    value.trim().parse().ok()
}
