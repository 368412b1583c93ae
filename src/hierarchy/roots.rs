//! Root resolution.
//!
//! A family tree is a forest: every node without a resolved parent heads its
//! own lineage, including married-in spouses with no recorded ancestry.

use crate::graph::{FamilyGraph, NodeId};
use crate::member::cmp_by_birth;

/// Every node with zero resolved parents, earliest known birth year first
/// (unknown last), then by name.
pub fn resolve_roots(graph: &FamilyGraph) -> Vec<NodeId> {
    let mut roots: Vec<NodeId> = graph
        .node_ids()
        .filter(|&id| graph.parent_count(id) == 0)
        .collect();
    roots.sort_by(|&a, &b| cmp_by_birth(graph.member(a), graph.member(b)));
    roots
}
