//! FamilyGraph - in-memory genealogy graph.
//!
//! The FamilyGraph stores parent→child relationships in petgraph's
//! StableGraph so that edges can be removed by the cycle guard without
//! invalidating node indices. Spouse links are undirected and live on the
//! nodes themselves; they never take part in the parent→child ordering.

use std::collections::{HashMap, VecDeque};

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::NodeIndexable;
use petgraph::{Directed, Direction};

use super::edge::{LinkKind, ParentLink};
use super::node::{Node, NodeId};
use crate::member::Member;

/// The family graph of one family tree.
///
/// Relationships are index references into a dense arena: node `n` is both
/// `NodeId(n)` and petgraph's `NodeIndex::new(n)`.
#[derive(Debug, Clone)]
pub struct FamilyGraph {
    /// Family tree every node belongs to.
    family_tree_id: String,

    /// Parent→child edges; nodes hold the member payload.
    graph: StableGraph<Node, ParentLink, Directed>,

    /// Map from member identifier to node.
    id_to_node: HashMap<String, NodeId>,

    /// Sequence number handed to the next recorded parent link.
    next_link_order: u32,
}

impl FamilyGraph {
    /// Create an empty graph for a family tree.
    pub fn new(family_tree_id: impl Into<String>) -> Self {
        Self::with_capacity(family_tree_id, 0, 0)
    }

    /// Create a graph with pre-allocated capacity.
    pub fn with_capacity(
        family_tree_id: impl Into<String>,
        node_capacity: usize,
        edge_capacity: usize,
    ) -> Self {
        Self {
            family_tree_id: family_tree_id.into(),
            graph: StableGraph::with_capacity(node_capacity, edge_capacity),
            id_to_node: HashMap::with_capacity(node_capacity),
            next_link_order: 0,
        }
    }

    pub fn family_tree_id(&self) -> &str {
        &self.family_tree_id
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a member. Returns `None` if the identifier is already taken.
    pub fn add_member(&mut self, member: Member) -> Option<NodeId> {
        if self.id_to_node.contains_key(&member.id) {
            return None;
        }
        let key = member.id.clone();
        let id = NodeId::from(self.graph.add_node(Node::new(member)));
        self.id_to_node.insert(key, id);
        Some(id)
    }

    /// Resolve a member identifier.
    pub fn lookup(&self, member_id: &str) -> Option<NodeId> {
        self.id_to_node.get(member_id).copied()
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// All node identifiers in arena order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices().map(NodeId::from)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.graph[NodeIndex::from(id)]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.graph[NodeIndex::from(id)]
    }

    /// Member identifier of a node.
    pub fn member_id(&self, id: NodeId) -> &str {
        self.node(id).id()
    }

    pub fn member(&self, id: NodeId) -> &Member {
        &self.node(id).member
    }

    pub fn generation(&self, id: NodeId) -> Option<u32> {
        self.node(id).generation
    }

    pub fn set_generation(&mut self, id: NodeId, generation: u32) {
        self.node_mut(id).generation = Some(generation);
    }

    // =========================================================================
    // Parent/Child Operations
    // =========================================================================

    /// Record a parent→child link. Returns `None` if the link already exists.
    pub fn link_parent(
        &mut self,
        parent: NodeId,
        child: NodeId,
        kind: LinkKind,
    ) -> Option<ParentLink> {
        if self.has_link(parent, child) {
            return None;
        }
        let link = ParentLink::new(kind, self.next_link_order);
        self.next_link_order += 1;
        self.graph.add_edge(parent.into(), child.into(), link);
        Some(link)
    }

    /// Remove a parent→child link, returning its weight.
    pub fn remove_link(&mut self, parent: NodeId, child: NodeId) -> Option<ParentLink> {
        let edge = self.graph.find_edge(parent.into(), child.into())?;
        self.graph.remove_edge(edge)
    }

    pub fn has_link(&self, parent: NodeId, child: NodeId) -> bool {
        self.graph.find_edge(parent.into(), child.into()).is_some()
    }

    /// Weight of an existing parent→child link.
    pub fn link(&self, parent: NodeId, child: NodeId) -> Option<ParentLink> {
        let edge = self.graph.find_edge(parent.into(), child.into())?;
        self.graph.edge_weight(edge).copied()
    }

    /// Get the number of parent→child edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Resolved parents, in arena order.
    pub fn parents(&self, id: NodeId) -> Vec<NodeId> {
        self.sorted_neighbors(id, Direction::Incoming)
    }

    /// Resolved children, in arena order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.sorted_neighbors(id, Direction::Outgoing)
    }

    pub fn parent_count(&self, id: NodeId) -> usize {
        self.graph
            .edges_directed(id.into(), Direction::Incoming)
            .count()
    }

    fn sorted_neighbors(&self, id: NodeId, direction: Direction) -> Vec<NodeId> {
        let mut neighbors: Vec<NodeId> = self
            .graph
            .neighbors_directed(id.into(), direction)
            .map(NodeId::from)
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    /// All parent→child pairs, sorted.
    pub fn parent_child_pairs(&self) -> Vec<(NodeId, NodeId)> {
        let mut pairs: Vec<_> = self
            .graph
            .edge_indices()
            .filter_map(|edge| self.graph.edge_endpoints(edge))
            .map(|(parent, child)| (NodeId::from(parent), NodeId::from(child)))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    // =========================================================================
    // Spouse Operations
    // =========================================================================

    /// Record a symmetric spouse link.
    pub fn link_spouses(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        self.node_mut(a).add_spouse(b);
        self.node_mut(b).add_spouse(a);
    }

    pub fn spouses(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).spouses
    }

    /// All spouse pairs `(a, b)` with `a < b`, sorted.
    pub fn spouse_pairs(&self) -> Vec<(NodeId, NodeId)> {
        let mut pairs = Vec::new();
        for id in self.node_ids() {
            for &spouse in self.spouses(id) {
                if id < spouse {
                    pairs.push((id, spouse));
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Whether `descendant` can be reached from `ancestor` along
    /// parent→child edges.
    pub fn is_descendant(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        let mut seen = vec![false; self.graph.node_bound()];
        let mut stack = vec![ancestor];
        while let Some(current) = stack.pop() {
            for child in self.graph.neighbors_directed(current.into(), Direction::Outgoing) {
                let child = NodeId::from(child);
                if child == descendant {
                    return true;
                }
                if !seen[child.index()] {
                    seen[child.index()] = true;
                    stack.push(child);
                }
            }
        }
        false
    }

    /// Whether the parent→child relation is acyclic (Kahn's algorithm).
    pub fn is_acyclic(&self) -> bool {
        let bound = self.graph.node_bound();
        let mut in_degree = vec![0usize; bound];
        for (_, child) in self.parent_child_pairs() {
            in_degree[child.index()] += 1;
        }

        let mut queue: VecDeque<NodeId> = self
            .node_ids()
            .filter(|id| in_degree[id.index()] == 0)
            .collect();
        let mut visited = 0;

        while let Some(id) = queue.pop_front() {
            visited += 1;
            for child in self.children(id) {
                in_degree[child.index()] -= 1;
                if in_degree[child.index()] == 0 {
                    queue.push_back(child);
                }
            }
        }

        visited == self.node_count()
    }
}
