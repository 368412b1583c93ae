//! Node type and related structures.
//!
//! Nodes are the members of one family graph. Each node has:
//! - A dense identifier (its arena slot, stable for the lifetime of the graph)
//! - The member record it was built from
//! - Its resolved spouses
//! - A generation number, unset until the generation pass runs

use std::fmt;

use petgraph::stable_graph::NodeIndex;

use crate::member::Member;

/// Dense node identifier.
///
/// Nodes are never removed from a family graph, so the identifier doubles as
/// the petgraph node index and as an index into per-node side tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Index into per-node side tables.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

impl From<NodeIndex> for NodeId {
    #[inline]
    fn from(index: NodeIndex) -> Self {
        Self(index.index() as u32)
    }
}

impl From<NodeId> for NodeIndex {
    #[inline]
    fn from(id: NodeId) -> Self {
        NodeIndex::new(id.index())
    }
}

/// A member inside the family graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub member: Member,
    /// Resolved spouses, sorted and deduplicated.
    pub spouses: Vec<NodeId>,
    /// Generation number (1 = founding generation), `None` until assigned.
    pub generation: Option<u32>,
}

impl Node {
    pub fn new(member: Member) -> Self {
        Self {
            member,
            spouses: Vec::new(),
            generation: None,
        }
    }

    /// The member identifier.
    #[inline]
    pub fn id(&self) -> &str {
        &self.member.id
    }

    /// Add a spouse, keeping the list sorted and free of duplicates.
    pub fn add_spouse(&mut self, spouse: NodeId) {
        if let Err(pos) = self.spouses.binary_search(&spouse) {
            self.spouses.insert(pos, spouse);
        }
    }
}
