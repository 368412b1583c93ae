//! Hierarchy assembly.
//!
//! Builds one nested tree per root and the generation index. Every node is
//! nested exactly once: a node with two parents is attached under a single
//! owning parent and listed by identifier in the other parent's `child_refs`.
//!
//! The owner is the parent with the smallest key
//! `(married_in, path_length, root_rank)`:
//! - `married_in`: a parentless parent whose spouse has recorded parents
//!   loses against the blood-line parent,
//! - `path_length`: hops from the parent's own root,
//! - `root_rank`: position of that root in the root ordering.
//!
//! When the parents sit under different roots the attachment is reported as
//! ambiguous, unless the other parent is a parentless spouse of the owner.

use std::collections::BTreeMap;

use crate::config::NameOrder;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::graph::{FamilyGraph, NodeId};
use crate::member::{cmp_by_birth, cmp_by_name};

/// A root or member with its nested children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageTree {
    pub node: NodeId,
    /// Children owned by this node, oldest first.
    pub children: Vec<LineageTree>,
    /// Children nested under another parent.
    pub child_refs: Vec<NodeId>,
}

impl LineageTree {
    /// Number of nodes in this subtree.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(LineageTree::len).sum::<usize>()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Visit every node in pre-order.
    pub fn walk(&self, visit: &mut impl FnMut(&LineageTree)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Members of one generation in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationBucket {
    pub generation: u32,
    pub members: Vec<NodeId>,
}

/// Assembled hierarchy of one family tree.
#[derive(Debug, Clone)]
pub struct Lineage {
    /// Roots in display order.
    pub roots: Vec<NodeId>,
    /// One tree per root, parallel to `roots`.
    pub trees: Vec<LineageTree>,
    /// Generation index, ascending.
    pub generations: Vec<GenerationBucket>,
    owner: Vec<Option<NodeId>>,
    root_of: Vec<NodeId>,
}

impl Lineage {
    /// Parent under which a node is nested (`None` for roots).
    pub fn owner(&self, id: NodeId) -> Option<NodeId> {
        self.owner[id.index()]
    }

    /// Root of the tree a node is nested in.
    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.root_of[id.index()]
    }

    /// Total number of nested nodes across all trees.
    pub fn node_count(&self) -> usize {
        self.trees.iter().map(LineageTree::len).sum()
    }
}

/// Placement facts gathered in topological (generation) order.
struct Placement {
    owner: Vec<Option<NodeId>>,
    root_of: Vec<NodeId>,
    depth: Vec<u32>,
}

pub struct HierarchyAssembler<'a> {
    graph: &'a FamilyGraph,
    name_order: NameOrder,
}

impl<'a> HierarchyAssembler<'a> {
    pub fn new(graph: &'a FamilyGraph, name_order: NameOrder) -> Self {
        Self { graph, name_order }
    }

    /// Assemble trees and the generation index. Every node must already
    /// carry a generation.
    pub fn assemble(&self, roots: &[NodeId], diagnostics: &mut Diagnostics) -> Lineage {
        let placement = self.place(roots, diagnostics);
        let trees = roots
            .iter()
            .map(|&root| self.subtree(root, &placement.owner))
            .collect();

        Lineage {
            roots: roots.to_vec(),
            trees,
            generations: self.generation_index(),
            owner: placement.owner,
            root_of: placement.root_of,
        }
    }

    fn generation_of(&self, id: NodeId) -> u32 {
        self.graph.generation(id).unwrap_or(0)
    }

    fn is_married_in(&self, id: NodeId) -> bool {
        self.graph.parent_count(id) == 0
            && self
                .graph
                .spouses(id)
                .iter()
                .any(|&spouse| self.graph.parent_count(spouse) > 0)
    }

    /// A parentless spouse of `owner`: a root of its own that only joins the
    /// lineage through marriage.
    fn is_married_in_spouse(&self, parent: NodeId, owner: NodeId) -> bool {
        self.graph.parent_count(parent) == 0 && self.graph.spouses(owner).contains(&parent)
    }

    fn place(&self, roots: &[NodeId], diagnostics: &mut Diagnostics) -> Placement {
        let count = self.graph.node_count();
        let mut root_rank = vec![usize::MAX; count];
        for (rank, &root) in roots.iter().enumerate() {
            root_rank[root.index()] = rank;
        }

        let mut placement = Placement {
            owner: vec![None; count],
            root_of: self.graph.node_ids().collect(),
            depth: vec![0; count],
        };

        // Parents always have a smaller generation than their children, so
        // this order visits every parent before its children.
        let mut order: Vec<NodeId> = self.graph.node_ids().collect();
        order.sort_by_key(|&id| (self.generation_of(id), id));

        for id in order {
            if root_rank[id.index()] != usize::MAX {
                continue;
            }
            let parents = self.graph.parents(id);
            let Some(&owner) = parents.iter().min_by_key(|&&parent| {
                (
                    self.is_married_in(parent),
                    placement.depth[parent.index()],
                    root_rank[placement.root_of[parent.index()].index()],
                    parent,
                )
            }) else {
                continue;
            };

            let root = placement.root_of[owner.index()];
            placement.owner[id.index()] = Some(owner);
            placement.root_of[id.index()] = root;
            placement.depth[id.index()] = placement.depth[owner.index()] + 1;

            let others: Vec<NodeId> = parents
                .iter()
                .copied()
                .filter(|&parent| {
                    parent != owner
                        && placement.root_of[parent.index()] != root
                        && !self.is_married_in_spouse(parent, owner)
                })
                .collect();
            if !others.is_empty() {
                diagnostics.record(Diagnostic::AmbiguousAttachment {
                    member: self.graph.member_id(id).to_string(),
                    attached_under: self.graph.member_id(owner).to_string(),
                    root: self.graph.member_id(root).to_string(),
                    also_child_of: others
                        .iter()
                        .map(|&p| self.graph.member_id(p).to_string())
                        .collect(),
                });
            }
        }

        placement
    }

    fn subtree(&self, id: NodeId, owner: &[Option<NodeId>]) -> LineageTree {
        let mut children = self.graph.children(id);
        children.sort_by(|&a, &b| cmp_by_birth(self.graph.member(a), self.graph.member(b)));

        let (owned, refs): (Vec<NodeId>, Vec<NodeId>) = children
            .into_iter()
            .partition(|&child| owner[child.index()] == Some(id));

        LineageTree {
            node: id,
            children: owned
                .into_iter()
                .map(|child| self.subtree(child, owner))
                .collect(),
            child_refs: refs,
        }
    }

    fn generation_index(&self) -> Vec<GenerationBucket> {
        let mut buckets: BTreeMap<u32, Vec<NodeId>> = BTreeMap::new();
        for id in self.graph.node_ids() {
            buckets.entry(self.generation_of(id)).or_default().push(id);
        }

        buckets
            .into_iter()
            .map(|(generation, mut members)| {
                members.sort_by(|&a, &b| {
                    cmp_by_name(self.graph.member(a), self.graph.member(b), self.name_order)
                });
                GenerationBucket {
                    generation,
                    members,
                }
            })
            .collect()
    }
}
