//! Generation assignment.
//!
//! Multi-source breadth-first propagation seeded with every root at
//! generation 1. A child's generation is the maximum over all of its parents
//! (`parent + 1`), so a node is never placed above the deepest of its
//! ancestor chains. Only strictly greater proposals re-propagate, which on an
//! acyclic graph guarantees termination.
//!
//! Parentless spouses are then aligned with their partner: marriage does not
//! start a new generation.

use std::collections::VecDeque;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::graph::{FamilyGraph, NodeId};

/// Generation of every root.
pub const FIRST_GENERATION: u32 = 1;

/// Assigns generation numbers in place on a family graph.
pub struct GenerationAssigner<'g> {
    graph: &'g mut FamilyGraph,
    queue: VecDeque<NodeId>,
}

impl<'g> GenerationAssigner<'g> {
    pub fn new(graph: &'g mut FamilyGraph) -> Self {
        Self {
            graph,
            queue: VecDeque::new(),
        }
    }

    /// Assign generations to every node.
    ///
    /// Returns nodes that were unreachable from `roots` and had to be
    /// promoted to roots themselves; each is also recorded as a diagnostic.
    pub fn assign(mut self, roots: &[NodeId], diagnostics: &mut Diagnostics) -> Vec<NodeId> {
        for &root in roots {
            self.propose(root, FIRST_GENERATION);
        }
        self.propagate();

        let mut promoted = Vec::new();
        while let Some(orphan) = self.next_orphan() {
            diagnostics.record(Diagnostic::RetroactiveRoot {
                member: self.graph.member_id(orphan).to_string(),
            });
            self.propose(orphan, FIRST_GENERATION);
            self.propagate();
            promoted.push(orphan);
        }

        self.align_spouses();
        promoted
    }

    /// Raise a node to `generation` if that is strictly deeper than its
    /// current one. Returns whether anything changed.
    fn propose(&mut self, id: NodeId, generation: u32) -> bool {
        match self.graph.generation(id) {
            Some(current) if current >= generation => false,
            _ => {
                self.graph.set_generation(id, generation);
                self.queue.push_back(id);
                true
            }
        }
    }

    fn propagate(&mut self) {
        while let Some(id) = self.queue.pop_front() {
            let Some(generation) = self.graph.generation(id) else {
                continue;
            };
            for child in self.graph.children(id) {
                self.propose(child, generation + 1);
            }
        }
    }

    /// An unassigned node with no unassigned parent, walking upward from the
    /// first unassigned node in arena order.
    fn next_orphan(&self) -> Option<NodeId> {
        let mut current = self
            .graph
            .node_ids()
            .find(|&id| self.graph.generation(id).is_none())?;

        for _ in 0..self.graph.node_count() {
            let unassigned_parent = self
                .graph
                .parents(current)
                .into_iter()
                .find(|&p| self.graph.generation(p).is_none());
            match unassigned_parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        Some(current)
    }

    /// Give each parentless node the deepest generation among its spouses.
    ///
    /// Spouses that descend from the node itself are ignored, and the number
    /// of rounds is bounded by the node count so that pathological spouse
    /// chains cannot feed back into each other forever.
    fn align_spouses(&mut self) {
        let parentless: Vec<NodeId> = self
            .graph
            .node_ids()
            .filter(|&id| self.graph.parent_count(id) == 0 && !self.graph.spouses(id).is_empty())
            .collect();
        if parentless.is_empty() {
            return;
        }

        for _ in 0..=self.graph.node_count() {
            let mut changed = false;
            for &id in &parentless {
                let current = self.graph.generation(id).unwrap_or(FIRST_GENERATION);
                let target = self
                    .graph
                    .spouses(id)
                    .iter()
                    .filter_map(|&spouse| {
                        let generation = self.graph.generation(spouse)?;
                        (generation > current && !self.graph.is_descendant(id, spouse))
                            .then_some(generation)
                    })
                    .max();

                if let Some(target) = target {
                    self.propose(id, target);
                    self.propagate();
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }
}

/// Assign generations to every node of `graph`. See [`GenerationAssigner`].
pub fn assign_generations(
    graph: &mut FamilyGraph,
    roots: &[NodeId],
    diagnostics: &mut Diagnostics,
) -> Vec<NodeId> {
    let promoted = GenerationAssigner::new(graph).assign(roots, diagnostics);
    tracing::debug!(
        family_tree = graph.family_tree_id(),
        deepest = graph.node_ids().filter_map(|id| graph.generation(id)).max(),
        promoted = promoted.len(),
        "generations assigned"
    );
    promoted
}
