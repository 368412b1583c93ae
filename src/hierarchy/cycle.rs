//! Cycle guard for the parent→child relation.
//!
//! A depth-first traversal tracks the active path; an edge into a node on
//! that path closes a cycle. Of the edges forming the cycle, the weakest one
//! (lowest link precedence, then most recently recorded) is removed and the
//! search restarts, until the relation is a DAG.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::graph::{FamilyGraph, NodeId, ParentLink};

/// A parent→child edge removed to break a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairedEdge {
    pub parent: NodeId,
    pub child: NodeId,
    pub link: ParentLink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    Active,
    Done,
}

struct Frame {
    node: NodeId,
    children: Vec<NodeId>,
    next: usize,
}

/// Remove parent→child edges until the graph is acyclic.
///
/// Returns the removed edges in removal order; each is also recorded as a
/// [`Diagnostic::CycleDetected`].
pub fn break_cycles(graph: &mut FamilyGraph, diagnostics: &mut Diagnostics) -> Vec<RepairedEdge> {
    let mut repaired = Vec::new();

    while let Some(cycle) = find_cycle(graph) {
        let weakest = cycle
            .iter()
            .filter_map(|&(parent, child)| {
                graph.link(parent, child).map(|link| RepairedEdge { parent, child, link })
            })
            .min_by(|a, b| a.link.removal_cmp(&b.link));

        let Some(edge) = weakest else { break };
        graph.remove_link(edge.parent, edge.child);
        diagnostics.record(Diagnostic::CycleDetected {
            parent: graph.member_id(edge.parent).to_string(),
            child: graph.member_id(edge.child).to_string(),
            link: edge.link.kind,
        });
        repaired.push(edge);
    }

    if !repaired.is_empty() {
        tracing::debug!(
            family_tree = graph.family_tree_id(),
            removed = repaired.len(),
            "parent-child cycles repaired"
        );
    }
    repaired
}

/// Find one cycle, returned as its `(parent, child)` edges in path order.
///
/// Nodes and children are visited in arena order, so the same graph always
/// yields the same cycle.
fn find_cycle(graph: &FamilyGraph) -> Option<Vec<(NodeId, NodeId)>> {
    let mut state = vec![Visit::New; graph.node_count()];

    for start in graph.node_ids() {
        if state[start.index()] != Visit::New {
            continue;
        }
        state[start.index()] = Visit::Active;
        let mut stack = vec![Frame {
            node: start,
            children: graph.children(start),
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let node = frame.node;
            let Some(&child) = frame.children.get(frame.next) else {
                state[node.index()] = Visit::Done;
                stack.pop();
                continue;
            };
            frame.next += 1;

            match state[child.index()] {
                Visit::New => {
                    state[child.index()] = Visit::Active;
                    stack.push(Frame {
                        node: child,
                        children: graph.children(child),
                        next: 0,
                    });
                }
                Visit::Active => {
                    let start = stack.iter().position(|f| f.node == child)?;
                    let mut edges: Vec<_> = stack[start..]
                        .windows(2)
                        .map(|pair| (pair[0].node, pair[1].node))
                        .collect();
                    edges.push((node, child));
                    return Some(edges);
                }
                Visit::Done => {}
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::LinkKind;
    use crate::member::Member;

    fn graph_of(ids: &[&str]) -> FamilyGraph {
        let mut graph = FamilyGraph::new("tree");
        for id in ids {
            graph.add_member(Member::new(*id, *id));
        }
        graph
    }

    #[test]
    fn test_acyclic_graph_untouched() {
        let mut graph = graph_of(&["a", "b", "c"]);
        graph.link_parent(NodeId(0), NodeId(1), LinkKind::Father);
        graph.link_parent(NodeId(0), NodeId(2), LinkKind::Father);
        graph.link_parent(NodeId(1), NodeId(2), LinkKind::Mother);

        let mut diagnostics = Diagnostics::new("tree");
        assert!(break_cycles(&mut graph, &mut diagnostics).is_empty());
        assert_eq!(graph.edge_count(), 3);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_two_cycle_removes_later_link() {
        let mut graph = graph_of(&["d", "e"]);
        let (d, e) = (NodeId(0), NodeId(1));
        // d.fatherId = e, then e.fatherId = d
        graph.link_parent(e, d, LinkKind::Father);
        graph.link_parent(d, e, LinkKind::Father);

        let mut diagnostics = Diagnostics::new("tree");
        let repaired = break_cycles(&mut graph, &mut diagnostics);
        assert_eq!(repaired.len(), 1);
        assert_eq!((repaired[0].parent, repaired[0].child), (d, e));
        assert!(graph.is_acyclic());
        assert_eq!(graph.parents(d), vec![e]);
        assert!(graph.parents(e).is_empty());
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_weaker_link_removed_first() {
        let mut graph = graph_of(&["a", "b", "c"]);
        let (a, b, c) = (NodeId(0), NodeId(1), NodeId(2));
        graph.link_parent(a, b, LinkKind::Father);
        graph.link_parent(b, c, LinkKind::Parent);
        graph.link_parent(c, a, LinkKind::Mother);

        let mut diagnostics = Diagnostics::new("tree");
        let repaired = break_cycles(&mut graph, &mut diagnostics);
        assert_eq!(repaired.len(), 1);
        assert_eq!(repaired[0].link.kind, LinkKind::Parent);
        assert!(graph.has_link(a, b));
        assert!(graph.has_link(c, a));
    }

    #[test]
    fn test_overlapping_cycles() {
        let mut graph = graph_of(&["a", "b", "c", "d"]);
        let (a, b, c, d) = (NodeId(0), NodeId(1), NodeId(2), NodeId(3));
        graph.link_parent(a, b, LinkKind::Father);
        graph.link_parent(b, c, LinkKind::Father);
        graph.link_parent(c, a, LinkKind::ChildList);
        graph.link_parent(c, d, LinkKind::Father);
        graph.link_parent(d, b, LinkKind::ChildList);

        let mut diagnostics = Diagnostics::new("tree");
        let repaired = break_cycles(&mut graph, &mut diagnostics);
        assert_eq!(repaired.len(), 2);
        assert!(repaired.iter().all(|e| e.link.kind == LinkKind::ChildList));
        assert!(graph.is_acyclic());
        assert_eq!(graph.edge_count(), 3);
    }
}
