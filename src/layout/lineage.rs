//! Generation-row lineage layout.
//!
//! A simplified tidy tree on integer slots. Rows are generations; columns
//! come from an in-order walk over every root's nested tree:
//!
//! 1. **Leaves** take the next unused column.
//! 2. **Parents** sit at the midpoint of their first and last child's
//!    columns, after their subtrees have been placed.
//! 3. **Married-in spouses** (roots with a spouse on the same row) are
//!    carried along as a unit with their partner and take the adjacent
//!    columns on the same row. Their own nested subtrees are laid out right
//!    after the partner's.
//!
//! Sibling subtrees occupy disjoint column ranges and every node of a subtree
//! lies on a deeper row than its head, which makes the placement
//! collision-free. The (row, column) grid is then transformed into target
//! coordinates, linear or radial.

use crate::graph::{EdgeKind, FamilyGraph, NodeId};
use crate::hierarchy::{Lineage, LineageTree};
use crate::spatial::SpatialIndex;

use super::{CoordinateMode, LayoutConfig};

/// Placement of one member.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutNode {
    pub node: NodeId,
    /// Generation.
    pub row: u32,
    /// Integer position within the row.
    pub column: u32,
    /// Target X coordinate.
    pub x: f32,
    /// Target Y coordinate.
    pub y: f32,
}

/// A rendered relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: EdgeKind,
}

/// Result of the lineage layout.
#[derive(Debug, Clone, Default)]
pub struct LayoutGraph {
    /// Placements sorted by (row, column).
    nodes: Vec<LayoutNode>,
    /// Parent→child edges, then spouse edges.
    edges: Vec<LayoutEdge>,
    /// Node slot → index into `nodes`.
    slots: Vec<Option<usize>>,
    column_count: u32,
}

impl LayoutGraph {
    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[LayoutEdge] {
        &self.edges
    }

    /// Placement of one node.
    pub fn position(&self, id: NodeId) -> Option<&LayoutNode> {
        let index = (*self.slots.get(id.index())?)?;
        self.nodes.get(index)
    }

    /// Number of columns used across all rows.
    pub fn column_count(&self) -> u32 {
        self.column_count
    }

    /// Deepest row.
    pub fn row_count(&self) -> u32 {
        self.nodes.iter().map(|n| n.row).max().unwrap_or(0)
    }

    /// Target positions interleaved as [x0, y0, x1, y1, ...] in node order.
    pub fn interleaved_positions(&self) -> Vec<f32> {
        let mut positions = Vec::with_capacity(self.nodes.len() * 2);
        for node in &self.nodes {
            positions.push(node.x);
            positions.push(node.y);
        }
        positions
    }

    /// Spatial index over the target coordinates, for hit testing.
    pub fn spatial_index(&self) -> SpatialIndex {
        let points: Vec<_> = self.nodes.iter().map(|n| (n.node, n.x, n.y)).collect();
        SpatialIndex::from_points(&points)
    }
}

/// Slot assignment state for one layout pass.
struct Slots {
    column: Vec<Option<u32>>,
    next: u32,
}

/// Computes the lineage layout of an assembled hierarchy.
pub struct LayoutPositioner<'a> {
    graph: &'a FamilyGraph,
    lineage: &'a Lineage,
    config: &'a LayoutConfig,
}

impl<'a> LayoutPositioner<'a> {
    pub fn new(graph: &'a FamilyGraph, lineage: &'a Lineage, config: &'a LayoutConfig) -> Self {
        Self {
            graph,
            lineage,
            config,
        }
    }

    /// Compute the layout.
    pub fn compute(&self) -> LayoutGraph {
        let count = self.graph.node_count();
        let companions = self.companions();
        let mut carried = vec![false; count];
        for member in companions.iter().flatten() {
            carried[member.node.index()] = true;
        }

        let mut slots = Slots {
            column: vec![None; count],
            next: 0,
        };
        let lineage: &'a Lineage = self.lineage;
        for tree in &lineage.trees {
            if !carried[tree.node.index()] {
                self.place(tree, &companions, &mut slots);
            }
        }

        let mut nodes: Vec<LayoutNode> = self
            .graph
            .node_ids()
            .filter_map(|id| {
                let column = slots.column[id.index()]?;
                Some(LayoutNode {
                    node: id,
                    row: self.graph.generation(id).unwrap_or(1),
                    column,
                    x: 0.0,
                    y: 0.0,
                })
            })
            .collect();
        nodes.sort_by_key(|n| (n.row, n.column));
        self.apply_coordinates(&mut nodes, slots.next);

        let mut slot_index = vec![None; count];
        for (index, node) in nodes.iter().enumerate() {
            slot_index[node.node.index()] = Some(index);
        }

        LayoutGraph {
            nodes,
            edges: self.edges(),
            slots: slot_index,
            column_count: slots.next,
        }
    }

    /// For every node, the married-in roots placed right after it.
    ///
    /// A root qualifies when it has a spouse on the same generation that is
    /// either not a root or precedes it in root order. An anchoring that would
    /// make a root (transitively) carry itself is skipped, so every root is
    /// placed exactly once.
    fn companions(&self) -> Vec<Vec<&'a LineageTree>> {
        let count = self.graph.node_count();
        let mut rank = vec![usize::MAX; count];
        for (index, tree) in self.lineage.trees.iter().enumerate() {
            rank[tree.node.index()] = index;
        }

        let mut companions = vec![Vec::new(); count];
        let mut anchor_of: Vec<Option<NodeId>> = vec![None; count];
        let lineage: &'a Lineage = self.lineage;
        for tree in &lineage.trees {
            let root = tree.node;
            let generation = self.graph.generation(root);
            let anchor = self
                .graph
                .spouses(root)
                .iter()
                .copied()
                .filter(|&spouse| self.graph.generation(spouse) == generation)
                .filter(|&spouse| {
                    let spouse_rank = rank[spouse.index()];
                    spouse_rank == usize::MAX || spouse_rank < rank[root.index()]
                })
                .min_by_key(|&spouse| (rank[spouse.index()] != usize::MAX, spouse));
            let Some(anchor) = anchor else { continue };
            if self.carried_by(anchor, root, &anchor_of) {
                continue;
            }
            anchor_of[root.index()] = Some(anchor);
            companions[anchor.index()].push(tree);
        }
        companions
    }

    /// Whether placing `node` depends on placing `root` first, following the
    /// accepted anchors from the root of `node`'s tree upward.
    fn carried_by(&self, node: NodeId, root: NodeId, anchor_of: &[Option<NodeId>]) -> bool {
        let mut current = self.lineage.root_of(node);
        for _ in 0..=anchor_of.len() {
            if current == root {
                return true;
            }
            match anchor_of[current.index()] {
                Some(anchor) => current = self.lineage.root_of(anchor),
                None => return false,
            }
        }
        true
    }

    /// A tree followed by its companions, transitively.
    fn unit(
        &self,
        tree: &'a LineageTree,
        companions: &[Vec<&'a LineageTree>],
    ) -> Vec<&'a LineageTree> {
        let mut unit = vec![tree];
        let mut i = 0;
        while i < unit.len() {
            let next = &companions[unit[i].node.index()];
            unit.extend_from_slice(next);
            i += 1;
        }
        unit
    }

    /// Place a subtree. Returns `(column, lo, hi)`: the head's column and the
    /// column range used by the whole subtree, companions included.
    fn place(
        &self,
        tree: &'a LineageTree,
        companions: &[Vec<&'a LineageTree>],
        slots: &mut Slots,
    ) -> (u32, u32, u32) {
        let unit = self.unit(tree, companions);
        let width = unit.len() as u32;

        let (column, mut lo, mut hi) = match self.place_children(tree, companions, slots) {
            Some((first, last, lo, hi)) => {
                let column = (first + last) / 2;
                (column, lo.min(column), hi.max(column + width - 1))
            }
            None => {
                let column = slots.next;
                (column, column, column + width - 1)
            }
        };

        // Companion subtrees sit on deeper rows, right after the head's range
        slots.next = slots.next.max(column + 1);
        for &companion in &unit[1..] {
            if let Some((_, _, sub_lo, sub_hi)) = self.place_children(companion, companions, slots) {
                lo = lo.min(sub_lo);
                hi = hi.max(sub_hi);
            }
        }

        for (offset, member) in unit.iter().enumerate() {
            slots.column[member.node.index()] = Some(column + offset as u32);
        }
        slots.next = slots.next.max(hi + 1);
        (column, lo, hi)
    }

    /// Place the nested children of `tree`. Returns the first and last child
    /// columns and the range they use.
    fn place_children(
        &self,
        tree: &'a LineageTree,
        companions: &[Vec<&'a LineageTree>],
        slots: &mut Slots,
    ) -> Option<(u32, u32, u32, u32)> {
        let placed: Vec<(u32, u32, u32)> = tree
            .children
            .iter()
            .map(|child| self.place(child, companions, slots))
            .collect();
        let &(first, lo, _) = placed.first()?;
        let &(last, _, hi) = placed.last()?;
        Some((first, last, lo, hi))
    }

    fn apply_coordinates(&self, nodes: &mut [LayoutNode], column_count: u32) {
        if column_count == 0 {
            return;
        }
        match self.config.coordinate_mode {
            CoordinateMode::Linear => {
                // Center horizontally around 0
                let center = (column_count - 1) as f32 / 2.0;
                for node in nodes.iter_mut() {
                    node.x = (node.column as f32 - center) * self.config.column_spacing;
                    node.y = node.row.saturating_sub(1) as f32 * self.config.row_spacing;
                }
            }
            CoordinateMode::Radial => {
                // Map columns to the full circle, generations to rings
                let angular_scale = std::f32::consts::TAU / column_count as f32;
                for node in nodes.iter_mut() {
                    let angle = (node.column as f32 + 0.5) * angular_scale;
                    let radius = node.row as f32 * self.config.row_spacing;
                    node.x = radius * angle.cos();
                    node.y = radius * angle.sin();
                }
            }
        }
    }

    fn edges(&self) -> Vec<LayoutEdge> {
        let parent_child = self
            .graph
            .parent_child_pairs()
            .into_iter()
            .map(|(from, to)| LayoutEdge {
                from,
                to,
                kind: EdgeKind::ParentChild,
            });
        let spouse = self
            .graph
            .spouse_pairs()
            .into_iter()
            .map(|(from, to)| LayoutEdge {
                from,
                to,
                kind: EdgeKind::Spouse,
            });
        parent_child.chain(spouse).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::config::EngineConfig;
    use crate::diagnostics::Diagnostics;
    use crate::graph::GraphBuilder;
    use crate::hierarchy::{HierarchyAssembler, assign_generations, break_cycles, resolve_roots};
    use crate::member::Member;

    fn layout_with(members: Vec<Member>, config: LayoutConfig) -> (FamilyGraph, LayoutGraph) {
        let engine_config = EngineConfig::default();
        let mut diagnostics = Diagnostics::new("tree");
        let mut graph = GraphBuilder::new("tree", &engine_config)
            .build(members, &mut diagnostics)
            .unwrap();
        break_cycles(&mut graph, &mut diagnostics);
        let mut roots = resolve_roots(&graph);
        roots.extend(assign_generations(&mut graph, &roots, &mut diagnostics));
        let lineage =
            HierarchyAssembler::new(&graph, engine_config.name_order).assemble(&roots, &mut diagnostics);
        let layout = LayoutPositioner::new(&graph, &lineage, &config).compute();
        (graph, layout)
    }

    fn layout(members: Vec<Member>) -> (FamilyGraph, LayoutGraph) {
        layout_with(members, LayoutConfig::default())
    }

    fn slot(graph: &FamilyGraph, layout: &LayoutGraph, id: &str) -> (u32, u32) {
        let node = layout.position(graph.lookup(id).unwrap()).unwrap();
        (node.row, node.column)
    }

    #[test]
    fn test_parent_centered_over_children() {
        let (graph, layout) = layout(vec![
            Member::new("p", "P"),
            Member::new("a", "A").with_father("p").with_birth_year(1950),
            Member::new("b", "B").with_father("p").with_birth_year(1952),
            Member::new("c", "C").with_father("p").with_birth_year(1954),
        ]);
        assert_eq!(slot(&graph, &layout, "a"), (2, 0));
        assert_eq!(slot(&graph, &layout, "b"), (2, 1));
        assert_eq!(slot(&graph, &layout, "c"), (2, 2));
        assert_eq!(slot(&graph, &layout, "p"), (1, 1));
        assert_eq!(layout.column_count(), 3);
        assert_eq!(layout.row_count(), 2);
    }

    #[test]
    fn test_spouse_adjacent_on_same_row() {
        let (graph, layout) = layout(vec![
            Member::new("a", "A").with_birth_year(1900),
            Member::new("h", "H").with_father("a").with_spouse("i"),
            Member::new("i", "I"),
            Member::new("k", "K").with_father("h").with_mother("i"),
        ]);
        let (h_row, h_col) = slot(&graph, &layout, "h");
        let (i_row, i_col) = slot(&graph, &layout, "i");
        assert_eq!(h_row, i_row);
        assert_eq!(i_col, h_col + 1);
    }

    #[test]
    fn test_spouse_of_leaf_pushes_next_column() {
        let (graph, layout) = layout(vec![
            Member::new("p", "P"),
            Member::new("a", "A").with_father("p").with_birth_year(1950).with_spouse("s"),
            Member::new("b", "B").with_father("p").with_birth_year(1955),
            Member::new("s", "S"),
        ]);
        assert_eq!(slot(&graph, &layout, "a"), (2, 0));
        assert_eq!(slot(&graph, &layout, "s"), (2, 1));
        assert_eq!(slot(&graph, &layout, "b"), (2, 2));
        assert_eq!(slot(&graph, &layout, "p"), (1, 1));
    }

    #[test]
    fn test_married_in_spouse_with_own_children_stays_adjacent() {
        // K only records its mother I, so I owns a subtree of her own.
        let (graph, layout) = layout(vec![
            Member::new("a", "A").with_birth_year(1900),
            Member::new("h", "H").with_father("a").with_spouse("i"),
            Member::new("i", "I"),
            Member::new("k", "K").with_mother("i"),
            Member::new("g", "Giang").with_birth_year(1910),
            Member::new("g1", "G1").with_father("g"),
        ]);
        let (h_row, h_col) = slot(&graph, &layout, "h");
        let (i_row, i_col) = slot(&graph, &layout, "i");
        assert_eq!(h_row, i_row);
        assert_eq!(i_col, h_col + 1);

        let (k_row, k_col) = slot(&graph, &layout, "k");
        assert_eq!((k_row, k_col), (3, i_col));
        let (_, g1_col) = slot(&graph, &layout, "g1");
        assert!(g1_col > i_col, "G1 at column {g1_col} splits the couple");
    }

    #[test]
    fn test_married_founders_with_children_adjacent() {
        let (graph, layout) = layout(vec![
            Member::new("a", "A").with_spouse("b"),
            Member::new("b", "B"),
            Member::new("c", "C").with_father("a").with_birth_year(1950),
            Member::new("d", "D").with_father("a").with_birth_year(1952),
            Member::new("e", "E").with_mother("b"),
        ]);
        let (a_row, a_col) = slot(&graph, &layout, "a");
        let (b_row, b_col) = slot(&graph, &layout, "b");
        assert_eq!(a_row, b_row);
        assert_eq!(b_col, a_col + 1);

        let slots: HashSet<(u32, u32)> = layout.nodes().iter().map(|n| (n.row, n.column)).collect();
        assert_eq!(slots.len(), 5);
    }

    #[test]
    fn test_cross_married_lineages_all_placed() {
        // Each founder marries into the other lineage.
        let (graph, layout) = layout(vec![
            Member::new("p", "P").with_spouse("y"),
            Member::new("x", "X").with_father("p"),
            Member::new("q", "Q").with_spouse("x"),
            Member::new("y", "Y").with_father("q"),
        ]);
        assert_eq!(layout.nodes().len(), graph.node_count());
        let slots: HashSet<(u32, u32)> = layout.nodes().iter().map(|n| (n.row, n.column)).collect();
        assert_eq!(slots.len(), graph.node_count());
    }

    #[test]
    fn test_forest_roots_side_by_side() {
        let (graph, layout) = layout(vec![
            Member::new("r1", "R1").with_birth_year(1800),
            Member::new("c1", "C1").with_father("r1"),
            Member::new("r2", "R2").with_birth_year(1820),
            Member::new("c2", "C2").with_father("r2"),
        ]);
        assert_eq!(slot(&graph, &layout, "r1"), (1, 0));
        assert_eq!(slot(&graph, &layout, "r2"), (1, 1));
    }

    #[test]
    fn test_no_collisions() {
        let (_, layout) = layout(vec![
            Member::new("a", "A"),
            Member::new("b", "B").with_father("a").with_spouse("x"),
            Member::new("x", "X"),
            Member::new("c", "C").with_father("a"),
            Member::new("d", "D").with_father("b").with_mother("x"),
            Member::new("e", "E").with_father("b"),
            Member::new("f", "F").with_father("c").with_spouse("y"),
            Member::new("y", "Y"),
            Member::new("g", "G").with_father("f"),
            Member::new("h", "H").with_father("d"),
        ]);
        let slots: HashSet<(u32, u32)> = layout.nodes().iter().map(|n| (n.row, n.column)).collect();
        assert_eq!(slots.len(), layout.nodes().len());
        assert_eq!(layout.nodes().len(), 10);
    }

    #[test]
    fn test_edges_typed() {
        let (graph, layout) = layout(vec![
            Member::new("a", "A").with_spouse("b"),
            Member::new("b", "B"),
            Member::new("c", "C").with_father("a").with_mother("b"),
        ]);
        let (a, b, c) = (
            graph.lookup("a").unwrap(),
            graph.lookup("b").unwrap(),
            graph.lookup("c").unwrap(),
        );
        assert_eq!(
            layout.edges(),
            &[
                LayoutEdge { from: a, to: c, kind: EdgeKind::ParentChild },
                LayoutEdge { from: b, to: c, kind: EdgeKind::ParentChild },
                LayoutEdge { from: a, to: b, kind: EdgeKind::Spouse },
            ]
        );
    }

    #[test]
    fn test_linear_coordinates() {
        let config = LayoutConfig {
            column_spacing: 100.0,
            row_spacing: 50.0,
            coordinate_mode: CoordinateMode::Linear,
        };
        let (graph, layout) = layout_with(
            vec![
                Member::new("p", "P"),
                Member::new("a", "A").with_father("p").with_birth_year(1),
                Member::new("b", "B").with_father("p").with_birth_year(2),
            ],
            config,
        );
        let p = layout.position(graph.lookup("p").unwrap()).unwrap();
        let a = layout.position(graph.lookup("a").unwrap()).unwrap();
        let b = layout.position(graph.lookup("b").unwrap()).unwrap();
        assert!(p.y.abs() < 0.01);
        assert!((a.y - 50.0).abs() < 0.01);
        assert!((a.x + 50.0).abs() < 0.01, "a.x = {}", a.x);
        assert!((b.x - 50.0).abs() < 0.01, "b.x = {}", b.x);
        assert!((p.x + 50.0).abs() < 0.01, "p sits on column 0, got {}", p.x);
    }

    #[test]
    fn test_radial_rings_by_generation() {
        let config = LayoutConfig {
            column_spacing: 1.0,
            row_spacing: 100.0,
            coordinate_mode: CoordinateMode::Radial,
        };
        let (_, layout) = layout_with(
            vec![
                Member::new("p", "P"),
                Member::new("a", "A").with_father("p"),
                Member::new("b", "B").with_father("p"),
                Member::new("c", "C").with_father("p"),
            ],
            config,
        );
        for node in layout.nodes() {
            let dist = (node.x.powi(2) + node.y.powi(2)).sqrt();
            let expected = node.row as f32 * 100.0;
            assert!(
                (dist - expected).abs() < 0.5,
                "node on row {} should be at radius {expected}, got {dist}",
                node.row
            );
        }
    }

    #[test]
    fn test_empty_layout() {
        let (_, layout) = layout(Vec::new());
        assert!(layout.nodes().is_empty());
        assert_eq!(layout.column_count(), 0);
        assert!(layout.interleaved_positions().is_empty());
    }
}
