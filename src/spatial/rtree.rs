//! R-tree member index using the rstar crate.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::graph::NodeId;

/// A laid-out member position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberPoint {
    pub node: NodeId,
    pub x: f32,
    pub y: f32,
}

impl RTreeObject for MemberPoint {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for MemberPoint {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Static index of member positions.
///
/// Built once per layout with a bulk load; a new layout means a new index.
#[derive(Default)]
pub struct SpatialIndex {
    tree: RTree<MemberPoint>,
}

impl SpatialIndex {
    /// Bulk load from `(node, x, y)` tuples.
    pub fn from_points(points: &[(NodeId, f32, f32)]) -> Self {
        let points = points
            .iter()
            .map(|&(node, x, y)| MemberPoint { node, x, y })
            .collect();
        Self {
            tree: RTree::bulk_load(points),
        }
    }

    /// Member closest to a point.
    pub fn nearest(&self, x: f32, y: f32) -> Option<NodeId> {
        self.tree.nearest_neighbor(&[x, y]).map(|point| point.node)
    }

    /// Member closest to a point, if it is no farther than `max_distance`.
    pub fn nearest_within(&self, x: f32, y: f32, max_distance: f32) -> Option<NodeId> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|point| point.distance_2(&[x, y]) <= max_distance_sq)
            .map(|point| point.node)
    }

    /// Members inside a rectangle, sorted by node.
    pub fn in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<NodeId> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        let mut nodes: Vec<NodeId> = self
            .tree
            .locate_in_envelope(&envelope)
            .map(|point| point.node)
            .collect();
        nodes.sort_unstable();
        nodes
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
