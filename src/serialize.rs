//! Externally consumed result shape.
//!
//! Maps the engine-internal graph, lineage and layout to plain camelCase
//! records: nested trees, generation buckets, layout nodes and typed edges.
//! Members are referenced by their input identifiers, never by arena index.

use serde::Serialize;

use crate::diagnostics::Diagnostic;
use crate::error::Result;
use crate::graph::{EdgeKind, FamilyGraph, NodeId};
use crate::hierarchy::{Lineage, LineageTree};
use crate::layout::LayoutGraph;
use crate::member::Gender;

/// Flat per-member record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub id: String,
    pub name: String,
    pub gender: Gender,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
    pub alive: bool,
    pub generation: u32,
    pub row: u32,
    pub column: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A member with its nested children.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyTree {
    #[serde(flatten)]
    pub member: MemberSummary,
    pub spouses: Vec<String>,
    pub children: Vec<HierarchyTree>,
    /// Children nested under another parent.
    pub child_refs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationListing {
    pub generation: u32,
    pub members: Vec<MemberSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNodeListing {
    pub id: String,
    pub row: u32,
    pub column: u32,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutEdgeListing {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutListing {
    pub nodes: Vec<LayoutNodeListing>,
    pub edges: Vec<LayoutEdgeListing>,
}

/// Complete result for one family tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyResult {
    pub family_tree_id: String,
    pub roots: Vec<HierarchyTree>,
    pub generations: Vec<GenerationListing>,
    pub layout: LayoutListing,
    pub diagnostics: Vec<Diagnostic>,
}

impl HierarchyResult {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Builds a [`HierarchyResult`] from the assembled pipeline state.
pub struct ResultWriter<'a> {
    graph: &'a FamilyGraph,
    lineage: &'a Lineage,
    layout: &'a LayoutGraph,
}

impl<'a> ResultWriter<'a> {
    pub fn new(graph: &'a FamilyGraph, lineage: &'a Lineage, layout: &'a LayoutGraph) -> Self {
        Self {
            graph,
            lineage,
            layout,
        }
    }

    pub fn write(&self, diagnostics: &[Diagnostic]) -> HierarchyResult {
        HierarchyResult {
            family_tree_id: self.graph.family_tree_id().to_string(),
            roots: self.lineage.trees.iter().map(|tree| self.tree(tree)).collect(),
            generations: self
                .lineage
                .generations
                .iter()
                .map(|bucket| GenerationListing {
                    generation: bucket.generation,
                    members: bucket.members.iter().map(|&id| self.summary(id)).collect(),
                })
                .collect(),
            layout: self.layout_listing(),
            diagnostics: diagnostics.to_vec(),
        }
    }

    fn id(&self, node: NodeId) -> String {
        self.graph.member_id(node).to_string()
    }

    fn summary(&self, node: NodeId) -> MemberSummary {
        let member = self.graph.member(node);
        let (row, column) = self
            .layout
            .position(node)
            .map_or((0, 0), |placed| (placed.row, placed.column));
        MemberSummary {
            id: member.id.clone(),
            name: member.full_name.clone(),
            gender: member.gender,
            birth_year: member.birth(),
            death_year: member.death(),
            alive: member.is_alive(),
            generation: self.graph.generation(node).unwrap_or(0),
            row,
            column,
            image: member.image.clone(),
        }
    }

    fn tree(&self, tree: &LineageTree) -> HierarchyTree {
        HierarchyTree {
            member: self.summary(tree.node),
            spouses: self
                .graph
                .spouses(tree.node)
                .iter()
                .map(|&spouse| self.id(spouse))
                .collect(),
            children: tree.children.iter().map(|child| self.tree(child)).collect(),
            child_refs: tree.child_refs.iter().map(|&child| self.id(child)).collect(),
        }
    }

    fn layout_listing(&self) -> LayoutListing {
        LayoutListing {
            nodes: self
                .layout
                .nodes()
                .iter()
                .map(|node| LayoutNodeListing {
                    id: self.id(node.node),
                    row: node.row,
                    column: node.column,
                    x: node.x,
                    y: node.y,
                })
                .collect(),
            edges: self
                .layout
                .edges()
                .iter()
                .map(|edge| LayoutEdgeListing {
                    from: self.id(edge.from),
                    to: self.id(edge.to),
                    kind: edge.kind,
                })
                .collect(),
        }
    }
}
