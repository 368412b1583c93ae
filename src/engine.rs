//! Hierarchy construction pipeline.
//!
//! `(familyTreeId, members) -> HierarchyResult`: graph building, cycle
//! repair, root resolution, generation assignment, assembly and layout, run
//! synchronously in one pass. Each build owns its graph, so builds for
//! different trees can run concurrently without coordination.

use crate::config::EngineConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::Result;
use crate::graph::{FamilyGraph, GraphBuilder};
use crate::hierarchy::{
    HierarchyAssembler, Lineage, RepairedEdge, assign_generations, break_cycles, resolve_roots,
};
use crate::layout::{LayoutGraph, LayoutPositioner};
use crate::member::Member;
use crate::serialize::{HierarchyResult, ResultWriter};

/// Entry point for building lineage hierarchies.
#[derive(Debug, Clone, Default)]
pub struct HierarchyEngine {
    config: EngineConfig,
}

impl HierarchyEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build the hierarchy of one family tree.
    ///
    /// Fails only on malformed records; every other irregularity is repaired
    /// and reported through [`HierarchyOutput::diagnostics`].
    pub fn build(&self, family_tree_id: &str, members: Vec<Member>) -> Result<HierarchyOutput> {
        let span = tracing::info_span!(
            "build_hierarchy",
            family_tree = family_tree_id,
            members = members.len()
        );
        let _guard = span.enter();

        let mut diagnostics = Diagnostics::new(family_tree_id);
        let mut graph = GraphBuilder::new(family_tree_id, &self.config).build(members, &mut diagnostics)?;
        let repaired = break_cycles(&mut graph, &mut diagnostics);

        let mut roots = resolve_roots(&graph);
        tracing::debug!(roots = roots.len(), "roots resolved");
        let promoted = assign_generations(&mut graph, &roots, &mut diagnostics);
        roots.extend(promoted);

        let lineage =
            HierarchyAssembler::new(&graph, self.config.name_order).assemble(&roots, &mut diagnostics);
        let layout = LayoutPositioner::new(&graph, &lineage, &self.config.layout).compute();

        tracing::info!(
            nodes = graph.node_count(),
            roots = lineage.roots.len(),
            generations = lineage.generations.len(),
            repaired = repaired.len(),
            diagnostics = diagnostics.len(),
            "lineage hierarchy built"
        );

        Ok(HierarchyOutput {
            graph,
            lineage,
            layout,
            repaired,
            diagnostics: diagnostics.into_vec(),
        })
    }

    /// Build from a JSON array of member records.
    pub fn build_from_json(&self, family_tree_id: &str, json: &str) -> Result<HierarchyResult> {
        let members: Vec<Member> = serde_json::from_str(json)?;
        Ok(self.build(family_tree_id, members)?.to_result())
    }
}

/// Everything a build produced, before serialization.
#[derive(Debug, Clone)]
pub struct HierarchyOutput {
    graph: FamilyGraph,
    lineage: Lineage,
    layout: LayoutGraph,
    repaired: Vec<RepairedEdge>,
    diagnostics: Vec<Diagnostic>,
}

impl HierarchyOutput {
    pub fn graph(&self) -> &FamilyGraph {
        &self.graph
    }

    pub fn lineage(&self) -> &Lineage {
        &self.lineage
    }

    pub fn layout(&self) -> &LayoutGraph {
        &self.layout
    }

    /// Parent→child edges removed to break cycles.
    pub fn repaired_edges(&self) -> &[RepairedEdge] {
        &self.repaired
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Map to the externally consumed result shape.
    pub fn to_result(&self) -> HierarchyResult {
        ResultWriter::new(&self.graph, &self.lineage, &self.layout).write(&self.diagnostics)
    }
}

/// Build one family tree with the default configuration.
pub fn build_hierarchy(family_tree_id: &str, members: Vec<Member>) -> Result<HierarchyResult> {
    Ok(HierarchyEngine::with_defaults()
        .build(family_tree_id, members)?
        .to_result())
}
