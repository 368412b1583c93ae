//! Pha He - lineage hierarchy engine
//!
//! Turns loosely-consistent genealogy records (people with optional father,
//! mother, legacy parent, spouse and children references) into a well-formed
//! multi-generation hierarchy: roots, generation numbers, one nested tree per
//! root, a generation index, and layout coordinates for visualization. It is
//! compiled to WebAssembly and exposes a JavaScript-friendly API via
//! wasm-bindgen, and can be used as a plain Rust library.
//!
//! # Architecture
//!
//! - `member`: input records and their sort orders
//! - `graph`: family graph on petgraph's StableGraph, and its builder
//! - `hierarchy`: cycle repair, roots, generations, tree assembly
//! - `layout`: generation-row layout with linear or radial coordinates
//! - `spatial`: R-tree index over laid-out members for hit testing
//! - `serialize`: externally consumed result shape
//! - `engine`: the whole pipeline behind one call

use js_sys::Float32Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod graph;
pub mod hierarchy;
pub mod layout;
pub mod member;
pub mod serialize;
pub mod spatial;

pub use config::{EngineConfig, NameOrder};
pub use diagnostics::{Diagnostic, Diagnostics, RelationField};
pub use engine::{HierarchyEngine, HierarchyOutput, build_hierarchy};
pub use error::{HierarchyError, Result};
pub use member::{Gender, Member};
pub use serialize::HierarchyResult;

use spatial::SpatialIndex;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    #[cfg(target_arch = "wasm32")]
    tracing_wasm::set_as_global_default();
}

/// A built lineage held on the Rust side for a view.
///
/// `build` replaces the current hierarchy; the query methods read the last
/// one built.
#[wasm_bindgen]
pub struct LineageView {
    engine: HierarchyEngine,
    output: Option<HierarchyOutput>,
    spatial: SpatialIndex,
}

#[wasm_bindgen]
impl LineageView {
    /// Create a view. `config` is an optional engine configuration object
    /// (camelCase keys); `undefined` or `null` means defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> std::result::Result<LineageView, JsError> {
        let config = if config.is_undefined() || config.is_null() {
            EngineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(Self::with_config(config))
    }

    /// Build from an array of member records and return the result object.
    pub fn build(
        &mut self,
        family_tree_id: &str,
        members: JsValue,
    ) -> std::result::Result<JsValue, JsError> {
        let members: Vec<Member> = serde_wasm_bindgen::from_value(members)?;
        let result = self.load(family_tree_id, members)?.to_result();
        Ok(result.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
    }

    /// Build from a JSON array of member records and return the result as
    /// JSON.
    #[wasm_bindgen(js_name = buildFromJson)]
    pub fn build_from_json(
        &mut self,
        family_tree_id: &str,
        json: &str,
    ) -> std::result::Result<String, JsError> {
        let members: Vec<Member> = serde_json::from_str(json).map_err(HierarchyError::from)?;
        Ok(self.load(family_tree_id, members)?.to_result().to_json()?)
    }

    #[wasm_bindgen(js_name = memberCount)]
    pub fn member_count(&self) -> u32 {
        self.output
            .as_ref()
            .map_or(0, |output| output.graph().node_count() as u32)
    }

    /// Root identifiers in display order.
    #[wasm_bindgen(js_name = rootIds)]
    pub fn root_ids(&self) -> Vec<String> {
        let Some(output) = &self.output else {
            return Vec::new();
        };
        output
            .lineage()
            .roots
            .iter()
            .map(|&root| output.graph().member_id(root).to_string())
            .collect()
    }

    /// Target positions [x0, y0, x1, y1, ...] in layout node order.
    pub fn positions(&self) -> Float32Array {
        Float32Array::from(&self.interleaved_positions()[..])
    }

    /// Identifier of the member nearest to (x, y), if within `max_distance`.
    #[wasm_bindgen(js_name = memberAt)]
    pub fn member_at(&self, x: f32, y: f32, max_distance: f32) -> Option<String> {
        let output = self.output.as_ref()?;
        let node = self.spatial.nearest_within(x, y, max_distance)?;
        Some(output.graph().member_id(node).to_string())
    }

    /// Identifiers of the members inside a rectangle.
    #[wasm_bindgen(js_name = membersInRect)]
    pub fn members_in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<String> {
        let Some(output) = &self.output else {
            return Vec::new();
        };
        self.spatial
            .in_rect(min_x, min_y, max_x, max_y)
            .into_iter()
            .map(|node| output.graph().member_id(node).to_string())
            .collect()
    }

    /// Diagnostics of the last build as an array of tagged objects.
    pub fn diagnostics(&self) -> std::result::Result<JsValue, JsError> {
        let diagnostics = self.output.as_ref().map_or(&[][..], HierarchyOutput::diagnostics);
        Ok(diagnostics.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
    }
}

impl LineageView {
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            engine: HierarchyEngine::new(config),
            output: None,
            spatial: SpatialIndex::default(),
        }
    }

    /// Build and keep a hierarchy, replacing the previous one.
    pub fn load(&mut self, family_tree_id: &str, members: Vec<Member>) -> Result<&HierarchyOutput> {
        let output = self.engine.build(family_tree_id, members)?;
        self.spatial = output.layout().spatial_index();
        let output: &HierarchyOutput = self.output.insert(output);
        Ok(output)
    }

    pub fn output(&self) -> Option<&HierarchyOutput> {
        self.output.as_ref()
    }

    fn interleaved_positions(&self) -> Vec<f32> {
        self.output
            .as_ref()
            .map(|output| output.layout().interleaved_positions())
            .unwrap_or_default()
    }
}

impl Default for LineageView {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}
