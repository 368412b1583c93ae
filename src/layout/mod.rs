//! Layout algorithms for lineage visualization.
//!
//! This module computes deterministic slot positions (row = generation,
//! column = integer position) for every member and converts them to target
//! coordinates, either top-down or as a radial fan chart. Rendering itself is
//! left to the consuming view.

pub mod lineage;

use serde::Deserialize;

pub use lineage::{LayoutEdge, LayoutGraph, LayoutNode, LayoutPositioner};

/// Coordinate mode for the final layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateMode {
    /// Linear top-down layout: x = column * column_spacing,
    /// y = (row - 1) * row_spacing.
    #[default]
    Linear,
    /// Radial fan chart: angle from the column, radius = row * row_spacing.
    Radial,
}

/// Configuration for the lineage layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Horizontal distance between adjacent columns.
    pub column_spacing: f32,
    /// Vertical (or radial) distance between generations.
    pub row_spacing: f32,
    /// Coordinate output mode.
    pub coordinate_mode: CoordinateMode,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_spacing: 160.0,
            row_spacing: 120.0,
            coordinate_mode: CoordinateMode::Linear,
        }
    }
}
