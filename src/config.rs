//! Engine configuration.
//!
//! Configuration is threaded explicitly into every build; there is no global
//! "current family tree" or ambient settings object.

use serde::Deserialize;

use crate::layout::LayoutConfig;

/// Which word of a full name is the family name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NameOrder {
    /// Family name first (Vietnamese order: "Nguyễn Văn An").
    #[default]
    FamilyFirst,
    /// Family name last ("An Nguyen").
    FamilyLast,
}

/// Configuration for a hierarchy build.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// How to derive a family name when a member has no explicit `lastName`.
    pub name_order: NameOrder,
    /// Drop records whose `familyTreeId` names a different tree.
    pub enforce_family_tree: bool,
    /// Layout spacing and coordinate mode.
    pub layout: LayoutConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name_order: NameOrder::FamilyFirst,
            enforce_family_tree: true,
            layout: LayoutConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::CoordinateMode;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"nameOrder":"familyLast","layout":{"coordinateMode":"radial"}}"#)
                .unwrap();
        assert_eq!(config.name_order, NameOrder::FamilyLast);
        assert!(config.enforce_family_tree);
        assert_eq!(config.layout.coordinate_mode, CoordinateMode::Radial);
        assert_eq!(config.layout.row_spacing, LayoutConfig::default().row_spacing);
    }

    #[test]
    fn test_empty_config() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.name_order, NameOrder::FamilyFirst);
        assert_eq!(config.layout.coordinate_mode, CoordinateMode::Linear);
    }
}
