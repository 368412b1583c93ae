//! Edge types.
//!
//! Parent→child edges carry the kind of source field they were resolved from
//! and the order in which they were recorded. Both matter when a cycle has to
//! be broken: the weakest, most recently recorded link goes first.

use std::cmp::Ordering;

use serde::Serialize;

/// Which record field produced a parent→child link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkKind {
    /// Child's `fatherId`.
    Father,
    /// Child's `motherId`.
    Mother,
    /// Child's legacy `parentId`.
    Parent,
    /// Inferred from the parent's `childrenIds`.
    ChildList,
}

impl LinkKind {
    /// Precedence rank; higher ranks are more explicit data.
    #[inline]
    pub fn precedence(self) -> u8 {
        match self {
            Self::Father | Self::Mother => 3,
            Self::Parent => 2,
            Self::ChildList => 1,
        }
    }
}

/// Weight of a parent→child edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    pub kind: LinkKind,
    /// Recording sequence number within the build.
    pub order: u32,
}

impl ParentLink {
    pub fn new(kind: LinkKind, order: u32) -> Self {
        Self { kind, order }
    }

    /// Removal preference: `Less` means `self` should be removed before
    /// `other` (lower precedence first, then the later-recorded link).
    pub fn removal_cmp(&self, other: &Self) -> Ordering {
        self.kind
            .precedence()
            .cmp(&other.kind.precedence())
            .then_with(|| other.order.cmp(&self.order))
    }
}

/// Edge kind in the emitted layout graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EdgeKind {
    #[serde(rename = "parent-child")]
    ParentChild,
    #[serde(rename = "spouse")]
    Spouse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        assert!(LinkKind::Father.precedence() > LinkKind::Parent.precedence());
        assert_eq!(LinkKind::Father.precedence(), LinkKind::Mother.precedence());
        assert!(LinkKind::Parent.precedence() > LinkKind::ChildList.precedence());
    }

    #[test]
    fn test_removal_prefers_weaker_then_later() {
        let father = ParentLink::new(LinkKind::Father, 0);
        let legacy = ParentLink::new(LinkKind::Parent, 1);
        assert_eq!(legacy.removal_cmp(&father), Ordering::Less);

        let early = ParentLink::new(LinkKind::Father, 2);
        let late = ParentLink::new(LinkKind::Father, 9);
        assert_eq!(late.removal_cmp(&early), Ordering::Less);
    }

    #[test]
    fn test_edge_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&EdgeKind::ParentChild).unwrap(),
            "\"parent-child\""
        );
        assert_eq!(serde_json::to_string(&EdgeKind::Spouse).unwrap(), "\"spouse\"");
    }
}
