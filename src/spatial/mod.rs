//! Hit testing over laid-out members.
//!
//! An R-tree over the target coordinates of a [`crate::layout::LayoutGraph`],
//! so a view can map a pointer position back to a member.

mod rtree;

pub use rtree::{MemberPoint, SpatialIndex};
