//! Family graph data structures and construction.
//!
//! This module provides the in-memory family graph built on petgraph's
//! StableGraph: parent→child edges are directed graph edges (so the cycle
//! guard can remove them without disturbing node indices), spouse links are
//! symmetric per-node lists, and every relationship is an index reference.

mod builder;
mod edge;
mod family;
mod node;

pub use builder::GraphBuilder;
pub use edge::{EdgeKind, LinkKind, ParentLink};
pub use family::FamilyGraph;
pub use node::{Node, NodeId};
