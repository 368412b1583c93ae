//! Hierarchy construction passes.
//!
//! Runs over a built [`crate::graph::FamilyGraph`] in order:
//! cycle repair, root resolution, generation assignment, and assembly of the
//! nested trees and the generation index.

mod assemble;
mod cycle;
mod generation;
mod roots;

pub use assemble::{GenerationBucket, HierarchyAssembler, Lineage, LineageTree};
pub use cycle::{RepairedEdge, break_cycles};
pub use generation::{FIRST_GENERATION, GenerationAssigner, assign_generations};
pub use roots::resolve_roots;
