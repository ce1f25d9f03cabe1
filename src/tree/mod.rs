//! Hierarchical backup tree and its flat presentation projection.
//!
//! [`builder`] turns the flat manifest record list into a [`node::FileTreeNode`]
//! hierarchy; [`projector`] flattens that hierarchy into display-ready rows
//! plus a path lookup index.

pub mod builder;
pub mod node;
pub mod projector;

#[cfg(test)]
mod test_properties;

pub use builder::{BuildOptions, BuildStats, build_tree};
pub use node::{FileTreeNode, NodeKind};
pub use projector::{PathIndex, PresentationNode, project};
