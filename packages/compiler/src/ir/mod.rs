//! Intermediate Representation
//!
//! The node tree lowering produces and the passes rewrite.

pub mod builder;
pub mod node;
pub mod tree;

pub use builder::IntermediateNodeBuilder;
pub use node::{IntermediateNode, NodeId, NodeKind, TokenKind};
pub use tree::IntermediateTree;
