//! IR Builder
//!
//! An insertion-point stack over one tree, used by lowering to build nested
//! structure without threading parent ids through every call.

use super::node::{NodeId, NodeKind};
use super::tree::IntermediateTree;
use crate::error::{EngineError, Result};
use crate::parse_util::SourceSpan;

pub struct IntermediateNodeBuilder<'a> {
    tree: &'a mut IntermediateTree,
    stack: Vec<NodeId>,
}

impl<'a> IntermediateNodeBuilder<'a> {
    /// Start building at `start` (usually the tree root).
    pub fn new(tree: &'a mut IntermediateTree, start: NodeId) -> Self {
        IntermediateNodeBuilder {
            tree,
            stack: vec![start],
        }
    }

    pub fn tree(&self) -> &IntermediateTree {
        self.tree
    }

    pub fn tree_mut(&mut self) -> &mut IntermediateTree {
        self.tree
    }

    /// The node new children are appended to.
    pub fn current(&self) -> Result<NodeId> {
        self.stack
            .last()
            .copied()
            .ok_or(EngineError::BuilderStackUnderflow)
    }

    /// Append a new node under the current node.
    pub fn add(&mut self, kind: NodeKind, source: Option<SourceSpan>) -> Result<NodeId> {
        let parent = self.current()?;
        let id = self.tree.create(kind, source);
        self.tree.append_child(parent, id);
        Ok(id)
    }

    /// Append an existing detached node under the current node.
    pub fn add_existing(&mut self, id: NodeId) -> Result<()> {
        let parent = self.current()?;
        self.tree.append_child(parent, id);
        Ok(())
    }

    /// Insert a new node under the current node at `index`.
    pub fn insert(
        &mut self,
        index: usize,
        kind: NodeKind,
        source: Option<SourceSpan>,
    ) -> Result<NodeId> {
        let parent = self.current()?;
        let id = self.tree.create(kind, source);
        self.tree.insert_child(parent, index, id);
        Ok(id)
    }

    /// Append a new node and make it the insertion point.
    pub fn push(&mut self, kind: NodeKind, source: Option<SourceSpan>) -> Result<NodeId> {
        let id = self.add(kind, source)?;
        self.stack.push(id);
        Ok(id)
    }

    /// Make an already attached node the insertion point.
    pub fn push_existing(&mut self, id: NodeId) {
        self.stack.push(id);
    }

    pub fn pop(&mut self) -> Result<NodeId> {
        self.stack.pop().ok_or(EngineError::BuilderStackUnderflow)
    }

    /// Last child of the current node.
    pub fn last_child(&self) -> Result<Option<NodeId>> {
        let parent = self.current()?;
        Ok(self.tree.children(parent).last().copied())
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}
