//! IR Tree
//!
//! Arena storage for one document's intermediate nodes. Nodes are addressed
//! by [`NodeId`]; the parent link is a plain index set only when a node is
//! attached, so ownership stays with the parent's child list.
//!
//! Detached nodes stay in the arena but are unreachable from the root and
//! ignored by every traversal.

use std::ops::Range;

use serde_json::{json, Value};
use smallvec::SmallVec;

use super::node::{IntermediateNode, NodeId, NodeKind, TokenKind};
use crate::diagnostics::RazorDiagnostic;
use crate::parse_util::SourceSpan;

#[derive(Debug, Clone)]
pub struct IntermediateTree {
    nodes: Vec<IntermediateNode>,
    root: NodeId,
}

impl IntermediateTree {
    /// Create a tree whose root is `document`.
    pub fn new(document: NodeKind, source: Option<SourceSpan>) -> Self {
        IntermediateTree {
            nodes: vec![IntermediateNode::new(document, source)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of arena slots, detached nodes included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a detached node.
    pub fn create(&mut self, kind: NodeKind, source: Option<SourceSpan>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(IntermediateNode::new(kind, source));
        id
    }

    pub fn node(&self, id: NodeId) -> &IntermediateNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut IntermediateNode {
        &mut self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.0].kind
    }

    pub fn source(&self, id: NodeId) -> Option<&SourceSpan> {
        self.nodes[id.0].source.as_ref()
    }

    pub fn add_diagnostic(&mut self, id: NodeId, diagnostic: RazorDiagnostic) {
        self.nodes[id.0].diagnostics.push(diagnostic);
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.assert_attachable(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.assert_attachable(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(index, child);
    }

    /// Detach and return the child at `index`.
    pub fn remove_child_at(&mut self, parent: NodeId, index: usize) -> NodeId {
        let child = self.nodes[parent.0].children.remove(index);
        self.nodes[child.0].parent = None;
        child
    }

    /// Detach `id` from its parent, if it has one.
    pub fn detach(&mut self, id: NodeId) {
        assert!(id != self.root, "the document node cannot be detached");
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != id);
        }
    }

    /// Detach and return every child of `parent`.
    pub fn take_children(&mut self, parent: NodeId) -> Vec<NodeId> {
        let children: Vec<NodeId> = std::mem::take(&mut self.nodes[parent.0].children).into_vec();
        for child in &children {
            self.nodes[child.0].parent = None;
        }
        children
    }

    /// Replace `parent.children[range]` with the single node `replacement`.
    /// The replaced children are detached.
    pub fn replace_children(&mut self, parent: NodeId, range: Range<usize>, replacement: NodeId) {
        self.assert_attachable(replacement);
        let start = range.start;
        let removed: SmallVec<[NodeId; 4]> =
            self.nodes[parent.0].children.drain(range).collect();
        for child in removed {
            self.nodes[child.0].parent = None;
        }
        self.nodes[replacement.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(start, replacement);
    }

    fn assert_attachable(&self, child: NodeId) {
        assert!(child != self.root, "the document node cannot be a child");
        assert!(
            self.nodes[child.0].parent.is_none(),
            "node {:?} already has a parent",
            child
        );
    }

    /// Parent chain of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Pre-order list of `id` and everything under it.
    pub fn pre_order(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        result
    }

    /// Pre-order descendants of `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut nodes = self.pre_order(id);
        nodes.remove(0);
        nodes
    }

    /// Concatenated content of the tokens under `id`.
    pub fn content(&self, id: NodeId) -> String {
        let mut content = String::new();
        for node in self.pre_order(id) {
            if let NodeKind::Token { content: text, .. } = self.kind(node) {
                content.push_str(text);
            }
        }
        content
    }

    /// True when every token under `id` is an HTML token.
    pub fn has_only_html_tokens(&self, id: NodeId) -> bool {
        self.children(id).iter().all(|child| {
            matches!(
                self.kind(*child),
                NodeKind::Token {
                    kind: TokenKind::Html,
                    ..
                }
            )
        })
    }

    /// Every diagnostic in the tree, depth-first pre-order.
    pub fn diagnostics(&self) -> Vec<RazorDiagnostic> {
        self.subtree_diagnostics(self.root)
    }

    pub fn subtree_diagnostics(&self, id: NodeId) -> Vec<RazorDiagnostic> {
        self.pre_order(id)
            .into_iter()
            .flat_map(|node| self.nodes[node.0].diagnostics.iter().cloned())
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.subtree_has_errors(self.root)
    }

    pub fn subtree_has_errors(&self, id: NodeId) -> bool {
        self.pre_order(id)
            .into_iter()
            .any(|node| self.nodes[node.0].has_error_diagnostics())
    }

    /// First node in pre-order whose kind satisfies `predicate`.
    pub fn find_first(&self, predicate: impl Fn(&NodeKind) -> bool) -> Option<NodeId> {
        self.pre_order(self.root)
            .into_iter()
            .find(|id| predicate(self.kind(*id)))
    }

    pub fn find_all(&self, predicate: impl Fn(&NodeKind) -> bool) -> Vec<NodeId> {
        self.pre_order(self.root)
            .into_iter()
            .filter(|id| predicate(self.kind(*id)))
            .collect()
    }

    pub fn namespace(&self) -> Option<NodeId> {
        self.find_first(|kind| matches!(kind, NodeKind::NamespaceDeclaration { .. }))
    }

    pub fn class(&self) -> Option<NodeId> {
        self.find_first(|kind| matches!(kind, NodeKind::ClassDeclaration { .. }))
    }

    pub fn method(&self) -> Option<NodeId> {
        self.find_first(|kind| matches!(kind, NodeKind::MethodDeclaration { .. }))
    }

    /// Verify the reachable tree is a strict rooted tree: the root has no
    /// parent, every other node names the parent that lists it, and no node
    /// is listed twice.
    pub fn check_well_formed(&self) -> Result<(), String> {
        if self.parent(self.root).is_some() {
            return Err("document node has a parent".to_string());
        }
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if seen[id.0] {
                return Err(format!("node {:?} is reachable twice", id));
            }
            seen[id.0] = true;
            for child in self.children(id) {
                if self.parent(*child) != Some(id) {
                    return Err(format!(
                        "node {:?} is a child of {:?} but points at {:?}",
                        child,
                        id,
                        self.parent(*child)
                    ));
                }
                stack.push(*child);
            }
        }
        Ok(())
    }

    /// JSON dump of the reachable tree in document order.
    pub fn to_json(&self) -> Value {
        self.node_to_json(self.root)
    }

    fn node_to_json(&self, id: NodeId) -> Value {
        let node = &self.nodes[id.0];
        let mut value = serde_json::to_value(&node.kind).unwrap_or(Value::Null);
        if let Value::Object(map) = &mut value {
            map.insert(
                "source".to_string(),
                serde_json::to_value(&node.source).unwrap_or(Value::Null),
            );
            map.insert(
                "diagnostics".to_string(),
                json!(node
                    .diagnostics
                    .iter()
                    .map(|d| json!({ "id": d.id(), "severity": d.severity, "message": d.message }))
                    .collect::<Vec<_>>()),
            );
            map.insert(
                "children".to_string(),
                Value::Array(
                    node.children
                        .iter()
                        .map(|child| self.node_to_json(*child))
                        .collect(),
                ),
            );
        }
        value
    }
}

pub struct Ancestors<'a> {
    tree: &'a IntermediateTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
