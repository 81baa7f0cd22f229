//! Whitespace Pass
//!
//! Removes whitespace-only content at the start and end of the rendering
//! method and of every element and tag helper body in a component. Only
//! whole content nodes are removed; whitespace between siblings stays.

use tracing::trace;

use crate::code_document::CodeDocument;
use crate::ir::{IntermediateTree, NodeId, NodeKind};
use crate::pipeline::{IntermediateNodePass, PhaseKind};

use super::directive_value;

pub struct WhitespacePass;

impl IntermediateNodePass for WhitespacePass {
    fn name(&self) -> &'static str {
        "whitespace"
    }

    fn phase(&self) -> PhaseKind {
        PhaseKind::DirectiveClassifier
    }

    fn order(&self) -> i32 {
        10
    }

    fn execute(&self, document: &CodeDocument, tree: &mut IntermediateTree) {
        if !document.file_kind.is_component() {
            return;
        }
        if directive_value(tree, "preservewhitespace").as_deref() == Some("true") {
            return;
        }
        let Some(method) = tree.method() else {
            return;
        };

        let mut containers = vec![method];
        containers.extend(tree.descendants(method).into_iter().filter(|id| {
            matches!(
                tree.kind(*id),
                NodeKind::MarkupElement { .. } | NodeKind::TagHelperBody
            )
        }));

        let mut removed = 0;
        for container in containers {
            removed += trim(tree, container, Edge::Start);
            removed += trim(tree, container, Edge::End);
        }
        trace!(removed, "removed boundary whitespace");
    }
}

#[derive(Clone, Copy)]
enum Edge {
    Start,
    End,
}

/// Scan inward from one edge of `container`, dropping whitespace-only
/// content until a node that renders something.
fn trim(tree: &mut IntermediateTree, container: NodeId, edge: Edge) -> usize {
    let mut removed = 0;
    let mut index = match edge {
        Edge::Start => 0,
        Edge::End => tree.children(container).len(),
    };
    loop {
        let position = match edge {
            Edge::Start if index < tree.children(container).len() => index,
            Edge::End if index > 0 => index - 1,
            _ => return removed,
        };
        let child = tree.children(container)[position];
        match tree.kind(child) {
            NodeKind::HtmlContent { .. } => {
                if !is_whitespace_only(tree, child) {
                    return removed;
                }
                tree.remove_child_at(container, position);
                removed += 1;
                if let Edge::End = edge {
                    index -= 1;
                }
            }
            NodeKind::MarkupElement { .. }
            | NodeKind::MarkupBlock { .. }
            | NodeKind::CSharpExpression
            | NodeKind::CSharpCode
            | NodeKind::TagHelper { .. } => return removed,
            _ => match edge {
                Edge::Start => index += 1,
                Edge::End => index -= 1,
            },
        }
    }
}

fn is_whitespace_only(tree: &IntermediateTree, content: NodeId) -> bool {
    tree.children(content).iter().all(|token| match tree.kind(*token) {
        NodeKind::Token { content, .. } => content.chars().all(char::is_whitespace),
        _ => false,
    })
}
