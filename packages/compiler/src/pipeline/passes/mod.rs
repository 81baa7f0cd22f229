//! IR Passes
//!
//! The built-in rewrites, registered by [`default_passes`] in the order the
//! engine sorts them into:
//!
//! | phase                | order | pass                   |
//! |----------------------|-------|------------------------|
//! | document-classifier  | 1000  | document classifier    |
//! | directive-classifier | 0     | functions directive    |
//! | directive-classifier | 10    | whitespace             |
//! | optimization         | 10000 | duplicate attribute    |
//! | optimization         | 10010 | markup encoding        |
//! | optimization         | 10020 | markup block           |

pub mod document_classifier;
pub mod functions_directive;
pub mod markup_block;
pub mod markup_diagnostic;
pub mod markup_encoding;
pub mod whitespace;

use crate::ir::{IntermediateTree, NodeId, NodeKind};

use super::IntermediateNodePass;

pub use document_classifier::DocumentClassifierPass;
pub use functions_directive::FunctionsDirectivePass;
pub use markup_block::MarkupBlockPass;
pub use markup_diagnostic::MarkupDiagnosticPass;
pub use markup_encoding::MarkupEncodingPass;
pub use whitespace::WhitespacePass;

pub fn default_passes() -> Vec<Box<dyn IntermediateNodePass>> {
    vec![
        Box::new(DocumentClassifierPass),
        Box::new(FunctionsDirectivePass),
        Box::new(WhitespacePass),
        Box::new(MarkupDiagnosticPass),
        Box::new(MarkupEncodingPass),
        Box::new(MarkupBlockPass),
    ]
}

/// Content of the first token of the last well-formed directive called
/// `name`. Later directives override earlier (imported) ones.
pub(crate) fn directive_value(tree: &IntermediateTree, name: &str) -> Option<String> {
    tree.find_all(|kind| matches!(kind, NodeKind::Directive { name: n, .. } if n == name))
        .into_iter()
        .rev()
        .find_map(|id| first_directive_token(tree, id))
}

/// Every value of a repeatable directive, in document order.
pub(crate) fn directive_values(tree: &IntermediateTree, name: &str) -> Vec<String> {
    tree.find_all(|kind| matches!(kind, NodeKind::Directive { name: n, .. } if n == name))
        .into_iter()
        .filter_map(|id| first_directive_token(tree, id))
        .collect()
}

fn first_directive_token(tree: &IntermediateTree, directive: NodeId) -> Option<String> {
    tree.children(directive)
        .iter()
        .find_map(|child| match tree.kind(*child) {
            NodeKind::DirectiveToken { content, .. } => Some(content.clone()),
            _ => None,
        })
}
