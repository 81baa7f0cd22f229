//! Duplicate Attribute Pass
//!
//! Reports every repeat of an attribute name on one element (ASCII case
//! insensitive). The attributes stay in the tree; the diagnostic is what
//! keeps the element out of markup blocks, so this runs before that pass.

use std::collections::HashSet;

use tracing::trace;

use crate::code_document::CodeDocument;
use crate::diagnostics::{DiagnosticKind, RazorDiagnostic};
use crate::ir::{IntermediateTree, NodeKind};
use crate::pipeline::{IntermediateNodePass, PhaseKind};

pub struct MarkupDiagnosticPass;

impl IntermediateNodePass for MarkupDiagnosticPass {
    fn name(&self) -> &'static str {
        "duplicate-attribute"
    }

    fn phase(&self) -> PhaseKind {
        PhaseKind::Optimization
    }

    fn order(&self) -> i32 {
        10000
    }

    fn execute(&self, document: &CodeDocument, tree: &mut IntermediateTree) {
        if !document.file_kind.is_component() {
            return;
        }
        let mut reported = 0;
        for element in tree.find_all(|kind| matches!(kind, NodeKind::MarkupElement { .. })) {
            let mut seen = HashSet::new();
            for child in tree.children(element).to_vec() {
                let NodeKind::HtmlAttribute { attribute_name, .. } = tree.kind(child) else {
                    continue;
                };
                if seen.insert(attribute_name.to_ascii_lowercase()) {
                    continue;
                }
                let diagnostic = RazorDiagnostic::create(
                    DiagnosticKind::DuplicateMarkupAttribute,
                    tree.source(child).cloned(),
                    &[attribute_name.as_str()],
                );
                tree.add_diagnostic(child, diagnostic);
                reported += 1;
            }
        }
        trace!(reported, "checked duplicate attributes");
    }
}
