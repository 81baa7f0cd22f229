//! Functions Directive Pass
//!
//! `@code { ... }` and `@functions { ... }` declare class members, so their
//! bodies move from the rendering method to the class, after the method.
//! The directive node stays behind with only its tokens.

use tracing::trace;

use crate::code_document::CodeDocument;
use crate::ir::{IntermediateTree, NodeKind};
use crate::pipeline::{IntermediateNodePass, PhaseKind};

pub struct FunctionsDirectivePass;

impl IntermediateNodePass for FunctionsDirectivePass {
    fn name(&self) -> &'static str {
        "functions-directive"
    }

    fn phase(&self) -> PhaseKind {
        PhaseKind::DirectiveClassifier
    }

    fn order(&self) -> i32 {
        0
    }

    fn execute(&self, _document: &CodeDocument, tree: &mut IntermediateTree) {
        let Some(class) = tree.class() else {
            return;
        };
        let directives = tree.find_all(|kind| {
            matches!(kind, NodeKind::Directive { name, .. } if name == "code" || name == "functions")
        });
        let mut moved = 0;
        for directive in directives {
            for child in tree.take_children(directive) {
                if matches!(tree.kind(child), NodeKind::DirectiveToken { .. }) {
                    tree.append_child(directive, child);
                } else {
                    tree.append_child(class, child);
                    moved += 1;
                }
            }
        }
        trace!(moved, "moved functions directive bodies to the class");
    }
}
