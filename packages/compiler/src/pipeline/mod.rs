//! Razor Pipeline
//!
//! Phases run in a fixed order over one [`CodeDocument`]. The first three
//! (parsing, tag helper binding, lowering) are built in; the rest are
//! registered [`IntermediateNodePass`]es grouped by phase and sorted by
//! their order value.

pub mod binder;
pub mod engine;
pub mod lowering;
pub mod passes;

use std::fmt;

use crate::code_document::CodeDocument;
use crate::ir::IntermediateTree;

pub use engine::{RazorEngine, RazorEngineBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PhaseKind {
    Parsing,
    TagHelperBinder,
    Lowering,
    DocumentClassifier,
    DirectiveClassifier,
    Optimization,
}

impl PhaseKind {
    pub const ALL: [PhaseKind; 6] = [
        PhaseKind::Parsing,
        PhaseKind::TagHelperBinder,
        PhaseKind::Lowering,
        PhaseKind::DocumentClassifier,
        PhaseKind::DirectiveClassifier,
        PhaseKind::Optimization,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PhaseKind::Parsing => "parsing",
            PhaseKind::TagHelperBinder => "tag-helper-binder",
            PhaseKind::Lowering => "lowering",
            PhaseKind::DocumentClassifier => "document-classifier",
            PhaseKind::DirectiveClassifier => "directive-classifier",
            PhaseKind::Optimization => "optimization",
        }
    }

    /// Phases whose work is done by registered passes.
    pub fn runs_passes(self) -> bool {
        matches!(
            self,
            PhaseKind::DocumentClassifier | PhaseKind::DirectiveClassifier | PhaseKind::Optimization
        )
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A rewrite over a lowered document. Passes hold no per-document state, so
/// one engine can run them for many documents at once.
pub trait IntermediateNodePass: Send + Sync {
    fn name(&self) -> &'static str;

    fn phase(&self) -> PhaseKind;

    /// Position within the phase; lower runs first, ties keep registration
    /// order.
    fn order(&self) -> i32;

    fn execute(&self, document: &CodeDocument, tree: &mut IntermediateTree);
}
