//! Razor Engine
//!
//! Runs every phase, in [`PhaseKind::ALL`] order, over one code document.
//! The engine owns the registered passes, sorted once at build time by
//! phase and then by order (stable, so ties keep registration order).

use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use tracing::{debug, debug_span, warn};

use crate::code_document::{CodeDocument, FileKind};
use crate::error::{EngineError, Result};
use crate::syntax::parse;

use super::binder::bind_tag_helpers;
use super::lowering::lower_document;
use super::passes::default_passes;
use super::{IntermediateNodePass, PhaseKind};

pub struct RazorEngine {
    passes: Vec<Box<dyn IntermediateNodePass>>,
}

impl RazorEngine {
    pub fn builder() -> RazorEngineBuilder {
        RazorEngineBuilder::default()
    }

    /// An engine with the built-in passes.
    pub fn create_default() -> Self {
        Self::from_sorted(default_passes())
    }

    fn from_sorted(mut passes: Vec<Box<dyn IntermediateNodePass>>) -> Self {
        passes.sort_by_key(|pass| (pass.phase(), pass.order()));
        RazorEngine { passes }
    }

    /// `(phase, name, order)` for each pass in execution order.
    pub fn passes(&self) -> Vec<(PhaseKind, &'static str, i32)> {
        self.passes
            .iter()
            .map(|pass| (pass.phase(), pass.name(), pass.order()))
            .collect()
    }

    pub fn process(&self, document: &mut CodeDocument) -> Result<()> {
        self.run(document, None)
    }

    /// Like [`process`](Self::process), but gives up with
    /// [`EngineError::Cancelled`] if `cancel` is set when a phase is about
    /// to start. A running phase is never interrupted.
    pub fn process_with_cancellation(
        &self,
        document: &mut CodeDocument,
        cancel: &AtomicBool,
    ) -> Result<()> {
        self.run(document, Some(cancel))
    }

    /// Process independent documents in parallel, one result per document.
    pub fn process_all(&self, documents: &mut [CodeDocument]) -> Vec<Result<()>> {
        documents
            .par_iter_mut()
            .map(|document| self.process(document))
            .collect()
    }

    fn run(&self, document: &mut CodeDocument, cancel: Option<&AtomicBool>) -> Result<()> {
        let span = debug_span!("razor_process", file = %document.source.file_path);
        let _enter = span.enter();

        for phase in PhaseKind::ALL {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                warn!(phase = %phase, "processing cancelled");
                return Err(EngineError::Cancelled {
                    file_path: document.source.file_path.to_string(),
                });
            }
            debug!(phase = %phase, "running phase");
            match phase {
                PhaseKind::Parsing => parse_document(document),
                PhaseKind::TagHelperBinder => bind_tag_helpers(document)?,
                PhaseKind::Lowering => lower_document(document)?,
                _ if phase.runs_passes() => self.run_passes(phase, document)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn run_passes(&self, phase: PhaseKind, document: &mut CodeDocument) -> Result<()> {
        let mut tree = document
            .ir_document
            .take()
            .ok_or(EngineError::MissingDocumentDependency {
                phase: phase.name(),
                dependency: "an IR document",
            })?;
        for pass in self.passes.iter().filter(|pass| pass.phase() == phase) {
            debug!(pass = pass.name(), order = pass.order(), "running pass");
            pass.execute(document, &mut tree);
        }
        document.ir_document = Some(tree);
        Ok(())
    }
}

/// Parse the document and its imports unless a caller already supplied
/// syntax trees.
fn parse_document(document: &mut CodeDocument) {
    if document.syntax_tree.is_none() {
        document.syntax_tree = Some(parse(&document.source, document.file_kind));
    }
    if document.import_syntax_trees.is_empty() && !document.imports.is_empty() {
        let import_kind = if document.file_kind.is_component() {
            FileKind::ComponentImport
        } else {
            FileKind::Legacy
        };
        document.import_syntax_trees = document
            .imports
            .iter()
            .map(|import| parse(import, import_kind))
            .collect();
    }
}

#[derive(Default)]
pub struct RazorEngineBuilder {
    passes: Vec<Box<dyn IntermediateNodePass>>,
}

impl RazorEngineBuilder {
    pub fn add_pass(mut self, pass: impl IntermediateNodePass + 'static) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    pub fn with_default_passes(mut self) -> Self {
        self.passes.extend(default_passes());
        self
    }

    /// Fails if a pass was registered for a phase the engine runs itself.
    pub fn build(self) -> Result<RazorEngine> {
        if let Some(pass) = self.passes.iter().find(|pass| !pass.phase().runs_passes()) {
            return Err(EngineError::BuiltInPhase {
                pass: pass.name(),
                phase: pass.phase().name(),
            });
        }
        Ok(RazorEngine::from_sorted(self.passes))
    }
}
