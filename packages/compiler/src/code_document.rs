//! Code Document
//!
//! The per-document context threaded through every engine phase: the source,
//! its imports, the syntax trees once parsed, the tag helpers in scope and,
//! after lowering, the IR tree.

use serde::{Deserialize, Serialize};

use crate::config::CodeGenerationOptions;
use crate::diagnostics::RazorDiagnostic;
use crate::ir::IntermediateTree;
use crate::parse_util::SourceDocument;
use crate::syntax::SyntaxTree;
use crate::tag_helpers::{TagHelperBinder, TagHelperDescriptor};

/// What a document compiles into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileKind {
    /// An MVC view or page (`.cshtml`).
    Legacy,
    /// A component (`.razor`).
    Component,
    /// `_Imports.razor`: directives shared by the components next to it.
    ComponentImport,
}

impl FileKind {
    pub fn is_component(self) -> bool {
        matches!(self, FileKind::Component | FileKind::ComponentImport)
    }

    pub fn from_file_path(file_path: &str) -> FileKind {
        let file_name = file_path
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or(file_path);
        if file_name.eq_ignore_ascii_case("_Imports.razor") {
            FileKind::ComponentImport
        } else if file_name.to_ascii_lowercase().ends_with(".razor") {
            FileKind::Component
        } else {
            FileKind::Legacy
        }
    }
}

#[derive(Debug, Clone)]
pub struct CodeDocument {
    pub source: SourceDocument,
    pub file_kind: FileKind,
    pub imports: Vec<SourceDocument>,
    pub syntax_tree: Option<SyntaxTree>,
    pub import_syntax_trees: Vec<SyntaxTree>,
    /// Every tag helper the host knows about.
    pub tag_helpers: Vec<TagHelperDescriptor>,
    /// The subset in scope for this document, set by the binder phase.
    pub bound_tag_helpers: Option<TagHelperBinder>,
    pub options: CodeGenerationOptions,
    pub ir_document: Option<IntermediateTree>,
}

impl CodeDocument {
    pub fn new(source: SourceDocument) -> Self {
        let file_kind = FileKind::from_file_path(&source.file_path);
        CodeDocument {
            source,
            file_kind,
            imports: Vec::new(),
            syntax_tree: None,
            import_syntax_trees: Vec::new(),
            tag_helpers: Vec::new(),
            bound_tag_helpers: None,
            options: CodeGenerationOptions::default(),
            ir_document: None,
        }
    }

    pub fn with_file_kind(mut self, file_kind: FileKind) -> Self {
        self.file_kind = file_kind;
        self
    }

    pub fn with_imports(mut self, imports: Vec<SourceDocument>) -> Self {
        self.imports = imports;
        self
    }

    pub fn with_tag_helpers(mut self, tag_helpers: Vec<TagHelperDescriptor>) -> Self {
        self.tag_helpers = tag_helpers;
        self
    }

    pub fn with_options(mut self, options: CodeGenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn diagnostics(&self) -> Vec<RazorDiagnostic> {
        if let Some(tree) = &self.ir_document {
            return tree.diagnostics();
        }
        let mut result = Vec::new();
        for import in &self.import_syntax_trees {
            result.extend(import.all_diagnostics());
        }
        if let Some(tree) = &self.syntax_tree {
            result.extend(tree.all_diagnostics());
        }
        result
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics().iter().any(RazorDiagnostic::is_error)
    }
}
