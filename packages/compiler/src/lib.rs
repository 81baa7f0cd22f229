#![deny(clippy::all)]

/**
 * Razor Rust Compiler
 *
 * Parses Razor templates and components, lowers them to an intermediate
 * node tree and runs the rewrite passes that prepare it for code generation.
 */

// Core modules
pub mod chars;
pub mod code_document;
pub mod config;
pub mod diagnostics;
pub mod entities;
pub mod error;
pub mod parse_util;
pub mod tag_helpers;

// Syntax and IR
pub mod ir;
pub mod syntax;

// Compilation pipeline
pub mod pipeline;

// Re-exports
pub use code_document::{CodeDocument, FileKind};
pub use config::{CodeGenerationOptions, RazorConfiguration};
pub use diagnostics::{DiagnosticKind, DiagnosticSeverity, RazorDiagnostic};
pub use error::{EngineError, Result};
pub use ir::{IntermediateNode, IntermediateNodeBuilder, IntermediateTree, NodeId, NodeKind};
pub use parse_util::{SourceDocument, SourceSpan};
pub use pipeline::{IntermediateNodePass, PhaseKind, RazorEngine, RazorEngineBuilder};
pub use tag_helpers::{BoundAttributeDescriptor, TagHelperDescriptor};
