//! Engine Errors
//!
//! Failures of the pipeline itself. Problems in the template being compiled
//! are diagnostics, see [`crate::diagnostics`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// `pop` (or an insertion) on a builder whose insertion stack is empty.
    #[error("the intermediate node builder has no current node")]
    BuilderStackUnderflow,

    #[error("the '{phase}' phase requires {dependency}, which no earlier phase produced")]
    MissingDocumentDependency {
        phase: &'static str,
        dependency: &'static str,
    },

    /// A pass registered for a phase whose work the engine does itself.
    #[error("pass '{pass}' cannot run in the built-in '{phase}' phase")]
    BuiltInPhase {
        pass: &'static str,
        phase: &'static str,
    },

    #[error("processing of '{file_path}' was cancelled")]
    Cancelled { file_path: String },

    #[error("invalid razor configuration: {0}")]
    Configuration(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
