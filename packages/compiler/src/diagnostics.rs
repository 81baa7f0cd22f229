//! Diagnostics
//!
//! Structured diagnostics attached to syntax and IR nodes. Diagnostics are
//! data: parse problems and semantic problems found by passes are recorded
//! on the node at fault and never raised as errors.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::parse_util::SourceSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticSeverity {
    Warning,
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Warning => write!(f, "Warning"),
            DiagnosticSeverity::Error => write!(f, "Error"),
        }
    }
}

/// Every diagnostic the compiler can report. Ids are stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    BlockDirectiveCannotBeImported,
    UnterminatedStringLiteral,
    UnexpectedCharacterAtStartOfCodeBlock,
    ExpectedEndOfBlockBeforeEof,
    UnexpectedEofAfterDirective,
    DirectiveExpectsTypeName,
    DirectiveExpectsNamespace,
    DirectiveExpectsIdentifier,
    DirectiveExpectsQuotedStringLiteral,
    UnfinishedTag,
    MissingEndTag,
    UnexpectedEndTag,
    ExpectedCloseBracketBeforeEof,
    RazorCommentNotTerminated,
    DirectiveExpectsBooleanLiteral,
    DuplicateDirective,
    UnclosedTag,
    UnexpectedClosingTag,
    UnexpectedClosingTagForVoidElement,
    DuplicateMarkupAttribute,
    UnexpectedMarkupElement,
    UnsupportedComponentImportContent,
}

impl DiagnosticKind {
    pub fn id(self) -> &'static str {
        match self {
            DiagnosticKind::BlockDirectiveCannotBeImported => "RZ0000",
            DiagnosticKind::UnterminatedStringLiteral => "RZ1000",
            DiagnosticKind::UnexpectedCharacterAtStartOfCodeBlock => "RZ1005",
            DiagnosticKind::ExpectedEndOfBlockBeforeEof => "RZ1006",
            DiagnosticKind::UnexpectedEofAfterDirective => "RZ1012",
            DiagnosticKind::DirectiveExpectsTypeName => "RZ1013",
            DiagnosticKind::DirectiveExpectsNamespace => "RZ1014",
            DiagnosticKind::DirectiveExpectsIdentifier => "RZ1015",
            DiagnosticKind::DirectiveExpectsQuotedStringLiteral => "RZ1016",
            DiagnosticKind::UnfinishedTag => "RZ1024",
            DiagnosticKind::MissingEndTag => "RZ1025",
            DiagnosticKind::UnexpectedEndTag => "RZ1026",
            DiagnosticKind::ExpectedCloseBracketBeforeEof => "RZ1027",
            DiagnosticKind::RazorCommentNotTerminated => "RZ1028",
            DiagnosticKind::DirectiveExpectsBooleanLiteral => "RZ1038",
            DiagnosticKind::DuplicateDirective => "RZ2001",
            DiagnosticKind::UnclosedTag => "RZ9980",
            DiagnosticKind::UnexpectedClosingTag => "RZ9981",
            DiagnosticKind::UnexpectedClosingTagForVoidElement => "RZ9983",
            DiagnosticKind::DuplicateMarkupAttribute => "RZ10007",
            DiagnosticKind::UnexpectedMarkupElement => "RZ10012",
            DiagnosticKind::UnsupportedComponentImportContent => "RZ10003",
        }
    }

    pub fn severity(self) -> DiagnosticSeverity {
        match self {
            DiagnosticKind::UnexpectedMarkupElement => DiagnosticSeverity::Warning,
            _ => DiagnosticSeverity::Error,
        }
    }

    /// Message template; `{0}`, `{1}` are replaced positionally.
    fn format(self) -> &'static str {
        match self {
            DiagnosticKind::BlockDirectiveCannotBeImported => {
                "Block directive '{0}' cannot be imported."
            }
            DiagnosticKind::UnterminatedStringLiteral => {
                "Unterminated string literal. Strings that start with a quotation mark (\") must be terminated before the end of the line."
            }
            DiagnosticKind::UnexpectedCharacterAtStartOfCodeBlock => {
                "\"{0}\" is not valid at the start of a code block. Only identifiers, keywords, comments, \"(\" and \"{\" are valid."
            }
            DiagnosticKind::ExpectedEndOfBlockBeforeEof => {
                "The {0} block is missing a closing \"{1}\" character. Make sure you have a matching \"{1}\" character for all the \"{2}\" characters within this block, and that none of the \"{1}\" characters are being interpreted as markup."
            }
            DiagnosticKind::UnexpectedEofAfterDirective => {
                "Unexpected end of file following the '{0}' directive. Expected '{1}'."
            }
            DiagnosticKind::DirectiveExpectsTypeName => {
                "The '{0}' directive expects a type name."
            }
            DiagnosticKind::DirectiveExpectsNamespace => {
                "The '{0}' directive expects a namespace name."
            }
            DiagnosticKind::DirectiveExpectsIdentifier => {
                "The '{0}' directive expects an identifier."
            }
            DiagnosticKind::DirectiveExpectsQuotedStringLiteral => {
                "The '{0}' directive expects a string surrounded by double quotes."
            }
            DiagnosticKind::UnfinishedTag => {
                "End of file or an unexpected character was reached before the \"{0}\" tag could be parsed. Elements inside markup blocks must be complete. They must either be self-closing (\"<br />\") or have matching end tags (\"<p>Hello</p>\")."
            }
            DiagnosticKind::MissingEndTag => {
                "The \"{0}\" element was not closed. All elements must be either self-closing or have a matching end tag."
            }
            DiagnosticKind::UnexpectedEndTag => {
                "Encountered end tag \"{0}\" with no matching start tag. Are your start/end tags properly balanced?"
            }
            DiagnosticKind::ExpectedCloseBracketBeforeEof => {
                "An opening \"{0}\" is missing the corresponding closing \"{1}\"."
            }
            DiagnosticKind::RazorCommentNotTerminated => "Razor comment is not terminated.",
            DiagnosticKind::DirectiveExpectsBooleanLiteral => {
                "The '{0}' directive expects a boolean literal."
            }
            DiagnosticKind::DuplicateDirective => {
                "The '{0}' directive may only occur once per document."
            }
            DiagnosticKind::UnclosedTag => {
                "The element '{0}' was not closed. All elements must be either self-closing or have a matching end tag."
            }
            DiagnosticKind::UnexpectedClosingTag => {
                "Unexpected closing tag '{0}' with no matching start tag."
            }
            DiagnosticKind::UnexpectedClosingTagForVoidElement => {
                "Unexpected closing tag '{0}'. The element '{0}' is a void element, and should be used without a closing tag."
            }
            DiagnosticKind::DuplicateMarkupAttribute => {
                "The attribute '{0}' is used two or more times for this element. Attributes must be unique (case-insensitive)."
            }
            DiagnosticKind::UnexpectedMarkupElement => {
                "Found markup element with unexpected name '{0}'. If this is intended to be a component, add a @using directive for its namespace."
            }
            DiagnosticKind::UnsupportedComponentImportContent => {
                "Markup, code and block directives are not valid in component imports."
            }
        }
    }
}

/// A diagnostic record: kind, severity, rendered message and optional span.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RazorDiagnostic {
    pub kind: DiagnosticKind,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub span: Option<SourceSpan>,
}

impl RazorDiagnostic {
    pub fn create(kind: DiagnosticKind, span: Option<SourceSpan>, args: &[&str]) -> Self {
        let mut message = kind.format().to_string();
        for (index, arg) in args.iter().enumerate() {
            message = message.replace(&format!("{{{}}}", index), arg);
        }
        RazorDiagnostic {
            kind,
            severity: kind.severity(),
            message,
            span,
        }
    }

    pub fn id(&self) -> &'static str {
        self.kind.id()
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl fmt::Display for RazorDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some(span) => write!(
                f,
                "{}({},{}): {} {}: {}",
                span.file_path,
                span.line_index + 1,
                span.character_index + 1,
                self.severity,
                self.id(),
                self.message
            ),
            None => write!(f, "{} {}: {}", self.severity, self.id(), self.message),
        }
    }
}
