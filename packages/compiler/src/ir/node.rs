//! IR Nodes
//!
//! The closed set of intermediate node kinds. Structure (parent and
//! children) lives in the arena slot, never in the kind, so passes can
//! rewrite a node's payload without touching the tree shape.

use serde::Serialize;
use smallvec::SmallVec;

use crate::code_document::FileKind;
use crate::config::CodeGenerationOptions;
use crate::diagnostics::RazorDiagnostic;
use crate::parse_util::SourceSpan;
use crate::syntax::directives::{DirectiveDescriptor, DirectiveTokenKind};
use crate::tag_helpers::TagMode;

/// Index of a node in its [`IntermediateTree`](super::IntermediateTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn new(id: usize) -> Self {
        NodeId(id)
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Html,
    CSharp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all_fields = "camelCase")]
pub enum NodeKind {
    Document {
        file_kind: FileKind,
        options: CodeGenerationOptions,
    },
    Checksum {
        algorithm: String,
        checksum: String,
    },
    NamespaceDeclaration {
        content: String,
    },
    UsingDirective {
        content: String,
        imported: bool,
    },
    ClassDeclaration {
        class_name: String,
        base_type: Option<String>,
        modifiers: Vec<String>,
        interfaces: Vec<String>,
    },
    MethodDeclaration {
        method_name: String,
        return_type: String,
        modifiers: Vec<String>,
    },
    Directive {
        name: String,
        #[serde(skip)]
        descriptor: &'static DirectiveDescriptor,
        imported: bool,
    },
    MalformedDirective {
        name: String,
        #[serde(skip)]
        descriptor: &'static DirectiveDescriptor,
        imported: bool,
    },
    DirectiveToken {
        kind: DirectiveTokenKind,
        content: String,
    },
    /// A component element; attribute nodes come first, then body content.
    MarkupElement {
        tag_name: String,
    },
    /// A run of static markup serialized to one literal.
    MarkupBlock {
        content: String,
    },
    /// `encoded` content is emitted verbatim; otherwise it is plain text and
    /// gets HTML-encoded on output.
    HtmlContent {
        encoded: bool,
    },
    HtmlAttribute {
        attribute_name: String,
        /// Authored text before the value, e.g. ` class="`.
        prefix: String,
        /// Closing quote; `None` for a minimized attribute.
        suffix: Option<String>,
    },
    HtmlAttributeValue {
        prefix: String,
    },
    CSharpExpressionAttributeValue {
        prefix: String,
    },
    CSharpCodeAttributeValue {
        prefix: String,
    },
    CSharpExpression,
    CSharpCode,
    Template,
    TagHelper {
        tag_name: String,
        tag_mode: TagMode,
        tag_helpers: Vec<String>,
    },
    TagHelperBody,
    TagHelperProperty {
        attribute_name: String,
        property_name: String,
        type_name: String,
    },
    TagHelperHtmlAttribute {
        attribute_name: String,
    },
    Token {
        kind: TokenKind,
        content: String,
    },
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Document { .. } => "Document",
            NodeKind::Checksum { .. } => "Checksum",
            NodeKind::NamespaceDeclaration { .. } => "NamespaceDeclaration",
            NodeKind::UsingDirective { .. } => "UsingDirective",
            NodeKind::ClassDeclaration { .. } => "ClassDeclaration",
            NodeKind::MethodDeclaration { .. } => "MethodDeclaration",
            NodeKind::Directive { .. } => "Directive",
            NodeKind::MalformedDirective { .. } => "MalformedDirective",
            NodeKind::DirectiveToken { .. } => "DirectiveToken",
            NodeKind::MarkupElement { .. } => "MarkupElement",
            NodeKind::MarkupBlock { .. } => "MarkupBlock",
            NodeKind::HtmlContent { .. } => "HtmlContent",
            NodeKind::HtmlAttribute { .. } => "HtmlAttribute",
            NodeKind::HtmlAttributeValue { .. } => "HtmlAttributeValue",
            NodeKind::CSharpExpressionAttributeValue { .. } => "CSharpExpressionAttributeValue",
            NodeKind::CSharpCodeAttributeValue { .. } => "CSharpCodeAttributeValue",
            NodeKind::CSharpExpression => "CSharpExpression",
            NodeKind::CSharpCode => "CSharpCode",
            NodeKind::Template => "Template",
            NodeKind::TagHelper { .. } => "TagHelper",
            NodeKind::TagHelperBody => "TagHelperBody",
            NodeKind::TagHelperProperty { .. } => "TagHelperProperty",
            NodeKind::TagHelperHtmlAttribute { .. } => "TagHelperHtmlAttribute",
            NodeKind::Token { .. } => "Token",
        }
    }

    pub fn html_token(content: impl Into<String>) -> Self {
        NodeKind::Token {
            kind: TokenKind::Html,
            content: content.into(),
        }
    }

    pub fn csharp_token(content: impl Into<String>) -> Self {
        NodeKind::Token {
            kind: TokenKind::CSharp,
            content: content.into(),
        }
    }

    /// Directive name for both well-formed and malformed directives.
    pub fn directive_name(&self) -> Option<&str> {
        match self {
            NodeKind::Directive { name, .. } | NodeKind::MalformedDirective { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }
}

/// One arena slot.
#[derive(Debug, Clone)]
pub struct IntermediateNode {
    pub kind: NodeKind,
    pub source: Option<SourceSpan>,
    pub diagnostics: Vec<RazorDiagnostic>,
    pub(super) parent: Option<NodeId>,
    pub(super) children: SmallVec<[NodeId; 4]>,
}

impl IntermediateNode {
    pub(super) fn new(kind: NodeKind, source: Option<SourceSpan>) -> Self {
        IntermediateNode {
            kind,
            source,
            diagnostics: Vec::new(),
            parent: None,
            children: SmallVec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn has_error_diagnostics(&self) -> bool {
        self.diagnostics.iter().any(RazorDiagnostic::is_error)
    }
}
