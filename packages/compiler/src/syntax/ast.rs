//! Razor Syntax Tree
//!
//! Typed syntax nodes produced by the markup parser and consumed by the
//! lowering phase. The tree keeps the authored text pieces (attribute
//! prefixes, tag closers) needed to rebuild markup exactly.

use serde::Serialize;

use super::directives::{DirectiveDescriptor, DirectiveTokenKind};
use crate::code_document::FileKind;
use crate::diagnostics::RazorDiagnostic;
use crate::parse_util::{SourceDocument, SourceSpan};

#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub source: SourceDocument,
    pub file_kind: FileKind,
    pub nodes: Vec<SyntaxNode>,
    /// Diagnostics that belong to no particular node.
    pub diagnostics: Vec<RazorDiagnostic>,
}

impl SyntaxTree {
    /// Every diagnostic in the tree: tree-level first, then node-attached
    /// ones in document order.
    pub fn all_diagnostics(&self) -> Vec<RazorDiagnostic> {
        let mut result = self.diagnostics.clone();
        for node in &self.nodes {
            node.collect_diagnostics(&mut result);
        }
        result
    }

    pub fn directives(&self) -> Vec<&RazorDirective> {
        let mut result = Vec::new();
        for node in &self.nodes {
            node.collect_directives(&mut result);
        }
        result
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum SyntaxNode {
    Text(TextLiteral),
    Comment(MarkupComment),
    Element(MarkupElement),
    Expression(CSharpExpression),
    CodeBlock(CSharpCodeBlock),
    /// Raw code inside a code block or statement.
    Code(CodeLiteral),
    Directive(RazorDirective),
}

impl SyntaxNode {
    pub fn span(&self) -> &SourceSpan {
        match self {
            SyntaxNode::Text(n) => &n.span,
            SyntaxNode::Comment(n) => &n.span,
            SyntaxNode::Element(n) => &n.span,
            SyntaxNode::Expression(n) => &n.span,
            SyntaxNode::CodeBlock(n) => &n.span,
            SyntaxNode::Code(n) => &n.span,
            SyntaxNode::Directive(n) => &n.span,
        }
    }

    fn collect_diagnostics(&self, out: &mut Vec<RazorDiagnostic>) {
        match self {
            SyntaxNode::Element(element) => {
                for child in &element.body {
                    child.collect_diagnostics(out);
                }
            }
            SyntaxNode::Expression(expr) => out.extend(expr.diagnostics.iter().cloned()),
            SyntaxNode::CodeBlock(block) => {
                out.extend(block.diagnostics.iter().cloned());
                for child in &block.children {
                    child.collect_diagnostics(out);
                }
            }
            SyntaxNode::Directive(directive) => {
                out.extend(directive.diagnostics.iter().cloned());
                for child in &directive.body {
                    child.collect_diagnostics(out);
                }
            }
            SyntaxNode::Text(_) | SyntaxNode::Comment(_) | SyntaxNode::Code(_) => {}
        }
    }

    fn collect_directives<'a>(&'a self, out: &mut Vec<&'a RazorDirective>) {
        match self {
            SyntaxNode::Directive(directive) => out.push(directive),
            SyntaxNode::Element(element) => {
                for child in &element.body {
                    child.collect_directives(out);
                }
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TextLiteral {
    pub content: String,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkupComment {
    pub content: String,
    pub span: SourceSpan,
}

/// An element as authored. Either tag may be missing: a start tag with no
/// end tag is unclosed, an end tag with no start tag is unmatched.
#[derive(Debug, Clone, Serialize)]
pub struct MarkupElement {
    pub name: String,
    pub start_tag: Option<StartTag>,
    pub end_tag: Option<EndTag>,
    pub body: Vec<SyntaxNode>,
    pub span: SourceSpan,
}

impl MarkupElement {
    pub fn is_self_closing(&self) -> bool {
        self.start_tag.as_ref().is_some_and(|tag| tag.self_closing)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StartTag {
    pub name: String,
    pub attributes: Vec<MarkupAttribute>,
    pub self_closing: bool,
    /// Covers `<name`.
    pub open_span: SourceSpan,
    /// Whitespace before the closer plus `>` or `/>`; empty when unfinished.
    pub close_text: String,
    pub close_span: Option<SourceSpan>,
    pub span: SourceSpan,
}

impl StartTag {
    pub fn is_finished(&self) -> bool {
        self.close_span.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EndTag {
    pub name: String,
    pub content: String,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Serialize)]
pub enum MarkupAttribute {
    Minimized(MinimizedAttribute),
    Valued(ValuedAttribute),
}

impl MarkupAttribute {
    pub fn name(&self) -> &str {
        match self {
            MarkupAttribute::Minimized(attr) => &attr.name,
            MarkupAttribute::Valued(attr) => &attr.name,
        }
    }

    pub fn span(&self) -> &SourceSpan {
        match self {
            MarkupAttribute::Minimized(attr) => &attr.span,
            MarkupAttribute::Valued(attr) => &attr.span,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MinimizedAttribute {
    /// Whitespace before the name.
    pub name_prefix: String,
    pub name: String,
    pub span: SourceSpan,
}

/// `name="value"`. For ` class="a @b"` the pieces are `name_prefix = " "`,
/// `value_prefix = "=\""`, values `[Literal("", "a"), Dynamic(" ", b)]` and
/// `value_suffix = "\""`.
#[derive(Debug, Clone, Serialize)]
pub struct ValuedAttribute {
    pub name_prefix: String,
    pub name: String,
    pub value_prefix: String,
    pub values: Vec<AttributeValue>,
    pub value_suffix: String,
    pub span: SourceSpan,
    pub value_span: SourceSpan,
}

impl ValuedAttribute {
    pub fn has_dynamic_value(&self) -> bool {
        self.values
            .iter()
            .any(|value| matches!(value, AttributeValue::Dynamic(_)))
    }

    /// Authored text of the value between the quotes.
    pub fn literal_value(&self) -> String {
        let mut text = String::new();
        for value in &self.values {
            match value {
                AttributeValue::Literal(literal) => {
                    text.push_str(&literal.prefix);
                    text.push_str(&literal.value);
                }
                AttributeValue::Dynamic(dynamic) => {
                    text.push_str(&dynamic.prefix);
                    text.push('@');
                    text.push_str(&dynamic.expression.code);
                }
            }
        }
        text
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum AttributeValue {
    Literal(LiteralAttributeValue),
    Dynamic(DynamicAttributeValue),
}

#[derive(Debug, Clone, Serialize)]
pub struct LiteralAttributeValue {
    pub prefix: String,
    pub value: String,
    pub span: SourceSpan,
    pub value_span: SourceSpan,
}

#[derive(Debug, Clone, Serialize)]
pub struct DynamicAttributeValue {
    pub prefix: String,
    pub expression: CSharpExpression,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Serialize)]
pub struct CSharpExpression {
    pub code: String,
    /// `@( ... )` rather than `@name.chain`.
    pub explicit: bool,
    pub span: SourceSpan,
    pub code_span: SourceSpan,
    pub diagnostics: Vec<RazorDiagnostic>,
}

/// `@{ ... }` or a control-flow statement: code literals interleaved with
/// markup.
#[derive(Debug, Clone, Serialize)]
pub struct CSharpCodeBlock {
    pub children: Vec<SyntaxNode>,
    pub span: SourceSpan,
    pub diagnostics: Vec<RazorDiagnostic>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodeLiteral {
    pub content: String,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Serialize)]
pub struct RazorDirective {
    pub name: String,
    #[serde(skip)]
    pub descriptor: &'static DirectiveDescriptor,
    pub tokens: Vec<DirectiveToken>,
    /// Block contents for `@section`, `@code` and `@functions`.
    pub body: Vec<SyntaxNode>,
    pub span: SourceSpan,
    pub diagnostics: Vec<RazorDiagnostic>,
}

impl RazorDirective {
    pub fn is_malformed(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn first_token(&self) -> Option<&str> {
        self.tokens.first().map(|token| token.content.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectiveToken {
    pub kind: DirectiveTokenKind,
    pub content: String,
    pub span: SourceSpan,
}
