//! Lowering Phase
//!
//! Turns the syntax tree (plus imports and bound tag helpers) into the IR
//! document:
//!
//! ```text
//! Document
//!   Checksum                 (unless suppressed)
//!   NamespaceDeclaration
//!     UsingDirective*        (imported usings first)
//!     ClassDeclaration
//!       MethodDeclaration
//!         imported directives, then the document content in source order
//! ```
//!
//! Components lower markup to `MarkupElement` trees. Legacy templates keep
//! markup flat: tags become HTML content and only attributes with code in
//! their values get attribute nodes. Malformed input never stops lowering;
//! problems end up as diagnostics on the nearest node.

use std::collections::HashSet;

use tracing::trace;
use xxhash_rust::xxh3::xxh3_64;

use crate::code_document::{CodeDocument, FileKind};
use crate::diagnostics::{DiagnosticKind, RazorDiagnostic};
use crate::error::{EngineError, Result};
use crate::ir::{IntermediateNodeBuilder, IntermediateTree, NodeId, NodeKind};
use crate::parse_util::{SourceDocument, SourceSpan};
use crate::syntax::directives::{DirectiveKind, DirectiveUsage};
use crate::syntax::html_tags::is_void_element;
use crate::syntax::{
    AttributeValue, CSharpCodeBlock, CSharpExpression, MarkupAttribute, MarkupElement,
    RazorDirective, StartTag, SyntaxNode, SyntaxTree,
};
use crate::tag_helpers::{TagHelperBinder, TagHelperBinding, TagMode};

pub const CHECKSUM_ALGORITHM: &str = "XXH3_64";

pub fn lower_document(document: &mut CodeDocument) -> Result<()> {
    let syntax_tree = document
        .syntax_tree
        .as_ref()
        .ok_or(EngineError::MissingDocumentDependency {
            phase: "lowering",
            dependency: "a syntax tree",
        })?;
    let default_binder = TagHelperBinder::default();
    let binder = document.bound_tag_helpers.as_ref().unwrap_or(&default_binder);

    let mut tree = IntermediateTree::new(
        NodeKind::Document {
            file_kind: document.file_kind,
            options: document.options.clone(),
        },
        None,
    );
    let root = tree.root();
    let mut builder = IntermediateNodeBuilder::new(&mut tree, root);

    if !document.options.suppress_checksum {
        builder.add(
            NodeKind::Checksum {
                algorithm: CHECKSUM_ALGORITHM.to_string(),
                checksum: format!("{:016x}", xxh3_64(document.source.content.as_bytes())),
            },
            None,
        )?;
    }
    let namespace = builder.push(
        NodeKind::NamespaceDeclaration {
            content: String::new(),
        },
        None,
    )?;
    builder.push(
        NodeKind::ClassDeclaration {
            class_name: String::new(),
            base_type: None,
            modifiers: Vec::new(),
            interfaces: Vec::new(),
        },
        None,
    )?;
    builder.push(
        NodeKind::MethodDeclaration {
            method_name: String::new(),
            return_type: String::new(),
            modifiers: Vec::new(),
        },
        None,
    )?;

    let mut imported_usings = Vec::new();
    for import in &document.import_syntax_trees {
        for diagnostic in import.all_diagnostics() {
            builder.tree_mut().add_diagnostic(root, diagnostic);
        }
        let mut lowerer = Lowerer::new(builder, &import.source, document.file_kind, binder, namespace);
        lowerer.imported = true;
        lowerer.lower_import(import, &mut imported_usings)?;
        builder = lowerer.builder;
    }

    let mut lowerer = Lowerer::new(builder, &syntax_tree.source, document.file_kind, binder, namespace);
    lowerer.lower_nodes(&syntax_tree.nodes)?;
    let mut builder = lowerer.builder;
    for _ in 0..3 {
        builder.pop()?;
    }
    for diagnostic in &syntax_tree.diagnostics {
        builder.tree_mut().add_diagnostic(root, diagnostic.clone());
    }

    insert_imported_usings(&mut tree, namespace, imported_usings);
    post_process_directives(&mut tree);

    trace!(
        file = %document.source.file_path,
        nodes = tree.len(),
        "lowered document"
    );
    document.ir_document = Some(tree);
    Ok(())
}

struct Lowerer<'t, 's> {
    builder: IntermediateNodeBuilder<'t>,
    source: &'s SourceDocument,
    file_kind: FileKind,
    binder: &'s TagHelperBinder,
    namespace: NodeId,
    imported: bool,
}

impl<'t, 's> Lowerer<'t, 's> {
    fn new(
        builder: IntermediateNodeBuilder<'t>,
        source: &'s SourceDocument,
        file_kind: FileKind,
        binder: &'s TagHelperBinder,
        namespace: NodeId,
    ) -> Self {
        Lowerer {
            builder,
            source,
            file_kind,
            binder,
            namespace,
            imported: false,
        }
    }

    /// Imports contribute directives only; their markup is not output.
    fn lower_import(
        &mut self,
        tree: &SyntaxTree,
        usings: &mut Vec<(String, SourceSpan)>,
    ) -> Result<()> {
        for directive in tree.directives() {
            match using_namespace(directive) {
                Some(content) => usings.push((content.to_string(), directive.span.clone())),
                None => self.lower_directive(directive)?,
            }
        }
        Ok(())
    }

    fn lower_nodes(&mut self, nodes: &[SyntaxNode]) -> Result<()> {
        for node in nodes {
            self.lower_node(node)?;
        }
        Ok(())
    }

    fn lower_node(&mut self, node: &SyntaxNode) -> Result<()> {
        if self.file_kind == FileKind::ComponentImport
            && !self.imported
            && !matches!(node, SyntaxNode::Text(_) | SyntaxNode::Directive(_))
        {
            self.add_document_diagnostic(
                DiagnosticKind::UnsupportedComponentImportContent,
                node.span(),
                "",
            );
        }
        match node {
            SyntaxNode::Text(text) => self.add_html(&text.content, text.span.clone()),
            SyntaxNode::Comment(comment) => {
                if self.file_kind.is_component() {
                    Ok(())
                } else {
                    let text = self.source.text(&comment.span).to_string();
                    self.add_html(&text, comment.span.clone())
                }
            }
            SyntaxNode::Element(element) => self.lower_element(element),
            SyntaxNode::Expression(expression) => {
                self.add_expression(expression)?;
                Ok(())
            }
            SyntaxNode::CodeBlock(block) => self.lower_code_block(block),
            SyntaxNode::Code(code) => {
                self.add_code(&code.content, code.span.clone())?;
                Ok(())
            }
            SyntaxNode::Directive(directive) => self.lower_directive(directive),
        }
    }

    // Markup

    fn lower_element(&mut self, element: &MarkupElement) -> Result<()> {
        if let Some(start_tag) = &element.start_tag {
            if let Some(binding) = self.binder.get_binding(&element.name) {
                return self.lower_tag_helper(element, start_tag, &binding);
            }
        }
        if self.file_kind.is_component() {
            self.lower_component_element(element)
        } else {
            self.lower_legacy_element(element)
        }
    }

    fn lower_component_element(&mut self, element: &MarkupElement) -> Result<()> {
        let name = &element.name;
        let Some(start_tag) = &element.start_tag else {
            let kind = if is_void_element(name) {
                DiagnosticKind::UnexpectedClosingTagForVoidElement
            } else {
                DiagnosticKind::UnexpectedClosingTag
            };
            let current = self.builder.current()?;
            self.builder.tree_mut().add_diagnostic(
                current,
                RazorDiagnostic::create(kind, Some(element.span.clone()), &[name.as_str()]),
            );
            return Ok(());
        };

        let id = self.builder.push(
            NodeKind::MarkupElement {
                tag_name: name.clone(),
            },
            Some(element.span.clone()),
        )?;
        let void = is_void_element(name);
        if name.starts_with(|c: char| c.is_ascii_uppercase()) {
            self.add_diagnostic(
                id,
                DiagnosticKind::UnexpectedMarkupElement,
                &start_tag.span,
                name,
            );
        }
        if let Some(end_tag) = &element.end_tag {
            if void {
                self.add_diagnostic(
                    id,
                    DiagnosticKind::UnexpectedClosingTagForVoidElement,
                    &end_tag.span,
                    name,
                );
            }
        } else if !start_tag.self_closing && !void {
            self.add_diagnostic(id, DiagnosticKind::UnclosedTag, &start_tag.span, name);
        }

        for attribute in &start_tag.attributes {
            self.lower_component_attribute(attribute)?;
        }
        self.lower_nodes(&element.body)?;
        self.builder.pop()?;
        Ok(())
    }

    fn lower_component_attribute(&mut self, attribute: &MarkupAttribute) -> Result<()> {
        match attribute {
            MarkupAttribute::Minimized(attr) => {
                self.builder.add(
                    NodeKind::HtmlAttribute {
                        attribute_name: attr.name.clone(),
                        prefix: format!("{}{}", attr.name_prefix, attr.name),
                        suffix: None,
                    },
                    Some(attr.span.clone()),
                )?;
            }
            MarkupAttribute::Valued(attr) => {
                self.builder.push(
                    NodeKind::HtmlAttribute {
                        attribute_name: attr.name.clone(),
                        prefix: format!("{}{}{}", attr.name_prefix, attr.name, attr.value_prefix),
                        suffix: Some(attr.value_suffix.clone()),
                    },
                    Some(attr.span.clone()),
                )?;
                self.lower_attribute_values(&attr.values, &attr.value_span)?;
                self.builder.pop()?;
            }
        }
        Ok(())
    }

    /// Attribute value pieces under the current attribute node. An empty
    /// value still gets one empty literal so `name=""` survives.
    fn lower_attribute_values(
        &mut self,
        values: &[AttributeValue],
        value_span: &SourceSpan,
    ) -> Result<()> {
        if values.is_empty() {
            self.builder.push(
                NodeKind::HtmlAttributeValue {
                    prefix: String::new(),
                },
                Some(value_span.clone()),
            )?;
            self.builder
                .add(NodeKind::html_token(""), Some(value_span.clone()))?;
            self.builder.pop()?;
            return Ok(());
        }
        for value in values {
            match value {
                AttributeValue::Literal(literal) => {
                    self.builder.push(
                        NodeKind::HtmlAttributeValue {
                            prefix: literal.prefix.clone(),
                        },
                        Some(literal.span.clone()),
                    )?;
                    self.builder.add(
                        NodeKind::html_token(literal.value.clone()),
                        Some(literal.value_span.clone()),
                    )?;
                    self.builder.pop()?;
                }
                AttributeValue::Dynamic(dynamic) => {
                    let id = self.builder.push(
                        NodeKind::CSharpExpressionAttributeValue {
                            prefix: dynamic.prefix.clone(),
                        },
                        Some(dynamic.span.clone()),
                    )?;
                    self.builder.add(
                        NodeKind::csharp_token(dynamic.expression.code.clone()),
                        Some(dynamic.expression.code_span.clone()),
                    )?;
                    for diagnostic in &dynamic.expression.diagnostics {
                        self.builder.tree_mut().add_diagnostic(id, diagnostic.clone());
                    }
                    self.builder.pop()?;
                }
            }
        }
        Ok(())
    }

    fn lower_legacy_element(&mut self, element: &MarkupElement) -> Result<()> {
        let Some(start_tag) = &element.start_tag else {
            if let Some(end_tag) = &element.end_tag {
                self.add_html(&end_tag.content, end_tag.span.clone())?;
            }
            self.add_document_diagnostic(
                DiagnosticKind::UnexpectedEndTag,
                &element.span,
                &element.name,
            );
            return Ok(());
        };

        self.add_source_html(&start_tag.open_span)?;
        for attribute in &start_tag.attributes {
            self.lower_legacy_attribute(attribute)?;
        }
        if let Some(close_span) = &start_tag.close_span {
            self.add_html(&start_tag.close_text, close_span.clone())?;
        }
        self.lower_nodes(&element.body)?;
        match &element.end_tag {
            Some(end_tag) => self.add_html(&end_tag.content, end_tag.span.clone())?,
            None => {
                if start_tag.is_finished()
                    && !start_tag.self_closing
                    && !is_void_element(&element.name)
                {
                    self.add_document_diagnostic(
                        DiagnosticKind::MissingEndTag,
                        &start_tag.span,
                        &element.name,
                    );
                }
            }
        }
        Ok(())
    }

    fn lower_legacy_attribute(&mut self, attribute: &MarkupAttribute) -> Result<()> {
        match attribute {
            MarkupAttribute::Minimized(attr) => {
                let span = self.with_prefix(&attr.span, &attr.name_prefix);
                self.add_source_html(&span)
            }
            MarkupAttribute::Valued(attr) if !attr.has_dynamic_value() => {
                let span = self.with_prefix(&attr.span, &attr.name_prefix);
                self.add_source_html(&span)
            }
            MarkupAttribute::Valued(attr) => {
                let span = self.with_prefix(&attr.span, &attr.name_prefix);
                self.builder.push(
                    NodeKind::HtmlAttribute {
                        attribute_name: attr.name.clone(),
                        prefix: format!("{}{}{}", attr.name_prefix, attr.name, attr.value_prefix),
                        suffix: Some(attr.value_suffix.clone()),
                    },
                    Some(span),
                )?;
                self.lower_attribute_values(&attr.values, &attr.value_span)?;
                self.builder.pop()?;
                Ok(())
            }
        }
    }

    fn lower_tag_helper(
        &mut self,
        element: &MarkupElement,
        start_tag: &StartTag,
        binding: &TagHelperBinding<'_>,
    ) -> Result<()> {
        let void = is_void_element(&binding.tag_name);
        let tag_mode = if start_tag.self_closing {
            TagMode::SelfClosing
        } else if element.end_tag.is_none() && void {
            TagMode::StartTagOnly
        } else {
            TagMode::StartTagAndEndTag
        };
        let id = self.builder.push(
            NodeKind::TagHelper {
                tag_name: binding.tag_name.clone(),
                tag_mode,
                tag_helpers: binding.descriptor_names(),
            },
            Some(element.span.clone()),
        )?;
        if tag_mode == TagMode::StartTagAndEndTag && element.end_tag.is_none() {
            self.add_diagnostic(id, DiagnosticKind::MissingEndTag, &start_tag.span, &element.name);
        }

        self.builder.push(NodeKind::TagHelperBody, None)?;
        self.lower_nodes(&element.body)?;
        self.builder.pop()?;

        let mut rendered = HashSet::new();
        for attribute in &start_tag.attributes {
            let name = attribute.name();
            let bound = binding
                .bound_attribute(name)
                .filter(|_| rendered.insert(name.to_ascii_lowercase()));
            match bound {
                Some(bound) => {
                    self.builder.push(
                        NodeKind::TagHelperProperty {
                            attribute_name: name.to_string(),
                            property_name: bound.property_name.clone(),
                            type_name: bound.type_name.clone(),
                        },
                        Some(attribute.span().clone()),
                    )?;
                    if let MarkupAttribute::Valued(attr) = attribute {
                        self.lower_property_values(&attr.values)?;
                    }
                    self.builder.pop()?;
                }
                None => {
                    self.builder.push(
                        NodeKind::TagHelperHtmlAttribute {
                            attribute_name: name.to_string(),
                        },
                        Some(attribute.span().clone()),
                    )?;
                    if let MarkupAttribute::Valued(attr) = attribute {
                        self.lower_attribute_values(&attr.values, &attr.value_span)?;
                    }
                    self.builder.pop()?;
                }
            }
        }
        self.builder.pop()?;
        Ok(())
    }

    /// A bound property's value: literal text as HTML content, code as
    /// expressions.
    fn lower_property_values(&mut self, values: &[AttributeValue]) -> Result<()> {
        for value in values {
            match value {
                AttributeValue::Literal(literal) => {
                    let text = format!("{}{}", literal.prefix, literal.value);
                    self.add_html(&text, literal.span.clone())?;
                }
                AttributeValue::Dynamic(dynamic) => {
                    self.add_expression(&dynamic.expression)?;
                }
            }
        }
        Ok(())
    }

    // Code

    fn add_expression(&mut self, expression: &CSharpExpression) -> Result<NodeId> {
        let id = self
            .builder
            .push(NodeKind::CSharpExpression, Some(expression.span.clone()))?;
        self.builder.add(
            NodeKind::csharp_token(expression.code.clone()),
            Some(expression.code_span.clone()),
        )?;
        for diagnostic in &expression.diagnostics {
            self.builder.tree_mut().add_diagnostic(id, diagnostic.clone());
        }
        self.builder.pop()?;
        Ok(id)
    }

    fn add_code(&mut self, content: &str, span: SourceSpan) -> Result<NodeId> {
        let id = self.builder.push(NodeKind::CSharpCode, Some(span.clone()))?;
        self.builder
            .add(NodeKind::csharp_token(content), Some(span))?;
        self.builder.pop()?;
        Ok(id)
    }

    fn lower_code_block(&mut self, block: &CSharpCodeBlock) -> Result<()> {
        let mut last_code = None;
        for child in &block.children {
            match child {
                SyntaxNode::Code(code) => {
                    last_code = Some(self.add_code(&code.content, code.span.clone())?);
                }
                other => self.lower_node(other)?,
            }
        }
        let target = match last_code {
            Some(id) => id,
            None => self.builder.tree().root(),
        };
        for diagnostic in &block.diagnostics {
            self.builder.tree_mut().add_diagnostic(target, diagnostic.clone());
        }
        Ok(())
    }

    // Directives

    fn lower_directive(&mut self, directive: &RazorDirective) -> Result<()> {
        if let Some(content) = using_namespace(directive) {
            if !self.imported {
                self.add_using(content, directive.span.clone())?;
            }
            return Ok(());
        }

        let kind = if directive.is_malformed() {
            NodeKind::MalformedDirective {
                name: directive.name.clone(),
                descriptor: directive.descriptor,
                imported: self.imported,
            }
        } else {
            NodeKind::Directive {
                name: directive.name.clone(),
                descriptor: directive.descriptor,
                imported: self.imported,
            }
        };
        let id = self.builder.push(kind, Some(directive.span.clone()))?;
        for diagnostic in &directive.diagnostics {
            self.builder.tree_mut().add_diagnostic(id, diagnostic.clone());
        }
        for token in &directive.tokens {
            self.builder.add(
                NodeKind::DirectiveToken {
                    kind: token.kind,
                    content: token.content.clone(),
                },
                Some(token.span.clone()),
            )?;
        }
        self.lower_nodes(&directive.body)?;
        self.builder.pop()?;
        Ok(())
    }

    /// Document usings go after the usings already in the namespace and
    /// before the class.
    fn add_using(&mut self, content: &str, span: SourceSpan) -> Result<()> {
        let tree = self.builder.tree_mut();
        let index = tree
            .children(self.namespace)
            .iter()
            .take_while(|child| matches!(tree.kind(**child), NodeKind::UsingDirective { .. }))
            .count();
        let id = tree.create(
            NodeKind::UsingDirective {
                content: content.to_string(),
                imported: false,
            },
            Some(span),
        );
        tree.insert_child(self.namespace, index, id);
        Ok(())
    }

    // Helpers

    /// Add literal markup, extending the previous content node when the two
    /// are contiguous in the source.
    fn add_html(&mut self, content: &str, span: SourceSpan) -> Result<()> {
        if content.is_empty() {
            return Ok(());
        }
        if let Some(last) = self.builder.last_child()? {
            let tree = self.builder.tree_mut();
            let contiguous = matches!(tree.kind(last), NodeKind::HtmlContent { .. })
                && tree.source(last).is_some_and(|prev| prev.is_adjacent(&span));
            if contiguous {
                let token = tree.create(NodeKind::html_token(content), Some(span.clone()));
                tree.append_child(last, token);
                let node = tree.node_mut(last);
                node.source = node.source.as_ref().map(|prev| prev.merge(&span));
                return Ok(());
            }
        }
        self.builder
            .push(NodeKind::HtmlContent { encoded: false }, Some(span.clone()))?;
        self.builder.add(NodeKind::html_token(content), Some(span))?;
        self.builder.pop()?;
        Ok(())
    }

    fn add_source_html(&mut self, span: &SourceSpan) -> Result<()> {
        let text = self.source.text(span).to_string();
        self.add_html(&text, span.clone())
    }

    fn with_prefix(&self, span: &SourceSpan, prefix: &str) -> SourceSpan {
        let start = span.absolute_index.saturating_sub(prefix.len());
        self.source.span(start, span.end())
    }

    fn add_diagnostic(&mut self, id: NodeId, kind: DiagnosticKind, span: &SourceSpan, arg: &str) {
        self.builder
            .tree_mut()
            .add_diagnostic(id, RazorDiagnostic::create(kind, Some(span.clone()), &[arg]));
    }

    fn add_document_diagnostic(&mut self, kind: DiagnosticKind, span: &SourceSpan, arg: &str) {
        let root = self.builder.tree().root();
        self.add_diagnostic(root, kind, span, arg);
    }
}

fn using_namespace(directive: &RazorDirective) -> Option<&str> {
    if directive.name == "using" && !directive.is_malformed() {
        directive.first_token()
    } else {
        None
    }
}

/// Imported usings go to the head of the namespace in import order,
/// skipping any the namespace already has.
fn insert_imported_usings(
    tree: &mut IntermediateTree,
    namespace: NodeId,
    usings: Vec<(String, SourceSpan)>,
) {
    let mut present: HashSet<String> = tree
        .children(namespace)
        .iter()
        .filter_map(|child| match tree.kind(*child) {
            NodeKind::UsingDirective { content, .. } => Some(content.clone()),
            _ => None,
        })
        .collect();
    let mut index = 0;
    for (content, span) in usings {
        if !present.insert(content.clone()) {
            continue;
        }
        let id = tree.create(
            NodeKind::UsingDirective {
                content,
                imported: true,
            },
            Some(span),
        );
        tree.insert_child(namespace, index, id);
        index += 1;
    }
}

/// Drop imported file-scoped directives the document (or a later import)
/// overrides, and imported block directives that may occur only once.
fn post_process_directives(tree: &mut IntermediateTree) {
    let directives = tree.find_all(|kind| kind.directive_name().is_some());
    for (position, id) in directives.iter().enumerate() {
        let (name, descriptor, imported) = match tree.kind(*id) {
            NodeKind::Directive {
                name,
                descriptor,
                imported,
            }
            | NodeKind::MalformedDirective {
                name,
                descriptor,
                imported,
            } => (name.clone(), *descriptor, *imported),
            _ => continue,
        };
        if !imported || descriptor.usage != DirectiveUsage::FileScopedSinglyOccurring {
            continue;
        }
        if descriptor.kind != DirectiveKind::SingleLine {
            let source = tree.source(*id).cloned();
            let root = tree.root();
            tree.add_diagnostic(
                root,
                RazorDiagnostic::create(
                    DiagnosticKind::BlockDirectiveCannotBeImported,
                    source,
                    &[name.as_str()],
                ),
            );
            tree.detach(*id);
            trace!(directive = %name, "removed imported block directive");
            continue;
        }
        let overridden = directives[position + 1..]
            .iter()
            .any(|later| tree.kind(*later).directive_name() == Some(name.as_str()));
        if overridden {
            tree.detach(*id);
            trace!(directive = %name, "removed overridden imported directive");
        }
    }
}
