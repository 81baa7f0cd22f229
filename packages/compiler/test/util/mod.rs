#![allow(dead_code)]

/**
 * Pipeline Test Utilities
 *
 * Builds documents from template text and flattens IR trees into
 * `[kind, detail, depth]` rows that read well in assertions.
 */
use razor_compiler::ir::{IntermediateTree, NodeId, NodeKind};
use razor_compiler::pipeline::binder::bind_tag_helpers;
use razor_compiler::pipeline::lowering::lower_document;
use razor_compiler::syntax::parse;
use razor_compiler::{CodeDocument, RazorEngine, SourceDocument, TagHelperDescriptor};

pub fn document(text: &str, path: &str) -> CodeDocument {
    CodeDocument::new(SourceDocument::new(text, path))
}

/// Parse, bind and lower without running any pass.
pub fn lower(mut document: CodeDocument) -> CodeDocument {
    document.syntax_tree = Some(parse(&document.source, document.file_kind));
    document.import_syntax_trees = document
        .imports
        .iter()
        .map(|import| parse(import, import_kind(&document)))
        .collect();
    bind_tag_helpers(&mut document).unwrap();
    lower_document(&mut document).unwrap();
    document
}

pub fn lower_text(text: &str, path: &str) -> CodeDocument {
    lower(document(text, path))
}

/// Run the full default pipeline.
pub fn process(text: &str, path: &str) -> CodeDocument {
    let mut document = document(text, path);
    RazorEngine::create_default().process(&mut document).unwrap();
    document
}

pub fn process_with_tag_helpers(
    text: &str,
    path: &str,
    tag_helpers: Vec<TagHelperDescriptor>,
) -> CodeDocument {
    let mut document = document(text, path).with_tag_helpers(tag_helpers);
    RazorEngine::create_default().process(&mut document).unwrap();
    document
}

fn import_kind(document: &CodeDocument) -> razor_compiler::FileKind {
    if document.file_kind.is_component() {
        razor_compiler::FileKind::ComponentImport
    } else {
        razor_compiler::FileKind::Legacy
    }
}

pub fn tree(document: &CodeDocument) -> &IntermediateTree {
    document.ir_document.as_ref().expect("document was not lowered")
}

/// Rows for everything under the rendering method.
pub fn humanize_method(tree: &IntermediateTree) -> Vec<Vec<String>> {
    let method = tree.method().expect("no method declaration");
    humanize_from(tree, method)
}

/// Rows for the whole tree below the document node.
pub fn humanize_ir(tree: &IntermediateTree) -> Vec<Vec<String>> {
    humanize_from(tree, tree.root())
}

fn humanize_from(tree: &IntermediateTree, start: NodeId) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for child in tree.children(start) {
        humanize_node(tree, *child, 0, &mut rows);
    }
    rows
}

fn humanize_node(tree: &IntermediateTree, id: NodeId, depth: usize, rows: &mut Vec<Vec<String>>) {
    let kind = tree.kind(id);
    rows.push(vec![
        kind.name().to_string(),
        detail(tree, id, kind),
        depth.to_string(),
    ]);
    // Token rows add noise; their text is already in the parent's detail.
    for child in tree.children(id) {
        if !matches!(tree.kind(*child), NodeKind::Token { .. }) {
            humanize_node(tree, *child, depth + 1, rows);
        }
    }
}

fn detail(tree: &IntermediateTree, id: NodeId, kind: &NodeKind) -> String {
    match kind {
        NodeKind::Checksum { algorithm, .. } => algorithm.clone(),
        NodeKind::NamespaceDeclaration { content } | NodeKind::UsingDirective { content, .. } => {
            content.clone()
        }
        NodeKind::ClassDeclaration { class_name, .. } => class_name.clone(),
        NodeKind::MethodDeclaration { method_name, .. } => method_name.clone(),
        NodeKind::Directive { name, .. } | NodeKind::MalformedDirective { name, .. } => name.clone(),
        NodeKind::DirectiveToken { content, .. } => content.clone(),
        NodeKind::MarkupElement { tag_name } | NodeKind::TagHelper { tag_name, .. } => {
            tag_name.clone()
        }
        NodeKind::MarkupBlock { content } => content.clone(),
        NodeKind::HtmlAttribute { attribute_name, .. }
        | NodeKind::TagHelperProperty { attribute_name, .. }
        | NodeKind::TagHelperHtmlAttribute { attribute_name } => attribute_name.clone(),
        NodeKind::HtmlContent { .. }
        | NodeKind::HtmlAttributeValue { .. }
        | NodeKind::CSharpExpressionAttributeValue { .. }
        | NodeKind::CSharpCodeAttributeValue { .. }
        | NodeKind::CSharpExpression
        | NodeKind::CSharpCode => tree.content(id),
        _ => String::new(),
    }
}

/// Shorthand for building expected rows.
pub fn row(kind: &str, detail: &str, depth: usize) -> Vec<String> {
    vec![kind.to_string(), detail.to_string(), depth.to_string()]
}

pub fn diagnostic_ids(document: &CodeDocument) -> Vec<&'static str> {
    document.diagnostics().iter().map(|d| d.id()).collect()
}
