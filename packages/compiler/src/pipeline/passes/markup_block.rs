//! Markup Block Pass
//!
//! Collapses maximal runs of static sibling markup into one `MarkupBlock`
//! holding the serialized HTML. A run member is an element or content node
//! whose whole subtree is plain markup with no error diagnostics. Elements
//! that can't be collapsed are searched for runs among their own children.
//!
//! Left alone entirely, contents included:
//! - `<script>` elements, whose content is emitted verbatim
//! - `<option>` under a `<select>`, which browsers normalize on their own

use tracing::trace;

use crate::code_document::CodeDocument;
use crate::ir::{IntermediateTree, NodeId, NodeKind, TokenKind};
use crate::parse_util::SourceSpan;
use crate::pipeline::{IntermediateNodePass, PhaseKind};
use crate::syntax::html_tags::is_void_element;

pub struct MarkupBlockPass;

impl IntermediateNodePass for MarkupBlockPass {
    fn name(&self) -> &'static str {
        "markup-block"
    }

    fn phase(&self) -> PhaseKind {
        PhaseKind::Optimization
    }

    fn order(&self) -> i32 {
        10020
    }

    fn execute(&self, document: &CodeDocument, tree: &mut IntermediateTree) {
        if !document.file_kind.is_component() {
            return;
        }
        let root = tree.root();
        let blocks = rewrite_container(tree, root);
        trace!(blocks, "merged static markup");
    }
}

fn rewrite_container(tree: &mut IntermediateTree, container: NodeId) -> usize {
    let children = tree.children(container).to_vec();
    let mut blocks = 0;
    let mut runs: Vec<(usize, usize)> = Vec::new();
    let mut run_start = None;

    for (index, child) in children.iter().enumerate() {
        let is_candidate = matches!(
            tree.kind(*child),
            NodeKind::MarkupElement { .. } | NodeKind::HtmlContent { .. }
        );
        if is_candidate && is_staticizable(tree, *child) {
            run_start.get_or_insert(index);
            continue;
        }
        if let Some(start) = run_start.take() {
            runs.push((start, index));
        }
        if is_container(tree.kind(*child)) && !is_excluded_element(tree, *child) {
            blocks += rewrite_container(tree, *child);
        }
    }
    if let Some(start) = run_start {
        runs.push((start, children.len()));
    }

    // Right to left, so earlier indices stay valid.
    for (start, end) in runs.into_iter().rev() {
        let members = &children[start..end];
        let mut content = String::new();
        let mut source: Option<SourceSpan> = None;
        for member in members {
            serialize(tree, *member, &mut content);
            if let Some(span) = tree.source(*member) {
                source = Some(match source {
                    Some(existing) => existing.merge(span),
                    None => span.clone(),
                });
            }
        }
        let block = tree.create(NodeKind::MarkupBlock { content }, source);
        tree.replace_children(container, start..end, block);
        blocks += 1;
    }
    blocks
}

fn is_container(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Document { .. }
            | NodeKind::NamespaceDeclaration { .. }
            | NodeKind::ClassDeclaration { .. }
            | NodeKind::MethodDeclaration { .. }
            | NodeKind::MarkupElement { .. }
            | NodeKind::TagHelper { .. }
            | NodeKind::TagHelperBody
            | NodeKind::Directive { .. }
            | NodeKind::MalformedDirective { .. }
            | NodeKind::Template
    )
}

fn is_staticizable(tree: &IntermediateTree, id: NodeId) -> bool {
    let node = tree.node(id);
    if node.has_error_diagnostics() {
        return false;
    }
    match &node.kind {
        NodeKind::MarkupElement { .. } => {
            if is_excluded_element(tree, id) {
                return false;
            }
            node.children()
                .iter()
                .all(|child| is_staticizable(tree, *child))
        }
        NodeKind::HtmlAttribute { .. } | NodeKind::HtmlAttributeValue { .. } => node
            .children()
            .iter()
            .all(|child| is_staticizable(tree, *child)),
        NodeKind::HtmlContent { .. } => tree.has_only_html_tokens(id),
        NodeKind::Token {
            kind: TokenKind::Html,
            ..
        } => true,
        _ => false,
    }
}

/// Elements left alone entirely: neither collapsed nor searched for runs.
fn is_excluded_element(tree: &IntermediateTree, id: NodeId) -> bool {
    match tree.kind(id) {
        NodeKind::MarkupElement { tag_name } => {
            tag_name.eq_ignore_ascii_case("script")
                || (tag_name.eq_ignore_ascii_case("option") && has_select_ancestor(tree, id))
        }
        _ => false,
    }
}

fn has_select_ancestor(tree: &IntermediateTree, id: NodeId) -> bool {
    tree.ancestors(id).any(|ancestor| {
        matches!(
            tree.kind(ancestor),
            NodeKind::MarkupElement { tag_name } if tag_name.eq_ignore_ascii_case("select")
        )
    })
}

fn serialize(tree: &IntermediateTree, id: NodeId, out: &mut String) {
    match tree.kind(id) {
        NodeKind::MarkupElement { tag_name } => {
            out.push('<');
            out.push_str(tag_name);
            let (attributes, body): (Vec<NodeId>, Vec<NodeId>) = tree
                .children(id)
                .iter()
                .partition(|child| matches!(tree.kind(**child), NodeKind::HtmlAttribute { .. }));
            for attribute in attributes {
                serialize_attribute(tree, attribute, out);
            }
            out.push('>');
            if is_void_element(tag_name) {
                return;
            }
            for child in body {
                serialize(tree, child, out);
            }
            out.push_str("</");
            out.push_str(tag_name);
            out.push('>');
        }
        NodeKind::HtmlContent { encoded: true } => out.push_str(&tree.content(id)),
        NodeKind::HtmlContent { encoded: false } => escape_text(&tree.content(id), out),
        _ => {}
    }
}

fn serialize_attribute(tree: &IntermediateTree, id: NodeId, out: &mut String) {
    let NodeKind::HtmlAttribute {
        attribute_name,
        prefix,
        suffix,
    } = tree.kind(id)
    else {
        return;
    };
    out.push(' ');
    out.push_str(attribute_name);
    if suffix.is_none() {
        return;
    }
    let quote = match prefix.chars().last() {
        Some(q @ ('"' | '\'')) => q,
        _ => '"',
    };
    let escaped = if quote == '"' { "&quot;" } else { "&#39;" };

    let mut value = String::new();
    for child in tree.children(id) {
        if let NodeKind::HtmlAttributeValue { prefix } = tree.kind(*child) {
            value.push_str(prefix);
            value.push_str(&tree.content(*child));
        }
    }
    out.push('=');
    out.push(quote);
    for c in value.chars() {
        if c == quote {
            out.push_str(escaped);
        } else {
            out.push(c);
        }
    }
    out.push(quote);
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
