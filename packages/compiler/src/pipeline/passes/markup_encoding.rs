//! Markup Encoding Pass
//!
//! Decides for each HTML content node whether its text is emitted verbatim
//! (`encoded = true`) or treated as plain text and escaped on output.
//! Plain text with well-formed character references is decoded in place.

use tracing::trace;

use crate::chars;
use crate::code_document::CodeDocument;
use crate::entities::resolve_entity;
use crate::ir::{IntermediateTree, NodeId, NodeKind};
use crate::pipeline::{IntermediateNodePass, PhaseKind};
use crate::syntax::html_tags::is_raw_text_element;

pub struct MarkupEncodingPass;

impl IntermediateNodePass for MarkupEncodingPass {
    fn name(&self) -> &'static str {
        "markup-encoding"
    }

    fn phase(&self) -> PhaseKind {
        PhaseKind::Optimization
    }

    fn order(&self) -> i32 {
        10010
    }

    fn execute(&self, document: &CodeDocument, tree: &mut IntermediateTree) {
        if !document.file_kind.is_component() {
            return;
        }
        let mut encoded = 0;
        let mut decoded = 0;
        for content in tree.find_all(|kind| matches!(kind, NodeKind::HtmlContent { .. })) {
            if !tree.has_only_html_tokens(content) {
                continue;
            }
            let text = tree.content(content);
            let verbatim = if in_raw_text_element(tree, content) || !is_printable_ascii(&text) {
                true
            } else if text.contains('&') {
                match decode_entities(&text) {
                    Some(plain) => {
                        replace_tokens(tree, content, plain);
                        decoded += 1;
                        false
                    }
                    None => true,
                }
            } else {
                false
            };
            if verbatim {
                encoded += 1;
            }
            *tree.kind_mut(content) = NodeKind::HtmlContent { encoded: verbatim };
        }
        trace!(encoded, decoded, "classified markup encoding");
    }
}

/// Browsers never decode references inside `<script>` or `<style>`.
fn in_raw_text_element(tree: &IntermediateTree, id: NodeId) -> bool {
    tree.ancestors(id).any(|ancestor| {
        matches!(
            tree.kind(ancestor),
            NodeKind::MarkupElement { tag_name } if is_raw_text_element(tag_name)
        )
    })
}

fn is_printable_ascii(text: &str) -> bool {
    text.chars().all(chars::is_printable_ascii)
}

/// Decode every `&...;` reference, or `None` if any `&` does not start a
/// reference that resolves.
pub fn decode_entities(text: &str) -> Option<String> {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after.find(';')?;
        result.push_str(&resolve_entity(&after[..semi])?);
        rest = &after[semi + 1..];
    }
    result.push_str(rest);
    Some(result)
}

fn replace_tokens(tree: &mut IntermediateTree, content: NodeId, text: String) {
    let tokens = tree.take_children(content);
    let source = tokens
        .first()
        .and_then(|first| tree.source(*first).cloned())
        .map(|start| match tokens.last().and_then(|last| tree.source(*last)) {
            Some(end) => start.merge(end),
            None => start,
        });
    let token = tree.create(NodeKind::html_token(text), source);
    tree.append_child(content, token);
}
