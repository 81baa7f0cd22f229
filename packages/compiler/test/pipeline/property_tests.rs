/**
 * Pipeline Property Tests
 *
 * Generated component markup pushed through lowering and the default
 * passes.
 */

#[path = "../util/mod.rs"]
mod utils;

use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Markup {
    Text(String),
    Whitespace(String),
    Expression(String),
    Element {
        name: &'static str,
        attributes: Vec<(String, Option<String>)>,
        children: Vec<Markup>,
    },
}

impl Markup {
    fn render(&self, out: &mut String) {
        match self {
            Markup::Text(text) | Markup::Whitespace(text) => out.push_str(text),
            Markup::Expression(name) => {
                out.push_str("@(");
                out.push_str(name);
                out.push(')');
            }
            Markup::Element {
                name,
                attributes,
                children,
            } => {
                out.push('<');
                out.push_str(name);
                for (attribute, value) in attributes {
                    out.push(' ');
                    out.push_str(attribute);
                    if let Some(value) = value {
                        out.push_str("=\"");
                        out.push_str(value);
                        out.push('"');
                    }
                }
                out.push('>');
                for child in children {
                    child.render(out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
    }

    fn is_static(&self) -> bool {
        match self {
            Markup::Text(_) => true,
            Markup::Whitespace(_) | Markup::Expression(_) => false,
            Markup::Element { children, .. } => children.iter().all(Markup::is_static),
        }
    }
}

fn render_all(nodes: &[Markup]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.render(&mut out);
    }
    out
}

fn element_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["div", "p", "span", "b", "section", "ul", "li", "em"])
}

fn attributes() -> impl Strategy<Value = Vec<(String, Option<String>)>> {
    prop::collection::btree_map(
        "[a-z]{1,6}",
        prop::option::of("[a-z0-9]{0,5}"),
        0..3,
    )
    .prop_map(|map| map.into_iter().collect())
}

/// Text that starts and ends with a letter, so trimming never touches it.
fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z]([a-zA-Z ,.]{0,8}[a-zA-Z])?"
}

fn static_markup() -> impl Strategy<Value = Markup> {
    let leaf = text().prop_map(Markup::Text);
    leaf.prop_recursive(4, 24, 4, |inner| {
        (element_name(), attributes(), prop::collection::vec(inner, 0..4)).prop_map(
            |(name, attributes, children)| Markup::Element {
                name,
                attributes,
                children,
            },
        )
    })
}

fn mixed_markup() -> impl Strategy<Value = Markup> {
    let leaf = prop_oneof![
        text().prop_map(Markup::Text),
        "[ \n]{1,4}".prop_map(Markup::Whitespace),
        "[a-z]{1,6}".prop_map(Markup::Expression),
    ];
    leaf.prop_recursive(4, 24, 4, |inner| {
        (element_name(), attributes(), prop::collection::vec(inner, 0..4)).prop_map(
            |(name, attributes, children)| Markup::Element {
                name,
                attributes,
                children,
            },
        )
    })
}

#[cfg(test)]
mod tests {
    use super::utils::{lower_text, process, tree};
    use super::*;
    use razor_compiler::ir::NodeKind;
    use razor_compiler::pipeline::passes::WhitespacePass;
    use razor_compiler::IntermediateNodePass;

    proptest! {
        #[test]
        fn processed_trees_stay_well_formed(nodes in prop::collection::vec(mixed_markup(), 1..5)) {
            let source = render_all(&nodes);
            let doc = process(&source, "Generated.razor");
            let tree = tree(&doc);
            prop_assert!(tree.check_well_formed().is_ok());
            prop_assert!(tree.method().is_some());
        }

        #[test]
        fn whitespace_removal_is_idempotent(nodes in prop::collection::vec(mixed_markup(), 1..5)) {
            let source = render_all(&nodes);
            let mut doc = lower_text(&source, "Generated.razor");
            let mut tree = doc.ir_document.take().unwrap();
            WhitespacePass.execute(&doc, &mut tree);
            let once = tree.to_json();
            WhitespacePass.execute(&doc, &mut tree);
            prop_assert_eq!(once, tree.to_json());
        }

        #[test]
        fn static_markup_becomes_one_block(nodes in prop::collection::vec(static_markup(), 1..5)) {
            let source = render_all(&nodes);
            let doc = process(&source, "Generated.razor");
            prop_assert!(!doc.has_errors());
            let tree = tree(&doc);
            let children = tree.children(tree.method().unwrap());
            prop_assert_eq!(children.len(), 1);
            match tree.kind(children[0]) {
                NodeKind::MarkupBlock { content } => prop_assert_eq!(content, &source),
                other => prop_assert!(false, "expected a markup block, found {:?}", other),
            }
        }

        #[test]
        fn blocks_only_cover_static_markup(nodes in prop::collection::vec(mixed_markup(), 1..5)) {
            let source = render_all(&nodes);
            let doc = process(&source, "Generated.razor");
            let tree = tree(&doc);
            for block in tree.find_all(|kind| matches!(kind, NodeKind::MarkupBlock { .. })) {
                prop_assert!(tree.children(block).is_empty());
                let parent = tree.parent(block).unwrap();
                let parent_ok = matches!(
                    tree.kind(parent),
                    NodeKind::MethodDeclaration { .. } | NodeKind::MarkupElement { .. }
                );
                prop_assert!(parent_ok);
            }
            if nodes.iter().all(Markup::is_static) {
                let blocks = tree.find_all(|kind| matches!(kind, NodeKind::MarkupBlock { .. }));
                prop_assert_eq!(blocks.len(), 1);
            }
        }
    }
}
