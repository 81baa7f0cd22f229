/**
 * Pass Tests
 *
 * The built-in passes as they run inside the default engine.
 */

#[path = "../util/mod.rs"]
mod utils;

#[cfg(test)]
mod tests {
    use super::utils::{diagnostic_ids, humanize_method, lower_text, process, row, tree};
    use razor_compiler::ir::{IntermediateTree, NodeKind};
    use razor_compiler::pipeline::passes::{
        MarkupBlockPass, MarkupDiagnosticPass, MarkupEncodingPass, WhitespacePass,
    };
    use razor_compiler::{CodeDocument, DiagnosticKind, IntermediateNodePass};

    fn run(document: &mut CodeDocument, passes: &[&dyn IntermediateNodePass]) -> IntermediateTree {
        let mut tree = document.ir_document.take().unwrap();
        for pass in passes {
            pass.execute(document, &mut tree);
        }
        tree
    }

    fn blocks(tree: &IntermediateTree) -> Vec<String> {
        tree.find_all(|kind| matches!(kind, NodeKind::MarkupBlock { .. }))
            .into_iter()
            .filter_map(|id| match tree.kind(id) {
                NodeKind::MarkupBlock { content } => Some(content.clone()),
                _ => None,
            })
            .collect()
    }

    mod duplicate_attributes {
        use super::*;

        #[test]
        fn should_report_only_the_repeated_attribute() {
            let mut doc = lower_text("<ul a=\"d\" b=\"\" c a=\"another\"></ul>", "A.razor");
            let tree = run(&mut doc, &[&MarkupDiagnosticPass]);
            let ul = tree.children(tree.method().unwrap())[0];
            let attributes = tree.children(ul).to_vec();
            assert_eq!(attributes.len(), 4);
            for (index, attribute) in attributes.iter().enumerate() {
                let expected = usize::from(index == 3);
                assert_eq!(tree.node(*attribute).diagnostics.len(), expected);
            }
            let diagnostic = &tree.node(attributes[3]).diagnostics[0];
            assert_eq!(diagnostic.kind, DiagnosticKind::DuplicateMarkupAttribute);
            assert_eq!(diagnostic.span.as_ref(), tree.source(attributes[3]));
        }

        #[test]
        fn should_accept_unique_attributes() {
            let mut doc = lower_text("<ul a=\"d\" b=\"\" c></ul>", "A.razor");
            let tree = run(&mut doc, &[&MarkupDiagnosticPass]);
            assert!(tree.diagnostics().is_empty());
        }

        #[test]
        fn should_keep_duplicates_in_tree() {
            let doc = process("<p id=\"a\" ID=\"b\">x</p>", "A.razor");
            assert_eq!(diagnostic_ids(&doc), vec!["RZ10007"]);
            let rows = humanize_method(tree(&doc));
            assert_eq!(rows[0], row("MarkupElement", "p", 0));
            assert_eq!(rows[1], row("HtmlAttribute", "id", 1));
            assert_eq!(rows[3], row("HtmlAttribute", "ID", 1));
        }
    }

    mod markup_encoding {
        use super::*;

        fn encoded_flags(text: &str) -> Vec<bool> {
            let mut doc = lower_text(text, "A.razor");
            let tree = run(&mut doc, &[&MarkupEncodingPass]);
            tree.find_all(|kind| matches!(kind, NodeKind::HtmlContent { .. }))
                .into_iter()
                .map(|id| matches!(tree.kind(id), NodeKind::HtmlContent { encoded: true }))
                .collect()
        }

        #[test]
        fn should_classify_plain_text() {
            assert_eq!(encoded_flags("The time is @X"), vec![false]);
        }

        #[test]
        fn should_encode_text_after_newline() {
            assert_eq!(encoded_flags("\nThe time is @X"), vec![true]);
        }

        #[test]
        fn should_decode_entity_only_text() {
            let mut doc = lower_text("<span>&equals;</span>", "A.razor");
            let tree = run(&mut doc, &[&MarkupEncodingPass]);
            let content = tree
                .find_first(|kind| matches!(kind, NodeKind::HtmlContent { .. }))
                .unwrap();
            assert!(matches!(tree.kind(content), NodeKind::HtmlContent { encoded: false }));
            assert_eq!(tree.content(content), "=");
        }

        #[test]
        fn should_decode_numeric_entities() {
            let mut doc = lower_text("<span>&#61;&#0x003D;</span>", "A.razor");
            let tree = run(&mut doc, &[&MarkupEncodingPass]);
            let content = tree
                .find_first(|kind| matches!(kind, NodeKind::HtmlContent { .. }))
                .unwrap();
            assert_eq!(tree.content(content), "==");
        }

        #[test]
        fn should_leave_legacy_templates_alone() {
            let mut doc = lower_text("<p>&equals;</p>", "Views/A.cshtml");
            let tree = run(&mut doc, &[&MarkupEncodingPass]);
            let content = tree
                .find_first(|kind| matches!(kind, NodeKind::HtmlContent { .. }))
                .unwrap();
            assert_eq!(tree.content(content), "<p>&equals;</p>");
        }
    }

    mod whitespace {
        use super::*;

        #[test]
        fn should_trim_component_boundaries() {
            let doc = process("\n  <div>\n    <p>Hi @name</p>\n  </div>\n", "A.razor");
            let rows = humanize_method(tree(&doc));
            assert_eq!(rows[0], row("MarkupElement", "div", 0));
            assert_eq!(rows[1], row("MarkupElement", "p", 1));
            assert_eq!(rows.len(), 4);
        }

        #[test]
        fn should_not_touch_legacy_templates() {
            let mut doc = lower_text("\n<p></p>\n", "Views/A.cshtml");
            let before = doc.ir_document.as_ref().unwrap().to_json();
            let tree = run(&mut doc, &[&WhitespacePass]);
            assert_eq!(tree.to_json(), before);
        }
    }

    mod markup_blocks {
        use super::*;

        fn optimized(text: &str) -> IntermediateTree {
            let mut doc = lower_text(text, "A.razor");
            run(
                &mut doc,
                &[&MarkupDiagnosticPass, &MarkupEncodingPass, &MarkupBlockPass],
            )
        }

        #[test]
        fn should_collapse_pure_markup_to_one_block() {
            let tree = optimized("<nav><a href=\"/\">Home</a> <a href=\"/about\">About</a></nav>");
            assert_eq!(
                blocks(&tree),
                vec!["<nav><a href=\"/\">Home</a> <a href=\"/about\">About</a></nav>"]
            );
            assert_eq!(tree.children(tree.method().unwrap()).len(), 1);
        }

        #[test]
        fn should_never_absorb_option_under_select() {
            let tree = optimized("<select><option value=\"1\">One</option></select>");
            assert!(blocks(&tree).iter().all(|block| !block.contains("option")));
            assert!(tree
                .find_first(|kind| matches!(kind, NodeKind::MarkupElement { tag_name } if tag_name == "option"))
                .is_some());
        }

        #[test]
        fn should_absorb_option_without_select() {
            let tree = optimized("<option value=\"1\">One</option>");
            assert_eq!(blocks(&tree), vec!["<option value=\"1\">One</option>"]);
        }

        #[test]
        fn should_serialize_void_elements_without_slash() {
            let tree = optimized("<link rel=\"stylesheet\" href=\"app.css\"/>");
            assert_eq!(blocks(&tree), vec!["<link rel=\"stylesheet\" href=\"app.css\">"]);
        }

        #[test]
        fn should_keep_style_content_verbatim() {
            let tree = optimized("<style>a > b { }</style>");
            assert_eq!(blocks(&tree), vec!["<style>a > b { }</style>"]);
        }

        #[test]
        fn should_keep_null_reference_encoded() {
            let tree = optimized("<p>&#0;</p>");
            assert_eq!(blocks(&tree), vec!["<p>&#0;</p>"]);
        }

        #[test]
        fn should_not_merge_element_with_duplicate_attribute() {
            let tree = optimized("<p class=\"a\" class=\"b\">text</p>");
            let p = tree.children(tree.method().unwrap())[0];
            assert!(matches!(tree.kind(p), NodeKind::MarkupElement { .. }));
            assert!(blocks(&tree).iter().all(|block| !block.contains("class")));
        }

        #[test]
        fn should_keep_runs_at_container_edges() {
            let tree = optimized("<b>x</b>@a<i>y</i>@b<u>z</u>");
            assert_eq!(blocks(&tree), vec!["<b>x</b>", "<i>y</i>", "<u>z</u>"]);
        }

        #[test]
        fn should_exclude_erroring_ancestors() {
            let tree = optimized("<section><div><span>ok</span></section>");
            let section = tree.children(tree.method().unwrap())[0];
            assert!(matches!(tree.kind(section), NodeKind::MarkupElement { .. }));
            assert_eq!(blocks(&tree), vec!["<span>ok</span>"]);
        }

        #[test]
        fn should_cover_merged_source_span() {
            let tree = optimized("<p>a</p><p>b</p>@x");
            let block = tree.children(tree.method().unwrap())[0];
            let span = tree.source(block).unwrap();
            assert_eq!(span.absolute_index, 0);
            assert_eq!(span.length, "<p>a</p><p>b</p>".len());
        }
    }

    mod functions_directive {
        use super::*;

        #[test]
        fn should_move_members_out_of_render_method() {
            let doc = process("<p>@Title</p>\n@code {\n    string Title = \"x\";\n}", "A.razor");
            let tree = tree(&doc);
            let class = tree.class().unwrap();
            let kinds: Vec<_> = tree.children(class).iter().map(|c| tree.kind(*c).name()).collect();
            assert_eq!(kinds[0], "MethodDeclaration");
            assert!(kinds[1..].iter().all(|kind| *kind == "CSharpCode"));
        }
    }
}
