/**
 * Lowering Tests
 *
 * Shape of the IR produced straight from the syntax tree, before any pass.
 */

#[path = "../util/mod.rs"]
mod utils;

#[cfg(test)]
mod tests {
    use super::utils::{document, humanize_ir, humanize_method, lower, lower_text, row, tree};
    use razor_compiler::ir::NodeKind;
    use razor_compiler::tag_helpers::{BoundAttributeDescriptor, TagMode};
    use razor_compiler::{
        CodeGenerationOptions, DiagnosticKind, RazorConfiguration, SourceDocument,
        TagHelperDescriptor,
    };

    mod document_structure {
        use super::*;

        #[test]
        fn should_nest_namespace_class_and_method() {
            let doc = lower_text("<p>Hi</p>", "Pages/Index.razor");
            assert_eq!(
                humanize_ir(tree(&doc)),
                vec![
                    row("Checksum", "XXH3_64", 0),
                    row("NamespaceDeclaration", "", 0),
                    row("ClassDeclaration", "", 1),
                    row("MethodDeclaration", "", 2),
                    row("MarkupElement", "p", 3),
                    row("HtmlContent", "Hi", 4),
                ]
            );
        }

        #[test]
        fn should_use_stable_checksum() {
            let first = lower_text("<p>Hi</p>", "A.razor");
            let second = lower_text("<p>Hi</p>", "B.razor");
            let checksum = |doc: &razor_compiler::CodeDocument| {
                let tree = tree(doc);
                match tree.kind(tree.children(tree.root())[0]) {
                    NodeKind::Checksum { checksum, .. } => checksum.clone(),
                    other => panic!("unexpected {:?}", other),
                }
            };
            assert_eq!(checksum(&first), checksum(&second));
            assert_ne!(checksum(&first), checksum(&lower_text("<p>Ho</p>", "A.razor")));
        }

        #[test]
        fn should_skip_checksum_at_design_time() {
            let config = RazorConfiguration::from_json(r#"{ "designTime": true }"#).unwrap();
            let doc = lower(
                document("<p></p>", "A.razor")
                    .with_options(CodeGenerationOptions::from_configuration(&config)),
            );
            assert_eq!(humanize_ir(tree(&doc))[0], row("NamespaceDeclaration", "", 0));
        }

        #[test]
        fn should_keep_source_order() {
            let doc = lower_text("a@b<i>c</i>@{ d(); }e", "A.razor");
            assert_eq!(
                humanize_method(tree(&doc)),
                vec![
                    row("HtmlContent", "a", 0),
                    row("CSharpExpression", "b", 0),
                    row("MarkupElement", "i", 0),
                    row("HtmlContent", "c", 1),
                    row("CSharpCode", " d(); ", 0),
                    row("HtmlContent", "e", 0),
                ]
            );
        }

        #[test]
        fn should_attach_spans_to_content() {
            let doc = lower_text("<p>Hello</p>", "A.razor");
            let tree = tree(&doc);
            let content = tree
                .find_first(|kind| matches!(kind, NodeKind::HtmlContent { .. }))
                .unwrap();
            let span = tree.source(content).unwrap();
            assert_eq!(span.absolute_index, 3);
            assert_eq!(span.length, 5);
            assert_eq!(span.file_path, "A.razor");
        }
    }

    mod components {
        use super::*;

        #[test]
        fn should_lower_attributes_before_body() {
            let doc = lower_text("<input type=\"text\" value=\"@name\" disabled />", "A.razor");
            assert_eq!(
                humanize_method(tree(&doc)),
                vec![
                    row("MarkupElement", "input", 0),
                    row("HtmlAttribute", "type", 1),
                    row("HtmlAttributeValue", "text", 2),
                    row("HtmlAttribute", "value", 1),
                    row("CSharpExpressionAttributeValue", "name", 2),
                    row("HtmlAttribute", "disabled", 1),
                ]
            );
        }

        #[test]
        fn should_drop_html_comments() {
            let doc = lower_text("<p>a<!-- note -->b</p>", "A.razor");
            assert_eq!(
                humanize_method(tree(&doc)),
                vec![
                    row("MarkupElement", "p", 0),
                    row("HtmlContent", "a", 1),
                    row("HtmlContent", "b", 1),
                ]
            );
        }

        #[test]
        fn should_report_unclosed_element() {
            let doc = lower_text("<div><p>text</div>", "A.razor");
            let tree = tree(&doc);
            let p = tree
                .find_first(|kind| matches!(kind, NodeKind::MarkupElement { tag_name } if tag_name == "p"))
                .unwrap();
            let kinds: Vec<_> = tree.node(p).diagnostics.iter().map(|d| d.kind).collect();
            assert_eq!(kinds, vec![DiagnosticKind::UnclosedTag]);
            assert!(doc.has_errors());
        }

        #[test]
        fn should_warn_about_unknown_component() {
            let doc = lower_text("<Counter />", "A.razor");
            let diagnostics = doc.diagnostics();
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(diagnostics[0].kind, DiagnosticKind::UnexpectedMarkupElement);
            assert!(!doc.has_errors());
        }
    }

    mod legacy_templates {
        use super::*;

        #[test]
        fn should_merge_contiguous_markup() {
            let doc = lower_text("<ul>\n  <li>One</li>\n</ul>", "Views/List.cshtml");
            assert_eq!(
                humanize_method(tree(&doc)),
                vec![row("HtmlContent", "<ul>\n  <li>One</li>\n</ul>", 0)]
            );
        }

        #[test]
        fn should_keep_comments_as_markup() {
            let doc = lower_text("<!-- hi --><p></p>", "Views/List.cshtml");
            assert_eq!(
                humanize_method(tree(&doc)),
                vec![row("HtmlContent", "<!-- hi --><p></p>", 0)]
            );
        }

        #[test]
        fn should_split_around_code() {
            let doc = lower_text("<p>@Model.Name</p>", "Views/List.cshtml");
            assert_eq!(
                humanize_method(tree(&doc)),
                vec![
                    row("HtmlContent", "<p>", 0),
                    row("CSharpExpression", "Model.Name", 0),
                    row("HtmlContent", "</p>", 0),
                ]
            );
        }
    }

    mod imports {
        use super::*;

        #[test]
        fn should_place_import_directives_before_content() {
            let doc = lower(
                document("<p></p>", "Pages/Index.razor").with_imports(vec![SourceDocument::new(
                    "@using App.Shared\n@inject IClock Clock\n",
                    "_Imports.razor",
                )]),
            );
            let rows = humanize_ir(tree(&doc));
            assert_eq!(rows[1], row("NamespaceDeclaration", "", 0));
            assert_eq!(rows[2], row("UsingDirective", "App.Shared", 1));
            assert_eq!(rows[3], row("ClassDeclaration", "", 1));
            assert_eq!(rows[5], row("Directive", "inject", 3));
            assert_eq!(rows.last().unwrap(), &row("MarkupElement", "p", 3));
            let tree = tree(&doc);
            let inject = tree
                .find_first(|kind| kind.directive_name() == Some("inject"))
                .unwrap();
            assert!(matches!(
                tree.kind(inject),
                NodeKind::Directive { imported: true, .. }
            ));
        }

        #[test]
        fn should_let_document_override_imported_directive() {
            let doc = lower(
                document("@inherits LocalBase\n", "Views/Index.cshtml").with_imports(vec![
                    SourceDocument::new("@inherits SharedBase\n", "Views/_ViewImports.cshtml"),
                ]),
            );
            let rows = humanize_method(tree(&doc));
            assert_eq!(
                rows,
                vec![row("Directive", "inherits", 0), row("DirectiveToken", "LocalBase", 1)]
            );
        }

        #[test]
        fn should_surface_import_diagnostics() {
            let doc = lower(
                document("<p></p>", "Pages/Index.razor")
                    .with_imports(vec![SourceDocument::new("@{ var x = 1;", "_Imports.razor")]),
            );
            let tree = tree(&doc);
            let root_ids: Vec<_> = tree
                .node(tree.root())
                .diagnostics
                .iter()
                .map(|d| d.id())
                .collect();
            assert_eq!(root_ids, vec!["RZ1006"]);
        }

        #[test]
        fn should_reject_content_in_component_imports() {
            let doc = lower_text(
                "@using App.Shared\n<p>@Title</p>\n@{ var x = 1; }\n",
                "Pages/_Imports.razor",
            );
            let diagnostics = doc.diagnostics();
            let unsupported: Vec<_> = diagnostics
                .iter()
                .filter(|d| d.kind == DiagnosticKind::UnsupportedComponentImportContent)
                .collect();
            assert_eq!(unsupported.len(), 3);
            assert!(unsupported.iter().all(|d| d.id() == "RZ10003"));
            assert_eq!(unsupported[0].span.as_ref().unwrap().absolute_index, 18);
            assert!(doc.has_errors());
        }

        #[test]
        fn should_accept_directives_in_component_imports() {
            let doc = lower_text("@using App.Shared\n@inject IClock Clock\n", "_Imports.razor");
            assert!(doc.diagnostics().is_empty());
        }
    }

    mod tag_helpers {
        use super::*;

        fn anchor_helper() -> TagHelperDescriptor {
            TagHelperDescriptor::new("App.AnchorTagHelper", "App")
                .with_tag("a")
                .with_bound_attribute(BoundAttributeDescriptor::new("asp-page", "Page", "System.String"))
        }

        #[test]
        fn should_lower_bound_element_to_tag_helper() {
            let doc = lower(
                document(
                    "@addTagHelper *, App\n<a asp-page=\"/Index\" class=\"nav\">Home</a>",
                    "Views/Index.cshtml",
                )
                .with_tag_helpers(vec![anchor_helper()]),
            );
            let rows = humanize_method(tree(&doc));
            assert_eq!(
                rows[2..].to_vec(),
                vec![
                    row("TagHelper", "a", 0),
                    row("TagHelperBody", "", 1),
                    row("HtmlContent", "Home", 2),
                    row("TagHelperProperty", "asp-page", 1),
                    row("HtmlContent", "/Index", 2),
                    row("TagHelperHtmlAttribute", "class", 1),
                    row("HtmlAttributeValue", "nav", 2),
                ]
            );
            let tree = tree(&doc);
            let helper = tree
                .find_first(|kind| matches!(kind, NodeKind::TagHelper { .. }))
                .unwrap();
            assert!(matches!(
                tree.kind(helper),
                NodeKind::TagHelper { tag_mode: TagMode::StartTagAndEndTag, tag_helpers, .. }
                    if tag_helpers == &vec!["App.AnchorTagHelper".to_string()]
            ));
        }

        #[test]
        fn should_ignore_helpers_not_added() {
            let doc = lower(
                document("<a asp-page=\"/Index\">Home</a>", "Views/Index.cshtml")
                    .with_tag_helpers(vec![anchor_helper()]),
            );
            assert!(tree(&doc)
                .find_first(|kind| matches!(kind, NodeKind::TagHelper { .. }))
                .is_none());
        }
    }
}
