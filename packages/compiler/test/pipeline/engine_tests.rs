/**
 * Engine Tests
 *
 * Whole-pipeline behavior: phase ordering, configuration, tag helpers and
 * batch processing.
 */

#[path = "../util/mod.rs"]
mod utils;

#[cfg(test)]
mod tests {
    use super::utils::{document, humanize_ir, humanize_method, process, process_with_tag_helpers, row, tree};
    use razor_compiler::ir::{IntermediateTree, NodeKind};
    use razor_compiler::pipeline::lowering::lower_document;
    use razor_compiler::tag_helpers::BoundAttributeDescriptor;
    use razor_compiler::{
        CodeDocument, CodeGenerationOptions, EngineError, IntermediateNodePass, PhaseKind,
        RazorConfiguration, RazorEngine, TagHelperDescriptor,
    };

    mod ordering {
        use super::*;

        #[test]
        fn should_list_default_passes_by_phase_and_order() {
            let engine = RazorEngine::create_default();
            assert_eq!(
                engine.passes(),
                vec![
                    (PhaseKind::DocumentClassifier, "document-classifier", 1000),
                    (PhaseKind::DirectiveClassifier, "functions-directive", 0),
                    (PhaseKind::DirectiveClassifier, "whitespace", 10),
                    (PhaseKind::Optimization, "duplicate-attribute", 10000),
                    (PhaseKind::Optimization, "markup-encoding", 10010),
                    (PhaseKind::Optimization, "markup-block", 10020),
                ]
            );
        }

        struct BlockCounter;

        impl IntermediateNodePass for BlockCounter {
            fn name(&self) -> &'static str {
                "block-counter"
            }

            fn phase(&self) -> PhaseKind {
                PhaseKind::Optimization
            }

            fn order(&self) -> i32 {
                20000
            }

            fn execute(&self, _document: &CodeDocument, tree: &mut IntermediateTree) {
                let count = tree
                    .find_all(|kind| matches!(kind, NodeKind::MarkupBlock { .. }))
                    .len();
                let method = tree.method().unwrap();
                let marker = tree.create(NodeKind::HtmlContent { encoded: false }, None);
                let token = tree.create(NodeKind::html_token(count.to_string()), None);
                tree.append_child(marker, token);
                tree.append_child(method, marker);
            }
        }

        #[test]
        fn should_run_custom_pass_after_built_in_optimizations() {
            let engine = RazorEngine::builder()
                .add_pass(BlockCounter)
                .with_default_passes()
                .build()
                .unwrap();
            assert_eq!(engine.passes().last().unwrap().1, "block-counter");

            let mut doc = document("<p>a</p>@x<p>b</p>", "A.razor");
            engine.process(&mut doc).unwrap();
            let rows = humanize_method(tree(&doc));
            assert_eq!(rows.last().unwrap(), &row("HtmlContent", "2", 0));
        }
    }

    mod components {
        use super::*;

        #[test]
        fn should_trim_whitespace_by_default() {
            let doc = process("<p>a</p>\n", "A.razor");
            assert_eq!(
                humanize_method(tree(&doc)),
                vec![row("MarkupBlock", "<p>a</p>", 0)]
            );
        }

        #[test]
        fn should_preserve_whitespace_on_request() {
            let doc = process("@preservewhitespace true\n<p>a</p>\n", "A.razor");
            let rows = humanize_method(tree(&doc));
            assert_eq!(rows.last().unwrap(), &row("MarkupBlock", "<p>a</p>\n", 0));
        }

        #[test]
        fn should_name_class_after_file() {
            let doc = process("<p></p>", "Pages/Fetch-Data.razor");
            let tree = tree(&doc);
            assert!(matches!(
                tree.kind(tree.class().unwrap()),
                NodeKind::ClassDeclaration { class_name, .. } if class_name == "Fetch_Data"
            ));
        }

        #[test]
        fn should_report_diagnostics_without_failing() {
            let doc = process("<div><p a=\"1\" a=\"2\"></div>", "A.razor");
            let ids: Vec<_> = doc.diagnostics().iter().map(|d| d.id()).collect();
            assert!(ids.contains(&"RZ10007"));
            assert!(tree(&doc).check_well_formed().is_ok());
        }
    }

    mod legacy_templates {
        use super::*;

        #[test]
        fn should_process_view_end_to_end() {
            let doc = process(
                "@using System.Linq\n@inherits MyBase\n<p>@Model.Name</p>\n",
                "Views/Home/Index.cshtml",
            );
            assert!(!doc.has_errors());
            let tree = tree(&doc);
            assert!(tree.check_well_formed().is_ok());
            assert!(tree
                .find_first(|kind| matches!(kind, NodeKind::MarkupBlock { .. }))
                .is_none());
            assert!(matches!(
                tree.kind(tree.class().unwrap()),
                NodeKind::ClassDeclaration { class_name, base_type: Some(base), .. }
                    if class_name == "Index" && base == "MyBase"
            ));
            let rows = humanize_ir(tree);
            assert!(rows.contains(&row("UsingDirective", "System.Linq", 1)));
            assert!(rows.contains(&row("CSharpExpression", "Model.Name", 3)));
        }

        #[test]
        fn should_bind_tag_helpers_through_engine() {
            let helper = TagHelperDescriptor::new("App.FormTagHelper", "App")
                .with_tag("form")
                .with_bound_attribute(BoundAttributeDescriptor::new(
                    "asp-action",
                    "Action",
                    "System.String",
                ));
            let doc = process_with_tag_helpers(
                "@addTagHelper *, App\n<form asp-action=\"Save\" method=\"post\"></form>",
                "Views/Edit.cshtml",
                vec![helper],
            );
            assert!(!doc.has_errors());
            let rows = humanize_method(tree(&doc));
            assert!(rows.contains(&row("TagHelper", "form", 0)));
            assert!(rows.contains(&row("TagHelperProperty", "asp-action", 1)));
            assert!(rows.contains(&row("TagHelperHtmlAttribute", "method", 1)));
        }
    }

    mod configuration {
        use super::*;

        #[test]
        fn should_omit_checksum_at_design_time() {
            let config = RazorConfiguration::from_json(r#"{ "designTime": true }"#).unwrap();
            let mut doc = document("<p></p>", "A.razor")
                .with_options(CodeGenerationOptions::from_configuration(&config));
            RazorEngine::create_default().process(&mut doc).unwrap();
            assert!(tree(&doc)
                .find_first(|kind| matches!(kind, NodeKind::Checksum { .. }))
                .is_none());
        }

        #[test]
        fn should_use_configured_root_namespace() {
            let config = RazorConfiguration::from_json(r#"{ "rootNamespace": "Shop.Web" }"#).unwrap();
            let mut doc = document("<p></p>", "A.razor")
                .with_options(config.code_generation_options());
            RazorEngine::create_default().process(&mut doc).unwrap();
            let tree = tree(&doc);
            assert!(matches!(
                tree.kind(tree.namespace().unwrap()),
                NodeKind::NamespaceDeclaration { content } if content == "Shop.Web"
            ));
        }
    }

    mod batches {
        use super::*;

        fn sources() -> Vec<(String, String)> {
            (0..16)
                .map(|index| {
                    let path = if index % 2 == 0 {
                        format!("Pages/Page{}.razor", index)
                    } else {
                        format!("Views/View{}.cshtml", index)
                    };
                    (format!("<h{0}>Title {0}</h{0}>\n<p>@value</p>", index % 6 + 1), path)
                })
                .collect()
        }

        #[test]
        fn should_match_sequential_results() {
            let engine = RazorEngine::create_default();
            let mut parallel: Vec<_> = sources()
                .iter()
                .map(|(text, path)| document(text, path))
                .collect();
            let results = engine.process_all(&mut parallel);
            assert!(results.iter().all(|result| result.is_ok()));

            for ((text, path), processed) in sources().iter().zip(&parallel) {
                let sequential = process(text, path);
                assert_eq!(tree(processed).to_json(), tree(&sequential).to_json());
            }
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn should_require_syntax_tree_for_lowering() {
            let mut doc = document("<p></p>", "A.razor");
            let result = lower_document(&mut doc);
            assert!(matches!(
                result,
                Err(EngineError::MissingDocumentDependency { phase: "lowering", .. })
            ));
        }
    }
}
