/**
 * Parser Tests
 *
 * Syntax trees for component and legacy templates, through the public
 * `parse` entry point.
 */

#[cfg(test)]
mod tests {
    use razor_compiler::syntax::{parse, AttributeValue, MarkupAttribute, SyntaxNode, SyntaxTree};
    use razor_compiler::{FileKind, SourceDocument};

    fn parse_component(text: &str) -> SyntaxTree {
        parse(&SourceDocument::new(text, "Test.razor"), FileKind::Component)
    }

    fn parse_legacy(text: &str) -> SyntaxTree {
        parse(&SourceDocument::new(text, "Test.cshtml"), FileKind::Legacy)
    }

    mod spans {
        use super::*;

        #[test]
        fn should_track_lines_and_columns() {
            let tree = parse_component("<div>\n  <p>x</p>\n</div>");
            let SyntaxNode::Element(div) = &tree.nodes[0] else {
                panic!("expected div");
            };
            let SyntaxNode::Element(p) = &div.body[1] else {
                panic!("expected p");
            };
            assert_eq!(p.span.line_index, 1);
            assert_eq!(p.span.character_index, 2);
            assert_eq!(p.span.length, "<p>x</p>".len());
            assert_eq!(div.span.end_line_index, 2);
        }

        #[test]
        fn should_treat_crlf_as_one_line_break() {
            let source = SourceDocument::new("a\r\nb\rc", "Test.razor");
            let location = source.location(3);
            assert_eq!((location.line_index, location.character_index), (1, 0));
            assert_eq!(source.location(5).line_index, 2);
        }

        #[test]
        fn should_resolve_span_text() {
            let source = SourceDocument::new("<b>bold</b>", "Test.razor");
            let tree = parse(&source, FileKind::Component);
            let SyntaxNode::Element(b) = &tree.nodes[0] else {
                panic!("expected b");
            };
            assert_eq!(source.text(b.body[0].span()), "bold");
            assert_eq!(b.end_tag.as_ref().unwrap().content, "</b>");
        }
    }

    mod attributes {
        use super::*;

        fn first_attribute(tree: &SyntaxTree) -> &MarkupAttribute {
            match &tree.nodes[0] {
                SyntaxNode::Element(element) => &element.start_tag.as_ref().unwrap().attributes[0],
                other => panic!("expected element, got {:?}", other),
            }
        }

        #[test]
        fn should_keep_single_quotes() {
            let tree = parse_component("<a href='x y'></a>");
            let MarkupAttribute::Valued(attribute) = first_attribute(&tree) else {
                panic!("expected valued attribute");
            };
            assert_eq!(attribute.value_prefix, "='");
            assert_eq!(attribute.value_suffix, "'");
            let pieces: Vec<_> = attribute
                .values
                .iter()
                .map(|value| match value {
                    AttributeValue::Literal(literal) => (literal.prefix.as_str(), literal.value.as_str()),
                    AttributeValue::Dynamic(_) => ("", "@"),
                })
                .collect();
            assert_eq!(pieces, vec![("", "x"), (" ", "y")]);
            assert_eq!(attribute.literal_value(), "x y");
        }

        #[test]
        fn should_parse_unquoted_values() {
            let tree = parse_component("<input value=abc>");
            let MarkupAttribute::Valued(attribute) = first_attribute(&tree) else {
                panic!("expected valued attribute");
            };
            assert_eq!(attribute.value_prefix, "=");
            assert_eq!(attribute.value_suffix, "");
            assert_eq!(attribute.literal_value(), "abc");
        }

        #[test]
        fn should_keep_whitespace_before_minimized_name() {
            let tree = parse_component("<input\n    disabled>");
            let MarkupAttribute::Minimized(attribute) = first_attribute(&tree) else {
                panic!("expected minimized attribute");
            };
            assert_eq!(attribute.name_prefix, "\n    ");
            assert_eq!(attribute.span.line_index, 1);
        }
    }

    mod directives {
        use super::*;

        #[test]
        fn should_keep_quotes_on_string_tokens() {
            let tree = parse_component("@page \"/counter\"\n<h1>Counter</h1>");
            let directives = tree.directives();
            assert_eq!(directives[0].name, "page");
            assert_eq!(directives[0].first_token(), Some("\"/counter\""));
            assert!(matches!(&tree.nodes[1], SyntaxNode::Element(e) if e.name == "h1"));
        }

        #[test]
        fn should_read_component_directives_as_expressions_in_views() {
            let tree = parse_legacy("@code");
            assert!(tree.directives().is_empty());
            assert!(matches!(&tree.nodes[0], SyntaxNode::Expression(e) if e.code == "code"));
        }

        #[test]
        fn should_read_view_directives_as_expressions_in_components() {
            let tree = parse_component("@model Foo");
            assert!(tree.directives().is_empty());
            assert!(matches!(&tree.nodes[0], SyntaxNode::Expression(e) if e.code == "model"));
        }

        #[test]
        fn should_capture_tag_helper_directive_text() {
            let tree = parse_legacy("@addTagHelper *, Microsoft.AspNetCore.Mvc.TagHelpers  \n");
            assert_eq!(
                tree.directives()[0].first_token(),
                Some("*, Microsoft.AspNetCore.Mvc.TagHelpers")
            );
        }
    }

    mod serialization {
        use super::*;

        #[test]
        fn should_serialize_nodes_as_tagged_json() {
            let tree = parse_component("<p class=\"a\">@x</p>");
            let value = serde_json::to_value(&tree.nodes[0]).unwrap();
            assert_eq!(value["Element"]["name"], "p");
            assert_eq!(value["Element"]["body"][0]["Expression"]["code"], "x");
            assert_eq!(value["Element"]["span"]["absoluteIndex"], 0);
        }
    }
}
