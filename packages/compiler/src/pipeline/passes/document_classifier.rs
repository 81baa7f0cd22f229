//! Document Classifier Pass
//!
//! Names the generated type: namespace, class, base type, interfaces and the
//! rendering method, from the file name, the configured root namespace and
//! the `@namespace`, `@inherits` and `@implements` directives.

use tracing::debug;

use crate::code_document::CodeDocument;
use crate::ir::{IntermediateTree, NodeKind};
use crate::pipeline::{IntermediateNodePass, PhaseKind};

use super::{directive_value, directive_values};

pub const COMPONENT_BASE_TYPE: &str = "Microsoft.AspNetCore.Components.ComponentBase";
pub const TEMPLATE_BASE_TYPE: &str = "Microsoft.AspNetCore.Mvc.Razor.RazorPage<dynamic>";
const DEFAULT_NAMESPACE: &str = "AspNetCoreGeneratedDocument";

pub struct DocumentClassifierPass;

impl IntermediateNodePass for DocumentClassifierPass {
    fn name(&self) -> &'static str {
        "document-classifier"
    }

    fn phase(&self) -> PhaseKind {
        PhaseKind::DocumentClassifier
    }

    fn order(&self) -> i32 {
        1000
    }

    fn execute(&self, document: &CodeDocument, tree: &mut IntermediateTree) {
        let component = document.file_kind.is_component();
        let namespace_name = directive_value(tree, "namespace")
            .or_else(|| {
                let root = document.options.root_namespace.trim();
                (!root.is_empty()).then(|| root.to_string())
            })
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let class_name = class_name_from_path(&document.source.file_path);
        let base_type = directive_value(tree, "inherits").unwrap_or_else(|| {
            if component {
                COMPONENT_BASE_TYPE.to_string()
            } else {
                TEMPLATE_BASE_TYPE.to_string()
            }
        });
        let interfaces = directive_values(tree, "implements");

        if let Some(namespace) = tree.namespace() {
            *tree.kind_mut(namespace) = NodeKind::NamespaceDeclaration {
                content: namespace_name.clone(),
            };
        }
        if let Some(class) = tree.class() {
            *tree.kind_mut(class) = NodeKind::ClassDeclaration {
                class_name: class_name.clone(),
                base_type: Some(base_type),
                modifiers: vec!["public".to_string(), "partial".to_string()],
                interfaces,
            };
        }
        if let Some(method) = tree.method() {
            *tree.kind_mut(method) = if component {
                NodeKind::MethodDeclaration {
                    method_name: "BuildRenderTree".to_string(),
                    return_type: "void".to_string(),
                    modifiers: vec!["protected".to_string(), "override".to_string()],
                }
            } else {
                NodeKind::MethodDeclaration {
                    method_name: "ExecuteAsync".to_string(),
                    return_type: "global::System.Threading.Tasks.Task".to_string(),
                    modifiers: vec![
                        "public".to_string(),
                        "async".to_string(),
                        "override".to_string(),
                    ],
                }
            };
        }
        debug!(namespace = %namespace_name, class = %class_name, "classified document");
    }
}

/// File stem as a C# identifier: invalid characters become `_` and a
/// leading digit gets a `_` prefix.
pub fn class_name_from_path(file_path: &str) -> String {
    let file_name = file_path
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_path);
    let stem = match file_name.find('.') {
        Some(0) | None => file_name,
        Some(dot) => &file_name[..dot],
    };
    let mut name: String = stem
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() {
        return "Template".to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}
