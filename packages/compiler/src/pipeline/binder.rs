//! Tag Helper Binder Phase
//!
//! Decides which tag helper descriptors are in scope for a document.
//! Components see every descriptor. Legacy templates opt in with
//! `@addTagHelper`, opt out with `@removeTagHelper` and may require an
//! element prefix with `@tagHelperPrefix`; imports are applied before the
//! document itself.

use tracing::trace;

use crate::code_document::CodeDocument;
use crate::error::{EngineError, Result};
use crate::syntax::SyntaxTree;
use crate::tag_helpers::{LookupInfo, TagHelperBinder, TagHelperDescriptor};

pub fn bind_tag_helpers(document: &mut CodeDocument) -> Result<()> {
    let syntax_tree = document
        .syntax_tree
        .as_ref()
        .ok_or(EngineError::MissingDocumentDependency {
            phase: "tag-helper-binder",
            dependency: "a syntax tree",
        })?;

    let binder = if document.file_kind.is_component() {
        TagHelperBinder::new(None, document.tag_helpers.clone())
    } else {
        let mut state = LegacyBinding::default();
        for import in &document.import_syntax_trees {
            state.visit(import, &document.tag_helpers);
        }
        state.visit(syntax_tree, &document.tag_helpers);
        TagHelperBinder::new(state.prefix, state.descriptors)
    };

    trace!(
        file = %document.source.file_path,
        bound = binder.descriptors.len(),
        available = document.tag_helpers.len(),
        "bound tag helpers"
    );
    document.bound_tag_helpers = Some(binder);
    Ok(())
}

#[derive(Default)]
struct LegacyBinding {
    prefix: Option<String>,
    descriptors: Vec<TagHelperDescriptor>,
}

impl LegacyBinding {
    fn visit(&mut self, tree: &SyntaxTree, available: &[TagHelperDescriptor]) {
        for directive in tree.directives() {
            if directive.is_malformed() {
                continue;
            }
            let Some(value) = directive.first_token() else {
                continue;
            };
            match directive.name.as_str() {
                "addTagHelper" => {
                    if let Some(lookup) = LookupInfo::parse(value) {
                        for descriptor in available {
                            if lookup.matches(descriptor) && !self.descriptors.contains(descriptor) {
                                self.descriptors.push(descriptor.clone());
                            }
                        }
                    }
                }
                "removeTagHelper" => {
                    if let Some(lookup) = LookupInfo::parse(value) {
                        self.descriptors.retain(|descriptor| !lookup.matches(descriptor));
                    }
                }
                "tagHelperPrefix" => {
                    let prefix = value.trim().trim_matches('"').trim();
                    self.prefix = (!prefix.is_empty()).then(|| prefix.to_string());
                }
                _ => {}
            }
        }
    }
}
