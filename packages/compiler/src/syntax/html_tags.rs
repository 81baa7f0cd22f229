//! HTML Tag Definitions
//!
//! The little the Razor parser needs to know about HTML: which elements are
//! void and which hold raw text.

use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagContentType {
    RawText,
    ParsableData,
}

#[derive(Debug, Clone)]
pub struct HtmlTagDefinition {
    pub is_void: bool,
    pub content_type: TagContentType,
}

impl HtmlTagDefinition {
    const fn new() -> Self {
        HtmlTagDefinition {
            is_void: false,
            content_type: TagContentType::ParsableData,
        }
    }

    fn with_void(mut self, is_void: bool) -> Self {
        self.is_void = is_void;
        self
    }

    fn with_content_type(mut self, content_type: TagContentType) -> Self {
        self.content_type = content_type;
        self
    }
}

static TAG_DEFINITIONS: Lazy<HashMap<&'static str, HtmlTagDefinition>> = Lazy::new(|| {
    let mut defs = HashMap::new();

    for tag in [
        "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
        "source", "track", "wbr",
    ] {
        defs.insert(tag, HtmlTagDefinition::new().with_void(true));
    }

    for tag in ["script", "style"] {
        defs.insert(
            tag,
            HtmlTagDefinition::new().with_content_type(TagContentType::RawText),
        );
    }

    defs
});

static DEFAULT_TAG_DEFINITION: HtmlTagDefinition = HtmlTagDefinition::new();

pub fn get_html_tag_definition(tag_name: &str) -> &'static HtmlTagDefinition {
    TAG_DEFINITIONS
        .get(tag_name)
        .or_else(|| TAG_DEFINITIONS.get(tag_name.to_ascii_lowercase().as_str()))
        .unwrap_or(&DEFAULT_TAG_DEFINITION)
}

pub fn is_void_element(tag_name: &str) -> bool {
    get_html_tag_definition(tag_name).is_void
}

pub fn is_raw_text_element(tag_name: &str) -> bool {
    get_html_tag_definition(tag_name).content_type == TagContentType::RawText
}
