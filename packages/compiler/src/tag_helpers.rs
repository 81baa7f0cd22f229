//! Tag Helpers
//!
//! Descriptors for the elements that lowering turns into tag helper
//! invocations, and the binder that decides which of them apply to an
//! element in a given document.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A bound attribute maps a markup attribute onto a tag helper property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundAttributeDescriptor {
    pub name: String,
    pub property_name: String,
    pub type_name: String,
}

impl BoundAttributeDescriptor {
    pub fn new(
        name: impl Into<String>,
        property_name: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        BoundAttributeDescriptor {
            name: name.into(),
            property_name: property_name.into(),
            type_name: type_name.into(),
        }
    }

    pub fn is_boolean(&self) -> bool {
        self.type_name == "bool" || self.type_name == "System.Boolean"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagHelperDescriptor {
    pub name: String,
    pub type_name: String,
    pub assembly_name: String,
    /// Tag names this helper targets; `*` matches every element.
    pub tag_matching_rules: Vec<String>,
    /// Keyed by lower-cased attribute name.
    pub bound_attributes: IndexMap<String, BoundAttributeDescriptor>,
}

impl TagHelperDescriptor {
    pub fn new(type_name: impl Into<String>, assembly_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        TagHelperDescriptor {
            name: type_name.clone(),
            type_name,
            assembly_name: assembly_name.into(),
            tag_matching_rules: Vec::new(),
            bound_attributes: IndexMap::new(),
        }
    }

    pub fn with_tag(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_matching_rules.push(tag_name.into());
        self
    }

    pub fn with_bound_attribute(mut self, attribute: BoundAttributeDescriptor) -> Self {
        self.bound_attributes
            .insert(attribute.name.to_ascii_lowercase(), attribute);
        self
    }

    pub fn matches_tag(&self, tag_name: &str) -> bool {
        self.tag_matching_rules
            .iter()
            .any(|rule| rule == "*" || rule.eq_ignore_ascii_case(tag_name))
    }

    pub fn bound_attribute(&self, attribute_name: &str) -> Option<&BoundAttributeDescriptor> {
        self.bound_attributes
            .get(&attribute_name.to_ascii_lowercase())
    }
}

/// How a tag helper element was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagMode {
    StartTagAndEndTag,
    SelfClosing,
    StartTagOnly,
}

/// `"Type.Name, Assembly"` from `@addTagHelper` / `@removeTagHelper`.
/// The type part may be `*` or end with `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupInfo {
    pub type_pattern: String,
    pub assembly_name: String,
}

impl LookupInfo {
    pub fn parse(lookup_text: &str) -> Option<LookupInfo> {
        let text = lookup_text.trim().trim_matches('"').trim();
        let (type_pattern, assembly_name) = text.split_once(',')?;
        let type_pattern = type_pattern.trim();
        let assembly_name = assembly_name.trim();
        if type_pattern.is_empty() || assembly_name.is_empty() {
            return None;
        }
        Some(LookupInfo {
            type_pattern: type_pattern.to_string(),
            assembly_name: assembly_name.to_string(),
        })
    }

    pub fn matches(&self, descriptor: &TagHelperDescriptor) -> bool {
        if !descriptor
            .assembly_name
            .eq_ignore_ascii_case(&self.assembly_name)
        {
            return false;
        }
        match self.type_pattern.strip_suffix('*') {
            Some(prefix) => descriptor.type_name.starts_with(prefix),
            None => descriptor.type_name == self.type_pattern,
        }
    }
}

/// The tag helpers in scope for one document.
#[derive(Debug, Clone, Default)]
pub struct TagHelperBinder {
    /// Required element prefix from `@tagHelperPrefix`.
    pub prefix: Option<String>,
    pub descriptors: Vec<TagHelperDescriptor>,
}

/// The helpers that apply to one element.
#[derive(Debug, Clone)]
pub struct TagHelperBinding<'a> {
    /// Element name with the tag helper prefix removed.
    pub tag_name: String,
    pub descriptors: Vec<&'a TagHelperDescriptor>,
}

impl TagHelperBinding<'_> {
    pub fn bound_attribute(&self, attribute_name: &str) -> Option<&BoundAttributeDescriptor> {
        self.descriptors
            .iter()
            .find_map(|descriptor| descriptor.bound_attribute(attribute_name))
    }

    pub fn descriptor_names(&self) -> Vec<String> {
        self.descriptors
            .iter()
            .map(|descriptor| descriptor.name.clone())
            .collect()
    }
}

impl TagHelperBinder {
    pub fn new(prefix: Option<String>, descriptors: Vec<TagHelperDescriptor>) -> Self {
        TagHelperBinder {
            prefix,
            descriptors,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn get_binding(&self, element_name: &str) -> Option<TagHelperBinding<'_>> {
        let tag_name = match &self.prefix {
            Some(prefix) => {
                if element_name.len() <= prefix.len()
                    || !element_name.is_char_boundary(prefix.len())
                    || !element_name[..prefix.len()].eq_ignore_ascii_case(prefix)
                {
                    return None;
                }
                &element_name[prefix.len()..]
            }
            None => element_name,
        };
        let descriptors: Vec<_> = self
            .descriptors
            .iter()
            .filter(|descriptor| descriptor.matches_tag(tag_name))
            .collect();
        if descriptors.is_empty() {
            return None;
        }
        Some(TagHelperBinding {
            tag_name: tag_name.to_string(),
            descriptors,
        })
    }
}
