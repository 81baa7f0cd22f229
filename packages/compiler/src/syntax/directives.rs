//! Directive Descriptors
//!
//! The statically known Razor directives, their token shapes and where they
//! may appear.

use serde::Serialize;

use crate::code_document::FileKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DirectiveKind {
    SingleLine,
    /// Followed by a `{ ... }` block of markup.
    RazorBlock,
    /// Followed by a `{ ... }` block of code.
    CodeBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DirectiveUsage {
    Unrestricted,
    FileScopedSinglyOccurring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DirectiveTokenKind {
    Type,
    Namespace,
    Member,
    String,
    Boolean,
    Attribute,
    /// Rest of the line, used by the tag helper directives.
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectiveTokenDescriptor {
    pub kind: DirectiveTokenKind,
    pub optional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Availability {
    Any,
    Component,
    Legacy,
}

#[derive(Debug, PartialEq, Eq)]
pub struct DirectiveDescriptor {
    pub directive: &'static str,
    pub kind: DirectiveKind,
    pub usage: DirectiveUsage,
    pub tokens: &'static [DirectiveTokenDescriptor],
    availability: Availability,
}

impl DirectiveDescriptor {
    pub fn is_available_in(&self, file_kind: FileKind) -> bool {
        match self.availability {
            Availability::Any => true,
            Availability::Component => file_kind.is_component(),
            Availability::Legacy => !file_kind.is_component(),
        }
    }
}

const fn token(kind: DirectiveTokenKind) -> DirectiveTokenDescriptor {
    DirectiveTokenDescriptor {
        kind,
        optional: false,
    }
}

const fn optional(kind: DirectiveTokenKind) -> DirectiveTokenDescriptor {
    DirectiveTokenDescriptor {
        kind,
        optional: true,
    }
}

use DirectiveTokenKind as T;

pub static USING: DirectiveDescriptor = DirectiveDescriptor {
    directive: "using",
    kind: DirectiveKind::SingleLine,
    usage: DirectiveUsage::Unrestricted,
    tokens: &[token(T::Namespace)],
    availability: Availability::Any,
};

pub static DIRECTIVES: &[DirectiveDescriptor] = &[
    DirectiveDescriptor {
        directive: "inherits",
        kind: DirectiveKind::SingleLine,
        usage: DirectiveUsage::FileScopedSinglyOccurring,
        tokens: &[token(T::Type)],
        availability: Availability::Any,
    },
    DirectiveDescriptor {
        directive: "namespace",
        kind: DirectiveKind::SingleLine,
        usage: DirectiveUsage::FileScopedSinglyOccurring,
        tokens: &[token(T::Namespace)],
        availability: Availability::Any,
    },
    DirectiveDescriptor {
        directive: "implements",
        kind: DirectiveKind::SingleLine,
        usage: DirectiveUsage::Unrestricted,
        tokens: &[token(T::Type)],
        availability: Availability::Any,
    },
    DirectiveDescriptor {
        directive: "layout",
        kind: DirectiveKind::SingleLine,
        usage: DirectiveUsage::FileScopedSinglyOccurring,
        tokens: &[token(T::Type)],
        availability: Availability::Component,
    },
    DirectiveDescriptor {
        directive: "page",
        kind: DirectiveKind::SingleLine,
        usage: DirectiveUsage::Unrestricted,
        tokens: &[optional(T::String)],
        availability: Availability::Any,
    },
    DirectiveDescriptor {
        directive: "model",
        kind: DirectiveKind::SingleLine,
        usage: DirectiveUsage::FileScopedSinglyOccurring,
        tokens: &[token(T::Type)],
        availability: Availability::Legacy,
    },
    DirectiveDescriptor {
        directive: "inject",
        kind: DirectiveKind::SingleLine,
        usage: DirectiveUsage::Unrestricted,
        tokens: &[token(T::Type), token(T::Member)],
        availability: Availability::Any,
    },
    DirectiveDescriptor {
        directive: "typeparam",
        kind: DirectiveKind::SingleLine,
        usage: DirectiveUsage::Unrestricted,
        tokens: &[token(T::Member)],
        availability: Availability::Component,
    },
    DirectiveDescriptor {
        directive: "attribute",
        kind: DirectiveKind::SingleLine,
        usage: DirectiveUsage::Unrestricted,
        tokens: &[token(T::Attribute)],
        availability: Availability::Any,
    },
    DirectiveDescriptor {
        directive: "preservewhitespace",
        kind: DirectiveKind::SingleLine,
        usage: DirectiveUsage::FileScopedSinglyOccurring,
        tokens: &[token(T::Boolean)],
        availability: Availability::Component,
    },
    DirectiveDescriptor {
        directive: "addTagHelper",
        kind: DirectiveKind::SingleLine,
        usage: DirectiveUsage::Unrestricted,
        tokens: &[token(T::Text)],
        availability: Availability::Legacy,
    },
    DirectiveDescriptor {
        directive: "removeTagHelper",
        kind: DirectiveKind::SingleLine,
        usage: DirectiveUsage::Unrestricted,
        tokens: &[token(T::Text)],
        availability: Availability::Legacy,
    },
    DirectiveDescriptor {
        directive: "tagHelperPrefix",
        kind: DirectiveKind::SingleLine,
        usage: DirectiveUsage::FileScopedSinglyOccurring,
        tokens: &[token(T::Text)],
        availability: Availability::Legacy,
    },
    DirectiveDescriptor {
        directive: "code",
        kind: DirectiveKind::CodeBlock,
        usage: DirectiveUsage::Unrestricted,
        tokens: &[],
        availability: Availability::Component,
    },
    DirectiveDescriptor {
        directive: "functions",
        kind: DirectiveKind::CodeBlock,
        usage: DirectiveUsage::Unrestricted,
        tokens: &[],
        availability: Availability::Any,
    },
    DirectiveDescriptor {
        directive: "section",
        kind: DirectiveKind::RazorBlock,
        usage: DirectiveUsage::Unrestricted,
        tokens: &[token(T::Member)],
        availability: Availability::Legacy,
    },
];

/// Look up a directive by its exact (case-sensitive) name.
pub fn find_directive(name: &str, file_kind: FileKind) -> Option<&'static DirectiveDescriptor> {
    if name == USING.directive {
        return Some(&USING);
    }
    DIRECTIVES
        .iter()
        .find(|descriptor| descriptor.directive == name && descriptor.is_available_in(file_kind))
}

/// Keywords that start a code statement rather than an expression.
pub const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "for", "foreach", "while", "switch", "lock", "try", "do", "using",
];

/// Words that continue a statement after its closing brace.
pub fn continues_statement(keyword: &str, word: &str) -> bool {
    match word {
        "else" => keyword == "if",
        "catch" | "finally" => keyword == "try",
        "while" => keyword == "do",
        _ => false,
    }
}
