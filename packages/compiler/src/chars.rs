//! Character Codes
//!
//! Character constants and classification helpers shared by the markup
//! parser and the IR passes.

pub const TAB: char = '\t';
pub const LF: char = '\n';
pub const CR: char = '\r';
pub const SPACE: char = ' ';

pub const DQ: char = '"';
pub const SQ: char = '\'';
pub const LPAREN: char = '(';
pub const RPAREN: char = ')';
pub const STAR: char = '*';
pub const PERIOD: char = '.';
pub const SLASH: char = '/';
pub const COLON: char = ':';
pub const SEMICOLON: char = ';';
pub const LT: char = '<';
pub const EQ: char = '=';
pub const GT: char = '>';
pub const QUESTION: char = '?';
pub const AT: char = '@';
pub const LBRACKET: char = '[';
pub const BACKSLASH: char = '\\';
pub const RBRACKET: char = ']';
pub const UNDERSCORE: char = '_';
pub const LBRACE: char = '{';
pub const RBRACE: char = '}';
pub const TILDA: char = '~';

/// Check if character is whitespace (HTML and C# agree on this set)
pub fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C')
}

/// Check if character is ASCII letter
pub fn is_ascii_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

/// Check if character is newline
pub fn is_new_line(ch: char) -> bool {
    ch == LF || ch == CR
}

/// Printable ASCII is the range `' '..='~'`.
pub fn is_printable_ascii(ch: char) -> bool {
    (SPACE..=TILDA).contains(&ch)
}

/// Check if character can start a C# identifier
pub fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == UNDERSCORE
}

/// Check if character can be part of a C# identifier
pub fn is_identifier_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == UNDERSCORE
}

/// Characters allowed in a markup tag or attribute name.
pub fn is_name_char(ch: char) -> bool {
    !is_whitespace(ch) && !matches!(ch, '/' | '>' | '<' | '=' | '"' | '\'' | '\0')
}
