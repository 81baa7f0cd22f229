//! Razor Markup Parser
//!
//! A single-pass recursive parser for the Razor subset the pipeline lowers:
//! HTML markup, transitions into C# (`@expr`, `@(expr)`, `@{ }`, control
//! flow statements) and directives. The parser never fails; problems are
//! recorded as diagnostics and parsing resumes at the next sensible point.

use std::collections::HashSet;

use super::ast::*;
use super::directives::{
    continues_statement, find_directive, DirectiveDescriptor, DirectiveKind, DirectiveTokenKind,
    DirectiveUsage, STATEMENT_KEYWORDS,
};
use super::html_tags;
use crate::chars;
use crate::code_document::FileKind;
use crate::diagnostics::{DiagnosticKind, RazorDiagnostic};
use crate::parse_util::SourceDocument;

/// Parse `source` into a syntax tree.
pub fn parse(source: &SourceDocument, file_kind: FileKind) -> SyntaxTree {
    let mut parser = Parser::new(source, file_kind);
    let mut nodes = Vec::new();
    parser.parse_markup_run(&mut nodes, None, false);
    SyntaxTree {
        source: source.clone(),
        file_kind,
        nodes,
        diagnostics: parser.diagnostics,
    }
}

/// Why a run of markup stopped.
enum RunEnd {
    Eof,
    /// The end tag of the element being parsed (consumed).
    EndTag(EndTag),
    /// An end tag for an enclosing element (left in place).
    OuterEndTag,
    /// A `}` closing a razor block (left in place).
    Brace,
}

struct Parser<'a> {
    source: &'a SourceDocument,
    text: &'a str,
    pos: usize,
    file_kind: FileKind,
    diagnostics: Vec<RazorDiagnostic>,
    open_elements: Vec<String>,
    seen_directives: HashSet<&'static str>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a SourceDocument, file_kind: FileKind) -> Self {
        Parser {
            source,
            text: &source.content,
            pos: 0,
            file_kind,
            diagnostics: Vec::new(),
            open_elements: Vec::new(),
            seen_directives: HashSet::new(),
        }
    }

    // Markup

    fn parse_markup_run(
        &mut self,
        nodes: &mut Vec<SyntaxNode>,
        closing: Option<&str>,
        stop_at_brace: bool,
    ) -> RunEnd {
        let mut text_start = self.pos;
        loop {
            let Some(ch) = self.peek() else {
                self.flush_text(nodes, text_start);
                return RunEnd::Eof;
            };
            match ch {
                chars::LT => {
                    let next = self.peek_nth(1);
                    if next == Some(chars::SLASH)
                        && self.peek_nth(2).is_some_and(chars::is_ascii_letter)
                    {
                        let name = self.peek_end_tag_name();
                        self.flush_text(nodes, text_start);
                        if closing.is_some_and(|current| current.eq_ignore_ascii_case(&name)) {
                            return RunEnd::EndTag(self.parse_end_tag());
                        }
                        if self
                            .open_elements
                            .iter()
                            .any(|open| open.eq_ignore_ascii_case(&name))
                        {
                            return RunEnd::OuterEndTag;
                        }
                        let end_tag = self.parse_end_tag();
                        let span = end_tag.span.clone();
                        nodes.push(SyntaxNode::Element(MarkupElement {
                            name: end_tag.name.clone(),
                            start_tag: None,
                            end_tag: Some(end_tag),
                            body: Vec::new(),
                            span,
                        }));
                        text_start = self.pos;
                        continue;
                    }
                    if self.starts_with("<!--") {
                        self.flush_text(nodes, text_start);
                        let comment = self.parse_comment();
                        nodes.push(SyntaxNode::Comment(comment));
                        text_start = self.pos;
                        continue;
                    }
                    if next.is_some_and(chars::is_ascii_letter) {
                        self.flush_text(nodes, text_start);
                        let element = self.parse_element();
                        nodes.push(SyntaxNode::Element(element));
                        text_start = self.pos;
                        continue;
                    }
                    self.bump();
                }
                chars::AT => {
                    if !self.try_parse_transition(nodes, &mut text_start) {
                        self.bump();
                    }
                }
                chars::RBRACE if stop_at_brace => {
                    self.flush_text(nodes, text_start);
                    return RunEnd::Brace;
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn parse_element(&mut self) -> MarkupElement {
        let start = self.pos;
        let start_tag = self.parse_start_tag();
        let name = start_tag.name.clone();

        if start_tag.self_closing || !start_tag.is_finished() {
            return MarkupElement {
                name,
                start_tag: Some(start_tag),
                end_tag: None,
                body: Vec::new(),
                span: self.source.span(start, self.pos),
            };
        }

        if html_tags::is_void_element(&name) {
            // `<input></input>`: the end tag belongs to the void element.
            let end_tag = if self.at_end_tag_named(&name) {
                Some(self.parse_end_tag())
            } else {
                None
            };
            return MarkupElement {
                name,
                start_tag: Some(start_tag),
                end_tag,
                body: Vec::new(),
                span: self.source.span(start, self.pos),
            };
        }

        let mut body = Vec::new();
        let end_tag = if html_tags::is_raw_text_element(&name) {
            let body_start = self.pos;
            let closer = format!("</{}", name);
            match find_ignore_ascii_case(&self.text[self.pos..], &closer) {
                Some(offset) => {
                    self.pos += offset;
                    self.push_text(&mut body, body_start, self.pos);
                    Some(self.parse_end_tag())
                }
                None => {
                    self.pos = self.text.len();
                    self.push_text(&mut body, body_start, self.pos);
                    None
                }
            }
        } else {
            self.open_elements.push(name.clone());
            let end = self.parse_markup_run(&mut body, Some(&name), false);
            self.open_elements.pop();
            match end {
                RunEnd::EndTag(tag) => Some(tag),
                _ => None,
            }
        };

        MarkupElement {
            name,
            start_tag: Some(start_tag),
            end_tag,
            body,
            span: self.source.span(start, self.pos),
        }
    }

    fn parse_start_tag(&mut self) -> StartTag {
        let start = self.pos;
        self.bump();
        let name = self.read_while(chars::is_name_char);
        let open_span = self.source.span(start, self.pos);
        let mut attributes = Vec::new();
        let mut self_closing = false;
        let mut close_text = String::new();
        let mut close_span = None;

        loop {
            let ws_start = self.pos;
            self.skip_whitespace();
            match self.peek() {
                None | Some(chars::LT) => {
                    self.pos = ws_start;
                    self.error(
                        DiagnosticKind::UnfinishedTag,
                        open_span.absolute_index,
                        open_span.end(),
                        &[&name],
                    );
                    break;
                }
                Some(chars::GT) => {
                    self.bump();
                    close_text = self.text[ws_start..self.pos].to_string();
                    close_span = Some(self.source.span(ws_start, self.pos));
                    break;
                }
                Some(chars::SLASH) if self.peek_nth(1) == Some(chars::GT) => {
                    self.pos += 2;
                    self_closing = true;
                    close_text = self.text[ws_start..self.pos].to_string();
                    close_span = Some(self.source.span(ws_start, self.pos));
                    break;
                }
                Some(ch) if !chars::is_name_char(ch) => {
                    // Stray `/`, `=` or quote between attributes.
                    self.bump();
                }
                Some(_) => attributes.push(self.parse_attribute(ws_start)),
            }
        }

        StartTag {
            name,
            attributes,
            self_closing,
            open_span,
            close_text,
            close_span,
            span: self.source.span(start, self.pos),
        }
    }

    fn parse_attribute(&mut self, prefix_start: usize) -> MarkupAttribute {
        let name_start = self.pos;
        let name = self.read_while(chars::is_name_char);
        let name_end = self.pos;
        let name_prefix = self.text[prefix_start..name_start].to_string();

        self.skip_whitespace();
        if self.peek() != Some(chars::EQ) {
            self.pos = name_end;
            return MarkupAttribute::Minimized(MinimizedAttribute {
                name_prefix,
                name,
                span: self.source.span(name_start, name_end),
            });
        }
        self.bump();
        self.skip_whitespace();
        let quote = match self.peek() {
            Some(q @ (chars::DQ | chars::SQ)) => {
                self.bump();
                Some(q)
            }
            _ => None,
        };
        let value_prefix = self.text[name_end..self.pos].to_string();
        let value_start = self.pos;
        let values = self.parse_attribute_values(quote);
        let value_end = self.pos;
        let value_suffix = match quote {
            Some(q) if self.peek() == Some(q) => {
                self.bump();
                q.to_string()
            }
            Some(_) => {
                self.error(
                    DiagnosticKind::UnterminatedStringLiteral,
                    value_start - 1,
                    self.pos,
                    &[],
                );
                String::new()
            }
            None => String::new(),
        };

        MarkupAttribute::Valued(ValuedAttribute {
            name_prefix,
            name,
            value_prefix,
            values,
            value_suffix,
            span: self.source.span(name_start, self.pos),
            value_span: self.source.span(value_start, value_end),
        })
    }

    /// Split an attribute value into whitespace-prefixed literal words and
    /// code transitions.
    fn parse_attribute_values(&mut self, quote: Option<char>) -> Vec<AttributeValue> {
        let mut values = Vec::new();
        loop {
            let segment_start = self.pos;
            if quote.is_some() {
                self.skip_whitespace();
            }
            let prefix = self.text[segment_start..self.pos].to_string();

            if self.at_attribute_value_end(quote) {
                if !prefix.is_empty() {
                    values.push(AttributeValue::Literal(LiteralAttributeValue {
                        prefix,
                        value: String::new(),
                        span: self.source.span(segment_start, self.pos),
                        value_span: self.source.span(self.pos, self.pos),
                    }));
                }
                break;
            }

            if self.at_code_transition() {
                let at = self.pos;
                self.bump();
                let expression = if self.peek() == Some(chars::LPAREN) {
                    self.parse_explicit_expression(at)
                } else {
                    self.parse_implicit_expression(at)
                };
                values.push(AttributeValue::Dynamic(DynamicAttributeValue {
                    prefix,
                    expression,
                    span: self.source.span(segment_start, self.pos),
                }));
                continue;
            }

            let value_start = self.pos;
            let mut value = String::new();
            while let Some(ch) = self.peek() {
                let stop = match quote {
                    Some(q) => ch == q || chars::is_whitespace(ch),
                    None => self.at_attribute_value_end(None),
                };
                if stop {
                    break;
                }
                if ch == chars::AT {
                    if self.peek_nth(1) == Some(chars::AT) {
                        value.push(chars::AT);
                        self.pos += 2;
                        continue;
                    }
                    if self.at_code_transition() {
                        break;
                    }
                }
                value.push(ch);
                self.bump();
            }
            values.push(AttributeValue::Literal(LiteralAttributeValue {
                prefix,
                value,
                span: self.source.span(segment_start, self.pos),
                value_span: self.source.span(value_start, self.pos),
            }));
        }
        values
    }

    fn at_attribute_value_end(&self, quote: Option<char>) -> bool {
        match (self.peek(), quote) {
            (None, _) => true,
            (Some(ch), Some(q)) => ch == q,
            (Some(ch), None) => {
                chars::is_whitespace(ch)
                    || ch == chars::GT
                    || (ch == chars::SLASH && self.peek_nth(1) == Some(chars::GT))
            }
        }
    }

    fn parse_end_tag(&mut self) -> EndTag {
        let start = self.pos;
        self.pos += 2;
        let name = self.read_while(chars::is_name_char);
        self.skip_whitespace();
        if self.peek() == Some(chars::GT) {
            self.bump();
        } else {
            self.error(
                DiagnosticKind::UnfinishedTag,
                start,
                self.pos,
                &[&format!("/{}", name)],
            );
        }
        EndTag {
            name,
            content: self.text[start..self.pos].to_string(),
            span: self.source.span(start, self.pos),
        }
    }

    fn parse_comment(&mut self) -> MarkupComment {
        let start = self.pos;
        self.pos += 4;
        let content = match self.text[self.pos..].find("-->") {
            Some(offset) => {
                let content = self.text[self.pos..self.pos + offset].to_string();
                self.pos += offset + 3;
                content
            }
            None => {
                self.error(DiagnosticKind::UnfinishedTag, start, start + 4, &["!--"]);
                let content = self.text[self.pos..].to_string();
                self.pos = self.text.len();
                content
            }
        };
        MarkupComment {
            content,
            span: self.source.span(start, self.pos),
        }
    }

    /// `<text>` inside code: its content is markup, the tags themselves are
    /// not output.
    fn parse_text_transition(&mut self, children: &mut Vec<SyntaxNode>) {
        let start_tag = self.parse_start_tag();
        if start_tag.self_closing || !start_tag.is_finished() {
            return;
        }
        self.open_elements.push("text".to_string());
        let end = self.parse_markup_run(children, Some("text"), false);
        self.open_elements.pop();
        if !matches!(end, RunEnd::EndTag(_)) {
            let span = start_tag.span;
            self.diagnostics.push(RazorDiagnostic::create(
                DiagnosticKind::MissingEndTag,
                Some(span),
                &["text"],
            ));
        }
    }

    // Transitions

    /// Handle an `@` in markup. Returns false when the `@` is plain text.
    fn try_parse_transition(
        &mut self,
        nodes: &mut Vec<SyntaxNode>,
        text_start: &mut usize,
    ) -> bool {
        let at = self.pos;
        match self.peek_nth(1) {
            Some(chars::AT) => {
                // `@@` is an escaped `@`: keep the second one as text.
                self.flush_text(nodes, *text_start);
                self.pos += 1;
                *text_start = self.pos;
                self.bump();
                true
            }
            Some(chars::STAR) => {
                self.flush_text(nodes, *text_start);
                self.skip_razor_comment();
                *text_start = self.pos;
                true
            }
            _ if self.previous_char().is_some_and(char::is_alphanumeric) => false,
            Some(chars::LPAREN) => {
                self.flush_text(nodes, *text_start);
                self.bump();
                let expression = self.parse_explicit_expression(at);
                nodes.push(SyntaxNode::Expression(expression));
                *text_start = self.pos;
                true
            }
            Some(chars::LBRACE) => {
                self.flush_text(nodes, *text_start);
                self.pos += 2;
                let block = self.parse_code_block(at);
                nodes.push(SyntaxNode::CodeBlock(block));
                *text_start = self.pos;
                true
            }
            Some(ch) if chars::is_identifier_start(ch) => {
                self.flush_text(nodes, *text_start);
                self.bump();
                let word = self.peek_identifier();
                if self.is_statement_keyword(&word) {
                    let block = self.parse_statement(at, &word);
                    nodes.push(SyntaxNode::CodeBlock(block));
                } else if let Some(descriptor) = find_directive(&word, self.file_kind) {
                    let directive = self.parse_directive(at, descriptor);
                    nodes.push(SyntaxNode::Directive(directive));
                } else {
                    let expression = self.parse_implicit_expression(at);
                    nodes.push(SyntaxNode::Expression(expression));
                }
                *text_start = self.pos;
                true
            }
            other => {
                let shown = match other {
                    Some(ch) => ch.to_string(),
                    None => "end of file".to_string(),
                };
                let end = (at + 1 + other.map_or(0, char::len_utf8)).min(self.text.len());
                self.error(
                    DiagnosticKind::UnexpectedCharacterAtStartOfCodeBlock,
                    at,
                    end,
                    &[&shown],
                );
                false
            }
        }
    }

    fn is_statement_keyword(&self, word: &str) -> bool {
        if !STATEMENT_KEYWORDS.contains(&word) {
            return false;
        }
        if word != "using" {
            return true;
        }
        // `@using (...)` is a statement, `@using Namespace` a directive.
        self.text[self.pos + word.len()..]
            .trim_start_matches(|c: char| chars::is_whitespace(c))
            .starts_with(chars::LPAREN)
    }

    /// `@name.member(args)[index]`; the cursor is on the first identifier.
    fn parse_implicit_expression(&mut self, at: usize) -> CSharpExpression {
        let code_start = self.pos;
        let mut diagnostics = Vec::new();
        self.read_identifier();
        loop {
            match self.peek() {
                Some(chars::PERIOD) if self.peek_nth(1).is_some_and(chars::is_identifier_start) => {
                    self.bump();
                    self.read_identifier();
                }
                Some(chars::QUESTION)
                    if self.peek_nth(1) == Some(chars::PERIOD)
                        && self.peek_nth(2).is_some_and(chars::is_identifier_start) =>
                {
                    self.pos += 2;
                    self.read_identifier();
                }
                Some(open @ (chars::LPAREN | chars::LBRACKET)) => {
                    let close = if open == chars::LPAREN {
                        chars::RPAREN
                    } else {
                        chars::RBRACKET
                    };
                    let open_at = self.pos;
                    if !self.scan_balanced(open, close) {
                        diagnostics.push(self.diagnostic(
                            DiagnosticKind::ExpectedCloseBracketBeforeEof,
                            open_at,
                            open_at + 1,
                            &[&open.to_string(), &close.to_string()],
                        ));
                        break;
                    }
                }
                _ => break,
            }
        }
        CSharpExpression {
            code: self.text[code_start..self.pos].to_string(),
            explicit: false,
            span: self.source.span(at, self.pos),
            code_span: self.source.span(code_start, self.pos),
            diagnostics,
        }
    }

    /// `@( ... )`; the cursor is on the `(`.
    fn parse_explicit_expression(&mut self, at: usize) -> CSharpExpression {
        let open = self.pos;
        let closed = self.scan_balanced(chars::LPAREN, chars::RPAREN);
        let code_end = if closed { self.pos - 1 } else { self.pos };
        let mut diagnostics = Vec::new();
        if !closed {
            diagnostics.push(self.diagnostic(
                DiagnosticKind::ExpectedCloseBracketBeforeEof,
                open,
                open + 1,
                &["(", ")"],
            ));
        }
        CSharpExpression {
            code: self.text[open + 1..code_end].to_string(),
            explicit: true,
            span: self.source.span(at, self.pos),
            code_span: self.source.span(open + 1, code_end),
            diagnostics,
        }
    }

    /// `@{ ... }`; the cursor is just past the `{`.
    fn parse_code_block(&mut self, at: usize) -> CSharpCodeBlock {
        let mut children = Vec::new();
        let mut diagnostics = Vec::new();
        let body_start = self.pos;
        if !self.parse_code_body(&mut children, body_start, false) {
            diagnostics.push(self.diagnostic(
                DiagnosticKind::ExpectedEndOfBlockBeforeEof,
                at,
                at + 2,
                &["code", "}", "{"],
            ));
        }
        CSharpCodeBlock {
            children,
            span: self.source.span(at, self.pos),
            diagnostics,
        }
    }

    /// `@if (...) { } else { }` and friends; the cursor is on the keyword.
    fn parse_statement(&mut self, at: usize, keyword: &str) -> CSharpCodeBlock {
        let mut children = Vec::new();
        let mut diagnostics = Vec::new();
        let mut code_start = self.pos;
        loop {
            loop {
                match self.peek() {
                    None | Some(chars::LBRACE) | Some(chars::SEMICOLON) => break,
                    Some(chars::LPAREN) => {
                        let open = self.pos;
                        if !self.scan_balanced(chars::LPAREN, chars::RPAREN) {
                            diagnostics.push(self.diagnostic(
                                DiagnosticKind::ExpectedCloseBracketBeforeEof,
                                open,
                                open + 1,
                                &["(", ")"],
                            ));
                        }
                    }
                    Some(chars::DQ) | Some(chars::SQ) => self.skip_string_literal(),
                    Some(_) => {
                        self.bump();
                    }
                }
            }
            match self.peek() {
                Some(chars::SEMICOLON) => {
                    self.bump();
                    self.flush_code(&mut children, code_start);
                    break;
                }
                Some(chars::LBRACE) => {
                    self.bump();
                    if !self.parse_code_body(&mut children, code_start, true) {
                        diagnostics.push(self.diagnostic(
                            DiagnosticKind::ExpectedEndOfBlockBeforeEof,
                            at,
                            at + 1 + keyword.len(),
                            &[keyword, "}", "{"],
                        ));
                        break;
                    }
                    let after_block = self.pos;
                    self.skip_whitespace();
                    let word = self.peek_identifier();
                    if continues_statement(keyword, &word) {
                        code_start = after_block;
                        continue;
                    }
                    self.pos = after_block;
                    break;
                }
                _ => {
                    self.flush_code(&mut children, code_start);
                    diagnostics.push(self.diagnostic(
                        DiagnosticKind::ExpectedEndOfBlockBeforeEof,
                        at,
                        at + 1 + keyword.len(),
                        &[keyword, "}", "{"],
                    ));
                    break;
                }
            }
        }
        CSharpCodeBlock {
            children,
            span: self.source.span(at, self.pos),
            diagnostics,
        }
    }

    /// Read code up to the `}` that closes the current block, switching to
    /// markup at statement boundaries. Returns false at end of file.
    fn parse_code_body(
        &mut self,
        children: &mut Vec<SyntaxNode>,
        mut code_start: usize,
        include_close: bool,
    ) -> bool {
        let mut depth = 0usize;
        let mut statement_start = true;
        while let Some(ch) = self.peek() {
            match ch {
                chars::DQ | chars::SQ => {
                    self.skip_string_literal();
                    statement_start = false;
                    continue;
                }
                chars::AT => match self.peek_nth(1) {
                    Some(chars::DQ) => {
                        self.bump();
                        self.skip_verbatim_string();
                        statement_start = false;
                        continue;
                    }
                    Some(chars::COLON) if statement_start => {
                        self.flush_code(children, code_start);
                        self.pos += 2;
                        let line_start = self.pos;
                        self.skip_to_line_end(true);
                        self.push_text(children, line_start, self.pos);
                        code_start = self.pos;
                        continue;
                    }
                    Some(chars::STAR) => {
                        self.flush_code(children, code_start);
                        self.skip_razor_comment();
                        code_start = self.pos;
                        continue;
                    }
                    _ => statement_start = false,
                },
                chars::SLASH if self.peek_nth(1) == Some(chars::SLASH) => {
                    self.skip_to_line_end(false);
                    continue;
                }
                chars::SLASH if self.peek_nth(1) == Some(chars::STAR) => {
                    self.skip_block_comment();
                    continue;
                }
                chars::LT
                    if statement_start && self.peek_nth(1).is_some_and(chars::is_ascii_letter) =>
                {
                    self.flush_code(children, code_start);
                    if self.at_text_transition() {
                        self.parse_text_transition(children);
                    } else {
                        let element = self.parse_element();
                        children.push(SyntaxNode::Element(element));
                    }
                    code_start = self.pos;
                    continue;
                }
                chars::LBRACE => {
                    depth += 1;
                    statement_start = true;
                }
                chars::RBRACE => {
                    if depth == 0 {
                        if include_close {
                            self.bump();
                            self.flush_code(children, code_start);
                        } else {
                            self.flush_code(children, code_start);
                            self.bump();
                        }
                        return true;
                    }
                    depth -= 1;
                    statement_start = true;
                }
                chars::SEMICOLON => statement_start = true,
                ch if chars::is_whitespace(ch) => {}
                _ => statement_start = false,
            }
            self.bump();
        }
        self.flush_code(children, code_start);
        false
    }

    // Directives

    /// The cursor is on the directive name.
    fn parse_directive(
        &mut self,
        at: usize,
        descriptor: &'static DirectiveDescriptor,
    ) -> RazorDirective {
        let name = self.read_identifier();
        let name_end = self.pos;
        let mut tokens = Vec::new();
        let mut body = Vec::new();
        let mut diagnostics = Vec::new();

        for token_descriptor in descriptor.tokens {
            self.skip_inline_whitespace();
            let token_start = self.pos;
            if self.at_line_end() {
                if token_descriptor.optional {
                    break;
                }
                let diagnostic = if self.peek().is_none() {
                    self.diagnostic(
                        DiagnosticKind::UnexpectedEofAfterDirective,
                        at,
                        name_end,
                        &[&name, token_description(token_descriptor.kind)],
                    )
                } else {
                    self.diagnostic(
                        expects_kind(token_descriptor.kind),
                        token_start,
                        token_start,
                        &[&name],
                    )
                };
                diagnostics.push(diagnostic);
                break;
            }
            match self.read_directive_token(token_descriptor.kind) {
                Some(content) => tokens.push(DirectiveToken {
                    kind: token_descriptor.kind,
                    content,
                    span: self.source.span(token_start, self.pos),
                }),
                None => {
                    let end = (token_start + 1).min(self.text.len());
                    diagnostics.push(self.diagnostic(
                        expects_kind(token_descriptor.kind),
                        token_start,
                        end,
                        &[&name],
                    ));
                    break;
                }
            }
        }

        match descriptor.kind {
            DirectiveKind::SingleLine => {
                self.skip_inline_whitespace();
                if self.peek() == Some(chars::SEMICOLON) {
                    self.bump();
                    self.skip_inline_whitespace();
                }
                if self.at_line_end() {
                    self.skip_to_line_end(true);
                }
            }
            DirectiveKind::RazorBlock | DirectiveKind::CodeBlock if diagnostics.is_empty() => {
                self.skip_whitespace();
                match self.peek() {
                    Some(chars::LBRACE) => {
                        let open = self.pos;
                        self.bump();
                        let closed = if descriptor.kind == DirectiveKind::CodeBlock {
                            let body_start = self.pos;
                            self.parse_code_body(&mut body, body_start, false)
                        } else {
                            match self.parse_markup_run(&mut body, None, true) {
                                RunEnd::Brace => {
                                    self.bump();
                                    true
                                }
                                _ => false,
                            }
                        };
                        if !closed {
                            diagnostics.push(self.diagnostic(
                                DiagnosticKind::ExpectedEndOfBlockBeforeEof,
                                open,
                                open + 1,
                                &[&name, "}", "{"],
                            ));
                        }
                    }
                    None => diagnostics.push(self.diagnostic(
                        DiagnosticKind::UnexpectedEofAfterDirective,
                        at,
                        name_end,
                        &[&name, "{"],
                    )),
                    Some(ch) => {
                        let end = self.pos + ch.len_utf8();
                        diagnostics.push(self.diagnostic(
                            DiagnosticKind::UnexpectedCharacterAtStartOfCodeBlock,
                            self.pos,
                            end,
                            &[&ch.to_string()],
                        ));
                    }
                }
            }
            _ => {}
        }

        if descriptor.usage == DirectiveUsage::FileScopedSinglyOccurring
            && !self.seen_directives.insert(descriptor.directive)
        {
            diagnostics.push(self.diagnostic(
                DiagnosticKind::DuplicateDirective,
                at,
                name_end,
                &[&name],
            ));
        }

        RazorDirective {
            name,
            descriptor,
            tokens,
            body,
            span: self.source.span(at, self.pos),
            diagnostics,
        }
    }

    fn read_directive_token(&mut self, kind: DirectiveTokenKind) -> Option<String> {
        let start = self.pos;
        match kind {
            DirectiveTokenKind::Type => {
                let first = self.peek()?;
                if !chars::is_identifier_start(first) && first != chars::LPAREN {
                    return None;
                }
                let mut depth = 0usize;
                while let Some(ch) = self.peek() {
                    match ch {
                        '<' | '(' | '[' => depth += 1,
                        '>' | ')' | ']' => depth = depth.saturating_sub(1),
                        ch if chars::is_new_line(ch) => break,
                        ch if chars::is_whitespace(ch) && depth == 0 => break,
                        _ => {}
                    }
                    self.bump();
                }
                Some(self.text[start..self.pos].to_string())
            }
            DirectiveTokenKind::Namespace => {
                if !self.peek().is_some_and(chars::is_identifier_start) {
                    return None;
                }
                self.skip_to_line_end(false);
                let content = self.text[start..self.pos]
                    .trim_end()
                    .trim_end_matches(chars::SEMICOLON)
                    .trim_end();
                Some(content.to_string())
            }
            DirectiveTokenKind::Member => {
                if !self.peek().is_some_and(chars::is_identifier_start) {
                    return None;
                }
                Some(self.read_identifier())
            }
            DirectiveTokenKind::String => {
                if self.peek() != Some(chars::DQ) {
                    return None;
                }
                let line = &self.text[start + 1..];
                let line_len = line.find(chars::is_new_line).unwrap_or(line.len());
                let close = line[..line_len].find(chars::DQ)?;
                self.pos = start + 1 + close + 1;
                Some(self.text[start..self.pos].to_string())
            }
            DirectiveTokenKind::Boolean => {
                let word = self.peek_identifier();
                if word == "true" || word == "false" {
                    self.pos += word.len();
                    Some(word)
                } else {
                    None
                }
            }
            DirectiveTokenKind::Attribute => {
                if self.peek() != Some(chars::LBRACKET) {
                    return None;
                }
                if !self.scan_balanced(chars::LBRACKET, chars::RBRACKET) {
                    self.pos = start;
                    return None;
                }
                Some(self.text[start..self.pos].to_string())
            }
            DirectiveTokenKind::Text => {
                self.skip_to_line_end(false);
                let content = self.text[start..self.pos].trim_end();
                if content.is_empty() {
                    None
                } else {
                    Some(content.to_string())
                }
            }
        }
    }

    // Code scanning

    /// Advance past a balanced `open ... close` group, skipping strings and
    /// comments. Returns false if the input ends first.
    fn scan_balanced(&mut self, open: char, close: char) -> bool {
        let mut depth = 0usize;
        while let Some(ch) = self.peek() {
            match ch {
                chars::DQ | chars::SQ => {
                    self.skip_string_literal();
                    continue;
                }
                chars::AT if self.peek_nth(1) == Some(chars::DQ) => {
                    self.bump();
                    self.skip_verbatim_string();
                    continue;
                }
                chars::SLASH if self.peek_nth(1) == Some(chars::SLASH) => {
                    self.skip_to_line_end(false);
                    continue;
                }
                chars::SLASH if self.peek_nth(1) == Some(chars::STAR) => {
                    self.skip_block_comment();
                    continue;
                }
                ch if ch == open => depth += 1,
                ch if ch == close => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.bump();
                        return true;
                    }
                }
                _ => {}
            }
            self.bump();
        }
        false
    }

    fn skip_string_literal(&mut self) {
        let start = self.pos;
        let Some(quote) = self.bump() else {
            return;
        };
        while let Some(ch) = self.peek() {
            match ch {
                chars::BACKSLASH => {
                    self.bump();
                    self.bump();
                }
                ch if chars::is_new_line(ch) => break,
                ch if ch == quote => {
                    self.bump();
                    return;
                }
                _ => {
                    self.bump();
                }
            }
        }
        self.error(DiagnosticKind::UnterminatedStringLiteral, start, self.pos, &[]);
    }

    /// `@"..."` with `""` escapes; the cursor is on the opening quote.
    fn skip_verbatim_string(&mut self) {
        let start = self.pos;
        self.bump();
        while let Some(ch) = self.peek() {
            if ch == chars::DQ {
                if self.peek_nth(1) == Some(chars::DQ) {
                    self.pos += 2;
                    continue;
                }
                self.bump();
                return;
            }
            self.bump();
        }
        self.error(DiagnosticKind::UnterminatedStringLiteral, start, self.pos, &[]);
    }

    fn skip_block_comment(&mut self) {
        self.pos += 2;
        match self.text[self.pos..].find("*/") {
            Some(offset) => self.pos += offset + 2,
            None => self.pos = self.text.len(),
        }
    }

    fn skip_razor_comment(&mut self) {
        let start = self.pos;
        self.pos += 2;
        match self.text[self.pos..].find("*@") {
            Some(offset) => self.pos += offset + 2,
            None => {
                self.error(DiagnosticKind::RazorCommentNotTerminated, start, start + 2, &[]);
                self.pos = self.text.len();
            }
        }
    }

    // Cursor helpers

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.text[self.pos..].chars().nth(n)
    }

    fn previous_char(&self) -> Option<char> {
        self.text[..self.pos].chars().next_back()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.text[self.pos..].starts_with(prefix)
    }

    fn read_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(&predicate) {
            self.bump();
        }
        self.text[start..self.pos].to_string()
    }

    fn read_identifier(&mut self) -> String {
        self.read_while(chars::is_identifier_part)
    }

    fn peek_identifier(&self) -> String {
        self.text[self.pos..]
            .chars()
            .take_while(|&ch| chars::is_identifier_part(ch))
            .collect()
    }

    fn peek_end_tag_name(&self) -> String {
        self.text[self.pos + 2..]
            .chars()
            .take_while(|&ch| chars::is_name_char(ch))
            .collect()
    }

    fn at_end_tag_named(&self, name: &str) -> bool {
        if !self.starts_with("</") {
            return false;
        }
        let rest = &self.text[self.pos + 2..];
        rest.len() >= name.len()
            && rest.is_char_boundary(name.len())
            && rest[..name.len()].eq_ignore_ascii_case(name)
            && rest[name.len()..]
                .chars()
                .next()
                .is_some_and(|ch| ch == chars::GT || chars::is_whitespace(ch))
    }

    fn at_text_transition(&self) -> bool {
        let rest = &self.text[self.pos..];
        rest.len() >= 5
            && rest[..5].eq_ignore_ascii_case("<text")
            && rest[5..]
                .chars()
                .next()
                .is_some_and(|ch| ch == chars::GT || ch == chars::SLASH || chars::is_whitespace(ch))
    }

    /// An `@` that starts code inside an attribute value.
    fn at_code_transition(&self) -> bool {
        self.peek() == Some(chars::AT)
            && !self.previous_char().is_some_and(char::is_alphanumeric)
            && self
                .peek_nth(1)
                .is_some_and(|ch| ch == chars::LPAREN || chars::is_identifier_start(ch))
    }

    fn at_line_end(&self) -> bool {
        self.peek().map_or(true, chars::is_new_line)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(chars::is_whitespace) {
            self.bump();
        }
    }

    fn skip_inline_whitespace(&mut self) {
        while self
            .peek()
            .is_some_and(|ch| ch == chars::SPACE || ch == chars::TAB)
        {
            self.bump();
        }
    }

    fn skip_to_line_end(&mut self, include_newline: bool) {
        while self.peek().is_some_and(|ch| !chars::is_new_line(ch)) {
            self.bump();
        }
        if include_newline {
            if self.starts_with("\r\n") {
                self.pos += 2;
            } else if self.peek().is_some_and(chars::is_new_line) {
                self.bump();
            }
        }
    }

    // Node helpers

    fn flush_text(&self, nodes: &mut Vec<SyntaxNode>, start: usize) {
        self.push_text(nodes, start, self.pos);
    }

    fn push_text(&self, nodes: &mut Vec<SyntaxNode>, start: usize, end: usize) {
        if end > start {
            nodes.push(SyntaxNode::Text(TextLiteral {
                content: self.text[start..end].to_string(),
                span: self.source.span(start, end),
            }));
        }
    }

    fn flush_code(&self, children: &mut Vec<SyntaxNode>, start: usize) {
        if self.pos > start {
            children.push(SyntaxNode::Code(CodeLiteral {
                content: self.text[start..self.pos].to_string(),
                span: self.source.span(start, self.pos),
            }));
        }
    }

    fn diagnostic(
        &self,
        kind: DiagnosticKind,
        start: usize,
        end: usize,
        args: &[&str],
    ) -> RazorDiagnostic {
        RazorDiagnostic::create(kind, Some(self.source.span(start, end)), args)
    }

    fn error(&mut self, kind: DiagnosticKind, start: usize, end: usize, args: &[&str]) {
        let diagnostic = self.diagnostic(kind, start, end, args);
        self.diagnostics.push(diagnostic);
    }
}

fn expects_kind(kind: DirectiveTokenKind) -> DiagnosticKind {
    match kind {
        DirectiveTokenKind::Type | DirectiveTokenKind::Attribute => {
            DiagnosticKind::DirectiveExpectsTypeName
        }
        DirectiveTokenKind::Namespace => DiagnosticKind::DirectiveExpectsNamespace,
        DirectiveTokenKind::Member => DiagnosticKind::DirectiveExpectsIdentifier,
        DirectiveTokenKind::String | DirectiveTokenKind::Text => {
            DiagnosticKind::DirectiveExpectsQuotedStringLiteral
        }
        DirectiveTokenKind::Boolean => DiagnosticKind::DirectiveExpectsBooleanLiteral,
    }
}

fn token_description(kind: DirectiveTokenKind) -> &'static str {
    match kind {
        DirectiveTokenKind::Type => "type name",
        DirectiveTokenKind::Namespace => "namespace",
        DirectiveTokenKind::Member => "identifier",
        DirectiveTokenKind::String | DirectiveTokenKind::Text => "string",
        DirectiveTokenKind::Boolean => "boolean",
        DirectiveTokenKind::Attribute => "attribute",
    }
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}
