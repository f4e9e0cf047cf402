//! Pseudocode parser
//!
//! Classifies normalized pseudocode lines into declarations and call edges.
//!
//! Two line shapes are recognized:
//!
//! ```text
//! function <name>(...)          declaration
//! ... <caller> calls <callee>(...)   call edge
//! ```
//!
//! The declaration pattern is tested first, so a line such as
//! `function main calls helper()` is a declaration of `main calls helper`.

use tracing::{debug, span, trace, Level};

use crate::core::{CallEdge, Declaration, ParsedItem, PseudocodeLine, SyntaxParser};

const FUNCTION_KEYWORD: &str = "function";
const CALLS_KEYWORD: &str = "calls";

/// Line-oriented pseudocode parser
#[derive(Debug, Clone, Copy, Default)]
pub struct PseudocodeParser;

impl PseudocodeParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a declaration line like "function foo(a, b)"
    ///
    /// The keyword must be followed by whitespace or end the line. The name
    /// is everything after it up to the first `(`, trimmed, and may be empty.
    fn parse_declaration(&self, line: &PseudocodeLine<'_>) -> Option<Declaration> {
        let rest = line.text.strip_prefix(FUNCTION_KEYWORD)?;
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return None;
        }

        Some(Declaration::new(until_paren(rest).trim(), line.number))
    }

    /// Parse a call line like "main calls helper(x)"
    ///
    /// The caller is the last whitespace-separated token before `calls`,
    /// without any parenthesis suffix. The callee is everything after
    /// `calls` up to the first `(`, trimmed.
    fn parse_call(&self, line: &PseudocodeLine<'_>) -> Option<CallEdge> {
        let pos = find_word(line.text, CALLS_KEYWORD)?;
        let before = &line.text[..pos];
        let after = &line.text[pos + CALLS_KEYWORD.len()..];

        let caller = before
            .split_whitespace()
            .next_back()
            .map(|token| until_paren(token).trim())
            .unwrap_or_default();
        let callee = until_paren(after).trim();

        Some(CallEdge::new(caller, callee, line.number))
    }
}

impl SyntaxParser for PseudocodeParser {
    fn parse_line(&self, line: &PseudocodeLine<'_>) -> Option<ParsedItem> {
        if let Some(decl) = self.parse_declaration(line) {
            trace!(line = line.number, name = %decl.name, "Declaration");
            return Some(decl.into());
        }

        if let Some(edge) = self.parse_call(line) {
            trace!(line = line.number, caller = %edge.caller, callee = %edge.callee, "Call");
            return Some(edge.into());
        }

        None
    }

    fn parse(&self, input: &str) -> Vec<ParsedItem> {
        let parse_span = span!(Level::DEBUG, "parse_pseudocode", input_len = input.len());
        let _enter = parse_span.enter();

        let items: Vec<ParsedItem> = PseudocodeLine::split(input)
            .filter(|line| !line.is_blank())
            .filter_map(|line| self.parse_line(&line))
            .collect();

        debug!(item_count = items.len(), "Parsed pseudocode");
        items
    }

    fn name(&self) -> &'static str {
        "pseudocode"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }
}

/// Text before the first `(`, or all of it
fn until_paren(text: &str) -> &str {
    text.split('(').next().unwrap_or(text)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte offset of the first occurrence of `word` not embedded in a longer identifier
fn find_word(haystack: &str, word: &str) -> Option<usize> {
    haystack.match_indices(word).map(|(pos, _)| pos).find(|&pos| {
        let before_ok = haystack[..pos].chars().next_back().map_or(true, |c| !is_ident_char(c));
        let after_ok = haystack[pos + word.len()..]
            .chars()
            .next()
            .map_or(true, |c| !is_ident_char(c));
        before_ok && after_ok
    })
}
