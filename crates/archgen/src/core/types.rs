//! Core type definitions for pseudocode processing
//!
//! This module contains the records the parser extracts from pseudocode:
//! numbered input lines, function declarations and call edges.

use serde::Serialize;
use std::fmt;

/// One logical line of pseudocode
///
/// Holds both the raw text and the whitespace-trimmed text the parser
/// actually matches against. Line numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PseudocodeLine<'a> {
    /// 1-based line number, for diagnostics
    pub number: usize,
    /// Text exactly as it appeared in the input (without the `\n`)
    pub raw: &'a str,
    /// Text with leading and trailing whitespace removed
    pub text: &'a str,
}

impl<'a> PseudocodeLine<'a> {
    pub fn new(number: usize, raw: &'a str) -> Self {
        Self {
            number,
            raw,
            text: raw.trim(),
        }
    }

    /// Split input on `\n` into numbered lines
    ///
    /// Carriage returns are removed by trimming, so CRLF input behaves
    /// the same as LF input.
    pub fn split(input: &'a str) -> impl Iterator<Item = PseudocodeLine<'a>> + 'a {
        input
            .split('\n')
            .enumerate()
            .map(|(idx, raw)| PseudocodeLine::new(idx + 1, raw))
    }

    /// Returns true if the trimmed line has no content
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// A declared function: `function <name>(...)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Declaration {
    /// Declared name; may be empty for malformed lines
    pub name: String,
    /// Line the declaration was read from
    pub line: usize,
}

impl Declaration {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "function {}", self.name)
    }
}

/// A directed call relationship: `<caller> calls <callee>(...)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CallEdge {
    /// Calling side; may be empty for malformed lines
    pub caller: String,
    /// Called side; may be empty for malformed lines
    pub callee: String,
    /// Line the edge was read from
    pub line: usize,
}

impl CallEdge {
    pub fn new(caller: impl Into<String>, callee: impl Into<String>, line: usize) -> Self {
        Self {
            caller: caller.into(),
            callee: callee.into(),
            line,
        }
    }

    /// Returns true if both endpoints carry a name
    pub fn is_complete(&self) -> bool {
        !self.caller.is_empty() && !self.callee.is_empty()
    }
}

impl fmt::Display for CallEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} calls {}", self.caller, self.callee)
    }
}

/// A single record extracted from a pseudocode line
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParsedItem {
    Declaration(Declaration),
    Call(CallEdge),
}

impl ParsedItem {
    /// Line the item was read from
    pub fn line(&self) -> usize {
        match self {
            ParsedItem::Declaration(decl) => decl.line,
            ParsedItem::Call(edge) => edge.line,
        }
    }
}

impl fmt::Display for ParsedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedItem::Declaration(decl) => decl.fmt(f),
            ParsedItem::Call(edge) => edge.fmt(f),
        }
    }
}

impl From<Declaration> for ParsedItem {
    fn from(value: Declaration) -> Self {
        ParsedItem::Declaration(value)
    }
}

impl From<CallEdge> for ParsedItem {
    fn from(value: CallEdge) -> Self {
        ParsedItem::Call(value)
    }
}
