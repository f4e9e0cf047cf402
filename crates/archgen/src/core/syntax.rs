//! Syntax parser abstraction trait
//!
//! This trait abstracts the line-oriented parsing of pseudocode into
//! a flat sequence of [`ParsedItem`] records that a model builder consumes.

use super::{ParsedItem, PseudocodeLine};

/// Trait for parsing pseudocode into a sequence of parsed items
///
/// Parsing is total: every input produces a (possibly empty) item list.
/// Lines that match no pattern contribute nothing.
///
/// # Example
/// ```
/// use archgen::core::SyntaxParser;
/// use archgen::uml::PseudocodeParser;
///
/// let items = PseudocodeParser::new().parse("function foo()\nfoo calls bar()");
/// assert_eq!(items.len(), 2);
/// ```
pub trait SyntaxParser: Send + Sync {
    /// Classify a single line, returning the item it contains if any
    fn parse_line(&self, line: &PseudocodeLine<'_>) -> Option<ParsedItem>;

    /// Parse input text into items, preserving line order
    fn parse(&self, input: &str) -> Vec<ParsedItem> {
        PseudocodeLine::split(input)
            .filter_map(|line| self.parse_line(&line))
            .collect()
    }

    /// Get the name of this syntax parser
    fn name(&self) -> &'static str;

    /// Get the version of this syntax parser
    fn version(&self) -> &'static str;
}
