//! PlantUML serializer
//!
//! Renders a [`UmlModel`] as PlantUML class-diagram source:
//!
//! ```text
//! @startuml
//! class foo {
//! }
//! class bar {
//! }
//! foo --> bar
//! @enduml
//! ```

use std::borrow::Cow;
use std::fmt::Write as _;

use tracing::debug;

use super::model::UmlModel;
use crate::core::Serializer;

pub const HEADER: &str = "@startuml";
pub const FOOTER: &str = "@enduml";
const ARROW: &str = "-->";

/// Words PlantUML treats as commands or declarations at the start of a line
const RESERVED_WORDS: &[&str] = &[
    "abstract",
    "annotation",
    "as",
    "caption",
    "circle",
    "class",
    "diamond",
    "end",
    "endfooter",
    "endheader",
    "endlegend",
    "endnote",
    "entity",
    "enum",
    "exception",
    "footer",
    "header",
    "hide",
    "interface",
    "legend",
    "namespace",
    "newpage",
    "note",
    "package",
    "remove",
    "scale",
    "set",
    "show",
    "skin",
    "skinparam",
    "struct",
    "title",
    "together",
];

fn is_reserved(name: &str) -> bool {
    RESERVED_WORDS
        .iter()
        .any(|word| word.eq_ignore_ascii_case(name))
}

/// Serializer producing PlantUML source text
#[derive(Debug, Clone, Copy, Default)]
pub struct PlantUmlSerializer;

impl PlantUmlSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl Serializer<UmlModel> for PlantUmlSerializer {
    fn serialize(&self, model: &UmlModel) -> String {
        let mut out = String::with_capacity(
            HEADER.len() + FOOTER.len() + 16 * (model.class_count() + model.relationship_count()),
        );

        out.push_str(HEADER);
        out.push('\n');

        // Writing to a String cannot fail
        for class in model.classes() {
            let _ = write!(out, "class {} {{\n}}\n", quote_name(&class.name));
        }

        for edge in model.relationships() {
            let _ = writeln!(
                out,
                "{} {} {}",
                quote_name(&edge.caller),
                ARROW,
                quote_name(&edge.callee)
            );
        }

        out.push_str(FOOTER);

        debug!(output_len = out.len(), "Serialized PlantUML");
        out
    }

    fn name(&self) -> &'static str {
        "plantuml"
    }

    fn format(&self) -> &'static str {
        "puml"
    }
}

/// Emit plain identifiers bare and anything else double-quoted
///
/// Reserved words are quoted even though they are identifiers. PlantUML has
/// no escape inside quoted names, so embedded double quotes become single
/// quotes.
fn quote_name(name: &str) -> Cow<'_, str> {
    let plain = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !is_reserved(name);
    if plain {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("\"{}\"", name.replace('"', "'")))
    }
}
