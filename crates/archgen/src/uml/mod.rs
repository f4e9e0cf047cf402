//! Pseudocode to UML translation
//!
//! Parse → Build → Serialize, all total: any input text yields a
//! well-formed PlantUML document.

mod model;
mod parser;
mod serializer;

pub use model::{ModelBuilder, UmlClass, UmlModel};
pub use parser::PseudocodeParser;
pub use serializer::{PlantUmlSerializer, FOOTER, HEADER};

use tracing::{info, span, Level};

use crate::core::{Serializer, SyntaxParser};

/// Parse pseudocode text into a model without serializing it
pub fn build_model(pseudocode: &str) -> UmlModel {
    let items = PseudocodeParser::new().parse(pseudocode);
    UmlModel::from_items(items)
}

/// Translate pseudocode text into a PlantUML document
pub fn translate_to_uml(pseudocode: &str) -> String {
    let uml_span = span!(Level::INFO, "translate_to_uml", input_len = pseudocode.len());
    let _enter = uml_span.enter();

    let model = build_model(pseudocode);
    let document = PlantUmlSerializer::new().serialize(&model);

    info!(
        class_count = model.class_count(),
        relationship_count = model.relationship_count(),
        "UML code generation successful"
    );
    document
}
