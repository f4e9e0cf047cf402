//! Archgen - Turn source code into architecture diagrams
//!
//! The pipeline has three stages: an LLM translates source code into
//! pseudocode, a deterministic translator derives a PlantUML class diagram
//! from that pseudocode, and PlantUML renders it to SVG.
//!
//! The middle stage is pure and lives in [`uml`]; the stages around it and
//! their collaborators live in [`pipeline`].
//!
//! # Quick Start
//!
//! ```rust
//! use archgen::translate_to_uml;
//!
//! let uml = translate_to_uml("function foo()\nfunction bar()\nfoo calls bar()");
//! assert_eq!(uml, "@startuml\nclass foo {\n}\nclass bar {\n}\nfoo --> bar\n@enduml");
//! ```
//!
//! # Advanced Usage
//!
//! For more control, use the individual components:
//!
//! ```rust
//! use archgen::prelude::*;
//!
//! let items = PseudocodeParser::new().parse("main calls load()\nmain calls load()");
//! let model = UmlModel::from_items(items);
//! assert_eq!(model.relationship_count(), 2);
//!
//! let text = PlantUmlSerializer::new().serialize(&model);
//! assert!(text.starts_with("@startuml"));
//! ```

pub mod core;
pub mod pipeline;
pub mod uml;

pub use crate::core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        CallEdge, Config, Database, Declaration, Environment, ParsedItem, PipelineError,
        PseudocodeLine, Serializer, SyntaxParser,
    };
    pub use crate::pipeline::{
        BlobStore, DiagramRenderer, FsBlobStore, MemoryBlobStore, Orchestrator, Translator,
    };
    pub use crate::uml::{ModelBuilder, PlantUmlSerializer, PseudocodeParser, UmlClass, UmlModel};
}

/// Translate pseudocode into a PlantUML document
///
/// Total over all inputs: unrecognized lines are ignored and the result
/// always has exactly one `@startuml` header and one `@enduml` footer.
///
/// # Example
/// ```rust
/// use archgen::translate_to_uml;
///
/// assert_eq!(translate_to_uml(""), "@startuml\n@enduml");
/// ```
pub fn translate_to_uml(pseudocode: &str) -> String {
    uml::translate_to_uml(pseudocode)
}

/// Parse pseudocode into a UML model without serializing it
///
/// # Example
/// ```rust
/// use archgen::parse;
///
/// let model = parse("function foo()\nfunction foo()\nfoo calls bar()");
/// assert_eq!(model.class_count(), 1);
/// assert_eq!(model.relationship_count(), 1);
/// ```
pub fn parse(pseudocode: &str) -> uml::UmlModel {
    uml::build_model(pseudocode)
}
