//! Code-to-diagram pipeline
//!
//! The three stages and the collaborators they depend on. Each collaborator
//! is a capability trait so the orchestrator can be driven by test doubles.

pub mod blob;
pub mod events;
pub mod orchestrator;
pub mod renderer;
pub mod translator;

pub use blob::{BlobStore, FsBlobStore, MemoryBlobStore};
pub use events::{
    DiagramLinks, GenerateDiagramRequest, GenerateUmlRequest, GenerateUmlResponse,
    TranslateRequest, TranslateResponse,
};
pub use orchestrator::{
    describe_error, Orchestrator, Stage, DEFAULT_PRESIGN_TTL, DIAGRAM_KEY, PSEUDOCODE_KEY,
    UML_CODE_KEY,
};
pub use renderer::{DiagramRenderer, PlantUmlRenderer, DEFAULT_PLANTUML_JAR};
pub use translator::{AnthropicTranslator, Translator};
