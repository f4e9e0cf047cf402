//! Core serializer trait for diagram output
//!
//! This trait defines the interface for turning a diagram model into
//! the text of a diagram-description language.

use super::Database;

/// Core trait for diagram serializers
///
/// Serialization is a pure function of the model: the same model always
/// yields byte-identical output.
///
/// # Example
/// ```
/// use archgen::core::Serializer;
/// use archgen::uml::{PlantUmlSerializer, UmlModel};
///
/// let text = PlantUmlSerializer::new().serialize(&UmlModel::new());
/// assert_eq!(text, "@startuml\n@enduml");
/// ```
pub trait Serializer<D: Database>: Send + Sync {
    /// Serialize the model into the output format
    fn serialize(&self, database: &D) -> String;

    /// Get the name of this serializer
    fn name(&self) -> &'static str;

    /// Get the supported output format
    fn format(&self) -> &'static str;
}
