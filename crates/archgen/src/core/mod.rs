//! Core abstractions for pseudocode processing
//!
//! This module defines the traits the UML core is built from, the records
//! passed between them, and the ambient pieces (errors, configuration,
//! logging) shared with the pipeline.

pub mod config;
mod database;
mod error;
pub mod logging;
mod serializer;
mod syntax;
mod types;

pub use config::{Config, Environment};
pub use database::*;
pub use error::*;
pub use logging::*;
pub use serializer::*;
pub use syntax::*;
pub use types::*;
