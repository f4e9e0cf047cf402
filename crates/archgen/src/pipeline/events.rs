//! Stage request and response payloads
//!
//! Each stage is invoked independently with a small JSON object and answers
//! with another one, so stages can be chained by anything that forwards JSON.

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::core::PipelineError;

/// Request for the translate stage: base64-encoded source code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateRequest {
    #[serde(default)]
    pub code_content: Option<String>,
}

impl TranslateRequest {
    /// Encode raw source code into a request
    pub fn from_source(source_code: &str) -> Self {
        Self {
            code_content: Some(base64::engine::general_purpose::STANDARD.encode(source_code)),
        }
    }

    /// Decode the source code carried by this request
    pub fn decode(&self) -> Result<String, PipelineError> {
        let encoded = self
            .code_content
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PipelineError::missing_input("code_content"))?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| PipelineError::invalid_encoding("code_content", e))?;
        String::from_utf8(bytes).map_err(|e| PipelineError::invalid_encoding("code_content", e))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub pseudocode_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateUmlRequest {
    #[serde(default)]
    pub pseudocode_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateUmlResponse {
    pub uml_code_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateDiagramRequest {
    #[serde(default)]
    pub uml_code_key: Option<String>,
}

/// Presigned links to every artifact the pipeline produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramLinks {
    pub pseudocode_url: String,
    pub uml_code_url: String,
    pub svg_diagram_url: String,
}

/// Return the key if present and non-blank
pub(crate) fn require_key<'a>(
    key: Option<&'a str>,
    field: &'static str,
) -> Result<&'a str, PipelineError> {
    key.map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| PipelineError::missing_input(field))
}
