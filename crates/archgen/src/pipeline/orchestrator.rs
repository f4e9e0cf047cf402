//! Pipeline orchestrator for the code-to-diagram stages
//!
//! The orchestrator manages the flow of artifacts through the stages:
//! Translate → Generate UML → Generate Diagram
//!
//! Stages communicate only through blob keys. Collaborator failures are
//! surfaced without retry, tagged with the stage and the external call that
//! failed.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, error, info, span, Level};

use super::blob::BlobStore;
use super::events::{
    require_key, DiagramLinks, GenerateDiagramRequest, GenerateUmlRequest, GenerateUmlResponse,
    TranslateRequest, TranslateResponse,
};
use super::renderer::DiagramRenderer;
use super::translator::Translator;
use crate::core::{Config, PipelineError};
use crate::uml::translate_to_uml;

pub const PSEUDOCODE_KEY: &str = "pseudocode.txt";
pub const UML_CODE_KEY: &str = "uml_code.puml";
pub const DIAGRAM_KEY: &str = "diagram.svg";
pub const DEFAULT_PRESIGN_TTL: Duration = Duration::from_secs(3600);

/// Pipeline stage, used to label failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Translate,
    GenerateUml,
    GenerateDiagram,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Translate => write!(f, "translate"),
            Stage::GenerateUml => write!(f, "uml"),
            Stage::GenerateDiagram => write!(f, "diagram"),
        }
    }
}

/// Log the failure and attach which stage and external call produced it
fn stage_failure<T>(
    result: Result<T, PipelineError>,
    stage: Stage,
    call: impl FnOnce() -> String,
) -> Result<T> {
    result.map_err(|e| {
        let call = call();
        error!(%stage, call = %call, error = %e, "Stage failed");
        anyhow::Error::new(e).context(format!("{stage} stage: {call} failed"))
    })
}

/// Orchestrator that owns the collaborators and runs the stages
pub struct Orchestrator {
    config: Config,
    store: Arc<dyn BlobStore>,
    translator: Arc<dyn Translator>,
    renderer: Arc<dyn DiagramRenderer>,
    presign_ttl: Duration,
}

impl Orchestrator {
    pub fn new(
        config: Config,
        store: Arc<dyn BlobStore>,
        translator: Arc<dyn Translator>,
        renderer: Arc<dyn DiagramRenderer>,
    ) -> Self {
        Self {
            config,
            store,
            translator,
            renderer,
            presign_ttl: DEFAULT_PRESIGN_TTL,
        }
    }

    /// Override how long presigned links stay valid
    #[must_use]
    pub fn with_presign_ttl(mut self, ttl: Duration) -> Self {
        self.presign_ttl = ttl;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn presign_ttl(&self) -> Duration {
        self.presign_ttl
    }

    /// Stage 1: translate source code to pseudocode and store it
    ///
    /// Returns the pseudocode blob key.
    pub fn translate_code(&self, source_code: &str) -> Result<String> {
        let stage = Stage::Translate;
        let stage_span = span!(Level::INFO, "translate_stage", input_len = source_code.len());
        let _enter = stage_span.enter();

        let pseudocode = stage_failure(self.translator.translate(source_code), stage, || {
            "translator call".to_string()
        })?;
        if pseudocode.trim().is_empty() {
            return stage_failure(
                Err(PipelineError::translate("No pseudocode generated")),
                stage,
                || "translator call".to_string(),
            );
        }
        debug!(output_len = pseudocode.len(), "Pseudocode received");

        let key = self.put(stage, PSEUDOCODE_KEY, pseudocode.as_bytes())?;
        info!(key = %key, "Translate stage completed");
        Ok(key)
    }

    /// Stage 1 driven by a request payload
    pub fn handle_translate(&self, request: &TranslateRequest) -> Result<TranslateResponse> {
        let source_code = stage_failure(request.decode(), Stage::Translate, || {
            "request decoding".to_string()
        })?;
        let pseudocode_key = self.translate_code(&source_code)?;
        Ok(TranslateResponse { pseudocode_key })
    }

    /// Stage 2: fetch pseudocode, derive UML source and store it
    ///
    /// Returns the UML source blob key.
    pub fn generate_uml(&self, pseudocode_key: &str) -> Result<String> {
        let stage = Stage::GenerateUml;
        let stage_span = span!(Level::INFO, "uml_stage", pseudocode_key);
        let _enter = stage_span.enter();

        let bytes = self.get(stage, pseudocode_key)?;
        let pseudocode = stage_failure(
            String::from_utf8(bytes).map_err(|e| PipelineError::invalid_encoding(pseudocode_key, e)),
            stage,
            || format!("decoding '{pseudocode_key}'"),
        )?;

        let uml = translate_to_uml(&pseudocode);

        let key = self.put(stage, UML_CODE_KEY, uml.as_bytes())?;
        info!(key = %key, "UML stage completed");
        Ok(key)
    }

    /// Stage 2 driven by a request payload
    pub fn handle_generate_uml(&self, request: &GenerateUmlRequest) -> Result<GenerateUmlResponse> {
        let key = stage_failure(
            require_key(request.pseudocode_key.as_deref(), "pseudocode_key"),
            Stage::GenerateUml,
            || "request validation".to_string(),
        )?;
        let uml_code_key = self.generate_uml(key)?;
        Ok(GenerateUmlResponse { uml_code_key })
    }

    /// Stage 3: fetch UML source, render it and return links to all artifacts
    pub fn generate_diagram(&self, uml_code_key: &str) -> Result<DiagramLinks> {
        let stage = Stage::GenerateDiagram;
        let stage_span = span!(Level::INFO, "diagram_stage", uml_code_key);
        let _enter = stage_span.enter();

        let bytes = self.get(stage, uml_code_key)?;
        let uml = stage_failure(
            String::from_utf8(bytes).map_err(|e| PipelineError::invalid_encoding(uml_code_key, e)),
            stage,
            || format!("decoding '{uml_code_key}'"),
        )?;

        let svg = stage_failure(self.renderer.render(&uml), stage, || {
            "renderer call".to_string()
        })?;
        let svg_key = self.put(stage, DIAGRAM_KEY, &svg)?;

        let links = DiagramLinks {
            pseudocode_url: self.presign(stage, PSEUDOCODE_KEY)?,
            uml_code_url: self.presign(stage, uml_code_key)?,
            svg_diagram_url: self.presign(stage, &svg_key)?,
        };
        info!("Diagram stage completed");
        Ok(links)
    }

    /// Stage 3 driven by a request payload
    pub fn handle_generate_diagram(&self, request: &GenerateDiagramRequest) -> Result<DiagramLinks> {
        let key = stage_failure(
            require_key(request.uml_code_key.as_deref(), "uml_code_key"),
            Stage::GenerateDiagram,
            || "request validation".to_string(),
        )?;
        self.generate_diagram(key)
    }

    /// Run all three stages on raw source code
    pub fn run(&self, source_code: &str) -> Result<DiagramLinks> {
        let run_span = span!(
            Level::INFO,
            "run_pipeline",
            bucket = %self.config.storage_bucket,
            environment = %self.config.environment
        );
        let _enter = run_span.enter();

        info!("Starting diagram pipeline");
        let pseudocode_key = self.translate_code(source_code)?;
        let uml_code_key = self.generate_uml(&pseudocode_key)?;
        let links = self.generate_diagram(&uml_code_key)?;
        info!("Pipeline completed successfully");
        Ok(links)
    }

    fn get(&self, stage: Stage, key: &str) -> Result<Vec<u8>> {
        stage_failure(self.store.get(key), stage, || format!("blob get '{key}'"))
    }

    fn put(&self, stage: Stage, key: &str, bytes: &[u8]) -> Result<String> {
        stage_failure(self.store.put(key, bytes), stage, || {
            format!("blob put '{key}'")
        })
    }

    fn presign(&self, stage: Stage, key: &str) -> Result<String> {
        stage_failure(self.store.presign(key, self.presign_ttl), stage, || {
            format!("blob presign '{key}'")
        })
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("bucket", &self.store.bucket())
            .field("presign_ttl", &self.presign_ttl)
            .finish_non_exhaustive()
    }
}

/// Convenience for callers that only need the context chain as one string
pub fn describe_error(err: &anyhow::Error) -> String {
    err.chain()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}
