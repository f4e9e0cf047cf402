//! End-to-end tests for the staged pipeline with test doubles
//!
//! The translator and renderer are replaced by in-process doubles so the
//! orchestration, storage and error tagging can be exercised offline.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use archgen::pipeline::{
    describe_error, BlobStore, DiagramRenderer, FsBlobStore, GenerateDiagramRequest,
    GenerateUmlRequest, MemoryBlobStore, Orchestrator, TranslateRequest, Translator,
    DIAGRAM_KEY, PSEUDOCODE_KEY, UML_CODE_KEY,
};
use archgen::{Config, Environment, PipelineError};

const PSEUDOCODE: &str = "function main()\nfunction load()\nmain calls load()\nmain calls save()";

struct FixedTranslator {
    output: String,
    calls: AtomicUsize,
}

impl FixedTranslator {
    fn new(output: &str) -> Self {
        Self {
            output: output.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl Translator for FixedTranslator {
    fn translate(&self, _source_code: &str) -> Result<String, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}

struct FailingTranslator;

impl Translator for FailingTranslator {
    fn translate(&self, _source_code: &str) -> Result<String, PipelineError> {
        Err(PipelineError::Api {
            status: 529,
            body: "overloaded".to_string(),
        })
    }
}

/// Wraps the UML source in a fake SVG document
struct SvgRenderer;

impl DiagramRenderer for SvgRenderer {
    fn render(&self, uml_source: &str) -> Result<Vec<u8>, PipelineError> {
        Ok(format!("<svg><!--\n{uml_source}\n--></svg>").into_bytes())
    }
}

struct FailingRenderer;

impl DiagramRenderer for FailingRenderer {
    fn render(&self, _uml_source: &str) -> Result<Vec<u8>, PipelineError> {
        Err(PipelineError::render("PlantUML exited with exit status: 1"))
    }
}

fn config() -> Config {
    Config::new(Environment::Dev, "archgen-dev-artifacts", "sk-test")
}

fn memory_orchestrator(
    translator: Arc<dyn Translator>,
    renderer: Arc<dyn DiagramRenderer>,
) -> (Arc<MemoryBlobStore>, Orchestrator) {
    let store = Arc::new(MemoryBlobStore::new("archgen-dev-artifacts"));
    let orchestrator = Orchestrator::new(config(), store.clone(), translator, renderer);
    (store, orchestrator)
}

#[test]
fn test_run_stores_all_artifacts() {
    let translator = Arc::new(FixedTranslator::new(PSEUDOCODE));
    let (store, orchestrator) = memory_orchestrator(translator.clone(), Arc::new(SvgRenderer));

    let links = orchestrator.run("def main():\n    save(load())\n").unwrap();

    assert_eq!(translator.calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.len().unwrap(), 3);
    assert_eq!(store.get(PSEUDOCODE_KEY).unwrap(), PSEUDOCODE.as_bytes());
    assert_eq!(
        String::from_utf8(store.get(UML_CODE_KEY).unwrap()).unwrap(),
        "@startuml\nclass main {\n}\nclass load {\n}\nmain --> load\nmain --> save\n@enduml"
    );
    assert!(String::from_utf8(store.get(DIAGRAM_KEY).unwrap())
        .unwrap()
        .starts_with("<svg>"));

    assert!(links
        .pseudocode_url
        .starts_with("memory://archgen-dev-artifacts/pseudocode.txt?expires="));
    assert!(links.uml_code_url.contains("/uml_code.puml?expires="));
    assert!(links.svg_diagram_url.contains("/diagram.svg?expires="));
}

#[test]
fn test_stages_chain_through_requests() {
    let (_store, orchestrator) = memory_orchestrator(
        Arc::new(FixedTranslator::new(PSEUDOCODE)),
        Arc::new(SvgRenderer),
    );

    let translated = orchestrator
        .handle_translate(&TranslateRequest::from_source("print('hi')"))
        .unwrap();
    assert_eq!(translated.pseudocode_key, PSEUDOCODE_KEY);

    let uml = orchestrator
        .handle_generate_uml(&GenerateUmlRequest {
            pseudocode_key: Some(translated.pseudocode_key),
        })
        .unwrap();
    assert_eq!(uml.uml_code_key, UML_CODE_KEY);

    let links = orchestrator
        .handle_generate_diagram(&GenerateDiagramRequest {
            uml_code_key: Some(uml.uml_code_key),
        })
        .unwrap();
    assert!(links.svg_diagram_url.contains(DIAGRAM_KEY));
}

#[test]
fn test_translate_missing_code_content() {
    let translator = Arc::new(FixedTranslator::new(PSEUDOCODE));
    let (store, orchestrator) = memory_orchestrator(translator.clone(), Arc::new(SvgRenderer));

    let err = orchestrator
        .handle_translate(&TranslateRequest::default())
        .unwrap_err();
    assert!(describe_error(&err).contains("code_content not provided"));
    assert_eq!(translator.calls.load(Ordering::SeqCst), 0);
    assert!(store.is_empty().unwrap());
}

#[test]
fn test_generate_uml_missing_key() {
    let (_store, orchestrator) = memory_orchestrator(
        Arc::new(FixedTranslator::new(PSEUDOCODE)),
        Arc::new(SvgRenderer),
    );
    let err = orchestrator
        .handle_generate_uml(&GenerateUmlRequest::default())
        .unwrap_err();
    let message = describe_error(&err);
    assert!(message.starts_with("uml stage"));
    assert!(message.contains("pseudocode_key not provided"));
}

#[test]
fn test_generate_diagram_missing_key() {
    let (_store, orchestrator) = memory_orchestrator(
        Arc::new(FixedTranslator::new(PSEUDOCODE)),
        Arc::new(SvgRenderer),
    );
    let err = orchestrator
        .handle_generate_diagram(&GenerateDiagramRequest {
            uml_code_key: Some("  ".to_string()),
        })
        .unwrap_err();
    assert!(describe_error(&err).contains("uml_code_key not provided"));
}

#[test]
fn test_generate_uml_unknown_key_is_not_found() {
    let (_store, orchestrator) = memory_orchestrator(
        Arc::new(FixedTranslator::new(PSEUDOCODE)),
        Arc::new(SvgRenderer),
    );
    let err = orchestrator.generate_uml("missing.txt").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::NotFound { .. })
    ));
    assert!(describe_error(&err).contains("blob get 'missing.txt'"));
}

#[test]
fn test_translator_failure_is_surfaced_without_retry() {
    let (store, orchestrator) =
        memory_orchestrator(Arc::new(FailingTranslator), Arc::new(SvgRenderer));
    let err = orchestrator.run("x = 1").unwrap_err();

    let message = describe_error(&err);
    assert!(message.contains("translate stage: translator call failed"));
    assert!(message.contains("status 529"));
    assert!(store.is_empty().unwrap());
}

#[test]
fn test_blank_translation_is_rejected() {
    let (store, orchestrator) =
        memory_orchestrator(Arc::new(FixedTranslator::new("  \n")), Arc::new(SvgRenderer));
    let err = orchestrator.translate_code("x = 1").unwrap_err();
    assert!(describe_error(&err).contains("No pseudocode generated"));
    assert!(!store.contains(PSEUDOCODE_KEY).unwrap());
}

#[test]
fn test_renderer_failure_keeps_earlier_artifacts() {
    let (store, orchestrator) = memory_orchestrator(
        Arc::new(FixedTranslator::new(PSEUDOCODE)),
        Arc::new(FailingRenderer),
    );
    let err = orchestrator.run("x = 1").unwrap_err();

    assert!(describe_error(&err).contains("diagram stage: renderer call failed"));
    assert!(store.contains(PSEUDOCODE_KEY).unwrap());
    assert!(store.contains(UML_CODE_KEY).unwrap());
    assert!(!store.contains(DIAGRAM_KEY).unwrap());
}

#[test]
fn test_unrecognized_pseudocode_still_produces_document() {
    let (store, orchestrator) = memory_orchestrator(
        Arc::new(FixedTranslator::new("I could not understand this code.")),
        Arc::new(SvgRenderer),
    );
    orchestrator.run("???").unwrap();
    assert_eq!(store.get(UML_CODE_KEY).unwrap(), b"@startuml\n@enduml");
}

#[test]
fn test_presign_ttl_override() {
    let (_store, orchestrator) = memory_orchestrator(
        Arc::new(FixedTranslator::new(PSEUDOCODE)),
        Arc::new(SvgRenderer),
    );
    let orchestrator = orchestrator.with_presign_ttl(Duration::from_secs(60));
    assert_eq!(orchestrator.presign_ttl(), Duration::from_secs(60));
    assert_eq!(orchestrator.config().storage_bucket, "archgen-dev-artifacts");
}

#[test]
fn test_orchestrator_debug_hides_api_key() {
    let (_store, orchestrator) = memory_orchestrator(
        Arc::new(FixedTranslator::new(PSEUDOCODE)),
        Arc::new(SvgRenderer),
    );
    let debug = format!("{orchestrator:?}");
    assert!(debug.contains("archgen-dev-artifacts"));
    assert!(!debug.contains("sk-test"));
}

#[test]
fn test_fs_store_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FsBlobStore::new(dir.path(), "artifacts"));
    let orchestrator = Orchestrator::new(
        config(),
        store.clone(),
        Arc::new(FixedTranslator::new(PSEUDOCODE)),
        Arc::new(SvgRenderer),
    );

    let links = orchestrator.run("fn main() {}").unwrap();

    let bucket = dir.path().join("artifacts");
    assert!(bucket.join(PSEUDOCODE_KEY).is_file());
    assert!(bucket.join(UML_CODE_KEY).is_file());
    assert!(bucket.join(DIAGRAM_KEY).is_file());
    assert!(links.svg_diagram_url.starts_with("file://"));
    assert!(links.svg_diagram_url.contains("diagram.svg?expires="));
    assert_eq!(store.bucket(), "artifacts");
}

#[test]
fn test_fs_store_rejects_escaping_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsBlobStore::new(dir.path(), "artifacts");
    assert!(matches!(
        store.put("../outside.txt", b"x"),
        Err(PipelineError::InvalidKey { .. })
    ));
    assert!(!dir.path().join("outside.txt").exists());
}

#[test]
fn test_diagram_stage_alone_on_fs_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FsBlobStore::new(dir.path(), "artifacts"));
    store.put(UML_CODE_KEY, b"@startuml\nclass a {\n}\n@enduml").unwrap();
    let orchestrator = Orchestrator::new(
        config(),
        store.clone(),
        Arc::new(FailingTranslator),
        Arc::new(SvgRenderer),
    );

    let links = orchestrator
        .handle_generate_diagram(&GenerateDiagramRequest {
            uml_code_key: Some(UML_CODE_KEY.to_string()),
        })
        .unwrap();

    assert!(links.pseudocode_url.contains("pseudocode.txt?expires="));
    assert!(dir.path().join("artifacts").join(DIAGRAM_KEY).is_file());
    assert!(!dir.path().join("artifacts").join(PSEUDOCODE_KEY).exists());
}
