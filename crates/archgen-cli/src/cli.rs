//! Command-line interface for the archgen utility
//!
//! Runs the pseudocode-to-UML translator on its own, or the whole
//! code-to-diagram pipeline against a directory-backed blob store.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use archgen::core::logging::init_logging;
use archgen::pipeline::{
    AnthropicTranslator, FsBlobStore, GenerateDiagramRequest, GenerateUmlRequest, Orchestrator,
    PlantUmlRenderer, TranslateRequest, Translator, DEFAULT_PLANTUML_JAR,
};
use archgen::{Config, PipelineError};

/// Archgen - Turn source code into architecture diagrams
#[derive(Parser)]
#[command(name = "archgen")]
#[command(about = "Translate source code into pseudocode, PlantUML and SVG diagrams")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert pseudocode to PlantUML source
    Uml {
        /// Input file containing pseudocode (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for PlantUML source (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the classes and relationships found in pseudocode
    Parse {
        /// Input file containing pseudocode (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Run a single pipeline stage with a JSON request
    Stage {
        /// Stage to run
        #[arg(value_enum)]
        stage: StageChoice,

        /// File containing the JSON request (use - for stdin)
        #[arg(short, long)]
        event: Option<PathBuf>,

        /// Directory holding the blob store buckets
        #[arg(short, long)]
        store: PathBuf,

        /// PlantUML jar used by the diagram stage
        #[arg(long, default_value = DEFAULT_PLANTUML_JAR)]
        plantuml_jar: PathBuf,
    },

    /// Run the whole pipeline on a source file
    Run {
        /// Source code file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Directory holding the blob store buckets
        #[arg(short, long)]
        store: PathBuf,

        /// PlantUML jar used to render the diagram
        #[arg(long, default_value = DEFAULT_PLANTUML_JAR)]
        plantuml_jar: PathBuf,
    },
}

/// Pipeline stages selectable from the command line
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum StageChoice {
    Translate,
    Uml,
    Diagram,
}

/// Stands in for the translator when the selected stage never calls it
struct TranslatorUnavailable;

impl Translator for TranslatorUnavailable {
    fn translate(&self, _source_code: &str) -> Result<String, PipelineError> {
        Err(PipelineError::config("translator is not configured for this stage"))
    }
}

/// Main CLI application
#[derive(Default)]
pub struct ArchgenApp;

impl ArchgenApp {
    pub fn new() -> Self {
        Self
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over CLI flags
        let log_level_str = std::env::var("ARCHGEN_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| Some(cli.log_level.as_str().to_string()));

        let log_format_str = std::env::var("ARCHGEN_LOG_FORMAT")
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        if let Err(e) = init_logging(log_level_str.as_deref(), log_format_str.as_deref()) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Archgen v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Uml { input, output } => self.uml_command(input, output, cli.verbose),
            Commands::Parse { input, json } => self.parse_command(input, json, cli.verbose),
            Commands::Stage {
                stage,
                event,
                store,
                plantuml_jar,
            } => {
                let config = Config::from_env()?;
                let event = self.read_input(event)?;
                let response = self.stage_command(config, stage, &event, &store, &plantuml_jar)?;
                self.write_output(None, &response)
            }
            Commands::Run {
                input,
                store,
                plantuml_jar,
            } => self.run_command(input, &store, &plantuml_jar, cli.verbose),
        }
    }

    /// Handle the uml command
    fn uml_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let uml = archgen::translate_to_uml(&content);
        self.write_output(output, &uml)
    }

    /// Handle the parse command
    fn parse_command(&self, input: Option<PathBuf>, json: bool, verbose: bool) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let report = self.describe_model(&content, json)?;
        self.write_output(None, &report)
    }

    /// Render the parsed model as JSON or as a short human-readable listing
    pub fn describe_model(&self, pseudocode: &str, json: bool) -> Result<String> {
        let model = archgen::parse(pseudocode);

        if json {
            return Ok(serde_json::to_string_pretty(&model)?);
        }

        let mut out = String::new();
        out.push_str(&format!("Classes ({}):\n", model.class_count()));
        for class in model.classes() {
            out.push_str(&format!("  {} (line {})\n", class.name, class.line));
        }
        out.push_str(&format!("Relationships ({}):\n", model.relationship_count()));
        for edge in model.relationships() {
            out.push_str(&format!("  {} --> {} (line {})\n", edge.caller, edge.callee, edge.line));
        }
        let undeclared = model.undeclared_participants();
        if !undeclared.is_empty() {
            out.push_str(&format!("Undeclared: {}\n", undeclared.join(", ")));
        }
        Ok(out)
    }

    /// Run one stage with a JSON request and return the JSON response
    pub fn stage_command(
        &self,
        config: Config,
        stage: StageChoice,
        event: &str,
        store: &Path,
        plantuml_jar: &Path,
    ) -> Result<String> {
        let translator: Arc<dyn Translator> = match stage {
            StageChoice::Translate => Arc::new(AnthropicTranslator::new(config.api_key.clone())?),
            StageChoice::Uml | StageChoice::Diagram => Arc::new(TranslatorUnavailable),
        };
        let orchestrator = Self::build_orchestrator(config, translator, store, plantuml_jar);
        info!(?stage, store = %store.display(), "Running single stage");

        match stage {
            StageChoice::Translate => {
                let request: TranslateRequest = parse_event(event)?;
                to_json(&orchestrator.handle_translate(&request)?)
            }
            StageChoice::Uml => {
                let request: GenerateUmlRequest = parse_event(event)?;
                to_json(&orchestrator.handle_generate_uml(&request)?)
            }
            StageChoice::Diagram => {
                let request: GenerateDiagramRequest = parse_event(event)?;
                to_json(&orchestrator.handle_generate_diagram(&request)?)
            }
        }
    }

    /// Handle the run command
    fn run_command(
        &self,
        input: Option<PathBuf>,
        store: &Path,
        plantuml_jar: &Path,
        verbose: bool,
    ) -> Result<()> {
        let source_code = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of source code", source_code.len());
        }

        let config = Config::from_env()?;
        let translator = Arc::new(AnthropicTranslator::new(config.api_key.clone())?);
        let orchestrator = Self::build_orchestrator(config, translator, store, plantuml_jar);
        info!(store = %store.display(), jar = %plantuml_jar.display(), "Running full pipeline");

        let links = orchestrator.run(&source_code)?;

        if verbose {
            eprintln!("Pipeline completed");
        }

        self.write_output(None, &to_json(&links)?)
    }

    fn build_orchestrator(
        config: Config,
        translator: Arc<dyn Translator>,
        store: &Path,
        plantuml_jar: &Path,
    ) -> Orchestrator {
        let store = Arc::new(FsBlobStore::new(store, config.storage_bucket.clone()));
        let renderer = Arc::new(PlantUmlRenderer::new(plantuml_jar));
        Orchestrator::new(config, store, translator, renderer)
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(content.as_bytes())?;
                if !content.is_empty() && !content.ends_with('\n') {
                    stdout.write_all(b"\n")?;
                }
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

fn parse_event<T: serde::de::DeserializeOwned>(event: &str) -> Result<T> {
    serde_json::from_str(event).context("Failed to parse stage request JSON")
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use archgen::pipeline::{PSEUDOCODE_KEY, UML_CODE_KEY};
    use archgen::Environment;
    use tempfile::tempdir;

    fn config() -> Config {
        Config::new(Environment::Dev, "artifacts", "")
    }

    #[test]
    fn test_cli_parsing_uml_command() {
        let args = vec!["archgen", "uml", "--input", "pseudo.txt", "--output", "out.puml"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Uml { input, output } => {
                assert_eq!(input.unwrap().to_string_lossy(), "pseudo.txt");
                assert_eq!(output.unwrap().to_string_lossy(), "out.puml");
            }
            _ => panic!("Expected Uml command"),
        }
        assert_eq!(cli.log_level, LogLevel::Info);
        assert_eq!(cli.log_format, LogFormat::Compact);
    }

    #[test]
    fn test_cli_parsing_parse_command() {
        let cli = Cli::try_parse_from(["archgen", "parse", "--json"]).unwrap();

        match cli.command {
            Commands::Parse { input, json } => {
                assert!(input.is_none());
                assert!(json);
            }
            _ => panic!("Expected Parse command"),
        }
    }

    #[test]
    fn test_cli_parsing_stage_command() {
        let args = vec!["archgen", "stage", "uml", "--event", "-", "--store", "/tmp/blobs"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Stage {
                stage,
                event,
                store,
                plantuml_jar,
            } => {
                assert_eq!(stage, StageChoice::Uml);
                assert_eq!(event.unwrap().to_string_lossy(), "-");
                assert_eq!(store, PathBuf::from("/tmp/blobs"));
                assert_eq!(plantuml_jar, PathBuf::from(DEFAULT_PLANTUML_JAR));
            }
            _ => panic!("Expected Stage command"),
        }
    }

    #[test]
    fn test_cli_parsing_run_requires_store() {
        assert!(Cli::try_parse_from(["archgen", "run", "--input", "main.py"]).is_err());

        let cli = Cli::try_parse_from([
            "archgen",
            "run",
            "--input",
            "main.py",
            "--store",
            "blobs",
            "--plantuml-jar",
            "/usr/share/plantuml.jar",
        ])
        .unwrap();
        match cli.command {
            Commands::Run { plantuml_jar, .. } => {
                assert_eq!(plantuml_jar, PathBuf::from("/usr/share/plantuml.jar"));
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["archgen", "uml", "--verbose", "--log-level", "debug"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_read_input_from_file() {
        let app = ArchgenApp::new();
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("pseudo.txt");
        fs::write(&file_path, "function foo()").unwrap();

        assert_eq!(app.read_input(Some(file_path)).unwrap(), "function foo()");
    }

    #[test]
    fn test_read_input_missing_file() {
        let app = ArchgenApp::new();
        let err = app
            .read_input(Some(PathBuf::from("/nonexistent/pseudo.txt")))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read input file"));
    }

    #[test]
    fn test_write_output_to_file() {
        let app = ArchgenApp::new();
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("out.puml");

        app.write_output(Some(file_path.clone()), "@startuml\n@enduml")
            .unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "@startuml\n@enduml");
    }

    #[test]
    fn test_describe_model_human() {
        let app = ArchgenApp::new();
        let report = app
            .describe_model("function main()\nmain calls helper()", false)
            .unwrap();
        assert!(report.contains("Classes (1):\n  main (line 1)\n"));
        assert!(report.contains("main --> helper (line 2)"));
        assert!(report.contains("Undeclared: helper"));
    }

    #[test]
    fn test_describe_model_json() {
        let app = ArchgenApp::new();
        let report = app.describe_model("function main()", true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(value["classes"][0]["name"], "main");
        assert!(value["relationships"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_uml_stage_against_directory_store() {
        let app = ArchgenApp::new();
        let dir = tempdir().unwrap();
        let bucket = dir.path().join("artifacts");
        fs::create_dir_all(&bucket).unwrap();
        fs::write(bucket.join(PSEUDOCODE_KEY), "function a()\na calls b()").unwrap();

        let response = app
            .stage_command(
                config(),
                StageChoice::Uml,
                r#"{"pseudocode_key": "pseudocode.txt"}"#,
                dir.path(),
                Path::new(DEFAULT_PLANTUML_JAR),
            )
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&response).unwrap();
        assert_eq!(value["uml_code_key"], UML_CODE_KEY);
        assert_eq!(
            fs::read_to_string(bucket.join(UML_CODE_KEY)).unwrap(),
            "@startuml\nclass a {\n}\na --> b\n@enduml"
        );
    }

    #[test]
    fn test_uml_stage_missing_key() {
        let app = ArchgenApp::new();
        let dir = tempdir().unwrap();
        let err = app
            .stage_command(
                config(),
                StageChoice::Uml,
                "{}",
                dir.path(),
                Path::new(DEFAULT_PLANTUML_JAR),
            )
            .unwrap_err();
        assert!(format!("{err:#}").contains("pseudocode_key not provided"));
    }

    #[test]
    fn test_translate_stage_requires_api_key() {
        let app = ArchgenApp::new();
        let dir = tempdir().unwrap();
        let err = app
            .stage_command(
                config(),
                StageChoice::Translate,
                r#"{"code_content": "cHJpbnQoMSk="}"#,
                dir.path(),
                Path::new(DEFAULT_PLANTUML_JAR),
            )
            .unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn test_stage_rejects_malformed_event() {
        let app = ArchgenApp::new();
        let dir = tempdir().unwrap();
        let err = app
            .stage_command(
                config(),
                StageChoice::Diagram,
                "not json",
                dir.path(),
                Path::new(DEFAULT_PLANTUML_JAR),
            )
            .unwrap_err();
        assert!(err.to_string().contains("Failed to parse stage request JSON"));
    }
}
