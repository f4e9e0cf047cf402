//! Diagram rendering
//!
//! Turns UML source text into SVG. The orchestrator only sees the
//! [`DiagramRenderer`] capability; [`PlantUmlRenderer`] shells out to the
//! PlantUML jar in pipe mode so no temporary files are needed.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, error, info};

use crate::core::PipelineError;

pub const DEFAULT_PLANTUML_JAR: &str = "/opt/plantuml.jar";

/// Renders UML source text to image bytes
pub trait DiagramRenderer: Send + Sync {
    fn render(&self, uml_source: &str) -> Result<Vec<u8>, PipelineError>;
}

/// Renderer that runs `java -jar plantuml.jar -tsvg -pipe`
#[derive(Debug, Clone)]
pub struct PlantUmlRenderer {
    java: PathBuf,
    jar: PathBuf,
}

impl PlantUmlRenderer {
    pub fn new(jar: impl Into<PathBuf>) -> Self {
        Self {
            java: PathBuf::from("java"),
            jar: jar.into(),
        }
    }

    /// Use a specific java executable instead of the one on `PATH`
    #[must_use]
    pub fn with_java(mut self, java: impl Into<PathBuf>) -> Self {
        self.java = java.into();
        self
    }

    pub fn jar(&self) -> &PathBuf {
        &self.jar
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.java);
        cmd.arg("-Djava.awt.headless=true")
            .arg("-jar")
            .arg(&self.jar)
            .args(["-tsvg", "-pipe"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl Default for PlantUmlRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_PLANTUML_JAR)
    }
}

impl DiagramRenderer for PlantUmlRenderer {
    fn render(&self, uml_source: &str) -> Result<Vec<u8>, PipelineError> {
        debug!(java = %self.java.display(), jar = %self.jar.display(), "Spawning PlantUML");

        let mut child = self.command().spawn().map_err(|e| {
            error!(error = %e, "PlantUML subprocess error");
            PipelineError::render(format!("failed to start {}: {e}", self.java.display()))
        })?;

        // Fed from its own thread so a large diagram cannot deadlock against
        // PlantUML filling stdout. Dropping stdin closes the pipe.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| PipelineError::render("PlantUML stdin unavailable"))?;
        let source = uml_source.to_owned();
        let writer = thread::spawn(move || stdin.write_all(source.as_bytes()));

        let output = child
            .wait_with_output()
            .map_err(|e| PipelineError::render(format!("waiting for PlantUML failed: {e}")))?;
        let written = writer
            .join()
            .map_err(|_| PipelineError::render("PlantUML stdin writer panicked"))?;

        // A failed process usually breaks the pipe too; its status and stderr
        // are the useful part of the report.
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(status = %output.status, "PlantUML subprocess error");
            return Err(PipelineError::render(format!(
                "PlantUML exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        written.map_err(|e| PipelineError::render(format!("writing UML source failed: {e}")))?;
        if output.stdout.is_empty() {
            return Err(PipelineError::render("PlantUML produced no output"));
        }

        info!(bytes = output.stdout.len(), "SVG diagram generation successful");
        Ok(output.stdout)
    }
}
