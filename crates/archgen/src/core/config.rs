//! Pipeline configuration resolved from environment variables.
//!
//! The environment flag selects which set of per-environment values is read.
//! Configuration is resolved once at process start and handed to the
//! orchestrator; nothing reads the environment after that.

use std::fmt;
use std::str::FromStr;

use super::PipelineError;

pub const ENV_VAR: &str = "ARCHGEN_ENV";
const VAR_PREFIX: &str = "ARCHGEN";

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Environment {
    #[default]
    Dev,
    Prod,
}

impl Environment {
    fn var_segment(self) -> &'static str {
        match self {
            Environment::Dev => "DEV",
            Environment::Prod => "PROD",
        }
    }
}

impl FromStr for Environment {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            other => Err(PipelineError::config(format!(
                "unknown {ENV_VAR}: {other} (expected 'dev' or 'prod')"
            ))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Dev => write!(f, "dev"),
            Environment::Prod => write!(f, "prod"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub environment: Environment,
    pub storage_bucket: String,
    pub api_key: String,
}

impl Config {
    pub fn new(
        environment: Environment,
        storage_bucket: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            environment,
            storage_bucket: storage_bucket.into(),
            api_key: api_key.into(),
        }
    }

    /// Build typed config from environment variables.
    ///
    /// - `ARCHGEN_ENV`: `dev` (default) or `prod`
    /// - `ARCHGEN_<ENV>_STORAGE_BUCKET`: required
    /// - `ARCHGEN_<ENV>_API_KEY`: optional here, required by the translator
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup(ENV_VAR) {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => Environment::default(),
        };

        let bucket_var = env_var_name(environment, "STORAGE_BUCKET");
        let storage_bucket = lookup(&bucket_var)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| PipelineError::config(format!("{bucket_var} is not set")))?;

        let api_key = lookup(&env_var_name(environment, "API_KEY")).unwrap_or_default();

        Ok(Self {
            environment,
            storage_bucket,
            api_key,
        })
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("environment", &self.environment)
            .field("storage_bucket", &self.storage_bucket)
            .field("api_key", &if self.has_api_key() { "<redacted>" } else { "<unset>" })
            .finish()
    }
}

fn env_var_name(environment: Environment, field: &str) -> String {
    format!("{VAR_PREFIX}_{}_{field}", environment.var_segment())
}
