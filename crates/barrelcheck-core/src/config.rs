//! Endpoint configuration for the suite
//!
//! The endpoints file maps environment names to base URLs, plus an
//! `environment` section selecting the active one. The file is read once and
//! never rewritten: a `--host` override only changes which key is resolved.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Response time limit applied when the file does not set one.
pub const DEFAULT_RESPONSE_TIME_LIMIT: f64 = 2.0;

/// Environment used when neither the file nor the CLI selects one.
pub const DEFAULT_ENVIRONMENT: &str = "prod";

/// Parsed endpoints file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Active environment selector and suite-wide settings
    pub environment: EnvironmentSelector,

    /// Every other top-level key is an environment name
    #[serde(flatten)]
    pub environments: BTreeMap<String, Environment>,
}

/// The `environment` section of the endpoints file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentSelector {
    /// Name of the active environment
    #[serde(default = "default_env")]
    pub env: String,

    /// Response time limit in seconds for the list endpoint
    #[serde(default)]
    pub response_time_limit: Option<f64>,
}

fn default_env() -> String {
    DEFAULT_ENVIRONMENT.to_string()
}

/// One deployment of the service under test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    pub base_url: String,
}

/// Configuration after environment selection, handed to the runner.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEndpoint {
    pub environment: String,
    pub base_url: String,
    pub response_time_limit: Duration,
}

impl EndpointsConfig {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Self::from_json(&content)
        }
    }

    /// Parse the JSON form of the endpoints file.
    ///
    /// # Errors
    ///
    /// Returns error if the document is not valid JSON or lacks the
    /// `environment` section.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Invalid JSON: {e}")))?;
        if value.get("environment").is_none() {
            return Err(ConfigError::MissingSelector);
        }
        serde_json::from_value(value).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from the first default location that exists.
    ///
    /// # Errors
    ///
    /// Returns error if no candidate exists or the found file is invalid
    pub fn load_default() -> Result<Self, ConfigError> {
        let candidates = ["endpoints.json", "config/endpoints.json", "endpoints.toml"];

        for name in candidates {
            let path = Path::new(name);
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(ConfigError::NotFound(
            candidates.iter().map(PathBuf::from).collect(),
        ))
    }

    /// Pick the active environment.
    ///
    /// `host_override` wins over the file's selector and is case-folded.
    ///
    /// # Errors
    ///
    /// Returns error if the selected environment is not defined, its base
    /// URL is empty, or the response time limit is not a positive,
    /// representable number of seconds.
    pub fn resolve(&self, host_override: Option<&str>) -> Result<ResolvedEndpoint, ConfigError> {
        let env = host_override
            .map(str::to_lowercase)
            .unwrap_or_else(|| self.environment.env.clone());

        let entry = self
            .environments
            .get(&env)
            .ok_or_else(|| ConfigError::UnknownEnvironment {
                name: env.clone(),
                known: self.environments.keys().cloned().collect(),
            })?;

        let base_url = entry.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl(env));
        }

        let limit = self
            .environment
            .response_time_limit
            .unwrap_or(DEFAULT_RESPONSE_TIME_LIMIT);
        let response_time_limit = Duration::try_from_secs_f64(limit)
            .ok()
            .filter(|d| !d.is_zero())
            .ok_or(ConfigError::InvalidResponseTimeLimit(limit))?;

        Ok(ResolvedEndpoint {
            environment: env,
            base_url,
            response_time_limit,
        })
    }

    /// Create example config file
    pub fn example() -> &'static str {
        r#"{
    "environment": {
        "env": "prod",
        "response_time_limit": 2.0
    },
    "prod": {
        "base_url": "https://barrels.example.com"
    },
    "dev": {
        "base_url": "http://localhost:5000"
    }
}
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("'environment' key is missing in endpoints file")]
    MissingSelector,
    #[error("No endpoints file found (looked for {0:?})")]
    NotFound(Vec<PathBuf>),
    #[error("Unknown environment '{name}' (defined: {known:?})")]
    UnknownEnvironment { name: String, known: Vec<String> },
    #[error("Environment '{0}' has an empty base_url")]
    EmptyBaseUrl(String),
    #[error("response_time_limit must be a positive number of seconds, got {0:?}")]
    InvalidResponseTimeLimit(f64),
}
