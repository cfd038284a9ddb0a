//! Configuration management for cozeflow
//!
//! This module provides hierarchical configuration with discovery and precedence:
//! CLI > file > defaults. Supports TOML configuration files with `[api]` and
//! `[backoff]` sections.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default Coze workflow run endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.coze.cn/v1/workflow/run";

/// Default environment variable holding the API bearer token
pub const DEFAULT_AUTH_TOKEN_ENV: &str = "COZE_API_TOKEN";

/// Environment variable naming an explicit config file path
pub const CONFIG_PATH_ENV: &str = "COZEFLOW_CONFIG";

/// Default config file name searched in the current directory
pub const CONFIG_FILE_NAME: &str = "cozeflow.toml";

/// Configuration errors with actionable messages
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Bearer token environment variable is not set
    #[error(
        "API token not found in environment variable '{env_var}'. \
         Set this variable or configure a different auth_token_env in [api]."
    )]
    MissingAuthToken { env_var: String },

    /// A required field is missing or empty
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Remote API settings from the `[api]` section
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Workflow run endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Workflow invoked by `run` (image + caption generation)
    #[serde(default)]
    pub workflow_id: String,
    /// Optional workflow invoked by `mode`
    #[serde(default)]
    pub mode_check_workflow_id: Option<String>,
    /// Application id sent with every call
    #[serde(default)]
    pub app_id: String,
    /// Environment variable holding the bearer token
    #[serde(default = "default_auth_token_env")]
    pub auth_token_env: String,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Retry ceiling: at most `max_retries + 1` physical attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Whether failed attempts are retried at all
    #[serde(default = "default_retry_enabled")]
    pub retry_enabled: bool,
    /// Minimum interval between user-initiated calls in milliseconds.
    /// Enforced by embedding UIs, not by the client itself.
    #[serde(default = "default_request_interval_ms")]
    pub request_interval_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            workflow_id: String::new(),
            mode_check_workflow_id: None,
            app_id: String::new(),
            auth_token_env: default_auth_token_env(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            retry_enabled: default_retry_enabled(),
            request_interval_ms: default_request_interval_ms(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_auth_token_env() -> String {
    DEFAULT_AUTH_TOKEN_ENV.to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_enabled() -> bool {
    true
}

fn default_request_interval_ms() -> u64 {
    5_000
}

/// Base retry delays per error kind from the `[backoff]` section.
///
/// The delay before attempt `k + 1` is `base * (k + 1)` (linear backoff).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackoffConfig {
    /// Base delay after a 429 / rate-limit failure
    #[serde(default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,
    /// Base delay after a 5xx / server failure
    #[serde(default = "default_server_error_ms")]
    pub server_error_ms: u64,
    /// Base delay after a network-level failure
    #[serde(default = "default_network_error_ms")]
    pub network_error_ms: u64,
    /// Base delay for every other retryable failure
    #[serde(default = "default_backoff_ms")]
    pub default_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            rate_limit_ms: default_rate_limit_ms(),
            server_error_ms: default_server_error_ms(),
            network_error_ms: default_network_error_ms(),
            default_ms: default_backoff_ms(),
        }
    }
}

fn default_rate_limit_ms() -> u64 {
    3_000
}

fn default_server_error_ms() -> u64 {
    2_000
}

fn default_network_error_ms() -> u64 {
    1_000
}

fn default_backoff_ms() -> u64 {
    1_000
}

/// Configuration for cozeflow operations.
///
/// `Config` provides hierarchical configuration with discovery and precedence:
/// CLI arguments > config file > built-in defaults.
///
/// # Discovery
///
/// Use [`Config::discover()`] for CLI-like behavior that:
/// - Uses an explicit path when one is given
/// - Respects the `COZEFLOW_CONFIG` environment variable
/// - Falls back to `cozeflow.toml` in the current directory
/// - Applies built-in defaults when no file exists
///
/// The bearer token is never stored in the file; it is resolved from the
/// environment variable named by `api.auth_token_env` at client construction.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Retry backoff bases
    #[serde(default)]
    pub backoff: BackoffConfig,
}

impl Config {
    /// Load configuration from an explicit file path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read and
    /// `ConfigError::Parse` if it is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Discover configuration with CLI-like precedence.
    ///
    /// Order: `explicit_path` > `COZEFLOW_CONFIG` > `./cozeflow.toml` > defaults.
    /// A path that was explicitly named (flag or env var) must exist; the
    /// current-directory fallback is optional.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a named file is missing or malformed.
    pub fn discover(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit_path {
            return Self::load(path);
        }

        if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
            return Self::load(Path::new(&env_path));
        }

        let local = Path::new(CONFIG_FILE_NAME);
        if local.exists() {
            return Self::load(local);
        }

        Ok(Self::default())
    }

    /// Validate that the fields every call needs are present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first missing field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "api.base_url must not be empty".to_string(),
            ));
        }
        if self.api.workflow_id.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "api.workflow_id must be set".to_string(),
            ));
        }
        if self.api.app_id.trim().is_empty() {
            return Err(ConfigError::Invalid("api.app_id must be set".to_string()));
        }
        Ok(())
    }

    /// Resolve the bearer token from the configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingAuthToken` naming the variable when it is
    /// unset or empty.
    pub fn resolve_auth_token(&self) -> Result<String, ConfigError> {
        match env::var(&self.api.auth_token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(ConfigError::MissingAuthToken {
                env_var: self.api.auth_token_env.clone(),
            }),
        }
    }
}
