//! Configuration module for the PDF question-answering service.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `PDFQA_` and use double underscores
//! to separate nested levels:
//! - `PDFQA_SERVER__BIND=0.0.0.0:8000` sets `server.bind`
//! - `PDFQA_MODEL__NAME=gemini-1.5-pro` sets `model.name`
//! - `PDFQA_QA__MAX_CHUNKS=3` sets `qa.max_chunks`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::documents::ChunkingConfig;

/// Directory holding the settings file and the default database.
pub const CONFIG_DIR: &str = ".pdfqa";

/// Environment prefix for overrides.
pub const ENV_PREFIX: &str = "PDFQA_";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Upload directory and database location
    #[serde(default)]
    pub storage: StorageConfig,

    /// External model settings
    #[serde(default)]
    pub model: ModelConfig,

    /// Answering policy
    #[serde(default)]
    pub qa: QaConfig,

    /// Log levels
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Origins allowed by the CORS layer
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Largest accepted request body, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    /// Where uploaded PDFs are written
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// SQLite database file holding document records
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Buffer size used when streaming uploads to disk
    #[serde(default = "default_write_buffer_bytes")]
    pub write_buffer_bytes: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModelConfig {
    /// Provider identifier. Only "gemini" is built in.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model identifier sent to the provider
    #[serde(default = "default_model_name")]
    pub name: String,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Inline API key. Takes precedence over `api_key_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QaConfig {
    /// Documents longer than this (in characters) are chunked before prompting
    #[serde(default = "default_context_threshold")]
    pub context_threshold_chars: usize,

    /// Number of leading chunks kept for oversized documents
    #[serde(default = "default_max_chunks")]
    pub max_chunks: usize,

    /// Upper bound on suggested questions returned
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,

    /// Window size and overlap
    #[serde(default)]
    pub chunking: ChunkingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level for all targets
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-target overrides, e.g. `llm = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}
fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}
fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}
fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}
fn default_database_path() -> PathBuf {
    PathBuf::from(CONFIG_DIR).join("documents.db")
}
fn default_write_buffer_bytes() -> usize {
    1024 * 1024
}
fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model_name() -> String {
    "gemini-1.5-flash".to_string()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_api_key_env() -> String {
    "GOOGLE_API_KEY".to_string()
}
fn default_context_threshold() -> usize {
    30_000
}
fn default_max_chunks() -> usize {
    5
}
fn default_max_suggestions() -> usize {
    7
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_origins: default_cors_origins(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            database_path: default_database_path(),
            write_buffer_bytes: default_write_buffer_bytes(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            name: default_model_name(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            api_key: None,
        }
    }
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            context_threshold_chars: default_context_threshold(),
            max_chunks: default_max_chunks(),
            max_suggestions: default_max_suggestions(),
            chunking: ChunkingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl ModelConfig {
    /// Resolve the API key from the inline value or the configured variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

impl QaConfig {
    /// Reject settings the chunker cannot honor.
    pub fn validate(&self) -> Result<(), String> {
        self.chunking.validate()?;
        if self.max_chunks == 0 {
            return Err("qa.max_chunks must be at least 1".to_string());
        }
        if self.max_suggestions == 0 {
            return Err("qa.max_suggestions must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));

        Self::figment(config_path).extract().map_err(Box::new)
    }

    /// Load configuration from a specific file, still honoring env overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref().to_path_buf())
            .extract()
            .map_err(Box::new)
    }

    fn figment(config_path: PathBuf) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            // Double underscore separates nested levels, single underscore
            // stays inside field names
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
    }

    /// Find the settings file by looking for a `.pdfqa` directory,
    /// searching from the current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .map(|ancestor| ancestor.join(CONFIG_DIR))
            .find(|dir| dir.is_dir())
            .map(|dir| dir.join("settings.toml"))
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(CONFIG_DIR).join("settings.toml");

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        Settings::default().save(&config_path)?;
        Ok(config_path)
    }
}
