//! Configuration for the grammar generator.
//!
//! Layered configuration:
//! - Default values
//! - TOML settings file
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `TTLGRAM_` and use double
//! underscores to separate nested levels:
//! - `TTLGRAM_DEBOUNCE_MS=500` sets `debounce_ms`
//! - `TTLGRAM_LOGGING__DEFAULT=debug` sets `logging.default`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Directory holding the settings file and generated grammars.
pub const LOCAL_DIR: &str = ".ttlgram";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory the generated grammar artifacts are written to
    #[serde(default = "default_grammar_dir")]
    pub grammar_dir: PathBuf,

    /// Tagged-template rules, each of the form `matchSpec:scopeRef`
    #[serde(default)]
    pub rules: Vec<String>,

    /// How long the rule list must be stable before regeneration
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Log levels, overridable per module.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level filter (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_grammar_dir() -> PathBuf {
    PathBuf::from(LOCAL_DIR).join("grammars")
}
fn default_debounce_ms() -> u64 {
    10_000
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            grammar_dir: default_grammar_dir(),
            rules: Vec::new(),
            debounce_ms: default_debounce_ms(),
            logging: LoggingConfig::default(),
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

impl Settings {
    /// Load configuration from all sources, using the workspace settings
    /// file if one is found.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Self::load_from(Self::settings_path())
    }

    /// The workspace settings file if one is found, the default location
    /// otherwise.
    pub fn settings_path() -> PathBuf {
        Self::find_workspace_config().unwrap_or_else(Self::default_settings_path)
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("TTLGRAM_").split("__"))
            .extract()
            .map_err(Box::new)
    }

    /// Save current configuration to file.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), Box<dyn std::error::Error>> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// Default settings file location relative to the current directory.
    pub fn default_settings_path() -> PathBuf {
        PathBuf::from(LOCAL_DIR).join("settings.toml")
    }

    /// Find the workspace settings file by searching for the local
    /// directory from the current directory up to root.
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(LOCAL_DIR);
            if config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }

        None
    }
}
