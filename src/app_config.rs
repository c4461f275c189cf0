use anyhow::{Context, Result, anyhow};
use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use url::Url;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Model API config
    #[serde(default)]
    pub api: ApiConfig,

    /// Fragmenting and request scheduling config
    #[serde(default)]
    pub translation: TranslationSettings,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Model API configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApiConfig {
    // @field: API key
    #[serde(default)]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Model name or shorthand (3, 4, 4large)
    #[serde(default = "default_model")]
    pub model: String,

    // @field: Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: HTTPS proxy URL
    #[serde(default)]
    pub https_proxy: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            https_proxy: None,
        }
    }
}

impl ApiConfig {
    /// Model name with shorthands expanded
    pub fn resolved_model(&self) -> String {
        resolve_model_shorthand(&self.model)
    }
}

/// Fragmenting and scheduling configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationSettings {
    /// Target fragment size in estimated tokens
    #[serde(default = "default_fragment_size")]
    pub fragment_size: usize,

    /// Minimum delay between the starts of two API calls
    #[serde(default)]
    pub api_call_interval_ms: u64,

    /// Maximum number of concurrent requests (unbounded when absent)
    #[serde(default)]
    pub max_concurrent_requests: Option<usize>,

    /// How many times a too-long fragment may be halved
    #[serde(default = "default_max_split_depth")]
    pub max_split_depth: usize,

    /// File overriding the built-in instruction template
    #[serde(default)]
    pub instruction_file: Option<String>,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            fragment_size: default_fragment_size(),
            api_call_interval_ms: 0,
            max_concurrent_requests: None,
            max_split_depth: default_max_split_depth(),
            instruction_file: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching log filter
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn default_target_language() -> String {
    "zh".to_string()
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_fragment_size() -> usize {
    2048
}

fn default_max_split_depth() -> usize {
    12
}

/// Expand the short model names accepted on the command line
pub fn resolve_model_shorthand(model: &str) -> String {
    match model.trim() {
        "3" => "gpt-3.5-turbo".to_string(),
        "4" => "gpt-4".to_string(),
        "4large" => "gpt-4-32k".to_string(),
        other => other.to_string(),
    }
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let _target_name = crate::language_utils::get_language_name(&self.target_language)?;

        if self.api.api_key.trim().is_empty() {
            return Err(anyhow!(
                "API key is required (set api.api_key, --api-key or OPENAI_API_KEY)"
            ));
        }

        Url::parse(&self.api.endpoint)
            .with_context(|| format!("Invalid API endpoint: {}", self.api.endpoint))?;

        if self.api.resolved_model().is_empty() {
            return Err(anyhow!("Model name cannot be empty"));
        }

        if !(0.0..=2.0).contains(&self.api.temperature) {
            return Err(anyhow!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.api.temperature
            ));
        }

        if self.api.timeout_secs == 0 {
            return Err(anyhow!("Timeout must be greater than zero"));
        }

        if self.translation.fragment_size == 0 {
            return Err(anyhow!("Fragment size must be greater than zero"));
        }

        if self.translation.max_concurrent_requests == Some(0) {
            return Err(anyhow!("Max concurrent requests must be greater than zero"));
        }

        Ok(())
    }

    /// Display name of the target language
    pub fn target_language_name(&self) -> Result<String> {
        crate::language_utils::get_language_name(&self.target_language)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json =
            serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;

        fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Load the configuration, writing a default file first if none exists
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        warn!(
            "Config file not found at '{}', creating default config.",
            path.display()
        );
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: default_target_language(),
            api: ApiConfig::default(),
            translation: TranslationSettings::default(),
            log_level: LogLevel::default(),
        }
    }
}
