//! Configuration management for LLMSense.
//!
//! Loads settings from a TOML file or uses defaults. Lookup order is an
//! explicit path, then `$LLMSENSE_CONFIG`, then the XDG config directory.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "LLMSENSE_CONFIG";

/// Text-generation backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the Ollama-compatible backend
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model used for interpretations, evaluations and debate agents
    #[serde(default = "default_model")]
    pub model: String,

    /// Temperature for interpretations, single-call evaluations and judging
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "mistral".to_string()
}

fn default_temperature() -> f64 {
    0.1
}

fn default_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Retry policy for transport failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Fixed delay between attempts
    #[serde(default = "default_delay")]
    pub delay_secs: u64,
}

fn default_attempts() -> u32 {
    3
}

fn default_delay() -> u64 {
    2
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            delay_secs: default_delay(),
        }
    }
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

/// Iterative debate settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateConfig {
    #[serde(default = "default_rounds")]
    pub rounds: u32,

    /// Agents argue warmer than the judge decides
    #[serde(default = "default_agent_temperature")]
    pub agent_temperature: f64,
}

fn default_rounds() -> u32 {
    2
}

fn default_agent_temperature() -> f64 {
    0.5
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
            agent_temperature: default_agent_temperature(),
        }
    }
}

/// Where records and the dataset live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_outputs_dir")]
    pub outputs_dir: PathBuf,

    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
}

fn default_outputs_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/Steel_industry_data.csv")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            outputs_dir: default_outputs_dir(),
            data_path: default_data_path(),
        }
    }
}

/// Full configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub debate: DebateConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load config from the first readable location, or return defaults
    pub fn load(explicit: Option<&Path>) -> Self {
        let Some(path) = Self::locate(explicit) else {
            info!("No config file location, using defaults");
            return Config::default();
        };

        Self::load_from_path(&path).unwrap_or_else(|e| {
            warn!("Config not loaded from {}, using defaults: {}", path.display(), e);
            Config::default()
        })
    }

    /// Resolve which file `load` would read
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("llmsense").join("config.toml"))
    }

    /// Load config from specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the default config to `path`, creating parent directories
    pub fn save_default(path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(&Config::default())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        info!("Saved default config to {}", path.display());
        Ok(())
    }
}
