use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the optional config file looked up in the working directory.
pub const CONFIG_FILE: &str = ".gitstr-parse.toml";

/// Comma separated fallback for `relays.sources`.
pub const RELAYS_ENV: &str = "GITSTR_RELAYS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from `.gitstr-parse.toml`.
/// All fields are optional; the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub relays: RelayConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayConfig {
    /// Relays assumed as the source of events when none are passed on the
    /// command line
    #[serde(default)]
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Colored terminal output
    #[serde(default = "default_color")]
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { color: default_color() }
    }
}

fn default_color() -> bool {
    true
}

impl Config {
    /// Load configuration from `.gitstr-parse.toml` in the current directory.
    /// Returns default config if the file doesn't exist. Empty
    /// `relays.sources` is filled from `GITSTR_RELAYS`.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            Config::default()
        };

        if config.relays.sources.is_empty() {
            if let Ok(value) = std::env::var(RELAYS_ENV) {
                config.relays.sources = split_relays(&value);
            }
        }

        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Command-line relays take precedence over configured ones.
    pub fn source_relays(&self, cli_relays: &[String]) -> Vec<String> {
        if cli_relays.is_empty() {
            self.relays.sources.clone()
        } else {
            cli_relays.to_vec()
        }
    }
}

fn split_relays(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|relay| !relay.is_empty())
        .map(str::to_string)
        .collect()
}
