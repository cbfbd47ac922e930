//! Configuration management
//!
//! Settings live in `<data dir>/config.yaml`. The data directory is
//! `~/.docbrief` unless `DOCBRIEF_HOME` points somewhere else.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "DOCBRIEF_HOME";

const DEFAULT_MAX_SUMMARY_CHARS: usize = 4_000;
const DEFAULT_KEYWORD_COUNT: usize = 10;
const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Keys accepted by [`Config::get`] and [`Config::set`].
const KEYS: &[&str] = &[
    "summary_provider",
    "summary_api_key",
    "summary_model",
    "anthropic_api_key",
    "anthropic_model",
    "openai_api_key",
    "openai_model",
    "openrouter_api_key",
    "openrouter_model",
    "max_summary_chars",
    "keyword_count",
    "server_host",
    "server_port",
    "max_upload_bytes",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// LLM provider used for summaries (anthropic, openai, openrouter)
    pub summary_provider: Option<String>,
    /// Generic API key, used when no provider-specific key is set
    pub summary_api_key: Option<String>,
    /// Generic model override
    pub summary_model: Option<String>,

    pub anthropic_api_key: Option<String>,
    pub anthropic_model: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_model: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: Option<String>,

    /// Character budget for text sent to the summary provider
    pub max_summary_chars: usize,
    /// Number of keywords kept per analysis
    pub keyword_count: usize,

    pub server_host: String,
    pub server_port: u16,
    /// Largest accepted upload for `POST /analyze`
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            summary_provider: None,
            summary_api_key: None,
            summary_model: None,
            anthropic_api_key: None,
            anthropic_model: None,
            openai_api_key: None,
            openai_model: None,
            openrouter_api_key: None,
            openrouter_model: None,
            max_summary_chars: DEFAULT_MAX_SUMMARY_CHARS,
            keyword_count: DEFAULT_KEYWORD_COUNT,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Returns the data directory, creating it if needed.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os(HOME_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .context("Could not find home directory")?
            .join(".docbrief"),
    };

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
    Ok(dir)
}

impl Config {
    /// Loads the config from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads the config from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_saphyr::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Writes the config to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let yaml = serde_saphyr::to_string(self).context("Failed to serialize config")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, yaml).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.yaml"))
    }

    /// All keys understood by `get` and `set`.
    pub fn keys() -> &'static [&'static str] {
        KEYS
    }

    /// Returns the value of a key as a string, `None` when unset.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = match key {
            "summary_provider" => self.summary_provider.clone(),
            "summary_api_key" => self.summary_api_key.clone(),
            "summary_model" => self.summary_model.clone(),
            "anthropic_api_key" => self.anthropic_api_key.clone(),
            "anthropic_model" => self.anthropic_model.clone(),
            "openai_api_key" => self.openai_api_key.clone(),
            "openai_model" => self.openai_model.clone(),
            "openrouter_api_key" => self.openrouter_api_key.clone(),
            "openrouter_model" => self.openrouter_model.clone(),
            "max_summary_chars" => Some(self.max_summary_chars.to_string()),
            "keyword_count" => Some(self.keyword_count.to_string()),
            "server_host" => Some(self.server_host.clone()),
            "server_port" => Some(self.server_port.to_string()),
            "max_upload_bytes" => Some(self.max_upload_bytes.to_string()),
            other => bail!("Unknown config key '{other}'. Valid keys: {}", KEYS.join(", ")),
        };
        Ok(value)
    }

    /// Sets a key from its string form. An empty value clears optional keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let optional = |v: &str| {
            let v = v.trim();
            (!v.is_empty()).then(|| v.to_string())
        };

        match key {
            "summary_provider" => {
                if let Some(provider) = optional(value) {
                    provider
                        .parse::<crate::summarize::SummaryProviderKind>()
                        .map_err(anyhow::Error::msg)?;
                    self.summary_provider = Some(provider.to_lowercase());
                } else {
                    self.summary_provider = None;
                }
            }
            "summary_api_key" => self.summary_api_key = optional(value),
            "summary_model" => self.summary_model = optional(value),
            "anthropic_api_key" => self.anthropic_api_key = optional(value),
            "anthropic_model" => self.anthropic_model = optional(value),
            "openai_api_key" => self.openai_api_key = optional(value),
            "openai_model" => self.openai_model = optional(value),
            "openrouter_api_key" => self.openrouter_api_key = optional(value),
            "openrouter_model" => self.openrouter_model = optional(value),
            "max_summary_chars" => self.max_summary_chars = parse_number(key, value)?,
            "keyword_count" => self.keyword_count = parse_number(key, value)?,
            "server_host" => {
                let host = value.trim();
                if host.is_empty() {
                    bail!("server_host cannot be empty");
                }
                self.server_host = host.to_string();
            }
            "server_port" => self.server_port = parse_number(key, value)?,
            "max_upload_bytes" => self.max_upload_bytes = parse_number(key, value)?,
            other => bail!("Unknown config key '{other}'. Valid keys: {}", KEYS.join(", ")),
        }
        Ok(())
    }

    /// API key for a provider: provider-specific key first, then the generic one.
    pub fn summary_api_key_for_provider(&self, provider: &str) -> Option<String> {
        let specific = match provider.to_lowercase().as_str() {
            "anthropic" => self.anthropic_api_key.clone(),
            "openai" => self.openai_api_key.clone(),
            "openrouter" => self.openrouter_api_key.clone(),
            _ => None,
        };
        specific.or_else(|| self.summary_api_key.clone())
    }

    /// Model override for a provider: provider-specific model first, then the generic one.
    pub fn summary_model_for_provider(&self, provider: &str) -> Option<String> {
        let specific = match provider.to_lowercase().as_str() {
            "anthropic" => self.anthropic_model.clone(),
            "openai" => self.openai_model.clone(),
            "openrouter" => self.openrouter_model.clone(),
            _ => None,
        };
        specific.or_else(|| self.summary_model.clone())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| anyhow::anyhow!("Invalid value '{value}' for {key}: expected a number"))
}
