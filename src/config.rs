use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main configuration for parlbot
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub llm: LlmConfig,
    pub context: ContextConfig,
    pub server: ServerConfig,
    /// Extra alias → canonical party entries, merged over the built-in table
    pub aliases: BTreeMap<String, String>,
}

/// Locations of the ranking databases
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database holding `ranking_members`; relative paths resolve against the project root
    pub members_db: String,
    /// Database holding `party_score` and `party_statistics_kr`
    pub parties_db: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            members_db: "ranking_members.db".into(),
            parties_db: "ranking_parties.db".into(),
        }
    }
}

/// Configuration for the answering model (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Chat-completions endpoint URL
    pub url: String,
    pub model: String,
    /// API key: a literal value, or "env:VAR_NAME" to read it from the environment
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: "https://api.groq.com/openai/v1/chat/completions".into(),
            model: "meta-llama/llama-4-scout-17b-16e-instruct".into(),
            api_key: Some("env:GROQ_API_KEY".into()),
            timeout_secs: 30,
            temperature: None,
        }
    }
}

impl LlmConfig {
    /// Resolve the API key, supporting "env:VAR_NAME" syntax
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key.as_ref().and_then(|key| {
            if let Some(var_name) = key.strip_prefix("env:") {
                std::env::var(var_name).ok().filter(|v| !v.is_empty())
            } else if key.is_empty() {
                None
            } else {
                Some(key.clone())
            }
        })
    }
}

/// Configuration for context assembly
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Maximum rows handed to the answering model, across all tables
    pub max_rows: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self { max_rows: 20 }
    }
}

/// Configuration for the HTTP server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8000 }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Get the path to the parlbot data directory for a project
    pub fn data_dir(root: &Path) -> PathBuf {
        root.join(".parlbot")
    }

    /// Get the config file path for a project
    pub fn config_path(root: &Path) -> PathBuf {
        Self::data_dir(root).join("config.toml")
    }

    /// Get the question log path
    pub fn metrics_path(root: &Path) -> PathBuf {
        Self::data_dir(root).join("metrics.jsonl")
    }

    pub fn members_db_path(&self, root: &Path) -> PathBuf {
        resolve_path(root, &self.storage.members_db)
    }

    pub fn parties_db_path(&self, root: &Path) -> PathBuf {
        resolve_path(root, &self.storage.parties_db)
    }
}

fn resolve_path(root: &Path, configured: &str) -> PathBuf {
    let path = Path::new(configured);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
