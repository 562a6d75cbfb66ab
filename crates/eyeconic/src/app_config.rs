//! Application configuration.
//!
//! Layered as: built-in defaults, then the TOML config file, then
//! `EYECONIC__SECTION__KEY` environment variables. The two provider keys also
//! fall back to the conventional `OPENROUTER_API_KEY` / `GEMINI_API_KEY`
//! variables.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::inference::Provider;

pub const APP_NAME: &str = "eyeconic";

/// Plain environment variables consulted when the config leaves a key unset.
pub const OPENROUTER_KEY_ENV: &str = "OPENROUTER_API_KEY";
pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub profile: String,
    pub logging: LoggingConfig,
    pub server: ServerConfig,
    pub paths: PathsConfig,
    pub inference: InferenceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: "default".to_string(),
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
            paths: PathsConfig::default(),
            inference: InferenceConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when neither RUST_LOG nor a CLI flag is given.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum request body size in megabytes (default: 20).
    pub max_upload_size_mb: usize,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_size_mb: 20,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Overrides the platform data directory (database + media).
    pub data_dir: Option<String>,
}

/// Inference provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub provider: Provider,
    pub openrouter_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    /// Overrides the provider's base URL.
    pub base_url: Option<String>,
    /// Outbound request timeout in seconds.
    pub timeout_secs: u64,
    /// Attribution sent to OpenRouter as `HTTP-Referer` / `X-Title`; ignored for Gemini.
    pub referer: Option<String>,
    pub app_title: Option<String>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            openrouter_api_key: None,
            gemini_api_key: None,
            base_url: None,
            timeout_secs: 120,
            referer: Some("https://eyeconic-chat.example".to_string()),
            app_title: Some("Eyeconic Chat App".to_string()),
        }
    }
}

impl InferenceConfig {
    /// Key for the selected provider.
    pub fn api_key(&self) -> Option<&str> {
        let key = match self.provider {
            Provider::OpenRouter => self.openrouter_api_key.as_deref(),
            Provider::Gemini => self.gemini_api_key.as_deref(),
        };
        key.filter(|k| !k.trim().is_empty())
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    /// Fill unset keys from the conventional environment variables.
    pub fn apply_env_fallbacks(&mut self) {
        if self.openrouter_api_key.is_none() {
            self.openrouter_api_key = env::var(OPENROUTER_KEY_ENV).ok().filter(|v| !v.is_empty());
        }
        if self.gemini_api_key.is_none() {
            self.gemini_api_key = env::var(GEMINI_KEY_ENV).ok().filter(|v| !v.is_empty());
        }
    }
}

impl AppConfig {
    /// Build the layered config from `config_file` (optional on disk) and the environment.
    pub fn load(config_file: &Path) -> Result<Self> {
        let built = Config::builder()
            .set_default("profile", "default")?
            .set_default("logging.level", "info")?
            .add_source(
                File::from(config_file)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::with_prefix(&env_prefix()).separator("__"))
            .build()
            .context("building configuration")?;

        let mut config: AppConfig = built
            .try_deserialize()
            .context("deserializing configuration")?;
        config.inference.apply_env_fallbacks();
        Ok(config)
    }

    /// Config rendered as TOML with secrets blanked out.
    pub fn to_redacted_toml(&self) -> Result<String> {
        let mut redacted = self.clone();
        for key in [
            &mut redacted.inference.openrouter_api_key,
            &mut redacted.inference.gemini_api_key,
        ] {
            if key.is_some() {
                *key = Some("********".to_string());
            }
        }
        toml::to_string_pretty(&redacted).context("serializing config to TOML")
    }
}

/// Write the default config with a short header.
pub fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating config directory {parent:?}"))?;
    }

    let config = AppConfig::default();
    let toml = toml::to_string_pretty(&config).context("serializing default config to TOML")?;
    let mut body = String::new();
    body.push_str("# Configuration for ");
    body.push_str(APP_NAME);
    body.push('\n');
    body.push_str("# File: ");
    body.push_str(&path.display().to_string());
    body.push_str("\n\n");
    body.push_str(&toml);
    std::fs::write(path, body).with_context(|| format!("writing config file to {}", path.display()))
}

pub fn expand_str_path(text: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(text).context("expanding path")?;
    Ok(PathBuf::from(expanded.to_string()))
}

pub fn default_config_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir).join(APP_NAME));
    }

    if let Some(mut dir) = dirs::config_dir() {
        dir.push(APP_NAME);
        return Ok(dir);
    }

    dirs::home_dir()
        .map(|home| home.join(".config").join(APP_NAME))
        .ok_or_else(|| anyhow!("unable to determine configuration directory"))
}

pub fn default_data_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir).join(APP_NAME));
    }

    if let Some(mut dir) = dirs::data_dir() {
        dir.push(APP_NAME);
        return Ok(dir);
    }

    dirs::home_dir()
        .map(|home| home.join(".local").join("share").join(APP_NAME))
        .ok_or_else(|| anyhow!("unable to determine data directory"))
}

fn env_prefix() -> String {
    APP_NAME
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}
