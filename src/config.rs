use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr, eyre};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::orchestrator::DEFAULT_COMMENT_COUNT;
use crate::summarize::{Backend, is_anthropic_model};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 1500;
pub const DEFAULT_LANG: &str = "en";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub youtube_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub model: Option<String>,
    /// API root for the summarizer, e.g. an OpenAI-compatible gateway
    pub llm_base_url: Option<String>,
    pub max_tokens: Option<u32>,
    pub lang: Option<String>,
    pub comment_count: Option<u32>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub static_dir: Option<PathBuf>,
}

impl Config {
    /// Load config from ~/.config/ytsum/config.toml if it exists
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(path)?;
            let config: Config =
                toml::from_str(&content).wrap_err_with(|| format!("invalid config file {}", path.display()))?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    /// Let API keys from the environment take priority over the file
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    fn apply_env_from(&mut self, var: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| var(name).filter(|v| !v.trim().is_empty());
        if let Some(key) = non_empty("YOUTUBE_API_KEY") {
            self.youtube_api_key = Some(key);
        }
        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }
        if let Some(key) = non_empty("ANTHROPIC_API_KEY") {
            self.anthropic_api_key = Some(key);
        }
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn lang(&self) -> &str {
        self.lang.as_deref().unwrap_or(DEFAULT_LANG)
    }

    pub fn comment_count(&self) -> u32 {
        self.comment_count.unwrap_or(DEFAULT_COMMENT_COUNT)
    }

    pub fn static_dir(&self) -> PathBuf {
        self.static_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR))
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let host = self.host.as_deref().unwrap_or(DEFAULT_HOST);
        let port = self.port.unwrap_or(DEFAULT_PORT);
        format!("{host}:{port}")
            .parse()
            .wrap_err_with(|| format!("invalid bind address {host}:{port}"))
    }

    pub fn youtube_api_key(&self) -> Result<&str> {
        self.youtube_api_key
            .as_deref()
            .ok_or_else(|| eyre!("YOUTUBE_API_KEY not set (environment or youtube_api_key in config)"))
    }

    /// Summarization backend for the configured model, with its key
    pub fn summarizer_backend(&self) -> Result<Backend> {
        if is_anthropic_model(self.model()) {
            let api_key = self.anthropic_api_key.clone().ok_or_else(|| {
                eyre!("ANTHROPIC_API_KEY not set (required for model {})", self.model())
            })?;
            Ok(Backend::Anthropic { api_key })
        } else {
            let api_key = self
                .openai_api_key
                .clone()
                .ok_or_else(|| eyre!("OPENAI_API_KEY not set (required for model {})", self.model()))?;
            Ok(Backend::OpenAi { api_key })
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytsum")
        .join("config.toml")
}
