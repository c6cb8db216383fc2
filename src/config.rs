// src/config.rs

//! Runtime configuration, read from environment variables.
//!
//! The binary loads a `.env` file first (if present) and lets command-line
//! flags override individual values afterwards.

use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::{FailureMode, SummaryMode};
use crate::intent::ExtractorKind;
use crate::llm::azure::DEFAULT_AZURE_API_VERSION;
use crate::llm::ollama::DEFAULT_OLLAMA_URL;
use crate::llm::{
    AzureOpenAiProvider, CompletionProvider, HttpOptions, OllamaProvider, ProviderError,
};

const MAX_RETRIES_CAP: u32 = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for `{key}`: `{value}`")]
    InvalidValue { key: &'static str, value: String },
    #[error("`{0}` must be set")]
    Missing(&'static str),
    #[error("configuration validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    #[default]
    Ollama,
    Azure,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<SecretString>,
    pub api_version: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Debug)]
pub struct AgentConfig {
    pub extractor: ExtractorKind,
    pub failure_mode: FailureMode,
    pub summary: SummaryMode,
    pub canned_fallback: bool,
    pub llm: LlmConfig,
    pub logging: LoggingConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Ollama,
            model: default_model(LlmProvider::Ollama).to_string(),
            base_url: None,
            api_key: None,
            api_version: DEFAULT_AZURE_API_VERSION.to_string(),
            timeout_secs: 30,
            max_retries: 1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            extractor: ExtractorKind::default(),
            failure_mode: FailureMode::default(),
            summary: SummaryMode::default(),
            canned_fallback: true,
            llm: LlmConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AgentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(raw) = get("SHOPPING_AGENT_EXTRACTOR") {
            config.extractor = parse_enum("SHOPPING_AGENT_EXTRACTOR", &raw)?;
        }
        if let Some(raw) = get("SHOPPING_AGENT_FAILURE_MODE") {
            config.failure_mode = parse_enum("SHOPPING_AGENT_FAILURE_MODE", &raw)?;
        }
        if let Some(raw) = get("SHOPPING_AGENT_SUMMARY") {
            config.summary = parse_enum("SHOPPING_AGENT_SUMMARY", &raw)?;
        }
        if let Some(raw) = get("SHOPPING_AGENT_CANNED_FALLBACK") {
            config.canned_fallback = parse_bool("SHOPPING_AGENT_CANNED_FALLBACK", &raw)?;
        }

        if let Some(raw) = get("LLM_PROVIDER") {
            config.llm.provider = parse_enum("LLM_PROVIDER", &raw)?;
        }
        config.llm.model =
            get("LLM_MODEL").unwrap_or_else(|| default_model(config.llm.provider).to_string());
        config.llm.base_url = get("LLM_BASE_URL");
        config.llm.api_key = get("LLM_API_KEY").map(SecretString::from);
        if let Some(raw) = get("LLM_API_VERSION") {
            config.llm.api_version = raw;
        }
        if let Some(raw) = get("LLM_TIMEOUT_SECS") {
            config.llm.timeout_secs = parse_number("LLM_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = get("LLM_MAX_RETRIES") {
            config.llm.max_retries = parse_number("LLM_MAX_RETRIES", &raw)?;
        }

        if let Some(raw) = get("SHOPPING_AGENT_LOG_LEVEL") {
            config.logging.level = raw;
        }
        if let Some(raw) = get("SHOPPING_AGENT_LOG_FORMAT") {
            config.logging.format = parse_enum("SHOPPING_AGENT_LOG_FORMAT", &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "LLM_TIMEOUT_SECS must be greater than zero".into(),
            ));
        }
        if self.llm.max_retries > MAX_RETRIES_CAP {
            return Err(ConfigError::Validation(format!(
                "LLM_MAX_RETRIES must be at most {MAX_RETRIES_CAP}"
            )));
        }
        if self.extractor == ExtractorKind::Llm && self.llm.provider == LlmProvider::Azure {
            if self.llm.base_url.is_none() {
                return Err(ConfigError::Missing("LLM_BASE_URL"));
            }
            if self.llm.api_key.is_none() {
                return Err(ConfigError::Missing("LLM_API_KEY"));
            }
        }
        Ok(())
    }
}

impl LlmConfig {
    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
        }
    }

    pub fn build_provider(&self) -> Result<Box<dyn CompletionProvider>, ConfigError> {
        let options = self.http_options();
        match self.provider {
            LlmProvider::Ollama => {
                let base_url = self.base_url.as_deref().unwrap_or(DEFAULT_OLLAMA_URL);
                Ok(Box::new(OllamaProvider::new(base_url, &self.model, options)?))
            }
            LlmProvider::Azure => {
                let endpoint = self
                    .base_url
                    .as_deref()
                    .ok_or(ConfigError::Missing("LLM_BASE_URL"))?;
                let api_key = self
                    .api_key
                    .clone()
                    .ok_or(ConfigError::Missing("LLM_API_KEY"))?;
                Ok(Box::new(AzureOpenAiProvider::new(
                    endpoint,
                    &self.model,
                    &self.api_version,
                    api_key,
                    options,
                )?))
            }
        }
    }
}

fn default_model(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::Ollama => "llama3",
        LlmProvider::Azure => "gpt-35-turbo",
    }
}

fn parse_enum<T: ValueEnum>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    T::from_str(raw.trim(), true).map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}
