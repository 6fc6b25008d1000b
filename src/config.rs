//! Configuration for the model provider and request tuning.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then the
//! environment. The CLI applies its own flags on top.
//!
//! ```toml
//! provider = "openrouter"
//! model = "google/gemini-2.5-flash"
//! base_url = "https://openrouter.ai/api/v1"
//!
//! [oracle]
//! system_instruction = "你是一名专业的提示词工程师。"
//! temperature = 0.7
//! max_tokens = 1024
//! ```

use clap::ValueEnum;
use rig::client::CompletionClient;
use rig::providers::{gemini, openrouter};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::PromptsmithError;
use crate::oracle::{create_oracle_with_config, SharedOracle};
use crate::prompts::{REVERSE_PROMPT_INSTRUCTION, REWRITE_SYSTEM_INSTRUCTION};

/// File picked up from the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "promptsmith.toml";

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Request tuning shared by both oracle operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Instruction sent alongside every image
    pub caption_instruction: String,
    /// System instruction for prompt rewrites
    pub system_instruction: String,
    /// Sampling temperature; `None` leaves the provider default
    pub temperature: Option<f64>,
    /// Maximum output tokens; `None` leaves the provider default
    pub max_tokens: Option<u64>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            caption_instruction: REVERSE_PROMPT_INSTRUCTION.to_string(),
            system_instruction: REWRITE_SYSTEM_INSTRUCTION.to_string(),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl OracleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_caption_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.caption_instruction = instruction.into();
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = Some(temp.clamp(0.0, 2.0));
        self
    }

    pub fn with_max_tokens(mut self, tokens: Option<u64>) -> Self {
        self.max_tokens = tokens;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    #[value(name = "openrouter")]
    OpenRouter,
}

impl Provider {
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-2.5-flash",
            Provider::OpenRouter => "google/gemini-2.5-flash",
        }
    }

    pub fn api_key_var(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::OpenRouter => "OPENROUTER_API_KEY",
        }
    }
}

/// Which provider and model to talk to, and with which key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub provider: Provider,
    pub model: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub oracle: OracleConfig,
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, PromptsmithError> {
        Ok(toml::from_str(content)?)
    }

    /// Load defaults, then `path` (or `promptsmith.toml` if present), then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, PromptsmithError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        settings.apply_env();
        Ok(settings)
    }

    fn from_file(path: &Path) -> Result<Self, PromptsmithError> {
        let content = fs::read_to_string(path).map_err(|e| {
            PromptsmithError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&content)
    }

    /// Override fields from `PROMPTSMITH_*` variables and the provider's key variable
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| env::var(name).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(provider) = var("PROMPTSMITH_PROVIDER")
            .and_then(|value| Provider::from_str(value.trim(), true).ok())
        {
            self.provider = provider;
        }
        if let Some(model) = var("PROMPTSMITH_MODEL") {
            self.model = Some(model);
        }
        if let Some(url) = var("PROMPTSMITH_BASE_URL") {
            self.base_url = Some(url);
        }
        if let Some(key) = var(self.provider.api_key_var()) {
            self.api_key = Some(key);
        }
    }

    /// Switch provider, picking up that provider's key from the environment
    pub fn set_provider(&mut self, provider: Provider) {
        if provider != self.provider {
            self.provider = provider;
            self.api_key = env::var(provider.api_key_var()).ok();
        }
    }

    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    pub fn api_key(&self) -> Result<&str, PromptsmithError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                PromptsmithError::Config(format!(
                    "no API key set; export {} or pass --api-key",
                    self.provider.api_key_var()
                ))
            })
    }

    /// Build a shared oracle for the configured provider and model
    pub fn build_oracle(&self) -> Result<SharedOracle, PromptsmithError> {
        let api_key = self.api_key()?;
        let model = self.model_name();
        debug!(provider = ?self.provider, model, "building oracle");

        let oracle = match self.provider {
            Provider::Gemini => {
                let client = gemini::Client::new(api_key);
                create_oracle_with_config(client.completion_model(model), self.oracle.clone())
            }
            Provider::OpenRouter => {
                let base_url = self.base_url.as_deref().unwrap_or(OPENROUTER_BASE_URL);
                let client = openrouter::Client::builder(api_key)
                    .base_url(base_url)
                    .build();
                create_oracle_with_config(client.completion_model(model), self.oracle.clone())
            }
        };

        Ok(oracle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn toml_overrides_defaults() {
        let settings = Settings::from_toml_str(
            r#"
            provider = "openrouter"
            model = "google/gemini-2.5-pro"

            [oracle]
            temperature = 0.4
            system_instruction = "你是一名分镜提示词编辑。"
            "#,
        )
        .unwrap();

        assert_eq!(settings.provider, Provider::OpenRouter);
        assert_eq!(settings.model_name(), "google/gemini-2.5-pro");
        assert_eq!(settings.oracle.temperature, Some(0.4));
        assert_eq!(
            settings.oracle.caption_instruction,
            REVERSE_PROMPT_INSTRUCTION
        );
        assert_eq!(settings.oracle.system_instruction, "你是一名分镜提示词编辑。");
        assert_eq!(
            Settings::default().oracle.system_instruction,
            REWRITE_SYSTEM_INSTRUCTION
        );
    }

    #[test]
    fn env_vars_win_over_file() {
        let vars: HashMap<&str, &str> = [
            ("PROMPTSMITH_PROVIDER", "OpenRouter"),
            ("OPENROUTER_API_KEY", "sk-test"),
            ("GEMINI_API_KEY", "ignored"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::from_toml_str("model = \"m\"").unwrap();
        settings.apply_vars(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(settings.provider, Provider::OpenRouter);
        assert_eq!(settings.api_key().unwrap(), "sk-test");
        assert_eq!(settings.model_name(), "m");
    }

    #[test]
    fn missing_key_is_config_error() {
        let settings = Settings::default();
        assert_eq!(settings.model_name(), "gemini-2.5-flash");
        assert!(matches!(
            settings.build_oracle(),
            Err(PromptsmithError::Config(_))
        ));
    }

    #[test]
    fn temperature_is_clamped() {
        assert_eq!(OracleConfig::new().with_temperature(5.0).temperature, Some(2.0));
    }
}
