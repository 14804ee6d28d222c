//! Settings Models
//!
//! Application configuration stored in config.json.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use somnia_core::ProxyConfig;
use somnia_llm::{ProviderConfig, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL};

/// Environment variable that supplies the API key when the config has none.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Endpoint settings for one hosted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointSettings {
    /// Full endpoint URL override. `None` uses the provider default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl EndpointSettings {
    fn with_model(model: &str) -> Self {
        Self {
            base_url: None,
            model: model.to_string(),
            api_key: None,
        }
    }
}

/// Application configuration stored in config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chat-completion endpoint used for analyses
    #[serde(default = "default_text_settings")]
    pub text: EndpointSettings,
    /// Image endpoint used for dream visualizations
    #[serde(default = "default_image_settings")]
    pub image: EndpointSettings,
    /// Outbound proxy shared by both endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,
    /// Analysis database location. `None` uses ~/.somnia/somnia.db
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

fn default_text_settings() -> EndpointSettings {
    EndpointSettings::with_model(DEFAULT_TEXT_MODEL)
}

fn default_image_settings() -> EndpointSettings {
    EndpointSettings::with_model(DEFAULT_IMAGE_MODEL)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            text: default_text_settings(),
            image: default_image_settings(),
            proxy: None,
            database_path: None,
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub text_model: Option<String>,
    pub text_base_url: Option<String>,
    pub image_model: Option<String>,
    pub image_base_url: Option<String>,
    pub api_key: Option<String>,
    pub database_path: Option<PathBuf>,
}

impl AppConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(model) = update.text_model {
            self.text.model = model;
        }
        if let Some(url) = update.text_base_url {
            self.text.base_url = Some(url);
        }
        if let Some(model) = update.image_model {
            self.image.model = model;
        }
        if let Some(url) = update.image_base_url {
            self.image.base_url = Some(url);
        }
        if let Some(key) = update.api_key {
            self.text.api_key = Some(key.clone());
            self.image.api_key = Some(key);
        }
        if let Some(path) = update.database_path {
            self.database_path = Some(path);
        }
    }

    /// Fill missing API keys from an environment-supplied value.
    pub fn with_env_api_key(mut self, env_key: Option<String>) -> Self {
        let env_key = env_key.filter(|k| !k.trim().is_empty());
        if let Some(key) = env_key {
            if self.text.api_key.is_none() {
                self.text.api_key = Some(key.clone());
            }
            if self.image.api_key.is_none() {
                self.image.api_key = Some(key);
            }
        }
        self
    }

    /// Provider configuration for the chat-completion endpoint.
    pub fn text_provider(&self) -> ProviderConfig {
        self.provider_config(&self.text)
    }

    /// Provider configuration for the image endpoint.
    pub fn image_provider(&self) -> ProviderConfig {
        self.provider_config(&self.image)
    }

    fn provider_config(&self, endpoint: &EndpointSettings) -> ProviderConfig {
        ProviderConfig {
            api_key: endpoint.api_key.clone(),
            base_url: endpoint.base_url.clone(),
            model: endpoint.model.clone(),
            proxy: self.proxy.clone(),
            ..Default::default()
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        self.text_provider()
            .validate()
            .map_err(|e| format!("text endpoint: {}", e))?;
        self.image_provider()
            .validate()
            .map_err(|e| format!("image endpoint: {}", e))?;
        if let Some(path) = &self.database_path {
            if path.as_os_str().is_empty() {
                return Err("database_path must not be empty".to_string());
            }
        }
        Ok(())
    }
}
