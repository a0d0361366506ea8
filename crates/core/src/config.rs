use crate::error::{AppError, Result};
use crate::settings::{ApiProvider, Settings};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

/// Environment overrides layered on top of the persisted settings.
///
/// Every field is optional; only the values that are set replace the
/// corresponding settings field.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub api_provider: Option<ApiProvider>,
    pub api_key: Option<String>,
    pub api_endpoint: Option<String>,
    pub model_name: Option<String>,
    pub prompt: Option<String>,
    pub settings_path: Option<PathBuf>,
    pub debug: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists, ignore if it doesn't
        let _ = dotenv();

        let api_provider = match non_empty_var("TRANSIT_API_PROVIDER") {
            Some(name) => Some(ApiProvider::parse(&name).ok_or_else(|| {
                AppError::Config(format!(
                    "TRANSIT_API_PROVIDER must be 'gemini' or 'openai', got '{}'",
                    name
                ))
            })?),
            None => None,
        };

        let debug = non_empty_var("TRANSIT_DEBUG")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            api_provider,
            api_key: non_empty_var("TRANSIT_API_KEY"),
            api_endpoint: non_empty_var("TRANSIT_API_ENDPOINT"),
            model_name: non_empty_var("TRANSIT_MODEL"),
            prompt: non_empty_var("TRANSIT_PROMPT"),
            settings_path: non_empty_var("TRANSIT_SETTINGS_PATH").map(PathBuf::from),
            debug,
        })
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Returns `settings` with every configured override applied.
    ///
    /// Switching provider without an explicit endpoint also switches to that
    /// provider's default endpoint, since the two URL schemes are unrelated.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(provider) = self.api_provider {
            if provider != settings.api_provider && self.api_endpoint.is_none() {
                settings.api_endpoint = provider.default_endpoint().to_string();
            }
            settings.api_provider = provider;
        }
        if let Some(key) = &self.api_key {
            settings.api_key = key.clone();
        }
        if let Some(endpoint) = &self.api_endpoint {
            settings.api_endpoint = endpoint.clone();
        }
        if let Some(model) = &self.model_name {
            settings.ai_model = model.clone();
        }
        if let Some(prompt) = &self.prompt {
            settings.custom_prompt = prompt.clone();
        }
        settings
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn with_provider(mut self, provider: ApiProvider) -> Self {
        self.config.api_provider = Some(provider);
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.api_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model_name = Some(model.into());
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.prompt = Some(prompt.into());
        self
    }

    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.settings_path = Some(path.into());
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_only_overrides_set_fields() {
        let config = Config::builder().with_api_key("env-key").build();
        let mut base = Settings::default();
        base.ai_model = "gemini-pro".to_string();
        let merged = config.apply(base);
        assert_eq!(merged.api_key, "env-key");
        assert_eq!(merged.ai_model, "gemini-pro");
    }

    #[test]
    fn switching_provider_resets_endpoint() {
        let config = Config::builder().with_provider(ApiProvider::OpenAi).build();
        let merged = config.apply(Settings::default());
        assert_eq!(merged.api_endpoint, ApiProvider::OpenAi.default_endpoint());
    }

    #[test]
    fn explicit_endpoint_wins_over_provider_default() {
        let config = Config::builder()
            .with_provider(ApiProvider::OpenAi)
            .with_endpoint("http://localhost:8080/v1/chat/completions")
            .build();
        let merged = config.apply(Settings::default());
        assert_eq!(merged.api_endpoint, "http://localhost:8080/v1/chat/completions");
    }
}
