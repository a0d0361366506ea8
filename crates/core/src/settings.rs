//! User settings and their persistence.
//!
//! The settings record is owned by whatever settings UI the host provides;
//! this crate only reads it through a [`SettingsStore`]. Two stores ship
//! here: [`MemoryStore`] for embedding and tests, and [`JsonFileStore`] which
//! keeps the record as JSON in the user's config directory
//! (e.g. `~/.config/transit/settings.json` on Linux).

use crate::error::{AppError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Default prompt. The target language is fixed by the template.
pub const DEFAULT_TRANSLATION_PROMPT: &str = "Detect the language of the following text, then translate it into Vietnamese, focusing on accuracy, technical terminology (especially in Information Technology), and preserving original formatting. Do not include any introductory or concluding phrases, just the translated text: \"{text}\"";

/// Built-in prompt for grammar correction.
pub const DEFAULT_CORRECTION_PROMPT: &str = "Correct grammar and improve, just simple in daily communication (native speaker), majoring in IT. Do not add any introductory or concluding phrases, just return options. Only output may have multiple sentences. The text to correct is: \"{text}\"";

/// Supported upstream AI services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiProvider {
    #[default]
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
}

impl fmt::Display for ApiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiProvider::Gemini => write!(f, "gemini"),
            ApiProvider::OpenAi => write!(f, "openai"),
        }
    }
}

impl ApiProvider {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Some(ApiProvider::Gemini),
            "openai" => Some(ApiProvider::OpenAi),
            _ => None,
        }
    }

    /// Name used in user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            ApiProvider::Gemini => "Gemini",
            ApiProvider::OpenAi => "OpenAI",
        }
    }

    pub fn default_endpoint(self) -> &'static str {
        match self {
            ApiProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta/models/",
            ApiProvider::OpenAi => "https://api.openai.com/v1/chat/completions",
        }
    }

    /// Models offered by the settings UI, as `(id, display name)`.
    pub fn available_models(self) -> &'static [(&'static str, &'static str)] {
        match self {
            ApiProvider::Gemini => &[
                ("gemini-2.0-flash", "Gemini 2.0 Flash"),
                ("gemini-1.5-flash-latest", "Gemini 1.5 Flash (Latest)"),
                ("gemini-1.5-pro-latest", "Gemini 1.5 Pro (Latest)"),
                ("gemini-pro", "Gemini Pro"),
            ],
            ApiProvider::OpenAi => &[
                ("gpt-4o", "GPT-4o"),
                ("gpt-4-turbo", "GPT-4 Turbo"),
                ("gpt-4", "GPT-4"),
                ("gpt-3.5-turbo", "GPT-3.5 Turbo"),
            ],
        }
    }

    pub fn default_model(self) -> &'static str {
        self.available_models()[0].0
    }
}

/// The persisted settings record.
///
/// Field names on disk match the keys the settings UI writes
/// (`apiProvider`, `apiKey`, `apiEndpoint`, `aiModel`, `customPrompt`).
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub api_provider: ApiProvider,
    pub api_key: String,
    /// Endpoint URL, or URL prefix for Gemini.
    pub api_endpoint: String,
    pub ai_model: String,
    /// Instructions; may contain a literal `{text}` placeholder.
    pub custom_prompt: String,
}

impl Settings {
    /// Creates default settings for the given provider.
    pub fn with_provider(provider: ApiProvider) -> Self {
        Self {
            api_provider: provider,
            api_key: String::new(),
            api_endpoint: provider.default_endpoint().to_string(),
            ai_model: provider.default_model().to_string(),
            custom_prompt: DEFAULT_TRANSLATION_PROMPT.to_string(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// The API key with its last ten characters replaced by `*`.
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        let keep = chars.len().saturating_sub(10);
        let mut masked: String = chars[..keep].iter().collect();
        masked.push_str(&"*".repeat(chars.len() - keep));
        masked
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_provider(ApiProvider::default())
    }
}

// Manual impl so the key never ends up in logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_provider", &self.api_provider)
            .field("api_key", &self.masked_api_key())
            .field("api_endpoint", &self.api_endpoint)
            .field("ai_model", &self.ai_model)
            .field("custom_prompt", &self.custom_prompt)
            .finish()
    }
}

/// Asynchronous access to the persisted settings record.
pub trait SettingsStore {
    fn read(&self) -> impl Future<Output = Result<Settings>> + Send;
    fn write(&self, settings: &Settings) -> impl Future<Output = Result<()>> + Send;
}

/// Callback-style read for hosts that cannot await.
pub async fn read_with<S, F>(store: &S, callback: F)
where
    S: SettingsStore,
    F: FnOnce(Result<Settings>),
{
    callback(store.read().await)
}

/// Settings kept in memory only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Settings>,
}

impl MemoryStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Mutex::new(settings),
        }
    }
}

impl SettingsStore for MemoryStore {
    async fn read(&self) -> Result<Settings> {
        self.inner
            .lock()
            .map(|s| s.clone())
            .map_err(|_| AppError::config("settings lock poisoned"))
    }

    async fn write(&self, settings: &Settings) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| AppError::config("settings lock poisoned"))?;
        *guard = settings.clone();
        Ok(())
    }
}

/// Settings persisted as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform default location.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] if no home directory can be determined.
    pub fn at_default_location() -> Result<Self> {
        Self::default_path()
            .map(Self::new)
            .ok_or_else(|| AppError::config("could not determine a config directory"))
    }

    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "transit", "transit").map(|dirs| dirs.config_dir().join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileStore {
    async fn read(&self) -> Result<Settings> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                debug!("Loaded settings from {}", self.path.display());
                Ok(serde_json::from_str(&content)?)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("No settings file at {}, using defaults", self.path.display());
                Ok(Settings::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, settings: &Settings) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        tokio::fs::write(&self.path, json).await?;
        debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_record_keys() {
        let json = serde_json::to_value(Settings::with_provider(ApiProvider::OpenAi)).unwrap();
        assert_eq!(json["apiProvider"], "openai");
        assert_eq!(json["aiModel"], "gpt-4o");
        assert!(json.get("customPrompt").is_some());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let s: Settings = serde_json::from_str(r#"{"apiKey":"k"}"#).unwrap();
        assert_eq!(s.api_provider, ApiProvider::Gemini);
        assert_eq!(s.api_key, "k");
        assert_eq!(s.ai_model, "gemini-2.0-flash");
    }

    #[test]
    fn masks_last_ten_chars() {
        let mut s = Settings::default();
        s.api_key = "abcdefghijklmnop".to_string();
        assert_eq!(s.masked_api_key(), "abcdef**********");
        s.api_key = "short".to_string();
        assert_eq!(s.masked_api_key(), "*****");
    }

    #[test]
    fn debug_output_hides_key() {
        let mut s = Settings::default();
        s.api_key = "sk-secret-value-1234567890".to_string();
        assert!(!format!("{:?}", s).contains("1234567890"));
    }

    #[test]
    fn provider_parse_is_case_insensitive() {
        assert_eq!(ApiProvider::parse("OpenAI"), Some(ApiProvider::OpenAi));
        assert_eq!(ApiProvider::parse("gemini"), Some(ApiProvider::Gemini));
        assert_eq!(ApiProvider::parse("claude"), None);
    }

    #[tokio::test]
    async fn memory_store_round_trips() {
        let store = MemoryStore::default();
        let mut s = store.read().await.unwrap();
        s.api_key = "k".to_string();
        store.write(&s).await.unwrap();
        assert_eq!(store.read().await.unwrap().api_key, "k");
    }

    #[tokio::test]
    async fn callback_adapter_delivers_settings() {
        let store = MemoryStore::new(Settings::with_provider(ApiProvider::OpenAi));
        let mut seen = None;
        read_with(&store, |result| seen = result.ok().map(|s| s.api_provider)).await;
        assert_eq!(seen, Some(ApiProvider::OpenAi));
    }
}
