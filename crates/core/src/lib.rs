//! Transit Core Library
//!
//! This library provides the core functionality for transit, a selection
//! translator: the user selects text, the text is sent to a configurable AI
//! text API, and the result is shown in a tooltip next to the selection.
//!
//! # Overview
//!
//! - **Selection capture**: validation and debouncing via [`selection`]
//! - **Placement**: clamped, flip-aware overlay positioning via [`positioner`]
//! - **AI Integration**: Gemini and OpenAI requests via [`provider`]
//! - **Overlay**: the icon/loading/tooltip state machine via [`overlay`]
//! - **Messaging**: page/background message passing via [`bridge`]
//!
//! # Quick Start
//!
//! The simplest way to use the library is through the [`Transit`] facade:
//!
//! ```ignore
//! use transit_core::{settings::JsonFileStore, Transit};
//!
//! let transit = Transit::new(JsonFileStore::at_default_location()?)?;
//! let text = transit.translate("Hello, world", Task::Translate).await?;
//! ```
//!
//! # Module Structure
//!
//! - [`bridge`]: Cross-context messages and the background service
//! - [`config`]: Environment configuration
//! - [`error`]: Error types and result aliases
//! - [`geometry`]: Rectangles, sizes and viewports
//! - [`logging`]: tracing subscriber setup
//! - [`overlay`]: Overlay state machine and host surface
//! - [`positioner`]: Floating element placement
//! - [`provider`]: Provider client
//! - [`selection`]: Selection capture
//! - [`settings`]: Settings record and stores

pub mod bridge;
pub mod config;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod overlay;
pub mod positioner;
pub mod provider;
pub mod selection;
pub mod settings;

// Re-export primary types for convenience
pub use config::Config;
pub use error::{AppError, Result};
pub use provider::{ProviderClient, Task, Translator};
pub use settings::{ApiProvider, Settings, SettingsStore};

/// Main entry point for translation.
///
/// Reads the settings from its store on every call, applies the
/// environment overrides from [`Config`], and dispatches to the
/// [`ProviderClient`]. This is what a background context holds.
///
/// # Example
///
/// ```ignore
/// use transit_core::{settings::MemoryStore, Task, Transit};
///
/// let transit = Transit::new(MemoryStore::new(settings))?;
/// let corrected = transit.translate("i has a apple", Task::Correct).await?;
/// ```
pub struct Transit<S> {
    store: S,
    config: Config,
    client: ProviderClient,
}

impl<S: SettingsStore + Sync> Transit<S> {
    /// Creates an instance without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(store: S) -> Result<Self> {
        Self::with_config(store, Config::default())
    }

    /// Creates an instance with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_config(store: S, config: Config) -> Result<Self> {
        Ok(Self::with_client(store, config, ProviderClient::new()?))
    }

    /// Creates an instance around a preconfigured client.
    pub fn with_client(store: S, config: Config, client: ProviderClient) -> Self {
        Self { store, config, client }
    }

    /// The effective settings: stored record plus environment overrides.
    pub async fn settings(&self) -> Result<Settings> {
        Ok(self.config.apply(self.store.read().await?))
    }

    /// Sends `text` with one standard request.
    pub async fn translate(&self, text: &str, task: Task) -> Result<String> {
        let settings = self.settings().await?;
        self.client.translate(text, &settings, task).await
    }

    /// Grammar correction with the built-in correction prompt.
    pub async fn correct(&self, text: &str) -> Result<String> {
        self.translate(text, Task::Correct).await
    }

    /// Sends `text` to the bulk streaming endpoint (Gemini only; OpenAI
    /// settings fall back to a standard request).
    pub async fn translate_streaming(&self, text: &str, task: Task) -> Result<String> {
        let settings = self.settings().await?;
        self.client.translate_streaming(text, &settings, task).await
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a mutable reference to the configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }
}

impl<S: SettingsStore + Sync> Translator for Transit<S> {
    async fn translate(&self, text: &str, task: Task) -> Result<String> {
        Transit::translate(self, text, task).await
    }
}

/// Initializes the library by loading environment variables.
///
/// Call this once at application startup before using any other functions.
/// This loads `.env` files if present.
pub fn init() {
    let _ = dotenvy::dotenv();
}
