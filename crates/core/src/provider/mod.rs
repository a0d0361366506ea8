//! Provider client for the supported AI text APIs.
//!
//! Gemini and OpenAI speak unrelated protocols; this module hides both
//! behind [`ProviderClient::translate`]. Request construction
//! ([`build_request`]) and response unwrapping are pure so they can be
//! checked without a network.
//!
//! # Example
//!
//! ```ignore
//! use transit_core::provider::{ProviderClient, Task};
//!
//! let client = ProviderClient::new()?;
//! let text = client.translate("Hello", &settings, Task::Translate).await?;
//! ```
//!
//! No timeout is applied here. Callers that need one wrap the future in
//! `tokio::time::timeout`.

mod gemini;
mod openai;
pub mod prompt;

pub use prompt::{PreparedPrompt, PromptStyle, Task};

use crate::error::{AppError, Result};
use crate::settings::{ApiProvider, Settings};
use futures::StreamExt;
use tracing::{debug, error, info, warn};
use url::Url;

/// Sampling temperature sent with every request.
pub const TEMPERATURE: f64 = 0.7;

/// A fully built HTTP request, ready to be sent.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub url: Url,
    pub headers: Vec<(&'static str, String)>,
    pub body: serde_json::Value,
}

/// Turns selected text into a result for display.
///
/// Implemented by [`crate::Transit`], which reads settings for every call;
/// the overlay controller and the background service only depend on this.
pub trait Translator {
    fn translate(&self, text: &str, task: Task) -> impl Future<Output = Result<String>> + Send;
}

/// Checks that the settings carry everything a request needs.
///
/// # Errors
/// Returns [`AppError::Configuration`] naming the first missing field.
pub fn validate(settings: &Settings) -> Result<()> {
    if settings.api_key.trim().is_empty() {
        return Err(AppError::Configuration { field: "API Key" });
    }
    if settings.ai_model.trim().is_empty() {
        return Err(AppError::Configuration { field: "AI Model" });
    }
    if settings.api_endpoint.trim().is_empty() {
        return Err(AppError::Configuration { field: "API Endpoint" });
    }
    Ok(())
}

/// Builds the request for `text` without sending it.
///
/// # Arguments
/// * `text` - The user's selected text
/// * `settings` - Provider, credentials, endpoint and prompt
/// * `task` - Translation or correction
/// * `style` - Forced prompt layout, or `None` to infer it from the prompt
/// * `streaming` - Whether to target the bulk streaming endpoint (Gemini only)
pub fn build_request(
    text: &str,
    settings: &Settings,
    task: Task,
    style: Option<PromptStyle>,
    streaming: bool,
) -> Result<ProviderRequest> {
    validate(settings)?;
    let prompt = prompt::prepare(text, settings, task, style);
    match settings.api_provider {
        ApiProvider::Gemini => gemini::build_request(&prompt, settings, streaming),
        ApiProvider::OpenAi => openai::build_request(&prompt, settings),
    }
}

/// HTTP client for both providers.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    style: Option<PromptStyle>,
}

impl ProviderClient {
    /// Creates a client with a default HTTP stack.
    ///
    /// # Errors
    /// Returns [`AppError::Network`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self::with_http_client(http))
    }

    /// Uses a preconfigured HTTP client (proxies, timeouts, ...).
    pub fn with_http_client(http: reqwest::Client) -> Self {
        Self { http, style: None }
    }

    /// Forces one prompt layout instead of inferring it per prompt.
    pub fn with_prompt_style(mut self, style: PromptStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Sends one request and returns the provider's text.
    ///
    /// # Errors
    /// - [`AppError::Configuration`] before any I/O if a field is missing
    /// - [`AppError::Network`] if the request fails in transport
    /// - [`AppError::Api`] on a non-2xx status
    /// - [`AppError::ResponseFormat`] if the body lacks the expected text
    pub async fn translate(&self, text: &str, settings: &Settings, task: Task) -> Result<String> {
        let request = build_request(text, settings, task, self.style, false)?;
        info!(
            "{} translate: model={}, chars={}",
            settings.api_provider.label(),
            settings.ai_model,
            text.chars().count()
        );

        let response = self.send(request).await?;
        let body = response.text().await?;

        let result = match settings.api_provider {
            ApiProvider::Gemini => gemini::extract_text(&body),
            ApiProvider::OpenAi => openai::extract_text(&body),
        };
        match &result {
            Ok(text) => info!("Translation successful: {} chars", text.chars().count()),
            Err(e) => warn!("Unexpected response body: {}", e),
        }
        result
    }

    /// Gemini bulk streaming variant.
    ///
    /// The response is a single JSON array of incremental chunks. The body
    /// is read to completion, then every chunk's text is concatenated.
    /// Errors follow the same contract as [`translate`](Self::translate).
    /// OpenAI has no equivalent endpoint and is served by `translate`.
    pub async fn translate_streaming(&self, text: &str, settings: &Settings, task: Task) -> Result<String> {
        if settings.api_provider != ApiProvider::Gemini {
            return self.translate(text, settings, task).await;
        }

        let request = build_request(text, settings, task, self.style, true)?;
        info!(
            "Gemini streaming translate: model={}, chars={}",
            settings.ai_model,
            text.chars().count()
        );

        let response = self.send(request).await?;
        let mut stream = response.bytes_stream();
        let mut buffer = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            debug!("Received {} bytes", chunk.len());
            buffer.extend_from_slice(&chunk);
        }

        let body = String::from_utf8_lossy(&buffer);
        let result = gemini::extract_stream_text(&body);
        if let Err(e) = &result {
            warn!("Unexpected streaming body: {}", e);
        }
        result
    }

    /// Sends the request and turns non-2xx statuses into [`AppError::Api`].
    async fn send(&self, request: ProviderRequest) -> Result<reqwest::Response> {
        // The URL may carry the key; log the path only.
        debug!("POST {}{}", request.url.origin().ascii_serialization(), request.url.path());

        let body = serde_json::to_vec(&request.body)?;
        let mut builder = self.http.post(request.url).body(body);
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(|e| {
            error!("Provider request failed: {}", e);
            AppError::from(e)
        })?;

        let status = response.status();
        debug!("Provider response status: {}", status);
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!("Provider API error: status={}, body={}", status, body);
        Err(AppError::Api {
            status: status.as_u16(),
            detail: parse_error_body(&body),
        })
    }
}

/// Keeps the upstream error body only when it is JSON.
fn parse_error_body(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .map(|value| value.to_string())
}
