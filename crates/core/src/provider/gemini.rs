use super::prompt::PreparedPrompt;
use super::{ProviderRequest, TEMPERATURE};
use crate::error::{AppError, Result};
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use url::Url;

const GENERATE: &str = "generateContent";
const STREAM_GENERATE: &str = "streamGenerateContent";
const LABEL: &str = "Gemini";

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    parts: Option<Vec<GeminiResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

impl GeminiResponse {
    /// `candidates[0].content.parts[0].text`, if present.
    fn first_text(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .next()?
            .text
    }
}

/// Derives the method URL from the configured endpoint.
///
/// A bare prefix such as `.../v1beta/models/` gets `{model}:{method}`
/// appended. An endpoint that already names `models/{model}` only gets the
/// `:{method}` suffix, and is left alone if it already ends with it.
pub(crate) fn method_url(endpoint: &str, model: &str, method: &str) -> Result<Url> {
    let endpoint = endpoint.trim();
    let suffix = format!(":{}", method);

    let raw = if !endpoint.contains(&format!("models/{}", model)) {
        let separator = if endpoint.ends_with('/') { "" } else { "/" };
        format!("{}{}{}{}", endpoint, separator, model, suffix)
    } else if !endpoint.ends_with(&suffix) {
        format!("{}{}", endpoint, suffix)
    } else {
        endpoint.to_string()
    };

    Url::parse(&raw).map_err(|e| AppError::InvalidSetting {
        field: "API Endpoint",
        reason: format!("'{}': {}", raw, e),
    })
}

pub(crate) fn build_request(prompt: &PreparedPrompt, settings: &Settings, streaming: bool) -> Result<ProviderRequest> {
    let parts = match prompt {
        PreparedPrompt::Combined(text) => vec![GeminiPart { text: text.clone() }],
        PreparedPrompt::Split { instructions, text } => vec![
            GeminiPart {
                text: instructions.clone(),
            },
            GeminiPart { text: text.clone() },
        ],
    };

    let body = serde_json::to_value(GeminiRequest {
        contents: vec![GeminiContent { parts }],
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
        },
    })?;

    let mut headers = vec![("Content-Type", "application/json".to_string())];
    let url = if streaming {
        // The bulk streaming endpoint is called with the key in the query
        // string; the standard endpoint takes it as a header.
        let mut url = method_url(&settings.api_endpoint, &settings.ai_model, STREAM_GENERATE)?;
        url.query_pairs_mut()
            .append_pair("alt", "json")
            .append_pair("key", &settings.api_key);
        url
    } else {
        headers.push(("x-goog-api-key", settings.api_key.clone()));
        method_url(&settings.api_endpoint, &settings.ai_model, GENERATE)?
    };

    Ok(ProviderRequest { url, headers, body })
}

pub(crate) fn extract_text(body: &str) -> Result<String> {
    serde_json::from_str::<GeminiResponse>(body)
        .ok()
        .and_then(GeminiResponse::first_text)
        .filter(|text| !text.is_empty())
        .ok_or(AppError::ResponseFormat { provider: LABEL })
}

/// Concatenates the text of every chunk in a bulk streaming body.
///
/// Chunks without text (such as a trailing chunk that only carries a finish
/// reason) are skipped.
pub(crate) fn extract_stream_text(body: &str) -> Result<String> {
    let chunks: Vec<GeminiResponse> =
        serde_json::from_str(body).map_err(|_| AppError::ResponseFormat { provider: LABEL })?;

    let text: String = chunks.into_iter().filter_map(GeminiResponse::first_text).collect();
    if text.is_empty() {
        return Err(AppError::ResponseFormat { provider: LABEL });
    }
    Ok(text)
}
