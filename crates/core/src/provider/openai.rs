use super::prompt::PreparedPrompt;
use super::{ProviderRequest, TEMPERATURE};
use crate::error::{AppError, Result};
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use url::Url;

const LABEL: &str = "OpenAI";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

pub(crate) fn build_request(prompt: &PreparedPrompt, settings: &Settings) -> Result<ProviderRequest> {
    let messages = match prompt {
        PreparedPrompt::Combined(text) => vec![ChatMessage {
            role: "user",
            content: text.clone(),
        }],
        PreparedPrompt::Split { instructions, text } => vec![
            ChatMessage {
                role: "system",
                content: instructions.clone(),
            },
            ChatMessage {
                role: "user",
                content: text.clone(),
            },
        ],
    };

    let body = serde_json::to_value(ChatRequest {
        model: &settings.ai_model,
        messages,
        temperature: TEMPERATURE,
    })?;

    let url = Url::parse(settings.api_endpoint.trim()).map_err(|e| AppError::InvalidSetting {
        field: "API Endpoint",
        reason: format!("'{}': {}", settings.api_endpoint, e),
    })?;

    Ok(ProviderRequest {
        url,
        headers: vec![
            ("Content-Type", "application/json".to_string()),
            ("Authorization", format!("Bearer {}", settings.api_key)),
        ],
        body,
    })
}

/// `choices[0].message.content`.
pub(crate) fn extract_text(body: &str) -> Result<String> {
    serde_json::from_str::<ChatResponse>(body)
        .ok()
        .and_then(|r| r.choices?.into_iter().next()?.message?.content)
        .filter(|text| !text.is_empty())
        .ok_or(AppError::ResponseFormat { provider: LABEL })
}
