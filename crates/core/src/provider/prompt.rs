//! Prompt assembly shared by both providers.

use crate::settings::{DEFAULT_CORRECTION_PROMPT, DEFAULT_TRANSLATION_PROMPT, Settings};

/// Placeholder substituted with the selected text.
pub const TEXT_PLACEHOLDER: &str = "{text}";

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Task {
    #[default]
    Translate,
    Correct,
}

/// How instructions and user text are sent upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    /// One prompt string with the text substituted into it.
    Combined,
    /// Instructions and text as two separate parts/messages.
    Split,
}

impl PromptStyle {
    /// Templates with a `{text}` placeholder are combined, anything else is
    /// treated as a system instruction.
    pub fn infer(prompt: &str) -> Self {
        if prompt.contains(TEXT_PLACEHOLDER) {
            PromptStyle::Combined
        } else {
            PromptStyle::Split
        }
    }
}

/// A prompt ready to be encoded by a provider.
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedPrompt {
    Combined(String),
    Split { instructions: String, text: String },
}

/// Builds the prompt for `text` from the settings and task.
///
/// `style` forces a layout; `None` infers it from the template.
pub fn prepare(text: &str, settings: &Settings, task: Task, style: Option<PromptStyle>) -> PreparedPrompt {
    let template = match task {
        Task::Translate if settings.custom_prompt.trim().is_empty() => DEFAULT_TRANSLATION_PROMPT,
        Task::Translate => settings.custom_prompt.as_str(),
        Task::Correct => DEFAULT_CORRECTION_PROMPT,
    };

    match style.unwrap_or_else(|| PromptStyle::infer(template)) {
        PromptStyle::Combined if template.contains(TEXT_PLACEHOLDER) => {
            PreparedPrompt::Combined(template.replace(TEXT_PLACEHOLDER, text))
        }
        PromptStyle::Combined => PreparedPrompt::Combined(format!("{}\n\n{}", template, text)),
        PromptStyle::Split => PreparedPrompt::Split {
            instructions: strip_placeholder(template),
            text: text.to_string(),
        },
    }
}

fn strip_placeholder(template: &str) -> String {
    template
        .replace("\"{text}\"", "")
        .replace(TEXT_PLACEHOLDER, "")
        .trim_end()
        .trim_end_matches(':')
        .to_string()
}
