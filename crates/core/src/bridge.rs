//! Messaging between the page context and the background context.
//!
//! The page context shows the overlay but holds neither network access nor
//! the API key. It sends a [`Message::TranslateText`] request; the
//! [`BackgroundService`] performs the provider call and answers by sending a
//! display message back to the tab the request came from. The request itself
//! is answered with an [`Ack`].

use crate::error::{AppError, Result};
use crate::geometry::Rect;
use crate::provider::{Task, Translator};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Identifies the browser tab a page context lives in.
pub type TabId = u32;

/// Messages exchanged between contexts, keyed by their `action` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Message {
    #[serde(rename = "translateText", rename_all = "camelCase")]
    TranslateText {
        #[serde(default)]
        text: String,
        #[serde(default)]
        rect: Option<Rect>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<u64>,
    },
    #[serde(rename = "displayTranslation", rename_all = "camelCase")]
    DisplayTranslation {
        translated_text: String,
        selection_rect: Rect,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<u64>,
    },
    #[serde(rename = "displayTranslationError", rename_all = "camelCase")]
    DisplayTranslationError {
        error_message: String,
        selection_rect: Rect,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<u64>,
    },
    #[serde(rename = "translatePDFText", rename_all = "camelCase")]
    TranslatePdfText {
        #[serde(default)]
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<u64>,
    },
    #[serde(rename = "displayPDFTranslation", rename_all = "camelCase")]
    DisplayPdfTranslation {
        translated_text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<u64>,
    },
    #[serde(rename = "displayPDFTranslationError", rename_all = "camelCase")]
    DisplayPdfTranslationError {
        error_message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<u64>,
    },
}

impl Message {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The wire name of the message.
    pub fn action(&self) -> &'static str {
        match self {
            Message::TranslateText { .. } => "translateText",
            Message::DisplayTranslation { .. } => "displayTranslation",
            Message::DisplayTranslationError { .. } => "displayTranslationError",
            Message::TranslatePdfText { .. } => "translatePDFText",
            Message::DisplayPdfTranslation { .. } => "displayPDFTranslation",
            Message::DisplayPdfTranslationError { .. } => "displayPDFTranslationError",
        }
    }

    pub fn request_id(&self) -> Option<u64> {
        match self {
            Message::TranslateText { request_id, .. }
            | Message::DisplayTranslation { request_id, .. }
            | Message::DisplayTranslationError { request_id, .. }
            | Message::TranslatePdfText { request_id, .. }
            | Message::DisplayPdfTranslation { request_id, .. }
            | Message::DisplayPdfTranslationError { request_id, .. } => *request_id,
        }
    }
}

/// Reply to a request message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Delivers messages to a page context.
pub trait TabMessenger {
    fn send(&self, tab: TabId, message: Message) -> impl Future<Output = Result<()>> + Send;
}

/// Delivers messages to page contexts over tokio channels.
///
/// Each page context registers its tab and reads its display messages from
/// the returned receiver.
#[derive(Debug, Default)]
pub struct ChannelMessenger {
    tabs: Mutex<HashMap<TabId, mpsc::UnboundedSender<Message>>>,
}

impl ChannelMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, tab: TabId) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut tabs) = self.tabs.lock() {
            tabs.insert(tab, tx);
        }
        rx
    }

    pub fn unregister(&self, tab: TabId) {
        if let Ok(mut tabs) = self.tabs.lock() {
            tabs.remove(&tab);
        }
    }
}

impl TabMessenger for ChannelMessenger {
    async fn send(&self, tab: TabId, message: Message) -> Result<()> {
        let sender = self
            .tabs
            .lock()
            .map_err(|_| AppError::delivery("tab registry lock poisoned"))?
            .get(&tab)
            .cloned()
            .ok_or_else(|| AppError::delivery(format!("no receiver for tab {}", tab)))?;

        sender
            .send(message)
            .map_err(|_| AppError::delivery(format!("tab {} has gone away", tab)))
    }
}

/// Sends a request from a page context to the background context.
pub trait RuntimeChannel {
    fn send(&self, message: Message) -> impl Future<Output = Result<Ack>> + Send;
}

/// Background context: performs translations on behalf of page contexts.
pub struct BackgroundService<T, M> {
    translator: T,
    messenger: M,
}

impl<T, M> BackgroundService<T, M>
where
    T: Translator + Sync,
    M: TabMessenger + Sync,
{
    pub fn new(translator: T, messenger: M) -> Self {
        Self { translator, messenger }
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    pub fn translator(&self) -> &T {
        &self.translator
    }

    /// Handles one request from the page context in `sender`.
    ///
    /// The outcome is delivered to `sender` as a display message; the
    /// returned [`Ack`] only reports whether that worked.
    pub async fn handle(&self, message: Message, sender: TabId) -> Ack {
        debug!("Background received {} from tab {}", message.action(), sender);
        match message {
            Message::TranslateText { text, rect, request_id } => {
                let rect = match rect {
                    Some(rect) if !text.trim().is_empty() => rect,
                    _ => return Ack::failed("No text or selection area provided for translation."),
                };
                let outcome = self.translator.translate(&text, Task::Translate).await;
                self.deliver(sender, outcome, |result| match result {
                    Ok(translated_text) => Message::DisplayTranslation {
                        translated_text,
                        selection_rect: rect,
                        request_id,
                    },
                    Err(error_message) => Message::DisplayTranslationError {
                        error_message,
                        selection_rect: rect,
                        request_id,
                    },
                })
                .await
            }
            Message::TranslatePdfText { text, request_id } => {
                if text.trim().is_empty() {
                    return Ack::failed("No text provided for translation.");
                }
                let outcome = self.translator.translate(&text, Task::Translate).await;
                self.deliver(sender, outcome, |result| match result {
                    Ok(translated_text) => Message::DisplayPdfTranslation {
                        translated_text,
                        request_id,
                    },
                    Err(error_message) => Message::DisplayPdfTranslationError {
                        error_message,
                        request_id,
                    },
                })
                .await
            }
            other => {
                warn!("Background ignoring unexpected {} message", other.action());
                Ack::failed(format!("Unsupported action: {}", other.action()))
            }
        }
    }

    /// Sends the result to the tab; on any failure sends an error message
    /// instead. A failure to deliver that error is logged and swallowed.
    async fn deliver<F>(&self, tab: TabId, outcome: Result<String>, build: F) -> Ack
    where
        F: Fn(std::result::Result<String, String>) -> Message,
    {
        let failure = match outcome {
            Ok(text) => match self.messenger.send(tab, build(Ok(text))).await {
                Ok(()) => return Ack::ok(),
                Err(e) => e,
            },
            Err(e) => e,
        };

        let message = format!("Failed to get translation: {}", failure);
        warn!("{}", message);
        if let Err(send_error) = self.messenger.send(tab, build(Err(message.clone()))).await {
            error!("Failed to send error message to tab {}: {}", tab, send_error);
        }
        Ack::failed(message)
    }
}

/// A page context's view of an in-process [`BackgroundService`].
pub struct LocalRuntime<'a, T, M> {
    service: &'a BackgroundService<T, M>,
    tab: TabId,
}

impl<'a, T, M> LocalRuntime<'a, T, M> {
    pub fn new(service: &'a BackgroundService<T, M>, tab: TabId) -> Self {
        Self { service, tab }
    }
}

impl<T, M> RuntimeChannel for LocalRuntime<'_, T, M>
where
    T: Translator + Sync,
    M: TabMessenger + Sync,
{
    async fn send(&self, message: Message) -> Result<Ack> {
        Ok(self.service.handle(message, self.tab).await)
    }
}
