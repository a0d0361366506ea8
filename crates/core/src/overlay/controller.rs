//! Overlay orchestration.
//!
//! This module contains the [`OverlayController`], which owns the single
//! active overlay for one page context and mediates between the selection
//! tracker, the positioner and a translator (direct or through the
//! background bridge).

use super::content::OverlayContent;
use super::state::{OverlayKind, OverlayState};
use super::surface::OverlaySurface;
use crate::bridge::{Ack, Message, RuntimeChannel};
use crate::geometry::{Point, Rect};
use crate::positioner::{self, DEFAULT_PADDING};
use crate::provider::{Task, Translator};
use crate::selection::{SelectionEvent, SelectionSnapshot};
use tracing::{debug, info, warn};

/// A translation started by the controller.
///
/// Carries the text and anchor captured when it started, plus the
/// selection generation used to recognise stale results.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationTicket {
    pub text: String,
    pub rect: Rect,
    pub generation: u64,
}

impl TranslationTicket {
    /// Request message for the background context.
    pub fn to_message(&self) -> Message {
        Message::TranslateText {
            text: self.text.clone(),
            rect: Some(self.rect),
            request_id: Some(self.generation),
        }
    }
}

/// Owns the overlay of one page context.
///
/// The controller follows the state machine documented on
/// [`OverlayState`]. Entering any state first removes the elements of the
/// other states, so at most one element is mounted at any time.
///
/// Every new selection, cleared selection or dismissal bumps a generation
/// counter. A result whose ticket belongs to an older generation is
/// dropped instead of being shown at an abandoned selection.
pub struct OverlayController<S> {
    surface: S,
    state: OverlayState,
    snapshot: Option<SelectionSnapshot>,
    is_translating: bool,
    shift_down: bool,
    generation: u64,
    padding: f64,
}

impl<S: OverlaySurface> OverlayController<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            state: OverlayState::None,
            snapshot: None,
            is_translating: false,
            shift_down: false,
            generation: 0,
            padding: DEFAULT_PADDING,
        }
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn snapshot(&self) -> Option<&SelectionSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn is_translating(&self) -> bool {
        self.is_translating
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Applies a settled selection event.
    ///
    /// While the loading indicator or a result is on screen a captured
    /// selection is ignored; the overlay leaves that state through an
    /// outside click or a cleared selection. Otherwise a new selection shows
    /// the icon, unless the icon is already showing for the same selection.
    pub fn on_selection(&mut self, event: SelectionEvent) {
        match event {
            SelectionEvent::Captured(snapshot) => {
                match self.state {
                    OverlayState::Loading(_) | OverlayState::Result { .. } => {
                        debug!("Overlay busy, suppressing icon");
                        return;
                    }
                    OverlayState::IconVisible(_) if self.snapshot.as_ref() == Some(&snapshot) => return,
                    _ => {}
                }
                self.generation += 1;
                let rect = snapshot.rect;
                self.snapshot = Some(snapshot);
                self.show_icon(rect);
            }
            SelectionEvent::Clear => {
                self.snapshot = None;
                self.dismiss();
            }
        }
    }

    /// Icon clicked: starts a translation of the current selection.
    pub fn on_icon_click(&mut self) -> Option<TranslationTicket> {
        if !matches!(self.state, OverlayState::IconVisible(_)) {
            return None;
        }
        self.begin_translation()
    }

    /// Shift pressed: starts a translation on the press edge only, so key
    /// repeat does not submit again.
    pub fn on_shift_down(&mut self) -> Option<TranslationTicket> {
        if self.shift_down {
            return None;
        }
        self.shift_down = true;
        self.begin_translation()
    }

    pub fn on_shift_up(&mut self) {
        self.shift_down = false;
    }

    /// A click anywhere in the document. Clicks outside the current overlay
    /// element dismiss it.
    pub fn on_document_click(&mut self, point: Point) {
        if let Some(kind) = self.state.kind() {
            if !self.surface.contains(kind, point) {
                debug!("Click outside {}, dismissing", kind.element_id());
                self.dismiss();
            }
        }
    }

    /// Enters `Loading` for the current selection.
    ///
    /// Returns `None` if there is no selection or a translation is already
    /// in flight.
    pub fn begin_translation(&mut self) -> Option<TranslationTicket> {
        if self.is_translating {
            debug!("Translation already in flight, ignoring trigger");
            return None;
        }
        let snapshot = self.snapshot.clone()?;
        self.is_translating = true;
        self.show_loading(snapshot.rect);
        info!("Translating {} chars", snapshot.text.chars().count());
        Some(TranslationTicket {
            text: snapshot.text,
            rect: snapshot.rect,
            generation: self.generation,
        })
    }

    /// Renders the outcome of `ticket`.
    ///
    /// Returns `false` when the result was dropped because the selection
    /// changed (or the overlay was dismissed) after the ticket was issued.
    pub fn complete_translation(&mut self, ticket: TranslationTicket, result: crate::Result<String>) -> bool {
        // A stale ticket no longer owns the in-flight flag; a newer
        // translation may hold it.
        if ticket.generation != self.generation {
            debug!(
                "Dropping result for stale selection (generation {} < {})",
                ticket.generation, self.generation
            );
            return false;
        }
        self.is_translating = false;
        match result {
            Ok(text) => self.show_result(ticket.rect, OverlayContent::sanitized(&text), false),
            Err(e) => {
                warn!("Translation failed: {}", e);
                self.show_result(ticket.rect, OverlayContent::text(e.tooltip_message()), true);
            }
        }
        true
    }

    /// Translates the current selection with `translator` and renders the
    /// outcome. Returns `false` if nothing was started or the result was
    /// stale.
    ///
    /// The controller stays mutably borrowed until the provider answers, so
    /// no click or selection can be delivered in the meantime. Event-driven
    /// hosts should call [`begin_translation`](Self::begin_translation),
    /// run the request themselves and hand the outcome to
    /// [`complete_translation`](Self::complete_translation).
    pub async fn translate_with<T: Translator>(&mut self, translator: &T, task: Task) -> bool {
        let Some(ticket) = self.begin_translation() else {
            return false;
        };
        let result = translator.translate(&ticket.text, task).await;
        self.complete_translation(ticket, result)
    }

    /// Sends the current selection to the background context.
    ///
    /// The result arrives later as a display message for
    /// [`on_message`](Self::on_message). If the request cannot be sent at
    /// all the error is shown right away.
    pub async fn request_via<R: RuntimeChannel>(&mut self, runtime: &R) -> Option<Ack> {
        let ticket = self.begin_translation()?;
        match runtime.send(ticket.to_message()).await {
            Ok(ack) => {
                if !ack.success {
                    warn!(
                        "Translation request failed: {}",
                        ack.error.as_deref().unwrap_or("unknown error")
                    );
                }
                self.is_translating = false;
                Some(ack)
            }
            Err(e) => {
                warn!("Error sending translation message: {}", e);
                let error = e.to_string();
                self.complete_translation(ticket, Err(e));
                Some(Ack::failed(error))
            }
        }
    }

    /// Handles a display message from the background context.
    pub fn on_message(&mut self, message: Message) -> Ack {
        if let Some(id) = message.request_id() {
            if id != self.generation {
                debug!("Dropping {} for stale request {}", message.action(), id);
                return Ack::ok();
            }
        }

        match message {
            Message::DisplayTranslation {
                translated_text,
                selection_rect,
                ..
            } => {
                if translated_text.is_empty() {
                    return Ack::failed("Missing data.");
                }
                self.show_result(selection_rect, OverlayContent::sanitized(&translated_text), false);
                Ack::ok()
            }
            Message::DisplayTranslationError {
                error_message,
                selection_rect,
                ..
            } => {
                if error_message.is_empty() {
                    return Ack::failed("Missing error data.");
                }
                self.show_result(
                    selection_rect,
                    OverlayContent::text(format!("Error: {}", error_message)),
                    true,
                );
                Ack::ok()
            }
            Message::DisplayPdfTranslation { translated_text, .. } => match self.current_anchor() {
                Some(rect) => {
                    self.show_result(rect, OverlayContent::sanitized(&translated_text), false);
                    Ack::ok()
                }
                None => Ack::failed("No selection to anchor the translation to."),
            },
            Message::DisplayPdfTranslationError { error_message, .. } => match self.current_anchor() {
                Some(rect) => {
                    self.show_result(rect, OverlayContent::text(format!("Error: {}", error_message)), true);
                    Ack::ok()
                }
                None => Ack::failed("No selection to anchor the error to."),
            },
            other => Ack::failed(format!("Unsupported action: {}", other.action())),
        }
    }

    /// Returns to `None`, removing every overlay element. A translation in
    /// flight is abandoned: its result will be dropped and it no longer
    /// blocks a new one.
    pub fn dismiss(&mut self) {
        self.generation += 1;
        self.is_translating = false;
        self.clear_all();
        self.state = OverlayState::None;
    }

    fn current_anchor(&self) -> Option<Rect> {
        self.state.anchor().or_else(|| self.snapshot.as_ref().map(|s| s.rect))
    }

    fn clear_all(&mut self) {
        for kind in OverlayKind::ALL {
            self.surface.remove(kind);
        }
    }

    fn clear_except(&mut self, keep: OverlayKind) {
        for kind in OverlayKind::ALL {
            if kind != keep {
                self.surface.remove(kind);
            }
        }
    }

    fn show_icon(&mut self, rect: Rect) {
        self.clear_except(OverlayKind::Icon);
        self.surface.mount(OverlayKind::Icon, OverlayContent::text(""), None);
        let size = self.surface.measure(OverlayKind::Icon);
        let placement = positioner::place_icon(&rect, size, &self.surface.viewport(), self.padding);
        self.surface.move_to(OverlayKind::Icon, placement);
        self.state = OverlayState::IconVisible(rect);
    }

    fn show_loading(&mut self, rect: Rect) {
        self.clear_except(OverlayKind::Loading);
        self.surface.mount(OverlayKind::Loading, OverlayContent::text(""), None);
        let size = self.surface.measure(OverlayKind::Loading);
        let placement = positioner::place(&rect, size, &self.surface.viewport(), self.padding);
        self.surface.move_to(OverlayKind::Loading, placement);
        self.state = OverlayState::Loading(rect);
    }

    fn show_result(&mut self, rect: Rect, content: OverlayContent, is_error: bool) {
        self.clear_except(OverlayKind::Tooltip);
        let text = content.as_str().to_string();
        self.surface.mount(
            OverlayKind::Tooltip,
            content,
            Some(positioner::tooltip_max_width(&rect)),
        );
        let size = self.surface.measure(OverlayKind::Tooltip);
        let placement = positioner::place(&rect, size, &self.surface.viewport(), self.padding);
        self.surface.move_to(OverlayKind::Tooltip, placement);
        self.state = OverlayState::Result { rect, text, is_error };
    }
}
