//! Selection capture and debouncing.
//!
//! Hosts feed raw selection state into [`capture`] (or a
//! [`SelectionTracker`]) whenever a selection-affecting event fires. The
//! result is either a usable [`SelectionSnapshot`] or a signal to clear the
//! overlay.

use crate::geometry::Rect;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::debug;

/// Quiet period before a burst of selection changes is acted on.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

/// Raw selection state as read from the host page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSelection {
    /// Full selected text, untrimmed.
    pub text: String,
    /// Number of ranges in the selection.
    pub range_count: usize,
    /// Whether the selection is collapsed to a caret.
    pub is_collapsed: bool,
    /// Whether the selection anchor lies inside a password input.
    pub anchor_in_password: bool,
    /// Bounding box of the first range, in viewport coordinates.
    pub first_range_rect: Option<Rect>,
}

impl RawSelection {
    /// Convenience constructor for a single-range, non-collapsed selection.
    pub fn new(text: impl Into<String>, rect: Rect) -> Self {
        Self {
            text: text.into(),
            range_count: 1,
            is_collapsed: false,
            anchor_in_password: false,
            first_range_rect: Some(rect),
        }
    }
}

/// A validated selection: non-empty trimmed text and its bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSnapshot {
    pub text: String,
    pub rect: Rect,
}

/// Outcome of capturing a selection.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    /// A usable selection was captured.
    Captured(SelectionSnapshot),
    /// The selection is empty, collapsed or must be ignored.
    Clear,
}

/// Validates a raw selection.
///
/// Selections inside password fields are treated as empty, as are
/// selections whose first range has zero width and zero height.
pub fn capture(raw: &RawSelection) -> SelectionEvent {
    if raw.anchor_in_password || raw.range_count == 0 || raw.is_collapsed {
        return SelectionEvent::Clear;
    }

    let text = raw.text.trim();
    if text.is_empty() {
        return SelectionEvent::Clear;
    }

    match raw.first_range_rect {
        Some(rect) if !rect.is_empty() => SelectionEvent::Captured(SelectionSnapshot {
            text: text.to_string(),
            rect,
        }),
        _ => SelectionEvent::Clear,
    }
}

/// Latest-value-wins debouncer with an injected clock.
///
/// Every [`push`](Debouncer::push) restarts the quiet period; [`poll`](Debouncer::poll)
/// releases the pending value once the period has elapsed.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Instant at which the pending value becomes ready.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending.take() {
            Some((value, at)) if now >= at => Some(value),
            other => {
                self.pending = other;
                None
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

/// Debounced selection capture.
///
/// Every settled selection is emitted, including one identical to the
/// previous event. Whether a repeat shows the icon again depends on the
/// overlay state, so the controller decides.
#[derive(Debug, Default)]
pub struct SelectionTracker {
    debouncer: Debouncer<RawSelection>,
}

impl SelectionTracker {
    pub fn new(delay: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
        }
    }

    /// Records a selection-affecting event.
    pub fn observe(&mut self, raw: RawSelection, now: Instant) {
        self.debouncer.push(raw, now);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Returns the settled event once the quiet period is over.
    pub fn poll(&mut self, now: Instant) -> Option<SelectionEvent> {
        self.debouncer.poll(now).map(|raw| capture(&raw))
    }

    /// Drives the tracker from a channel of raw selections until the sender
    /// is dropped. Pending input is flushed on shutdown.
    pub async fn run(
        mut self,
        mut input: mpsc::Receiver<RawSelection>,
        output: mpsc::Sender<SelectionEvent>,
    ) {
        loop {
            let next = match self.deadline() {
                Some(deadline) => tokio::select! {
                    raw = input.recv() => raw,
                    _ = tokio::time::sleep_until(deadline) => {
                        if let Some(event) = self.poll(Instant::now()) {
                            if output.send(event).await.is_err() {
                                return;
                            }
                        }
                        continue;
                    }
                },
                None => input.recv().await,
            };

            match next {
                Some(raw) => self.observe(raw, Instant::now()),
                None => break,
            }
        }

        if let Some(deadline) = self.deadline() {
            if let Some(event) = self.poll(deadline) {
                let _ = output.send(event).await;
            }
        }
        debug!("Selection tracker input closed");
    }
}
