//! Overlay state types.

use crate::geometry::Rect;

/// The three floating elements. At most one is mounted at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    Icon,
    Loading,
    Tooltip,
}

impl OverlayKind {
    pub const ALL: [OverlayKind; 3] = [OverlayKind::Icon, OverlayKind::Loading, OverlayKind::Tooltip];

    /// DOM id of the element.
    pub fn element_id(self) -> &'static str {
        match self {
            OverlayKind::Icon => "translation-icon",
            OverlayKind::Loading => "translation-loading",
            OverlayKind::Tooltip => "translation-tooltip",
        }
    }
}

/// Current state of the overlay.
///
/// The controller follows a simple state machine:
/// `None` -> `IconVisible` -> `Loading` -> `Result` -> `None`,
/// with every state able to drop back to `None` when the selection is
/// cleared or a click lands outside the overlay.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum OverlayState {
    /// Nothing is shown.
    #[default]
    None,
    /// The translate icon is shown next to the selection.
    IconVisible(Rect),
    /// A request is in flight.
    Loading(Rect),
    /// The result tooltip is shown.
    Result {
        rect: Rect,
        /// Rendered tooltip text (sanitized markup or plain error text).
        text: String,
        is_error: bool,
    },
}

impl OverlayState {
    /// The element this state displays.
    pub fn kind(&self) -> Option<OverlayKind> {
        match self {
            OverlayState::None => None,
            OverlayState::IconVisible(_) => Some(OverlayKind::Icon),
            OverlayState::Loading(_) => Some(OverlayKind::Loading),
            OverlayState::Result { .. } => Some(OverlayKind::Tooltip),
        }
    }

    pub fn anchor(&self) -> Option<Rect> {
        match self {
            OverlayState::None => None,
            OverlayState::IconVisible(rect) | OverlayState::Loading(rect) => Some(*rect),
            OverlayState::Result { rect, .. } => Some(*rect),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, OverlayState::None)
    }
}
