//! The document the overlay is drawn on.

use super::content::OverlayContent;
use super::state::OverlayKind;
use crate::geometry::{Point, Size, Viewport};
use crate::positioner::Placement;
use std::collections::HashMap;

/// Host document operations needed by the overlay controller.
///
/// A browser host implements this over the DOM; [`HeadlessSurface`] keeps
/// everything in memory.
pub trait OverlaySurface {
    /// Current visible area and scroll offset.
    fn viewport(&self) -> Viewport;

    /// Creates (or replaces) the element of `kind` with `content`.
    fn mount(&mut self, kind: OverlayKind, content: OverlayContent, max_width: Option<f64>);

    /// Rendered size of a mounted element.
    fn measure(&self, kind: OverlayKind) -> Size;

    /// Moves a mounted element and makes it visible.
    fn move_to(&mut self, kind: OverlayKind, placement: Placement);

    /// Removes the element; a no-op if it is not mounted.
    fn remove(&mut self, kind: OverlayKind);

    fn is_mounted(&self, kind: OverlayKind) -> bool;

    /// Whether `point` (document coordinates) falls inside the element.
    fn contains(&self, kind: OverlayKind, point: Point) -> bool;
}

/// A mounted element on a [`HeadlessSurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessElement {
    pub content: OverlayContent,
    pub size: Size,
    pub max_width: Option<f64>,
    pub placement: Option<Placement>,
}

const CHAR_WIDTH: f64 = 8.0;
const LINE_HEIGHT: f64 = 20.0;
const TOOLTIP_PADDING: f64 = 16.0;

/// In-memory surface with estimated element sizes.
///
/// Tooltip size is estimated from the text length and its width cap; icon
/// and loading sizes are fixed. Any size can be pinned with
/// [`with_size`](HeadlessSurface::with_size).
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    viewport: Viewport,
    elements: HashMap<OverlayKind, HeadlessElement>,
    fixed_sizes: HashMap<OverlayKind, Size>,
}

impl HeadlessSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            elements: HashMap::new(),
            fixed_sizes: HashMap::new(),
        }
    }

    pub fn with_size(mut self, kind: OverlayKind, size: Size) -> Self {
        self.fixed_sizes.insert(kind, size);
        self
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn element(&self, kind: OverlayKind) -> Option<&HeadlessElement> {
        self.elements.get(&kind)
    }

    /// Number of mounted elements.
    pub fn mounted_count(&self) -> usize {
        self.elements.len()
    }

    fn estimate(&self, kind: OverlayKind, content: &OverlayContent, max_width: Option<f64>) -> Size {
        if let Some(size) = self.fixed_sizes.get(&kind) {
            return *size;
        }
        match kind {
            OverlayKind::Icon => Size::new(24.0, 24.0),
            OverlayKind::Loading => Size::new(48.0, 16.0),
            OverlayKind::Tooltip => {
                let chars = content.as_str().chars().count().max(1) as f64;
                let natural = chars * CHAR_WIDTH + TOOLTIP_PADDING;
                let width = max_width.map_or(natural, |cap| natural.min(cap));
                let per_line = ((width - TOOLTIP_PADDING) / CHAR_WIDTH).max(1.0);
                let lines = (chars / per_line).ceil();
                Size::new(width, lines * LINE_HEIGHT + TOOLTIP_PADDING)
            }
        }
    }
}

impl OverlaySurface for HeadlessSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn mount(&mut self, kind: OverlayKind, content: OverlayContent, max_width: Option<f64>) {
        let size = self.estimate(kind, &content, max_width);
        self.elements.insert(
            kind,
            HeadlessElement {
                content,
                size,
                max_width,
                placement: None,
            },
        );
    }

    fn measure(&self, kind: OverlayKind) -> Size {
        self.elements.get(&kind).map(|e| e.size).unwrap_or_default()
    }

    fn move_to(&mut self, kind: OverlayKind, placement: Placement) {
        if let Some(element) = self.elements.get_mut(&kind) {
            element.placement = Some(placement);
        }
    }

    fn remove(&mut self, kind: OverlayKind) {
        self.elements.remove(&kind);
    }

    fn is_mounted(&self, kind: OverlayKind) -> bool {
        self.elements.contains_key(&kind)
    }

    fn contains(&self, kind: OverlayKind, point: Point) -> bool {
        match self.elements.get(&kind) {
            Some(HeadlessElement {
                size,
                placement: Some(p),
                ..
            }) => {
                point.x >= p.left
                    && point.x <= p.left + size.width
                    && point.y >= p.top
                    && point.y <= p.top + size.height
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::positioner::Side;

    #[test]
    fn tooltip_estimate_respects_width_cap() {
        let mut surface = HeadlessSurface::new(Viewport::new(800.0, 600.0));
        surface.mount(OverlayKind::Tooltip, OverlayContent::text("x".repeat(100)), Some(200.0));
        let size = surface.measure(OverlayKind::Tooltip);
        assert_eq!(size.width, 200.0);
        assert!(size.height > LINE_HEIGHT);
    }

    #[test]
    fn contains_uses_placement() {
        let mut surface = HeadlessSurface::new(Viewport::new(800.0, 600.0));
        surface.mount(OverlayKind::Icon, OverlayContent::text(""), None);
        assert!(!surface.contains(OverlayKind::Icon, Point::new(5.0, 5.0)));
        surface.move_to(
            OverlayKind::Icon,
            Placement {
                left: 0.0,
                top: 0.0,
                side: Side::Below,
            },
        );
        assert!(surface.contains(OverlayKind::Icon, Point::new(5.0, 5.0)));
        assert!(!surface.contains(OverlayKind::Icon, Point::new(50.0, 5.0)));
    }
}
