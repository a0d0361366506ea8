//! Floating element placement relative to a text selection.
//!
//! The icon, the loading indicator and the result tooltip are all positioned
//! with the functions in this module. They are pure: the caller measures the
//! element and reads the viewport, then applies the returned coordinates.

use crate::geometry::{Rect, Size, Viewport};
use serde::Serialize;

/// Gap between the selection and the floating element.
pub const DEFAULT_PADDING: f64 = 10.0;

/// Narrowest width a result tooltip may be constrained to.
pub const MIN_TOOLTIP_WIDTH: f64 = 200.0;

/// Which side of the selection the element ended up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Below,
    Above,
    /// Only produced by [`place_icon`].
    Right,
}

impl Side {
    /// Class toggled on the tooltip to orient its arrow.
    ///
    /// Below renders an arrow pointing up at the selection, Above one
    /// pointing down.
    pub fn arrow_class(self) -> Option<&'static str> {
        match self {
            Side::Below => Some("tooltip-below-selection"),
            Side::Above => Some("tooltip-above-selection"),
            Side::Right => None,
        }
    }
}

/// Document-relative coordinates for a floating element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub left: f64,
    pub top: f64,
    pub side: Side,
}

/// Computes the position of a tooltip or loading indicator.
///
/// The element is centered horizontally on the selection and clamped to the
/// visible area. Vertically it goes below the selection when it fits, above
/// when that fits instead, and otherwise below but pulled up so that it stays
/// on screen. Elements larger than the viewport are pinned to its top-left.
///
/// # Arguments
/// * `anchor` - Selection bounding box in viewport coordinates
/// * `element` - Measured size of the floating element
/// * `viewport` - Visible area and scroll offset
/// * `padding` - Gap between selection and element
pub fn place(anchor: &Rect, element: Size, viewport: &Viewport, padding: f64) -> Placement {
    let left = clamp_horizontal(
        anchor.center_x() - element.width / 2.0 + viewport.scroll_x,
        element.width,
        viewport,
    );

    let below = anchor.bottom + padding + viewport.scroll_y;
    let above = anchor.top - element.height - padding + viewport.scroll_y;

    let (top, side) = if below + element.height <= viewport.max_y() {
        (below, Side::Below)
    } else if above >= viewport.scroll_y {
        (above, Side::Above)
    } else {
        // Neither side has room: keep it below but never past the bottom
        // edge, and never above the top edge.
        let pulled_up = below.min(viewport.max_y() - element.height);
        (pulled_up.max(viewport.scroll_y), Side::Below)
    };

    Placement {
        left: snap(left, viewport.scroll_x),
        top: snap(top, viewport.scroll_y),
        side,
    }
}

/// Computes the position of the translate icon.
///
/// Candidates are tried in viewport space: centered below the selection,
/// to its right and vertically centered, then centered above. The first one
/// fully inside the viewport wins. Otherwise the icon is right-aligned with
/// the selection, just below it, and clamped to every viewport edge.
pub fn place_icon(anchor: &Rect, element: Size, viewport: &Viewport, padding: f64) -> Placement {
    let fits = |left: f64, top: f64| {
        left >= 0.0
            && top >= 0.0
            && left + element.width <= viewport.width
            && top + element.height <= viewport.height
    };

    let centered_left = anchor.center_x() - element.width / 2.0;
    let candidates = [
        (centered_left, anchor.bottom + padding, Side::Below),
        (
            anchor.right + padding,
            anchor.center_y() - element.height / 2.0,
            Side::Right,
        ),
        (centered_left, anchor.top - element.height - padding, Side::Above),
    ];

    for (left, top, side) in candidates {
        if fits(left, top) {
            return Placement {
                left: snap(left + viewport.scroll_x, viewport.scroll_x),
                top: snap(top + viewport.scroll_y, viewport.scroll_y),
                side,
            };
        }
    }

    let left = clamp_horizontal(
        anchor.right - element.width + viewport.scroll_x,
        element.width,
        viewport,
    );
    let top = (anchor.bottom + padding + viewport.scroll_y)
        .min(viewport.max_y() - element.height)
        .max(viewport.scroll_y);

    Placement {
        left: snap(left, viewport.scroll_x),
        top: snap(top, viewport.scroll_y),
        side: Side::Below,
    }
}

/// Maximum tooltip width for a selection: never narrower than
/// [`MIN_TOOLTIP_WIDTH`], otherwise as wide as the selection.
pub fn tooltip_max_width(anchor: &Rect) -> f64 {
    anchor.width.max(MIN_TOOLTIP_WIDTH)
}

/// Rounds down to a whole pixel without crossing the visible edge at
/// `origin`, which may itself be fractional.
fn snap(value: f64, origin: f64) -> f64 {
    value.floor().max(origin.ceil())
}

fn clamp_horizontal(left: f64, width: f64, viewport: &Viewport) -> f64 {
    if left < viewport.scroll_x {
        viewport.scroll_x
    } else if left + width > viewport.max_x() {
        (viewport.max_x() - width).max(viewport.scroll_x)
    } else {
        left
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(1000.0, 800.0)
    }

    #[test]
    fn centers_below_when_room() {
        let anchor = Rect::from_xywh(400.0, 100.0, 200.0, 20.0);
        let p = place(&anchor, Size::new(100.0, 50.0), &viewport(), DEFAULT_PADDING);
        assert_eq!(p, Placement { left: 450.0, top: 130.0, side: Side::Below });
    }

    #[test]
    fn flips_above_near_bottom() {
        let anchor = Rect::from_xywh(400.0, 740.0, 200.0, 20.0);
        let p = place(&anchor, Size::new(100.0, 50.0), &viewport(), DEFAULT_PADDING);
        assert_eq!(p.side, Side::Above);
        assert_eq!(p.top, 680.0);
    }

    #[test]
    fn clamps_to_left_edge() {
        let anchor = Rect::from_xywh(0.0, 100.0, 20.0, 20.0);
        let p = place(&anchor, Size::new(300.0, 50.0), &viewport(), DEFAULT_PADDING);
        assert_eq!(p.left, 0.0);
    }

    #[test]
    fn clamps_to_right_edge_with_scroll() {
        let anchor = Rect::from_xywh(980.0, 100.0, 20.0, 20.0);
        let vp = viewport().scrolled(50.0, 300.0);
        let p = place(&anchor, Size::new(300.0, 50.0), &vp, DEFAULT_PADDING);
        assert_eq!(p.left, 750.0);
        assert_eq!(p.top, 430.0);
    }

    #[test]
    fn oversized_element_pinned_to_scroll_origin() {
        let anchor = Rect::from_xywh(300.0, 300.0, 50.0, 20.0);
        let vp = viewport().scrolled(10.0, 20.0);
        let p = place(&anchor, Size::new(1200.0, 900.0), &vp, DEFAULT_PADDING);
        assert_eq!(p.left, 10.0);
        assert_eq!(p.top, 20.0);
        assert_eq!(p.side, Side::Below);
    }

    #[test]
    fn tall_element_without_room_stays_on_screen() {
        let anchor = Rect::from_xywh(300.0, 350.0, 50.0, 20.0);
        let p = place(&anchor, Size::new(100.0, 500.0), &viewport(), DEFAULT_PADDING);
        assert_eq!(p.side, Side::Below);
        assert_eq!(p.top, 300.0);
    }

    #[test]
    fn coordinates_are_floored() {
        let anchor = Rect::from_xywh(100.5, 100.7, 33.3, 10.1);
        let p = place(&anchor, Size::new(41.0, 17.0), &viewport(), DEFAULT_PADDING);
        assert_eq!(p.left, p.left.floor());
        assert_eq!(p.top, p.top.floor());
    }

    #[test]
    fn fractional_scroll_never_snaps_above_visible_area() {
        let anchor = Rect::from_xywh(300.0, 350.0, 50.0, 20.0);
        let vp = viewport().scrolled(0.5, 0.5);
        let p = place(&anchor, Size::new(100.0, 900.0), &vp, DEFAULT_PADDING);
        assert_eq!(p.top, 1.0);
        assert!(p.top >= vp.scroll_y);

        let p = place(&Rect::from_xywh(0.0, 100.0, 20.0, 20.0), Size::new(300.0, 50.0), &vp, DEFAULT_PADDING);
        assert_eq!(p.left, 1.0);
    }

    #[test]
    fn icon_prefers_below_then_right() {
        let anchor = Rect::from_xywh(100.0, 100.0, 80.0, 20.0);
        let icon = Size::new(24.0, 24.0);
        assert_eq!(place_icon(&anchor, icon, &viewport(), DEFAULT_PADDING).side, Side::Below);

        let low = Rect::from_xywh(100.0, 770.0, 80.0, 20.0);
        let p = place_icon(&low, icon, &viewport(), DEFAULT_PADDING);
        assert_eq!(p.side, Side::Right);
        assert_eq!(p.left, 190.0);
    }

    #[test]
    fn icon_falls_back_above_when_right_blocked() {
        let anchor = Rect::from_xywh(900.0, 770.0, 95.0, 20.0);
        let p = place_icon(&anchor, Size::new(24.0, 24.0), &viewport(), DEFAULT_PADDING);
        assert_eq!(p.side, Side::Above);
    }

    #[test]
    fn tooltip_width_has_floor() {
        assert_eq!(tooltip_max_width(&Rect::from_xywh(0.0, 0.0, 50.0, 10.0)), 200.0);
        assert_eq!(tooltip_max_width(&Rect::from_xywh(0.0, 0.0, 450.0, 10.0)), 450.0);
    }

    #[test]
    fn arrow_class_follows_side() {
        assert_eq!(Side::Below.arrow_class(), Some("tooltip-below-selection"));
        assert_eq!(Side::Above.arrow_class(), Some("tooltip-above-selection"));
    }
}
