//! Plain geometry types shared by the selection tracker, positioner and
//! overlay controller.
//!
//! Rectangles are expressed in viewport coordinates (what a range's bounding
//! box reports); placements produced by the positioner are in document
//! coordinates (viewport plus scroll offset).

use serde::{Deserialize, Serialize};

/// A bounding box in viewport coordinates.
///
/// Carries both the `x/y/width/height` and the `top/right/bottom/left`
/// forms so it can travel through the messaging bridge unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Rect {
    /// Builds a rectangle from its origin and size.
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            top: y,
            right: x + width,
            bottom: y + height,
            left: x,
        }
    }

    /// Horizontal center of the rectangle.
    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    /// Vertical center of the rectangle.
    pub fn center_y(&self) -> f64 {
        self.top + self.height / 2.0
    }

    /// A collapsed or whitespace-only selection reports a zero-sized box.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }
}

/// Measured size of an overlay element.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A point in document coordinates (e.g. a click).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Visible window dimensions and current scroll offset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    pub fn scrolled(mut self, scroll_x: f64, scroll_y: f64) -> Self {
        self.scroll_x = scroll_x;
        self.scroll_y = scroll_y;
        self
    }

    /// Right edge of the visible area in document coordinates.
    pub fn max_x(&self) -> f64 {
        self.scroll_x + self.width
    }

    /// Bottom edge of the visible area in document coordinates.
    pub fn max_y(&self) -> f64 {
        self.scroll_y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_xywh_fills_edges() {
        let r = Rect::from_xywh(10.0, 20.0, 100.0, 16.0);
        assert_eq!(r.right, 110.0);
        assert_eq!(r.bottom, 36.0);
        assert_eq!(r.center_x(), 60.0);
    }

    #[test]
    fn zero_sized_rect_is_empty() {
        assert!(Rect::from_xywh(5.0, 5.0, 0.0, 0.0).is_empty());
        assert!(!Rect::from_xywh(5.0, 5.0, 0.0, 12.0).is_empty());
    }

    #[test]
    fn rect_deserializes_from_dom_rect_shape() {
        let json = r#"{"x":1,"y":2,"width":3,"height":4,"top":2,"right":4,"bottom":6,"left":1}"#;
        let r: Rect = serde_json::from_str(json).unwrap();
        assert_eq!(r, Rect::from_xywh(1.0, 2.0, 3.0, 4.0));
    }
}
