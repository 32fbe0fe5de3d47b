//! Canvas geometry types.
//!
//! Coordinates are canvas-local layout units: `(0, 0)` is the top-left
//! corner, `(width, height)` the bottom-right.

use serde::{Deserialize, Serialize};

/// Smallest extent a committed layer may have along either axis.
pub const MIN_EXTENT: f64 = 1.0;

/// Top-left corner of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset this position by a delta.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Width and height of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Dimensions of the editing canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A canvas is usable when both dimensions are finite and positive.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Pixel dimensions for raster output (rounded, at least 1x1).
    pub fn pixel_dimensions(&self) -> (u32, u32) {
        let w = self.width.round().max(1.0) as u32;
        let h = self.height.round().max(1.0) as u32;
        (w, h)
    }
}

/// An axis-aligned rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub position: Position,
    pub size: Size,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            position: Position::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.position.x + self.size.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.position.y + self.size.height
    }

    /// Check if a point lies within this rectangle (edges inclusive).
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.position.x && px <= self.right() && py >= self.position.y && py <= self.bottom()
    }

    /// Check that this rectangle satisfies the committed-geometry invariants
    /// for the given canvas.
    pub fn is_within(&self, canvas: CanvasSize) -> bool {
        let eps = 1e-9;
        let finite = [
            self.position.x,
            self.position.y,
            self.size.width,
            self.size.height,
        ]
        .iter()
        .all(|v| v.is_finite());

        finite
            && self.position.x >= 0.0
            && self.position.y >= 0.0
            && self.size.width > 0.0
            && self.size.height > 0.0
            && self.right() <= canvas.width + eps
            && self.bottom() <= canvas.height + eps
    }

    /// Force this rectangle inside the canvas.
    ///
    /// Size is preserved where possible (shrunk only when larger than the
    /// canvas); the position is then clamped so the rectangle does not
    /// overflow the right or bottom edge. Non-finite inputs collapse to the
    /// minimum extent at the origin.
    pub fn fit_within(&self, canvas: CanvasSize) -> Rect {
        let width = fit_extent(self.size.width, canvas.width);
        let height = fit_extent(self.size.height, canvas.height);
        let x = clamp_range(self.position.x, 0.0, canvas.width - width);
        let y = clamp_range(self.position.y, 0.0, canvas.height - height);
        Rect::new(x, y, width, height)
    }
}

/// Clamp `value` into `[lo, hi]`, tolerating an inverted range (`hi < lo`
/// yields `lo`) and non-finite input (yields `lo`).
pub fn clamp_range(value: f64, lo: f64, hi: f64) -> f64 {
    if !value.is_finite() {
        return lo;
    }
    let hi = hi.max(lo);
    value.clamp(lo, hi)
}

fn fit_extent(extent: f64, available: f64) -> f64 {
    let min = MIN_EXTENT.min(available);
    clamp_range(extent, min, available)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_range_handles_inverted_bounds() {
        assert_eq!(clamp_range(5.0, 0.0, -10.0), 0.0);
        assert_eq!(clamp_range(f64::NAN, 0.0, 10.0), 0.0);
        assert_eq!(clamp_range(12.0, 0.0, 10.0), 10.0);
    }

    #[test]
    fn test_fit_within_pulls_overflowing_rect_back() {
        let canvas = CanvasSize::new(100.0, 100.0);
        let rect = Rect::new(80.0, 90.0, 50.0, 30.0).fit_within(canvas);
        assert_eq!(rect, Rect::new(50.0, 70.0, 50.0, 30.0));
        assert!(rect.is_within(canvas));
    }

    #[test]
    fn test_fit_within_shrinks_oversized_rect() {
        let canvas = CanvasSize::new(100.0, 60.0);
        let rect = Rect::new(-5.0, 10.0, 400.0, 20.0).fit_within(canvas);
        assert_eq!(rect.size.width, 100.0);
        assert_eq!(rect.position.x, 0.0);
        assert!(rect.is_within(canvas));
    }

    #[test]
    fn test_fit_within_repairs_non_finite_geometry() {
        let canvas = CanvasSize::new(100.0, 100.0);
        let rect = Rect::new(f64::NAN, 10.0, f64::INFINITY, 0.0).fit_within(canvas);
        assert!(rect.is_within(canvas));
        assert_eq!(rect.size.height, MIN_EXTENT);
    }

    #[test]
    fn test_pixel_dimensions_round() {
        assert_eq!(CanvasSize::new(359.6, 640.2).pixel_dimensions(), (360, 640));
        assert_eq!(CanvasSize::new(0.2, 0.2).pixel_dimensions(), (1, 1));
    }

    #[test]
    fn test_contains_is_edge_inclusive() {
        let rect = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(rect.contains(10.0, 30.0));
        assert!(!rect.contains(9.9, 15.0));
    }

    proptest::proptest! {
        #[test]
        fn prop_fit_within_is_within_and_stable(
            x in -5000.0f64..5000.0,
            y in -5000.0f64..5000.0,
            w in -100.0f64..5000.0,
            h in -100.0f64..5000.0,
            cw in 1.0f64..2000.0,
            ch in 1.0f64..2000.0,
        ) {
            let canvas = CanvasSize::new(cw, ch);
            let fitted = Rect::new(x, y, w, h).fit_within(canvas);
            proptest::prop_assert!(fitted.is_within(canvas));
            proptest::prop_assert_eq!(fitted.fit_within(canvas), fitted);
        }
    }
}
