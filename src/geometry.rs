// ============================================================================
// Canvas-space geometry: pointer translation and rectangle normalisation
// ============================================================================

/// Integer pixel coordinate on the canvas (1:1 with the persisted surface).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Pixel-centre coordinates as floats, for the rasterizer.
    pub fn to_f32(self) -> (f32, f32) {
        (self.x as f32, self.y as f32)
    }
}

/// A rectangle as produced by a drag: origin plus a signed extent.
/// `width` / `height` are negative when the drag went left / up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZRect {
    pub pos: Position,
    pub width: i32,
    pub height: i32,
}

/// Sign-normalised edges of a [`ZRect`]; always `left <= right`, `top <= bottom`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl ZRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            pos: Position::new(x, y),
            width,
            height,
        }
    }

    /// The rectangle spanned between a drag's start and end points.
    pub fn from_corners(start: Position, end: Position) -> Self {
        Self {
            pos: start,
            width: end.x - start.x,
            height: end.y - start.y,
        }
    }

    /// Rebuild a rectangle with non-negative extent from normalised edges.
    pub fn from_bounds(b: BoundingBox) -> Self {
        Self::new(b.left, b.top, b.right - b.left, b.bottom - b.top)
    }

    pub fn normalize(&self) -> BoundingBox {
        let (left, right) = if self.width < 0 {
            (self.pos.x + self.width, self.pos.x)
        } else {
            (self.pos.x, self.pos.x + self.width)
        };
        let (top, bottom) = if self.height < 0 {
            (self.pos.y + self.height, self.pos.y)
        } else {
            (self.pos.y, self.pos.y + self.height)
        };
        BoundingBox {
            left,
            right,
            top,
            bottom,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl BoundingBox {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Inclusive hit test, used by the cursor tool to decide drag vs. new marquee.
    pub fn contains(&self, p: Position) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }
}

/// Translate a pointer's client coordinates into canvas pixels.
///
/// `origin` is the on-screen position of the canvas' top-left corner. The
/// offset is scaled by `100 / zoom_percent` and rounded to the nearest pixel;
/// a zoom of 100 leaves the offset unscaled.
pub fn to_canvas_position(origin: (f32, f32), client_x: f32, client_y: f32, zoom_percent: f32) -> Position {
    let scale = if zoom_percent > 0.0 && zoom_percent.is_finite() {
        100.0 / zoom_percent
    } else {
        1.0
    };
    let x = (client_x - origin.0) * scale;
    let y = (client_y - origin.1) * scale;
    Position::new(x.round() as i32, y.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_keeps_positive_extent() {
        let b = ZRect::new(5, 7, 10, 20).normalize();
        assert_eq!(
            b,
            BoundingBox {
                left: 5,
                right: 15,
                top: 7,
                bottom: 27
            }
        );
    }

    #[test]
    fn normalize_swaps_negative_extent() {
        let b = ZRect::new(15, 27, -10, -20).normalize();
        assert_eq!(b.left, 5);
        assert_eq!(b.right, 15);
        assert_eq!(b.top, 7);
        assert_eq!(b.bottom, 27);
    }

    #[test]
    fn normalize_spans_same_extent_for_every_drag_direction() {
        let start = Position::new(40, 40);
        for (dx, dy) in [(12, 9), (-12, 9), (12, -9), (-12, -9), (0, 5), (-3, 0)] {
            let end = start.offset(dx, dy);
            let b = ZRect::from_corners(start, end).normalize();
            assert!(b.left <= b.right && b.top <= b.bottom);
            assert_eq!(b.width(), dx.abs());
            assert_eq!(b.height(), dy.abs());
            assert_eq!(b.left, start.x.min(end.x));
            assert_eq!(b.bottom, start.y.max(end.y));
        }
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = ZRect::new(30, 10, -8, 4).normalize();
        let twice = ZRect::from_bounds(once).normalize();
        assert_eq!(once, twice);
    }

    #[test]
    fn contains_is_inclusive() {
        let b = ZRect::new(50, 50, 50, 50).normalize();
        assert!(b.contains(Position::new(50, 50)));
        assert!(b.contains(Position::new(100, 100)));
        assert!(!b.contains(Position::new(101, 75)));
        assert!(!b.contains(Position::new(75, 49)));
    }

    #[test]
    fn zoom_100_only_removes_origin() {
        let p = to_canvas_position((20.0, 30.0), 57.0, 41.0, 100.0);
        assert_eq!(p, Position::new(37, 11));
    }

    #[test]
    fn zoom_200_halves_client_deltas() {
        let a = to_canvas_position((0.0, 0.0), 100.0, 100.0, 200.0);
        let b = to_canvas_position((0.0, 0.0), 110.0, 100.0, 200.0);
        assert_eq!(b.x - a.x, 5);
        assert_eq!(a, Position::new(50, 50));
    }

    #[test]
    fn fractional_offsets_round_to_nearest() {
        let p = to_canvas_position((0.5, 0.0), 10.0, 10.4, 100.0);
        assert_eq!(p, Position::new(10, 10));
        let q = to_canvas_position((0.0, 0.0), 7.0, 7.0, 50.0);
        assert_eq!(q, Position::new(14, 14));
    }

    #[test]
    fn invalid_zoom_falls_back_to_identity() {
        let p = to_canvas_position((0.0, 0.0), 12.0, 8.0, 0.0);
        assert_eq!(p, Position::new(12, 8));
    }
}
