use super::Point;

/// Default cell size of the board grid.
pub const DEFAULT_GRID_SIZE: f64 = 50.0;

/// Stateless quantizer mapping canvas coordinates onto a square grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub size: f64,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE)
    }
}

impl Grid {
    pub fn new(size: f64) -> Self {
        Self { size }
    }

    /// Round each axis to the nearest grid line. Ties round down, anything
    /// past half a cell rounds up.
    pub fn snap(&self, p: Point) -> Point {
        self.snap_with_threshold(p, self.size / 2.0)
    }

    /// Round each axis up to the next grid line unless it already lies on one.
    /// The result is never smaller than the input on either axis.
    pub fn snap_forward(&self, p: Point) -> Point {
        self.snap_with_threshold(p, 0.0)
    }

    fn snap_with_threshold(&self, p: Point, threshold: f64) -> Point {
        if self.size <= 0.0 {
            return p;
        }

        Point::new(
            self.snap_axis(p.x, threshold),
            self.snap_axis(p.y, threshold),
        )
    }

    fn snap_axis(&self, v: f64, threshold: f64) -> f64 {
        let steps = (v / self.size).floor();
        let rest = (v - steps * self.size).abs();
        let jump = if rest > threshold { 1.0 } else { 0.0 };
        (steps + jump) * self.size
    }
}
