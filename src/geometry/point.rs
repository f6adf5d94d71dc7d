use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// An immutable 2-D coordinate or offset on the board canvas.
///
/// Every operation returns a new value. Equality is exact; there is no
/// tolerance, so grid-snapped positions compare reliably.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs())
    }

    /// Translate by separate axis offsets.
    pub fn moved(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn with_x(self, x: f64) -> Self {
        Self::new(x, self.y)
    }

    pub fn with_y(self, y: f64) -> Self {
        Self::new(self.x, y)
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Both coordinates are `>= 0`.
    pub fn is_non_negative(self) -> bool {
        self.x >= 0.0 && self.y >= 0.0
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
