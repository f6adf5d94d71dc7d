use crate::geometry::Point;

use super::{NodeId, TimeLineId};

/// Stroke width of a connector line.
pub const CONNECTOR_LINE_WIDTH: f64 = 4.0;
pub const MIN_SPLIT_RATIO: f64 = 0.1;
pub const MAX_SPLIT_RATIO: f64 = 0.9;
pub const DEFAULT_SPLIT_RATIO: f64 = 0.5;

/// Geometry of the stepped line drawn from a branch slot to its child
/// TimeLine.
///
/// The line runs horizontally from the branch, steps vertically at
/// `split_ratio` of its width and continues to the child's attachment point.
/// Only the split ratio is persisted; everything else is recomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    anchor: Point,
    size: Point,
    up: bool,
    split_ratio: f64,
}

impl Default for Connector {
    fn default() -> Self {
        Self::with_split_ratio(DEFAULT_SPLIT_RATIO)
    }
}

impl Connector {
    pub fn with_split_ratio(ratio: f64) -> Self {
        let mut connector = Self {
            anchor: Point::ZERO,
            size: Point::ZERO,
            up: false,
            split_ratio: DEFAULT_SPLIT_RATIO,
        };
        connector.set_split_ratio(ratio);
        connector
    }

    /// Recompute the bounding box from the branch end `start` to the child
    /// end `end`.
    pub fn set_path(&mut self, start: Point, end: Point) {
        let half = CONNECTOR_LINE_WIDTH / 2.0;
        let (start, end) = if start.y > end.y {
            let start = start.moved(0.0, half);
            let end = end.moved(0.0, -half);
            self.up = true;
            self.anchor = Point::new(start.x, end.y);
            (start, end)
        } else {
            let start = start.moved(0.0, -half);
            let end = end.moved(0.0, half);
            self.up = false;
            self.anchor = start;
            (start, end)
        };

        self.size = (end - start).abs();
    }

    /// Shift the whole line, used when both ends move by the same vector.
    pub fn translate(&mut self, vector: Point) {
        self.anchor = self.anchor + vector;
    }

    /// Clamped to `[0.1, 0.9]`.
    pub fn set_split_ratio(&mut self, ratio: f64) {
        self.split_ratio = if ratio.is_nan() {
            DEFAULT_SPLIT_RATIO
        } else {
            ratio.clamp(MIN_SPLIT_RATIO, MAX_SPLIT_RATIO)
        };
    }

    pub fn split_ratio(&self) -> f64 {
        self.split_ratio
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    pub fn size(&self) -> Point {
        self.size
    }

    /// The child end lies above the branch end.
    pub fn is_up(&self) -> bool {
        self.up
    }

    /// Width of the horizontal segment before the vertical step.
    pub fn split_offset(&self) -> f64 {
        self.size.x * self.split_ratio
    }
}

/// A structural node linking a sequence slot to an entire child TimeLine.
///
/// The link is always present: a branch without a child cannot be expressed.
/// Severing a link goes through removing the branch from its TimeLine.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeBranch {
    pub id: NodeId,
    child: TimeLineId,
    connector: Connector,
}

impl TimeBranch {
    pub(crate) fn new(id: NodeId, child: TimeLineId, connector: Connector) -> Self {
        Self {
            id,
            child,
            connector,
        }
    }

    pub fn child(&self) -> &TimeLineId {
        &self.child
    }

    pub fn connector(&self) -> &Connector {
        &self.connector
    }

    pub(crate) fn connector_mut(&mut self) -> &mut Connector {
        &mut self.connector
    }

    pub(crate) fn set_child(&mut self, child: TimeLineId) {
        self.child = child;
    }

    /// Move link and connector to a freshly minted branch. The caller must
    /// repoint the child's back-reference at the new id.
    pub(crate) fn extract_as_clone(&self) -> Self {
        Self {
            id: NodeId::generate(),
            child: self.child.clone(),
            connector: self.connector.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_ratio_is_clamped() {
        let mut c = Connector::with_split_ratio(1.5);
        assert_eq!(c.split_ratio(), MAX_SPLIT_RATIO);
        c.set_split_ratio(-3.0);
        assert_eq!(c.split_ratio(), MIN_SPLIT_RATIO);
        c.set_split_ratio(f64::NAN);
        assert_eq!(c.split_ratio(), DEFAULT_SPLIT_RATIO);
    }

    #[test]
    fn test_downward_path_anchors_at_start() {
        let mut c = Connector::default();
        c.set_path(Point::new(400.0, 150.0), Point::new(500.0, 250.0));
        assert!(!c.is_up());
        assert_eq!(c.anchor(), Point::new(400.0, 148.0));
        assert_eq!(c.size(), Point::new(100.0, 104.0));
        assert_eq!(c.split_offset(), 50.0);
    }

    #[test]
    fn test_upward_path_anchors_at_end_height() {
        let mut c = Connector::default();
        c.set_path(Point::new(400.0, 350.0), Point::new(500.0, 150.0));
        assert!(c.is_up());
        assert_eq!(c.anchor(), Point::new(400.0, 148.0));
        assert_eq!(c.size(), Point::new(100.0, 204.0));
    }

    #[test]
    fn test_translate_moves_anchor_only() {
        let mut c = Connector::default();
        c.set_path(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        let size = c.size();
        c.translate(Point::new(50.0, 50.0));
        assert_eq!(c.anchor(), Point::new(50.0, 48.0));
        assert_eq!(c.size(), size);
    }
}
