//! Pointer-drag sampling.
//!
//! Pointer moves arrive far more often than the board needs to react to
//! them. [`DragAction`] keeps at most one unprocessed sample: while one is
//! pending, further samples are dropped. The host takes the pending sample
//! once per frame with [`DragAction::take_frame`].

use crate::geometry::Point;

/// One processed drag step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSample {
    /// Pointer position at mouse down.
    pub initial: Point,
    /// Pointer travel since mouse down.
    pub offset: Point,
    /// Pointer travel since the previous frame.
    pub delta: Point,
    /// Drag origin moved by `offset`.
    pub location: Point,
}

#[derive(Debug, Clone, Default)]
pub struct DragAction {
    initial: Option<Point>,
    last: Point,
    origin: Point,
    pending: Option<Point>,
}

impl DragAction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.initial.is_some()
    }

    /// Start a drag at `pointer`. `origin` is the dragged object's position
    /// (zero when not given); sample locations are relative to it.
    pub fn mouse_down(&mut self, pointer: Point, origin: Option<Point>) {
        self.initial = Some(pointer);
        self.last = pointer;
        self.origin = origin.unwrap_or(Point::ZERO);
        self.pending = None;
    }

    pub fn mouse_up(&mut self) {
        self.initial = None;
        self.origin = Point::ZERO;
    }

    /// Record a pointer move. Returns `false` if it was dropped because the
    /// drag is inactive or a sample is still pending.
    pub fn sample(&mut self, pointer: Point) -> bool {
        if !self.is_active() || self.pending.is_some() {
            return false;
        }
        self.pending = Some(pointer);
        true
    }

    /// Process the pending sample, if any. A sample left over from a drag
    /// that already ended is discarded.
    pub fn take_frame(&mut self) -> Option<DragSample> {
        let current = self.pending.take()?;
        let initial = self.initial?;

        let offset = current - initial;
        let delta = current - self.last;
        self.last = current;

        Some(DragSample {
            initial,
            offset,
            delta,
            location: self.origin + offset,
        })
    }
}
