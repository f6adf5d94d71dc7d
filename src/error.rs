//! Error types for board operations.
//!
//! A [`BoardError`] means a caller broke a contract of the document model:
//! an id that is not on the board, a node of the wrong kind, or an edit that
//! would break the tree shape. These are propagated, never swallowed; the
//! recoverable failure mode of the crate is
//! [`LoadError`](crate::persistence::LoadError) when opening a file.

use thiserror::Error;

use crate::geometry::Point;
use crate::models::{NodeId, TimeLineId};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BoardError {
    #[error("Time line not found: {0}")]
    UnknownTimeLine(TimeLineId),

    #[error("Node not found: {0}")]
    UnknownNode(NodeId),

    #[error("Node {0} is not a time item")]
    NotAnItem(NodeId),

    #[error("Node {0} is not a branch")]
    NotABranch(NodeId),

    #[error("Node id already in use: {0}")]
    DuplicateNode(NodeId),

    #[error("Linking {child} below {owner} would create a cycle")]
    WouldCreateCycle { owner: TimeLineId, child: TimeLineId },

    #[error("Not a hex color: {0}")]
    InvalidColor(String),

    #[error("Position {0} lies outside the board")]
    NegativePosition(Point),

    #[error("Board invariant violated: {0}")]
    Invariant(String),
}

pub type BoardResult<T> = Result<T, BoardError>;
