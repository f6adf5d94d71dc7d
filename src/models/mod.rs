//! Domain models for the timeline board.
//!
//! # Core Concepts
//!
//! - [`TimeLine`]: A positioned, ordered sequence of nodes. Every TimeLine on a
//!   board holds at least one node; emptying it removes the TimeLine.
//! - [`Node`]: One slot of a sequence, either a [`TimeItem`] (content) or a
//!   [`TimeBranch`] (a link to a whole child TimeLine).
//! - [`Connector`]: Geometry of the line drawn from a branch slot to its child.
//! - [`ColorTable`]: Named colors known to the project.
//!
//! Ownership only flows forward: a TimeLine owns its nodes, a branch owns its
//! link. The child-to-parent direction is a [`BranchRef`] id pair that is never
//! used to own anything.

mod branch;
mod color;
mod ids;
mod item;
mod timeline;

pub use branch::*;
pub use color::*;
pub use ids::*;
pub use item::*;
pub use timeline::*;
