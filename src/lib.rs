//! Editor core for branching timelines laid out on a 2-D canvas.
//!
//! A [`TimeBoard`](board::TimeBoard) holds TimeLines: positioned sequences of
//! items that can branch into child TimeLines, forming a forest. The board
//! keeps that forest consistent through every edit, moves groups of
//! TimeLines atomically and snaps them to a grid. [`persistence`] turns a
//! board into a versioned project file and back.

pub mod board;
pub mod config;
pub mod drag;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod models;
pub mod persistence;
pub mod prompt;
pub mod tree_render;
