//! Canvas geometry: immutable points and grid quantization.

mod grid;
mod point;

pub use grid::*;
pub use point::*;
