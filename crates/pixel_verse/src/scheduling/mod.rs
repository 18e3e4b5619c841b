//! Parallel chunk scheduling.
//!
//! - [`canvas`] - cross-chunk atom access shared by the tasks of one batch
//! - [`checkerboard`] - the four-batch parallel sweep

pub mod canvas;
pub mod checkerboard;

pub use canvas::{Canvas, Cell};
pub use checkerboard::{DirtyMarks, run_batches};
