//! Numeric building blocks: descriptive statistics and intervals.

pub mod interval;
pub mod statistics;

pub use interval::*;
pub use statistics::*;
