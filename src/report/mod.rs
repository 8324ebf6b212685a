//! Terminal reports.
//!
//! Formatting lives here so the data and model code never prints.

pub mod format;

pub use format::*;
