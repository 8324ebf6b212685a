//! `fitdata` library crate.
//!
//! Tabular measurement data prepared for curve fitting, and the parametric
//! functions fitted to it. The binary (`fitdata`) is a thin wrapper around
//! this library so that:
//!
//! - core logic is testable without spawning processes
//! - a solver backend can depend on the library alone

pub mod app;
pub mod cli;
pub mod data;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod report;
