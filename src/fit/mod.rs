//! Fitting seam.
//!
//! This crate does not ship an optimizer. It prepares [`FitInputs`] from a
//! dataset and defines the [`Solver`] trait any least-squares backend plugs
//! into.

pub mod inputs;

pub use inputs::*;
