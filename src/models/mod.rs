//! Parametric model functions.
//!
//! - `function`: the [`ParametricFunction`] wrapper with parameter fixing
//! - `library`: builtin functions with analytic derivatives
//! - `registry`: an explicit name → function table

pub mod function;
pub mod library;
pub mod registry;

pub use function::*;
pub use registry::*;
