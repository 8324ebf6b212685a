//! Parametric model functions with partial parameter fixing.
//!
//! A [`ParametricFunction`] wraps `f(a, x)` where `a` has `n` parameters, plus
//! optional analytic derivatives with respect to `x` and to `a`.
//!
//! Any parameter slot can be pinned to a value with [`ParametricFunction::fix`].
//! Pinned slots disappear from the function's visible arity: curried calls
//! ([`Arguments::Active`]) take only the unpinned values, and the parameter
//! Jacobian drops the rows of pinned slots. Explicit calls
//! ([`Arguments::Full`]) always take all `n` values.
//!
//! The pins live inside the instance. Every `Arc` handle to the same function
//! sees the same pins, so fixing a parameter through one handle changes how
//! curried calls behave through all of them. Use
//! [`ParametricFunction::detached`] to get an instance with its own pins.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use nalgebra::DMatrix;
use tracing::debug;

use crate::error::{Error, Result};

/// `f(a, x)` or `∂f/∂x (a, x)`.
pub type ValueFn = dyn Fn(&[f64], f64) -> f64 + Send + Sync;

/// `∂f/∂a (a, x)`: one entry per parameter.
pub type GradientFn = dyn Fn(&[f64], f64) -> Vec<f64> + Send + Sync;

/// How a parameter vector should be read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arguments<'a> {
    /// All `n` parameters; pinned values are ignored.
    Full(&'a [f64]),
    /// Only the unpinned parameters, in ascending slot order.
    Active(&'a [f64]),
}

pub struct ParametricFunction {
    name: Option<String>,
    n: usize,
    syntax: Option<String>,
    value: Arc<ValueFn>,
    x_derivative: Option<Arc<ValueFn>>,
    a_derivative: Option<Arc<GradientFn>>,
    fixed: Mutex<BTreeMap<usize, f64>>,
}

impl ParametricFunction {
    /// Anonymous function of `n` parameters.
    pub fn new<F>(n: usize, value: F) -> Self
    where
        F: Fn(&[f64], f64) -> f64 + Send + Sync + 'static,
    {
        Self {
            name: None,
            n,
            syntax: None,
            value: Arc::new(value),
            x_derivative: None,
            a_derivative: None,
            fixed: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Human-readable formula, e.g. `a[0] + a[1] * x`.
    pub fn with_syntax(mut self, syntax: impl Into<String>) -> Self {
        self.syntax = Some(syntax.into());
        self
    }

    pub fn with_x_derivative<F>(mut self, derivative: F) -> Self
    where
        F: Fn(&[f64], f64) -> f64 + Send + Sync + 'static,
    {
        self.x_derivative = Some(Arc::new(derivative));
        self
    }

    pub fn with_a_derivative<F>(mut self, derivative: F) -> Self
    where
        F: Fn(&[f64], f64) -> Vec<f64> + Send + Sync + 'static,
    {
        self.a_derivative = Some(Arc::new(derivative));
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn syntax(&self) -> Option<&str> {
        self.syntax.as_deref()
    }

    /// Total number of parameters, pinned or not.
    pub fn number_of_parameters(&self) -> usize {
        self.n
    }

    pub fn has_x_derivative(&self) -> bool {
        self.x_derivative.is_some()
    }

    pub fn has_a_derivative(&self) -> bool {
        self.a_derivative.is_some()
    }

    // ------------------------------------------------------------------
    // Fixing
    // ------------------------------------------------------------------

    /// Snapshot of the pinned slots.
    pub fn fixed(&self) -> BTreeMap<usize, f64> {
        self.pins().clone()
    }

    /// Number of parameters not pinned.
    pub fn active_parameters(&self) -> usize {
        self.n - self.pins().len()
    }

    /// Pin slot `index` (0-based) to `value`, replacing any previous pin.
    ///
    /// The pin is visible to every holder of this instance.
    pub fn fix(&self, index: usize, value: f64) -> Result<()> {
        if index >= self.n {
            return Err(Error::Function(format!(
                "cannot fix index {index} of {}: index should be between 0 and {}",
                self.label(),
                self.n.saturating_sub(1)
            )));
        }
        self.pins().insert(index, value);
        debug!(function = %self.label(), index, value, "fixed parameter");
        Ok(())
    }

    /// Remove the pin on slot `index`. Visible to every holder.
    pub fn unfix(&self, index: usize) -> Result<()> {
        if self.pins().remove(&index).is_none() {
            return Err(Error::Function(format!(
                "cannot unfix index {index} of {}: parameter is not fixed",
                self.label()
            )));
        }
        debug!(function = %self.label(), index, "unfixed parameter");
        Ok(())
    }

    /// Remove every pin. Visible to every holder.
    pub fn clear_fixed(&self) {
        self.pins().clear();
    }

    /// Pin every slot: the unpinned ones take `a` (ascending slot order), the
    /// pinned ones keep their values. Visible to every holder.
    pub fn assign(&self, a: &[f64]) -> Result<()> {
        let mut pins = self.pins();
        let full = splice(self.n, &pins, a).map_err(|actual| self.length_error(self.n - pins.len(), actual))?;
        *pins = full.into_iter().enumerate().collect();
        Ok(())
    }

    /// Independent copy carrying the current pins.
    pub fn detached(&self) -> ParametricFunction {
        ParametricFunction {
            name: self.name.clone(),
            n: self.n,
            syntax: self.syntax.clone(),
            value: Arc::clone(&self.value),
            x_derivative: self.x_derivative.clone(),
            a_derivative: self.a_derivative.clone(),
            fixed: Mutex::new(self.fixed()),
        }
    }

    // ------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------

    /// `f(a, x)` with all `n` parameters given explicitly.
    pub fn evaluate(&self, a: &[f64], x: f64) -> Result<f64> {
        let a = self.full_parameters(Arguments::Full(a))?;
        Ok((self.value)(&a, x))
    }

    /// `f(a, x)` with only the unpinned parameters given.
    pub fn evaluate_active(&self, a: &[f64], x: f64) -> Result<f64> {
        let a = self.full_parameters(Arguments::Active(a))?;
        Ok((self.value)(&a, x))
    }

    /// `f(a, x)` using only pinned values; every slot must be pinned.
    pub fn evaluate_fixed(&self, x: f64) -> Result<f64> {
        let active = self.active_parameters();
        if active != 0 {
            return Err(Error::Function(format!(
                "{} has {active} unfixed parameters; fix or assign them before evaluating",
                self.label()
            )));
        }
        self.evaluate_active(&[], x)
    }

    pub fn evaluate_many(&self, args: Arguments<'_>, xs: &[f64]) -> Result<Vec<f64>> {
        let a = self.full_parameters(args)?;
        Ok(xs.iter().map(|x| (self.value)(&a, *x)).collect())
    }

    /// `∂f/∂x` at every `x`.
    pub fn x_derivative(&self, args: Arguments<'_>, xs: &[f64]) -> Result<Vec<f64>> {
        let derivative = self.x_derivative.as_ref().ok_or_else(|| Error::MissingDerivative {
            function: self.label(),
            derivative: "x",
        })?;
        let a = self.full_parameters(args)?;
        Ok(xs.iter().map(|x| derivative(&a, *x)).collect())
    }

    /// Parameter Jacobian: one row per parameter, one column per `x`.
    ///
    /// Rows of pinned slots are removed, so the result has
    /// `active_parameters()` rows whenever anything is pinned.
    pub fn a_derivative(&self, args: Arguments<'_>, xs: &[f64]) -> Result<DMatrix<f64>> {
        let derivative = self.a_derivative.as_ref().ok_or_else(|| Error::MissingDerivative {
            function: self.label(),
            derivative: "a",
        })?;
        let a = self.full_parameters(args)?;

        let mut jacobian = DMatrix::zeros(self.n, xs.len());
        for (col, x) in xs.iter().enumerate() {
            let gradient = derivative(&a, *x);
            if gradient.len() != self.n {
                return Err(Error::Function(format!(
                    "a-derivative of {} returned {} values, expected {}",
                    self.label(),
                    gradient.len(),
                    self.n
                )));
            }
            jacobian.column_mut(col).copy_from_slice(&gradient);
        }

        let pinned: Vec<usize> = self.pins().keys().copied().collect();
        if pinned.is_empty() {
            Ok(jacobian)
        } else {
            Ok(jacobian.remove_rows_at(&pinned))
        }
    }

    /// Expand `args` into a full parameter vector of length `n`.
    pub fn full_parameters(&self, args: Arguments<'_>) -> Result<Vec<f64>> {
        match args {
            Arguments::Full(a) => {
                if a.len() != self.n {
                    return Err(self.length_error(self.n, a.len()));
                }
                Ok(a.to_vec())
            }
            Arguments::Active(a) => {
                let pins = self.pins();
                splice(self.n, &pins, a).map_err(|actual| self.length_error(self.n - pins.len(), actual))
            }
        }
    }

    fn pins(&self) -> MutexGuard<'_, BTreeMap<usize, f64>> {
        self.fixed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("function {name:?}"),
            None => "anonymous function".to_string(),
        }
    }

    fn length_error(&self, expected: usize, actual: usize) -> Error {
        Error::Function(format!(
            "input length of {} should be {expected}, got {actual}",
            self.label()
        ))
    }
}

/// Fill the unpinned slots of an `n`-vector from `active`.
///
/// Fails with the length of `active` when it does not match the number of
/// unpinned slots.
fn splice(n: usize, pins: &BTreeMap<usize, f64>, active: &[f64]) -> std::result::Result<Vec<f64>, usize> {
    if active.len() != n - pins.len() {
        return Err(active.len());
    }
    let mut free = active.iter();
    Ok((0..n)
        .map(|slot| match pins.get(&slot) {
            Some(value) => *value,
            None => free.next().copied().unwrap_or(f64::NAN),
        })
        .collect())
}

impl fmt::Debug for ParametricFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParametricFunction")
            .field("name", &self.name)
            .field("n", &self.n)
            .field("syntax", &self.syntax)
            .field("fixed", &*self.pins())
            .field("x_derivative", &self.x_derivative.is_some())
            .field("a_derivative", &self.a_derivative.is_some())
            .finish()
    }
}
