//! Solver-facing view of a dataset.
//!
//! A [`FitInputs`] snapshots the selected records of the bound roles together
//! with the function being fitted and its starting point. Solvers only ever see
//! this struct, never the mutable [`FittingData`] it came from.

use std::sync::Arc;

use nalgebra::DMatrix;
use tracing::debug;

use crate::data::{FittingData, Role};
use crate::error::{Error, Result};
use crate::models::{Arguments, ParametricFunction};

#[derive(Debug, Clone)]
pub struct FitInputs {
    pub function: Arc<ParametricFunction>,
    /// Initial guess for the unpinned parameters.
    pub a0: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub xerr: Option<Vec<f64>>,
    pub yerr: Option<Vec<f64>>,
}

impl FitInputs {
    /// Project the selected records of `data` for fitting `function`.
    ///
    /// Both x and y must be bound; `a0` is given in active form.
    pub fn from_data(data: &FittingData, function: Arc<ParametricFunction>, a0: Vec<f64>) -> Result<Self> {
        let x = data.x().ok_or(Error::MissingRole(Role::X))?;
        let y = data.y().ok_or(Error::MissingRole(Role::Y))?;

        let active = function.active_parameters();
        if a0.len() != active {
            return Err(Error::Function(format!(
                "initial guess has {} values but {} parameters are free",
                a0.len(),
                active
            )));
        }

        debug!(records = x.len(), parameters = active, "prepared fit inputs");
        Ok(Self {
            function,
            a0,
            x,
            y,
            xerr: data.xerr(),
            yerr: data.yerr(),
        })
    }

    pub fn number_of_records(&self) -> usize {
        self.x.len()
    }

    /// Records minus free parameters, saturating at zero.
    pub fn degrees_of_freedom(&self) -> usize {
        self.x.len().saturating_sub(self.function.active_parameters())
    }

    /// `y - f(a, x)` for active parameters `a`.
    pub fn residuals(&self, a: &[f64]) -> Result<Vec<f64>> {
        let fitted = self.function.evaluate_many(Arguments::Active(a), &self.x)?;
        Ok(self.y.iter().zip(fitted).map(|(y, f)| y - f).collect())
    }

    /// Effective variance per record: `yerr² + (f'(x) · xerr)²`.
    ///
    /// Without error columns every record weighs 1. The x term is used only
    /// when the function has an x-derivative.
    pub fn variances(&self, a: &[f64]) -> Result<Vec<f64>> {
        let mut weighted = self.yerr.is_some();
        let mut variances = match &self.yerr {
            Some(yerr) => yerr.iter().map(|e| e * e).collect(),
            None => vec![0.0; self.x.len()],
        };
        if let Some(xerr) = &self.xerr {
            if self.function.has_x_derivative() {
                let slopes = self.function.x_derivative(Arguments::Active(a), &self.x)?;
                for ((v, slope), e) in variances.iter_mut().zip(slopes).zip(xerr) {
                    *v += (slope * e).powi(2);
                }
                weighted = true;
            }
        }
        if !weighted {
            variances.fill(1.0);
        }
        Ok(variances)
    }

    /// Weighted sum of squared residuals at `a`.
    pub fn chi2(&self, a: &[f64]) -> Result<f64> {
        let residuals = self.residuals(a)?;
        let variances = self.variances(a)?;
        residuals
            .iter()
            .zip(&variances)
            .map(|(r, v)| {
                if *v > 0.0 {
                    Ok(r * r / v)
                } else {
                    Err(Error::InvalidData("record with zero uncertainty".to_string()))
                }
            })
            .sum()
    }
}

/// Solver result, in active-parameter form.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOutput {
    pub a: Vec<f64>,
    pub a_err: Vec<f64>,
    pub covariance: DMatrix<f64>,
    pub chi2: f64,
    pub degrees_of_freedom: usize,
}

impl FitOutput {
    /// `chi2 / dof`, or `None` when no degrees of freedom remain.
    pub fn chi2_reduced(&self) -> Option<f64> {
        (self.degrees_of_freedom > 0).then(|| self.chi2 / self.degrees_of_freedom as f64)
    }
}

/// A fitting algorithm.
pub trait Solver {
    fn solve(&self, inputs: &FitInputs) -> Result<FitOutput>;
}
