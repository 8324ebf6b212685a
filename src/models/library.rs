//! Builtin fitting functions.
//!
//! Every builtin carries its formula (as `syntax`) and both analytic
//! derivatives. Constructors return fresh instances, so pins set on one call's
//! result never leak into another's.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::models::function::ParametricFunction;

/// All fixed-arity builtins.
pub fn builtins() -> Vec<Arc<ParametricFunction>> {
    vec![
        constant(),
        linear(),
        parabolic(),
        hyperbolic(),
        exponential(),
        cos(),
        sin(),
        straight_power(),
        inverse_power(),
        normal(),
    ]
}

pub fn constant() -> Arc<ParametricFunction> {
    Arc::new(
        ParametricFunction::new(1, |a, _| a[0])
            .named("constant")
            .with_syntax("a[0]")
            .with_x_derivative(|_, _| 0.0)
            .with_a_derivative(|_, _| vec![1.0]),
    )
}

pub fn linear() -> Arc<ParametricFunction> {
    Arc::new(
        ParametricFunction::new(2, |a, x| a[0] + a[1] * x)
            .named("linear")
            .with_syntax("a[0] + a[1] * x")
            .with_x_derivative(|a, _| a[1])
            .with_a_derivative(|_, x| vec![1.0, x]),
    )
}

pub fn parabolic() -> Arc<ParametricFunction> {
    Arc::new(
        ParametricFunction::new(3, |a, x| a[0] + a[1] * x + a[2] * x * x)
            .named("parabolic")
            .with_syntax("a[0] + a[1] * x + a[2] * x ^ 2")
            .with_x_derivative(|a, x| a[1] + 2.0 * a[2] * x)
            .with_a_derivative(|_, x| vec![1.0, x, x * x]),
    )
}

pub fn hyperbolic() -> Arc<ParametricFunction> {
    Arc::new(
        ParametricFunction::new(3, |a, x| a[0] / (x + a[1]) + a[2])
            .named("hyperbolic")
            .with_syntax("a[0] / (x + a[1]) + a[2]")
            .with_x_derivative(|a, x| -a[0] / (x + a[1]).powi(2))
            .with_a_derivative(|a, x| {
                let shifted = x + a[1];
                vec![1.0 / shifted, -a[0] / shifted.powi(2), 1.0]
            }),
    )
}

pub fn exponential() -> Arc<ParametricFunction> {
    Arc::new(
        ParametricFunction::new(3, |a, x| a[0] * (a[1] * x).exp() + a[2])
            .named("exponential")
            .with_syntax("a[0] * exp(a[1] * x) + a[2]")
            .with_x_derivative(|a, x| a[0] * a[1] * (a[1] * x).exp())
            .with_a_derivative(|a, x| {
                let e = (a[1] * x).exp();
                vec![e, a[0] * x * e, 1.0]
            }),
    )
}

pub fn cos() -> Arc<ParametricFunction> {
    Arc::new(
        ParametricFunction::new(4, |a, x| a[0] * (a[1] * x + a[2]).cos() + a[3])
            .named("cos")
            .with_syntax("a[0] * cos(a[1] * x + a[2]) + a[3]")
            .with_x_derivative(|a, x| -a[0] * a[1] * (a[1] * x + a[2]).sin())
            .with_a_derivative(|a, x| {
                let phase = a[1] * x + a[2];
                vec![phase.cos(), -a[0] * x * phase.sin(), -a[0] * phase.sin(), 1.0]
            }),
    )
}

pub fn sin() -> Arc<ParametricFunction> {
    Arc::new(
        ParametricFunction::new(4, |a, x| a[0] * (a[1] * x + a[2]).sin() + a[3])
            .named("sin")
            .with_syntax("a[0] * sin(a[1] * x + a[2]) + a[3]")
            .with_x_derivative(|a, x| a[0] * a[1] * (a[1] * x + a[2]).cos())
            .with_a_derivative(|a, x| {
                let phase = a[1] * x + a[2];
                vec![phase.sin(), a[0] * x * phase.cos(), a[0] * phase.cos(), 1.0]
            }),
    )
}

pub fn straight_power() -> Arc<ParametricFunction> {
    Arc::new(
        ParametricFunction::new(4, |a, x| a[0] * (x + a[1]).powf(a[2]) + a[3])
            .named("straight_power")
            .with_syntax("a[0] * (x + a[1]) ^ a[2] + a[3]")
            .with_x_derivative(|a, x| a[0] * a[2] * (x + a[1]).powf(a[2] - 1.0))
            .with_a_derivative(|a, x| {
                let base = x + a[1];
                let power = base.powf(a[2]);
                vec![
                    power,
                    a[0] * a[2] * base.powf(a[2] - 1.0),
                    a[0] * power * base.ln(),
                    1.0,
                ]
            }),
    )
}

pub fn inverse_power() -> Arc<ParametricFunction> {
    Arc::new(
        ParametricFunction::new(4, |a, x| a[0] / (x + a[1]).powf(a[2]) + a[3])
            .named("inverse_power")
            .with_syntax("a[0] / (x + a[1]) ^ a[2] + a[3]")
            .with_x_derivative(|a, x| -a[0] * a[2] * (x + a[1]).powf(-a[2] - 1.0))
            .with_a_derivative(|a, x| {
                let base = x + a[1];
                let power = base.powf(-a[2]);
                vec![
                    power,
                    -a[0] * a[2] * base.powf(-a[2] - 1.0),
                    -a[0] * power * base.ln(),
                    1.0,
                ]
            }),
    )
}

pub fn normal() -> Arc<ParametricFunction> {
    Arc::new(
        ParametricFunction::new(4, |a, x| a[0] * gaussian(a, x) + a[3])
            .named("normal")
            .with_syntax("a[0] * exp(-((x - a[1]) ^ 2) / (2 * a[2] ^ 2)) + a[3]")
            .with_x_derivative(|a, x| -a[0] * gaussian(a, x) * (x - a[1]) / a[2].powi(2))
            .with_a_derivative(|a, x| {
                let g = gaussian(a, x);
                let d = x - a[1];
                vec![
                    g,
                    a[0] * g * d / a[2].powi(2),
                    a[0] * g * d * d / a[2].powi(3),
                    1.0,
                ]
            }),
    )
}

fn gaussian(a: &[f64], x: f64) -> f64 {
    (-(x - a[1]).powi(2) / (2.0 * a[2].powi(2))).exp()
}

/// `Σ a[i] x^i` for `i` in `0..=degree`, named `polynomial_<degree>`.
pub fn polynomial(degree: usize) -> Result<Arc<ParametricFunction>> {
    if degree < 1 {
        return Err(Error::Function(format!(
            "polynomial degree must be at least 1, got {degree}"
        )));
    }

    let syntax = (0..=degree)
        .map(|i| match i {
            0 => "a[0]".to_string(),
            1 => "a[1] * x".to_string(),
            _ => format!("a[{i}] * x ^ {i}"),
        })
        .collect::<Vec<_>>()
        .join(" + ");

    Ok(Arc::new(
        ParametricFunction::new(degree + 1, |a, x| horner(a, x))
            .named(format!("polynomial_{degree}"))
            .with_syntax(syntax)
            .with_x_derivative(|a, x| {
                a.iter()
                    .enumerate()
                    .skip(1)
                    .map(|(i, c)| i as f64 * c * x.powi(i as i32 - 1))
                    .sum()
            })
            .with_a_derivative(move |_, x| (0..=degree).map(|i| x.powi(i as i32)).collect()),
    ))
}

fn horner(a: &[f64], x: f64) -> f64 {
    a.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::function::Arguments;
    use approx::assert_relative_eq;

    /// Central difference of `f` in `x` and in every parameter.
    fn check_gradients(f: &ParametricFunction, a: &[f64], x: f64) {
        let h = 1e-6;
        let value = |a: &[f64], x: f64| f.evaluate(a, x).unwrap();

        let numeric_dx = (value(a, x + h) - value(a, x - h)) / (2.0 * h);
        let dx = f.x_derivative(Arguments::Full(a), &[x]).unwrap()[0];
        assert_relative_eq!(dx, numeric_dx, epsilon = 1e-5, max_relative = 1e-5);

        let jacobian = f.a_derivative(Arguments::Full(a), &[x]).unwrap();
        for i in 0..a.len() {
            let mut up = a.to_vec();
            let mut down = a.to_vec();
            up[i] += h;
            down[i] -= h;
            let numeric = (value(&up, x) - value(&down, x)) / (2.0 * h);
            assert_relative_eq!(jacobian[(i, 0)], numeric, epsilon = 1e-5, max_relative = 1e-5);
        }
    }

    #[test]
    fn analytic_gradients_match_finite_differences() {
        let cases: Vec<(Arc<ParametricFunction>, Vec<f64>)> = vec![
            (constant(), vec![2.0]),
            (linear(), vec![1.0, -2.0]),
            (parabolic(), vec![1.0, -2.0, 0.5]),
            (hyperbolic(), vec![3.0, 1.5, -1.0]),
            (exponential(), vec![2.0, 0.3, 1.0]),
            (cos(), vec![1.5, 2.0, 0.3, 1.0]),
            (sin(), vec![1.5, 2.0, 0.3, 1.0]),
            (straight_power(), vec![2.0, 1.0, 1.7, 0.5]),
            (inverse_power(), vec![2.0, 1.0, 1.7, 0.5]),
            (normal(), vec![3.0, 0.5, 1.2, 0.1]),
            (polynomial(3).unwrap(), vec![1.0, -1.0, 0.5, 0.25]),
        ];
        for (f, a) in cases {
            for x in [0.4, 1.3, 2.2] {
                check_gradients(&f, &a, x);
            }
        }
    }

    #[test]
    fn polynomial_generator() {
        let p = polynomial(2).unwrap();
        assert_eq!(p.name(), Some("polynomial_2"));
        assert_eq!(p.syntax(), Some("a[0] + a[1] * x + a[2] * x ^ 2"));
        assert_eq!(p.number_of_parameters(), 3);
        assert_relative_eq!(p.evaluate(&[1.0, 2.0, 3.0], 2.0).unwrap(), 17.0);
        assert!(polynomial(0).is_err());
    }

    #[test]
    fn builtins_have_unique_names_and_metadata() {
        let all = builtins();
        let mut names: Vec<&str> = all.iter().filter_map(|f| f.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), all.len());
        assert!(all.iter().all(|f| f.syntax().is_some()));
        assert!(all.iter().all(|f| f.has_x_derivative() && f.has_a_derivative()));
    }

    #[test]
    fn constructors_return_fresh_instances() {
        let first = linear();
        first.fix(0, 1.0).unwrap();
        assert_eq!(linear().active_parameters(), 2);
    }
}
