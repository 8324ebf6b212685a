//! Closed numeric intervals with optional bounds.
//!
//! An absent bound means the interval is unconstrained on that side, so
//! `Interval::default()` contains every value. Intervals are used to express
//! domain filters over data columns and to report column domains.

use std::fmt;
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Interval {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Bounded interval `[min, max]`.
    pub fn closed(min: f64, max: f64) -> Self {
        Self::new(Some(min), Some(max))
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_bounded(&self) -> bool {
        self.min.is_some() && self.max.is_some()
    }

    /// True when `min > max`, i.e. no value can be contained.
    pub fn is_empty(&self) -> bool {
        matches!((self.min, self.max), (Some(lo), Some(hi)) if lo > hi)
    }

    /// Inclusive containment; NaN is never contained.
    pub fn contains(&self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }
        self.min.is_none_or(|lo| lo <= value) && self.max.is_none_or(|hi| value <= hi)
    }

    /// `max - min`, when both bounds are present.
    pub fn width(&self) -> Option<f64> {
        Some(self.max? - self.min?)
    }

    /// Intersection of two intervals. The result may be empty.
    pub fn intersect(&self, other: &Interval) -> Interval {
        Interval {
            min: tighter(self.min, other.min, f64::max),
            max: tighter(self.max, other.max, f64::min),
        }
    }

    /// Smallest interval covering both operands.
    ///
    /// An empty operand contributes nothing.
    pub fn union(&self, other: &Interval) -> Interval {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Interval {
            min: looser(self.min, other.min, f64::min),
            max: looser(self.max, other.max, f64::max),
        }
    }

    /// Interval spanning the smallest and largest finite values, if any.
    pub fn from_values(values: &[f64]) -> Option<Interval> {
        let mut finite = values.iter().copied().filter(|v| v.is_finite());
        let first = finite.next()?;
        let (lo, hi) = finite.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some(Interval::closed(lo, hi))
    }
}

fn tighter(a: Option<f64>, b: Option<f64>, pick: fn(f64, f64) -> f64) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (a, None) => a,
        (None, b) => b,
    }
}

fn looser(a: Option<f64>, b: Option<f64>, pick: fn(f64, f64) -> f64) -> Option<f64> {
    Some(pick(a?, b?))
}

impl Add<f64> for Interval {
    type Output = Interval;

    fn add(self, shift: f64) -> Interval {
        Interval {
            min: self.min.map(|v| v + shift),
            max: self.max.map(|v| v + shift),
        }
    }
}

impl Sub<f64> for Interval {
    type Output = Interval;

    fn sub(self, shift: f64) -> Interval {
        self + (-shift)
    }
}

impl Mul<f64> for Interval {
    type Output = Interval;

    /// Scale both bounds; a negative factor swaps them.
    fn mul(self, factor: f64) -> Interval {
        let min = self.min.map(|v| v * factor);
        let max = self.max.map(|v| v * factor);
        if factor < 0.0 {
            Interval { min: max, max: min }
        } else {
            Interval { min, max }
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lo = self.min.map_or_else(|| "-inf".to_string(), |v| format!("{v}"));
        let hi = self.max.map_or_else(|| "inf".to_string(), |v| format!("{v}"));
        write!(f, "[{lo}, {hi}]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_is_inclusive() {
        let i = Interval::closed(1.0, 2.0);
        assert!(i.contains(1.0));
        assert!(i.contains(2.0));
        assert!(!i.contains(2.000_001));
        assert!(!i.contains(f64::NAN));
    }

    #[test]
    fn missing_bound_is_unconstrained() {
        let below = Interval::new(None, Some(0.0));
        assert!(below.contains(-1e300));
        assert!(!below.contains(0.5));
        assert!(Interval::unbounded().contains(42.0));
    }

    #[test]
    fn shift_and_scale() {
        let i = Interval::closed(1.0, 3.0);
        assert_eq!(i + 1.0, Interval::closed(2.0, 4.0));
        assert_eq!(i - 1.0, Interval::closed(0.0, 2.0));
        assert_eq!(i * 2.0, Interval::closed(2.0, 6.0));
        assert_eq!(i * -1.0, Interval::closed(-3.0, -1.0));
        assert_eq!(Interval::new(Some(1.0), None) * -2.0, Interval::new(None, Some(-2.0)));
    }

    #[test]
    fn intersection_and_union() {
        let a = Interval::closed(0.0, 5.0);
        let b = Interval::new(Some(3.0), None);
        assert_eq!(a.intersect(&b), Interval::closed(3.0, 5.0));
        assert_eq!(a.union(&b), Interval::new(Some(0.0), None));

        let disjoint = Interval::closed(6.0, 7.0);
        assert!(a.intersect(&disjoint).is_empty());
        assert_eq!(a.union(&disjoint), Interval::closed(0.0, 7.0));
    }

    #[test]
    fn from_values_skips_non_finite() {
        let i = Interval::from_values(&[3.0, f64::NAN, -1.0, 8.0]).unwrap();
        assert_eq!(i, Interval::closed(-1.0, 8.0));
        assert_eq!(i.width(), Some(9.0));
        assert!(Interval::from_values(&[]).is_none());
    }
}
