//! Elementary transforms used to build metafunction terms.

use core::f64::consts::{E, PI};
use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One of the 13 elementary scalar transforms of the metafunction catalog.
///
/// Each transform is applied element-wise to an already distribution-mapped
/// column. Domain correctness (e.g. [`Inverse`](Self::Inverse) near `-0.1`)
/// is the caller's concern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Function {
    /// `x`
    Linear,
    /// `x²`
    Quadratic,
    /// `x³`
    Cubic,
    /// `eˣ / (e − 1)`
    Exponential,
    /// `sin(2πx) / 2`
    Periodic,
    /// `1` if `x > 0.5`, else `0`
    Discontinuous,
    /// `4(x − 0.5)²`
    NonMonotonic,
    /// `(10 − 1/1.1)⁻¹ (x + 0.1)⁻¹`
    Inverse,
    /// `0`
    NoEffect,
    /// `cos(x)`
    Trigonometric,
    /// Sawtooth with period 1/4, ranging over `[0, 1/4]`.
    PiecewiseLarge,
    /// Sawtooth with period 1/32, ranging over `[0, 1/32]`.
    PiecewiseSmall,
    /// `x² − 0.2 cos(7πx)`
    Oscillation,
}

impl Function {
    /// The full catalog, in sampling order.
    pub const ALL: [Self; 13] = [
        Self::Linear,
        Self::Quadratic,
        Self::Cubic,
        Self::Exponential,
        Self::Periodic,
        Self::Discontinuous,
        Self::NonMonotonic,
        Self::Inverse,
        Self::NoEffect,
        Self::Trigonometric,
        Self::PiecewiseLarge,
        Self::PiecewiseSmall,
        Self::Oscillation,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Quadratic => "quadratic",
            Self::Cubic => "cubic",
            Self::Exponential => "exponential",
            Self::Periodic => "periodic",
            Self::Discontinuous => "discontinuous",
            Self::NonMonotonic => "non_monotonic",
            Self::Inverse => "inverse",
            Self::NoEffect => "no_effect",
            Self::Trigonometric => "trigonometric",
            Self::PiecewiseLarge => "piecewise_large",
            Self::PiecewiseSmall => "piecewise_small",
            Self::Oscillation => "oscillation",
        }
    }

    /// Evaluate the transform at `x`.
    #[must_use]
    pub fn eval(self, x: f64) -> f64 {
        match self {
            Self::Linear => x,
            Self::Quadratic => x * x,
            Self::Cubic => x * x * x,
            Self::Exponential => x.exp() / (E - 1.0),
            Self::Periodic => (2.0 * PI * x).sin() / 2.0,
            Self::Discontinuous => {
                if x > 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::NonMonotonic => 4.0 * (x - 0.5).powi(2),
            Self::Inverse => 1.0 / ((10.0 - 1.0 / 1.1) * (x + 0.1)),
            Self::NoEffect => 0.0,
            Self::Trigonometric => x.cos(),
            Self::PiecewiseLarge => {
                sign_of_trunc(4.0 * x) * (0.125 - x.rem_euclid(0.25)) + 0.125
            }
            Self::PiecewiseSmall => {
                (sign_of_trunc(32.0 * x) * (0.031_25 - 2.0 * x.rem_euclid(0.031_25)) + 0.031_25)
                    / 2.0
            }
            Self::Oscillation => x * x - 0.2 * (7.0 * PI * x).cos(),
        }
    }

    /// Apply the transform to every element of `column` in place.
    pub fn apply(self, column: &mut [f64]) {
        for v in column.iter_mut() {
            *v = self.eval(*v);
        }
    }
}

/// `(-1)^n` where `n` is `s` truncated toward zero.
#[allow(clippy::cast_possible_truncation)]
fn sign_of_trunc(s: f64) -> f64 {
    if (s.trunc() as i64) % 2 == 0 { 1.0 } else { -1.0 }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Function {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|func| func.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownFunction(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < TOL
    }

    #[test]
    fn polynomial_family() {
        assert!(close(Function::Linear.eval(-0.3), -0.3));
        assert!(close(Function::Quadratic.eval(-0.3), 0.09));
        assert!(close(Function::Cubic.eval(-0.3), -0.027));
        assert!(close(Function::NonMonotonic.eval(0.5), 0.0));
        assert!(close(Function::NonMonotonic.eval(1.0), 1.0));
    }

    #[test]
    fn exponential_is_normalised() {
        assert!(close(Function::Exponential.eval(0.0), 1.0 / (E - 1.0)));
        assert!(close(Function::Exponential.eval(1.0), E / (E - 1.0)));
    }

    #[test]
    fn periodic_and_trigonometric() {
        assert!(close(Function::Periodic.eval(0.25), 0.5));
        assert!(close(Function::Periodic.eval(0.5), 0.0));
        assert!(close(Function::Trigonometric.eval(0.0), 1.0));
    }

    #[test]
    fn discontinuous_steps_above_half() {
        assert_eq!(Function::Discontinuous.eval(0.5), 0.0);
        assert_eq!(Function::Discontinuous.eval(0.500_001), 1.0);
        assert_eq!(Function::Discontinuous.eval(-3.0), 0.0);
    }

    #[test]
    fn inverse_matches_formula() {
        let expected = 1.0 / (10.0 - 1.0 / 1.1) / 1.0;
        assert!(close(Function::Inverse.eval(0.9), expected));
    }

    #[test]
    fn no_effect_is_zero_everywhere() {
        for x in [-5.0, 0.0, 0.3, 12.0] {
            assert_eq!(Function::NoEffect.eval(x), 0.0);
        }
    }

    #[test]
    fn inverse_at_zero() {
        let expected = 1.0 / ((10.0 - 1.0 / 1.1) * 0.1);
        assert!(close(Function::Inverse.eval(0.0), expected));
    }

    #[test]
    fn piecewise_large_sawtooth() {
        // 4x = 0.4: even segment, 0.125 - 0.1 + 0.125
        assert!(close(Function::PiecewiseLarge.eval(0.1), 0.15));
        // 4x = 1.4: odd segment, -(0.125 - 0.1) + 0.125
        assert!(close(Function::PiecewiseLarge.eval(0.35), 0.1));
        // 4x = -0.4 truncates to an even segment; -0.1 mod 0.25 = 0.15
        assert!(close(Function::PiecewiseLarge.eval(-0.1), 0.1));
    }

    #[test]
    fn piecewise_small_sawtooth() {
        // 32x = 0.5: even segment, remainder 1/64
        let v = Function::PiecewiseSmall.eval(0.5 / 32.0);
        assert!(close(v, 0.015_625));
        // 32x = 1.25: odd segment, remainder 1/128
        let v = Function::PiecewiseSmall.eval(1.25 / 32.0);
        assert!(close(v, 0.007_812_5));
    }

    #[test]
    fn piecewise_amplitudes_on_unit_interval() {
        let range = |f: Function| {
            (0..100_000).map(|i| f.eval(f64::from(i) * 1e-5)).fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), v| (lo.min(v), hi.max(v)),
            )
        };
        let (lo, hi) = range(Function::PiecewiseLarge);
        assert!(lo >= 0.0 && hi <= 0.25 + TOL, "large: [{lo}, {hi}]");
        assert!(hi > 0.24);
        let (lo, hi) = range(Function::PiecewiseSmall);
        assert!(lo >= 0.0 && hi <= 0.031_25 + TOL, "small: [{lo}, {hi}]");
        assert!(hi > 0.03);
    }

    #[test]
    fn oscillation_matches_formula() {
        assert!(close(Function::Oscillation.eval(0.0), -0.2));
        assert!(close(Function::Oscillation.eval(1.0), 1.0 + 0.2));
    }

    #[test]
    fn apply_is_elementwise() {
        let mut col = vec![1.0, 2.0, 3.0];
        Function::Quadratic.apply(&mut col);
        assert_eq!(col, vec![1.0, 4.0, 9.0]);
    }

    #[test]
    fn names_parse_back() {
        for f in Function::ALL {
            assert_eq!(f.name().parse::<Function>().unwrap(), f);
        }
        let err = "sigmoid".parse::<Function>().unwrap_err();
        assert!(err.is_configuration());
    }
}
