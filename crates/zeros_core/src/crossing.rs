//! Adaptive step-refinement search for sign changes of oscillating functions.
//!
//! The search walks forward from a start point in steps of `10^-power`. When a
//! step lands on the other side of the axis it is discarded and the step is
//! shrunk tenfold, until the step is finer than the requested resolution.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{RootError, RootResult};

/// A real function of one variable with isolated sign-changing crossings.
pub trait OscillatingFunction {
    fn apply(&self, x: f64) -> f64;
}

impl<F: Fn(f64) -> f64> OscillatingFunction for F {
    fn apply(&self, x: f64) -> f64 {
        self(x)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Upper limit on trial steps in a single search before giving up.
    pub max_steps: usize,
    /// Largest accepted resolution, in decimal digits.
    pub max_resolution: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_steps: 1_000_000,
            max_resolution: 12,
        }
    }
}

/// Finds the first crossing past a start point to a given number of decimal digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossingFinder {
    settings: SearchSettings,
}

impl CrossingFinder {
    pub fn new(settings: SearchSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Returns the smallest crossing of `f` greater than `start`, rounded to
    /// `resolution` decimal places.
    ///
    /// `starting_power` sets the coarsest step, `10^-starting_power`. Callers
    /// that already know the crossing lies within that distance of `start`
    /// should pass the matching power to skip the coarse steps.
    pub fn find_crossing<F: OscillatingFunction + ?Sized>(
        &self,
        f: &F,
        start: f64,
        resolution: u32,
        starting_power: u32,
    ) -> RootResult<f64> {
        let lower = self.bracket_crossing(f, start, resolution, starting_power, None)?;
        Ok(settle(lower, resolution))
    }

    /// Like [`find_crossing`](Self::find_crossing), but fails with
    /// [`RootError::NoCrossing`] when no crossing exists in `(start, bound]`.
    pub fn find_crossing_below<F: OscillatingFunction + ?Sized>(
        &self,
        f: &F,
        start: f64,
        resolution: u32,
        starting_power: u32,
        bound: f64,
    ) -> RootResult<f64> {
        let lower = self.bracket_crossing(f, start, resolution, starting_power, Some(bound))?;
        Ok(settle(lower, resolution))
    }

    /// Runs the search and returns the unrounded lower end of the final
    /// bracket: the last trial point still on the starting side of the axis.
    /// The crossing lies within `10^-(resolution + 1)` above it.
    pub fn bracket_crossing<F: OscillatingFunction + ?Sized>(
        &self,
        f: &F,
        start: f64,
        resolution: u32,
        starting_power: u32,
        bound: Option<f64>,
    ) -> RootResult<f64> {
        if resolution > self.settings.max_resolution {
            return Err(RootError::InvalidResolution {
                requested: resolution,
                max: self.settings.max_resolution,
            });
        }
        if !start.is_finite() {
            return Err(RootError::InvalidArgument {
                name: "start",
                value: start,
            });
        }

        let mut initial = sample(f, start)?;
        if initial == 0.0 {
            initial = sample(f, start + 0.5 * resolution_unit(resolution))?;
        }
        let positive = initial > 0.0;

        let mut trial = start;
        let mut power = starting_power;
        let mut steps = 0usize;
        while power <= resolution + 1 {
            if steps >= self.settings.max_steps {
                return Err(RootError::NoCrossing {
                    start,
                    reason: format!("gave up after {} steps", self.settings.max_steps),
                });
            }
            steps += 1;

            let candidate = trial + pow10(power);
            let probe = match bound {
                Some(bound) if candidate > bound => bound,
                _ => candidate,
            };
            let crossed = (sample(f, probe)? > 0.0) != positive;
            if crossed {
                power += 1;
                trace!(trial, power, "crossing bracketed, refining step");
            } else if probe < candidate {
                return Err(RootError::NoCrossing {
                    start,
                    reason: format!("no sign change up to {bound:?}"),
                });
            } else {
                trial = candidate;
            }
        }
        Ok(trial)
    }
}

fn sample<F: OscillatingFunction + ?Sized>(f: &F, x: f64) -> RootResult<f64> {
    let value = f.apply(x);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RootError::NonFinite { at: x })
    }
}

fn pow10(power: u32) -> f64 {
    10f64.powi(-(power as i32))
}

/// One unit in the last requested decimal place, `10^-resolution`.
pub fn resolution_unit(resolution: u32) -> f64 {
    pow10(resolution)
}

/// Rounds to `resolution + 1` places first, then to `resolution`, so binary
/// representation noise in the guard digit cannot flip the last digit.
pub fn settle(value: f64, resolution: u32) -> f64 {
    round_to(round_to(value, resolution + 1), resolution)
}

/// Rounds half away from zero at `digits` decimal places.
///
/// Operates on the shortest decimal representation of `value`, so `3.1415`
/// rounds to `3.142` even though its binary value sits just below the tie.
pub fn round_to(value: f64, digits: u32) -> f64 {
    adjust_decimal(value, digits, DecimalMode::HalfUp)
}

/// Truncates toward zero at `digits` decimal places.
pub fn truncate_to(value: f64, digits: u32) -> f64 {
    adjust_decimal(value, digits, DecimalMode::Down)
}

#[derive(Debug, Clone, Copy)]
enum DecimalMode {
    HalfUp,
    Down,
}

fn adjust_decimal(value: f64, digits: u32, mode: DecimalMode) -> f64 {
    if !value.is_finite() || value == 0.0 {
        return value;
    }
    // e.g. "3.1415e0"
    let repr = format!("{:e}", value.abs());
    let Some((mantissa, exponent)) = repr.split_once('e') else {
        return value;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value;
    };
    let significand: Vec<u8> = mantissa
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| b - b'0')
        .collect();

    // Number of significant digits left of the cut.
    let keep = exponent + 1 + digits as i32;
    if keep >= significand.len() as i32 {
        return value;
    }
    let kept = keep.max(0) as usize;
    let mut scaled = significand[..kept]
        .iter()
        .fold(0u64, |acc, &d| acc * 10 + u64::from(d));
    if matches!(mode, DecimalMode::HalfUp) && keep >= 0 && significand[kept] >= 5 {
        scaled += 1;
    }
    let magnitude = format!("{scaled}e-{digits}")
        .parse::<f64>()
        .unwrap_or(value.abs());
    magnitude.copysign(value)
}

#[cfg(test)]
mod tests {
    use super::{round_to, settle, truncate_to, CrossingFinder, SearchSettings};
    use crate::error::RootError;

    #[test]
    fn finds_crossing_of_a_line() {
        let finder = CrossingFinder::default();
        let root = finder
            .find_crossing(&|x: f64| x - 1.23456, 0.0, 4, 0)
            .expect("line should cross");
        assert_eq!(root, 1.2346);
    }

    #[test]
    fn finds_first_crossing_of_sine() {
        let finder = CrossingFinder::default();
        let root = finder
            .find_crossing(&f64::sin, 0.5, 6, 0)
            .expect("sine should cross");
        assert_eq!(root, 3.141593);
        let next = finder
            .find_crossing(&f64::sin, root + 1e-6, 6, 0)
            .expect("sine should cross again");
        assert_eq!(next, 6.283185);
    }

    #[test]
    fn zero_at_start_probes_just_past_it() {
        let finder = CrossingFinder::default();
        let root = finder
            .find_crossing(&f64::sin, 0.0, 3, 0)
            .expect("sine should cross");
        assert_eq!(root, 3.142);
    }

    #[test]
    fn starting_power_limits_coarse_steps() {
        let finder = CrossingFinder::default();
        let root = finder
            .find_crossing(&|x: f64| x - 2.00057, 2.0005, 5, 4)
            .expect("line should cross");
        assert_eq!(root, 2.00057);
    }

    #[test]
    fn bracket_stays_below_the_crossing() {
        let finder = CrossingFinder::default();
        let lower = finder
            .bracket_crossing(&|x: f64| x - 0.7, 0.0, 3, 0, None)
            .expect("line should cross");
        assert!(lower <= 0.7);
        assert!(0.7 - lower < 1e-4 + 1e-12);
    }

    #[test]
    fn never_crossing_function_reports_no_crossing() {
        let finder = CrossingFinder::new(SearchSettings {
            max_steps: 500,
            ..SearchSettings::default()
        });
        let result = finder.find_crossing(&|x: f64| 1.0 + x * x, 0.0, 4, 0);
        assert!(matches!(result, Err(RootError::NoCrossing { .. })));
    }

    #[test]
    fn bound_stops_search_without_crossing() {
        let finder = CrossingFinder::default();
        let result = finder.find_crossing_below(&|x: f64| (-x).exp(), 0.0, 4, 0, 50.0);
        assert!(matches!(result, Err(RootError::NoCrossing { .. })));

        let root = finder
            .find_crossing_below(&|x: f64| x - 2.5, 0.0, 2, 0, 2.6)
            .expect("crossing before the bound is found");
        assert_eq!(root, 2.5);
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let finder = CrossingFinder::default();
        let result = finder.find_crossing(&|x: f64| if x > 3.0 { f64::NAN } else { 1.0 }, 0.0, 3, 0);
        assert!(matches!(result, Err(RootError::NonFinite { .. })));
    }

    #[test]
    fn rejects_excessive_resolution() {
        let finder = CrossingFinder::default();
        let result = finder.find_crossing(&f64::sin, 1.0, 20, 0);
        assert_eq!(
            result,
            Err(RootError::InvalidResolution {
                requested: 20,
                max: 12
            })
        );
    }

    #[test]
    fn rounding_helpers() {
        assert_eq!(round_to(2.40485, 4), 2.4049);
        assert_eq!(round_to(5.52007811, 4), 5.5201);
        assert_eq!(truncate_to(5.52007811, 4), 5.52);
        assert_eq!(truncate_to(2.4048255, 4), 2.4048);
        assert_eq!(settle(2.404825, 4), 2.4048);
        assert_eq!(round_to(3.1415, 3), 3.142);
        assert_eq!(round_to(-1.25, 1), -1.3);
        assert_eq!(round_to(0.0004, 3), 0.0);
        assert_eq!(round_to(0.0006, 3), 0.001);
        assert_eq!(truncate_to(133.07835509, 6), 133.078355);
    }
}
