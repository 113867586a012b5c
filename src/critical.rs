//! Critical-radius detection: where φ-loops stop being causal.
//!
//! Two entry points:
//! - [`CriticalRadiusFinder::find`] bisects a caller-supplied bracket whose
//!   endpoints must straddle the crossing.
//! - [`CriticalRadiusFinder::scan`] walks a uniform radius grid until the
//!   causal class changes, then refines the bracketing cell by bisection.
//!
//! Bisection halves the bracket every step, so the loop is bounded by
//! ⌈log2(width / tolerance)⌉ iterations. A bracket that is still wider than
//! the tolerance (up to rounding) once the bound is spent, or whose midpoint
//! collapses onto an endpoint, has stopped shrinking and is reported as
//! [`LoopSimError::ConvergenceFailure`].

use log::{debug, info};

use crate::error::{LoopSimError, Result};
use crate::metric::{CausalClass, GodelMetric};

/// Canonical search range and tolerance for the φ-loop transition.
pub const DEFAULT_R_MIN: f64 = 0.0;
pub const DEFAULT_R_MAX: f64 = 3.0;
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Bracket for [`CriticalRadiusFinder::find`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchBracket {
    pub r_min: f64,
    pub r_max: f64,
    /// Final bracket width at which bisection stops.
    pub tolerance: f64,
}

impl SearchBracket {
    pub fn new(r_min: f64, r_max: f64, tolerance: f64) -> Result<Self> {
        let bracket = Self {
            r_min,
            r_max,
            tolerance,
        };
        bracket.validate()?;
        Ok(bracket)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.r_min.is_finite() || self.r_min < 0.0 {
            return Err(LoopSimError::invalid(
                "r_min",
                self.r_min,
                "must be non-negative and finite",
            ));
        }
        if !self.r_max.is_finite() || self.r_max <= self.r_min {
            return Err(LoopSimError::invalid(
                "r_max",
                self.r_max,
                "must be finite and greater than r_min",
            ));
        }
        validate_tolerance(self.tolerance)
    }

    pub fn width(&self) -> f64 {
        self.r_max - self.r_min
    }

    /// Upper bound on bisection steps needed to reach `tolerance`.
    pub fn iteration_bound(&self) -> usize {
        iteration_bound(self.width(), self.tolerance)
    }
}

impl Default for SearchBracket {
    fn default() -> Self {
        Self {
            r_min: DEFAULT_R_MIN,
            r_max: DEFAULT_R_MAX,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Uniform coarse scan followed by bisection refinement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanConfig {
    pub r_min: f64,
    pub r_max: f64,
    /// Number of grid points, endpoints included.
    pub steps: usize,
    pub tolerance: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            r_min: 0.1,
            r_max: 10.0,
            steps: 1000,
            tolerance: 1e-6,
        }
    }
}

impl ScanConfig {
    fn validate(&self) -> Result<()> {
        SearchBracket::new(self.r_min, self.r_max, self.tolerance)?;
        if self.steps < 2 {
            return Err(LoopSimError::invalid(
                "steps",
                self.steps as f64,
                "scan needs at least two grid points",
            ));
        }
        Ok(())
    }
}

fn validate_tolerance(tolerance: f64) -> Result<()> {
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return Err(LoopSimError::invalid(
            "tolerance",
            tolerance,
            "must be positive and finite",
        ));
    }
    Ok(())
}

fn iteration_bound(width: f64, tolerance: f64) -> usize {
    if width <= tolerance {
        return 0;
    }
    let ratio = width / tolerance;
    let steps = if ratio.is_finite() {
        ratio.log2()
    } else {
        // width / tolerance overflowed; the difference of logs stays finite.
        width.log2() - tolerance.log2()
    };
    steps.ceil() as usize
}

/// Whether a bracket of `width` ending at `upper` meets `tolerance` once the
/// rounding of repeated midpoints is allowed for.
fn within_rounding(width: f64, upper: f64, tolerance: f64) -> bool {
    width <= tolerance * (1.0 + 4.0 * f64::EPSILON) + 4.0 * f64::EPSILON * upper.abs()
}

/// Located φ-loop transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalRadiusResult {
    /// Midpoint of the final bracket.
    pub r_crit: f64,
    pub omega: f64,
    /// Final bisection bracket (lower, upper).
    pub confidence_interval: (f64, f64),
    /// Bisection steps taken.
    pub iterations: usize,
}

impl CriticalRadiusResult {
    pub fn width(&self) -> f64 {
        self.confidence_interval.1 - self.confidence_interval.0
    }

    pub fn contains(&self, r: f64) -> bool {
        self.confidence_interval.0 <= r && r <= self.confidence_interval.1
    }
}

/// Locates r_crit for one metric.
#[derive(Debug, Clone, Copy)]
pub struct CriticalRadiusFinder {
    metric: GodelMetric,
}

impl CriticalRadiusFinder {
    pub fn new(metric: GodelMetric) -> Self {
        Self { metric }
    }

    pub fn from_omega(omega: f64) -> Result<Self> {
        Ok(Self::new(GodelMetric::from_omega(omega)?))
    }

    pub fn metric(&self) -> &GodelMetric {
        &self.metric
    }

    /// Bisect `bracket` down to its tolerance.
    ///
    /// Fails with [`LoopSimError::NoSignChange`] when both endpoints share a
    /// causal class; the caller must widen or move the bracket.
    pub fn find(&self, bracket: &SearchBracket) -> Result<CriticalRadiusResult> {
        bracket.validate()?;

        let lower = self.metric.sample(bracket.r_min)?;
        let upper = self.metric.sample(bracket.r_max)?;
        if lower.class == upper.class {
            return Err(LoopSimError::NoSignChange {
                r_min: bracket.r_min,
                r_max: bracket.r_max,
                class: lower.class,
            });
        }

        let result = self.bisect(bracket.r_min, bracket.r_max, lower.class, bracket.tolerance)?;
        info!(
            "omega={}: r_crit = {:.6} in [{:.6}, {:.6}] after {} steps",
            result.omega,
            result.r_crit,
            result.confidence_interval.0,
            result.confidence_interval.1,
            result.iterations
        );
        Ok(result)
    }

    /// Scan a uniform grid for the first class change and refine it.
    pub fn scan(&self, config: &ScanConfig) -> Result<CriticalRadiusResult> {
        config.validate()?;

        let spacing = (config.r_max - config.r_min) / (config.steps - 1) as f64;
        let first = self.metric.classify(config.r_min)?;
        let mut previous_r = config.r_min;

        for i in 1..config.steps {
            let r = if i == config.steps - 1 {
                config.r_max
            } else {
                config.r_min + spacing * i as f64
            };
            let class = self.metric.classify(r)?;
            if class != first {
                debug!("class change between r={} and r={}", previous_r, r);
                return self.bisect(previous_r, r, first, config.tolerance);
            }
            previous_r = r;
        }

        Err(LoopSimError::NoSignChange {
            r_min: config.r_min,
            r_max: config.r_max,
            class: first,
        })
    }

    fn bisect(
        &self,
        mut lower: f64,
        mut upper: f64,
        lower_class: CausalClass,
        tolerance: f64,
    ) -> Result<CriticalRadiusResult> {
        let bound = iteration_bound(upper - lower, tolerance);
        let mut iterations = 0;

        while upper - lower > tolerance {
            let mid = 0.5 * (lower + upper);
            if iterations >= bound {
                if within_rounding(upper - lower, upper, tolerance) {
                    break;
                }
                return Err(LoopSimError::ConvergenceFailure {
                    estimate: mid,
                    lower,
                    upper,
                    iterations,
                });
            }
            if mid <= lower || mid >= upper {
                // Adjacent floats: the bracket cannot shrink any further.
                return Err(LoopSimError::ConvergenceFailure {
                    estimate: mid,
                    lower,
                    upper,
                    iterations,
                });
            }
            if self.metric.classify(mid)? == lower_class {
                lower = mid;
            } else {
                upper = mid;
            }
            iterations += 1;
            debug!("bisection step {}: [{}, {}]", iterations, lower, upper);
        }

        Ok(CriticalRadiusResult {
            r_crit: 0.5 * (lower + upper),
            omega: self.metric.omega(),
            confidence_interval: (lower, upper),
            iterations,
        })
    }
}

/// Locate r_crit for rotation `omega` within `[r_min, r_max]`.
pub fn find_critical_radius(
    omega: f64,
    r_min: f64,
    r_max: f64,
    tolerance: f64,
) -> Result<CriticalRadiusResult> {
    let bracket = SearchBracket::new(r_min, r_max, tolerance)?;
    CriticalRadiusFinder::from_omega(omega)?.find(&bracket)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_radius_at_half_rotation() {
        let result = find_critical_radius(0.5, 0.0, 3.0, 1e-4).unwrap();
        assert!(
            (result.r_crit - 1.414).abs() < 1e-3,
            "r_crit = {} should be near √2",
            result.r_crit
        );
        assert!(result.width() <= 1e-4);
        assert!(result.contains(2f64.sqrt()));
        assert_eq!(result.omega, 0.5);
    }

    #[test]
    fn iterations_respect_log_bound() {
        let bracket = SearchBracket::new(0.0, 3.0, 1e-4).unwrap();
        let result = CriticalRadiusFinder::from_omega(0.5)
            .unwrap()
            .find(&bracket)
            .unwrap();
        assert_eq!(bracket.iteration_bound(), 15);
        assert!(result.iterations <= bracket.iteration_bound());
    }

    #[test]
    fn bracket_below_crossing_has_no_sign_change() {
        let err = find_critical_radius(0.5, 0.1, 1.0, 1e-4).unwrap_err();
        assert_eq!(
            err,
            LoopSimError::NoSignChange {
                r_min: 0.1,
                r_max: 1.0,
                class: CausalClass::Causal,
            }
        );
    }

    #[test]
    fn bracket_above_crossing_has_no_sign_change() {
        let err = find_critical_radius(0.5, 2.0, 3.0, 1e-4).unwrap_err();
        assert!(matches!(
            err,
            LoopSimError::NoSignChange {
                class: CausalClass::Timelike,
                ..
            }
        ));
    }

    #[test]
    fn rejects_malformed_brackets() {
        assert!(find_critical_radius(0.5, -1.0, 3.0, 1e-4).is_err());
        assert!(find_critical_radius(0.5, 2.0, 1.0, 1e-4).is_err());
        assert!(find_critical_radius(0.5, 0.0, 3.0, 0.0).is_err());
        assert!(find_critical_radius(0.0, 0.0, 3.0, 1e-4).is_err());
    }

    #[test]
    fn unreachable_tolerance_reports_best_estimate() {
        let err = find_critical_radius(0.5, 1.0, 2.0, 1e-300).unwrap_err();
        let estimate = err.best_estimate().expect("convergence failure carries an estimate");
        assert!(
            (estimate - 2f64.sqrt()).abs() < 1e-12,
            "estimate {} should still be near √2",
            estimate
        );
    }

    #[test]
    fn power_of_two_ratio_converges_despite_rounding() {
        for &(omega, r_min, r_max, tol) in &[
            (0.5, 0.1, 1.7, 0.1),
            (0.5, 0.2, 1.8, 0.1),
            (1.0, 0.2, 1.8, 0.05),
            (0.5, 0.6, 3.0, 0.3),
        ] {
            let result = find_critical_radius(omega, r_min, r_max, tol).unwrap_or_else(|err| {
                panic!("[{}, {}] tol {} at omega={}: {:?}", r_min, r_max, tol, omega, err)
            });
            let expected = omega.recip().sqrt();
            assert!(result.contains(expected), "{:?} should contain {}", result, expected);
            assert!(result.width() <= tol * (1.0 + 1e-12));
            assert!(result.iterations <= iteration_bound(r_max - r_min, tol));
        }
    }

    #[test]
    fn overflowing_ratio_still_terminates() {
        assert!(iteration_bound(1e10, 1e-300) < 1100);
        let err = find_critical_radius(0.5, 0.0, 1e10, 1e-300).unwrap_err();
        match err {
            LoopSimError::ConvergenceFailure {
                estimate,
                iterations,
                ..
            } => {
                assert!((estimate - 2f64.sqrt()).abs() < 1e-12, "estimate {}", estimate);
                assert!(iterations < 200, "took {} steps", iterations);
            }
            other => panic!("expected ConvergenceFailure, got {:?}", other),
        }
    }

    #[test]
    fn scan_agrees_with_closed_form() {
        for &omega in &[0.1, 0.5, 1.0, 2.0] {
            let finder = CriticalRadiusFinder::from_omega(omega).unwrap();
            let expected = finder.metric().analytic_critical_radius();
            let result = finder.scan(&ScanConfig::default()).unwrap();
            assert!(
                (result.r_crit - expected).abs() < 1e-5,
                "omega={}: scanned {} vs analytic {}",
                omega,
                result.r_crit,
                expected
            );
        }
    }

    #[test]
    fn scan_without_transition_fails() {
        let finder = CriticalRadiusFinder::from_omega(0.5).unwrap();
        let config = ScanConfig {
            r_min: 0.1,
            r_max: 1.0,
            ..ScanConfig::default()
        };
        assert!(matches!(
            finder.scan(&config),
            Err(LoopSimError::NoSignChange { .. })
        ));
        let degenerate = ScanConfig {
            steps: 1,
            ..ScanConfig::default()
        };
        assert!(finder.scan(&degenerate).is_err());
    }
}
