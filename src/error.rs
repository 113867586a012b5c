//! Error taxonomy shared by the metric sampler, the critical-radius finder
//! and the self-consistency Monte Carlo.
//!
//! Nothing here is fatal to the caller: every variant describes a condition
//! the caller can recover from by re-invoking with adjusted parameters.

use thiserror::Error;

use crate::metric::CausalClass;

/// Errors produced by the loop simulator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoopSimError {
    /// A parameter failed validation. Not retried.
    #[error("Invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Both ends of the search range share one causal class.
    #[error("No sign change in [{r_min}, {r_max}]: both endpoints are {class:?}")]
    NoSignChange {
        r_min: f64,
        r_max: f64,
        class: CausalClass,
    },

    /// Bisection exhausted its iteration bound before the bracket reached
    /// tolerance. Carries the best estimate so far.
    #[error(
        "Bisection did not converge after {iterations} iterations: \
         r ≈ {estimate} in [{lower}, {upper}]"
    )]
    ConvergenceFailure {
        estimate: f64,
        lower: f64,
        upper: f64,
        iterations: usize,
    },
}

impl LoopSimError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        LoopSimError::InvalidParameter { name, value, reason }
    }

    /// Best available estimate of the critical radius, if this error carries one.
    pub fn best_estimate(&self) -> Option<f64> {
        match *self {
            LoopSimError::ConvergenceFailure { estimate, .. } => Some(estimate),
            _ => None,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LoopSimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_parameter_message_names_the_field() {
        let err = LoopSimError::invalid("omega", -1.0, "must be positive");
        let msg = err.to_string();
        assert!(msg.contains("omega"), "message should name the field: {}", msg);
        assert!(msg.contains("must be positive"));
    }

    #[test]
    fn convergence_failure_exposes_estimate() {
        let err = LoopSimError::ConvergenceFailure {
            estimate: 1.41,
            lower: 1.40,
            upper: 1.42,
            iterations: 3,
        };
        assert_eq!(err.best_estimate(), Some(1.41));
        assert_eq!(LoopSimError::invalid("r", -1.0, "negative").best_estimate(), None);
    }
}
