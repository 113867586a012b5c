//! Complexity sweeps: survival rate for each complexity in an ordered range.
//!
//! Every sweep point reuses the engine's seed, so neighbouring complexities
//! are compared with common random numbers and the stratified estimator
//! yields a non-increasing survival curve.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};

use crate::consistency::{
    validate_noise_level, ConsistencyMonteCarlo, SimulationConfig, SurvivalResult,
};
use crate::error::{LoopSimError, Result};

/// Parameters shared by every point of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub noise_level: f64,
    pub iterations: usize,
    /// Strictly increasing complexities, each ≥ 1.
    pub complexities: Vec<usize>,
}

impl SweepConfig {
    pub fn new(noise_level: f64, iterations: usize, complexities: Vec<usize>) -> Result<Self> {
        let config = Self {
            noise_level,
            iterations,
            complexities,
        };
        config.validate()?;
        Ok(config)
    }

    /// Every complexity from 1 to `max_complexity` inclusive.
    pub fn up_to(max_complexity: usize, iterations: usize, noise_level: f64) -> Result<Self> {
        if max_complexity < 1 {
            return Err(LoopSimError::invalid(
                "max_complexity",
                max_complexity as f64,
                "must be at least 1",
            ));
        }
        Self::new(noise_level, iterations, (1..=max_complexity).collect())
    }

    pub fn validate(&self) -> Result<()> {
        validate_noise_level(self.noise_level)?;
        if self.iterations < 1 {
            return Err(LoopSimError::invalid(
                "iterations",
                self.iterations as f64,
                "must be at least 1",
            ));
        }
        if self.complexities.is_empty() {
            return Err(LoopSimError::invalid(
                "complexities",
                0.0,
                "sweep needs at least one complexity",
            ));
        }
        if self.complexities[0] < 1 {
            return Err(LoopSimError::invalid(
                "complexities",
                self.complexities[0] as f64,
                "complexities must be at least 1",
            ));
        }
        if let Some(w) = self.complexities.windows(2).find(|w| w[1] <= w[0]) {
            return Err(LoopSimError::invalid(
                "complexities",
                w[1] as f64,
                "complexities must be strictly increasing",
            ));
        }
        Ok(())
    }

    fn point(&self, complexity: usize) -> SimulationConfig {
        SimulationConfig {
            noise_level: self.noise_level,
            complexity,
            iterations: self.iterations,
        }
    }
}

impl Default for SweepConfig {
    /// Complexities 1..=200, 500 trials each, η = 0.5.
    fn default() -> Self {
        Self {
            noise_level: 0.5,
            iterations: 500,
            complexities: (1..=200).collect(),
        }
    }
}

/// Outcome of a sweep that may have been cancelled between points.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepOutcome {
    /// Results for the points completed, in complexity order.
    pub results: Vec<SurvivalResult>,
    pub cancelled: bool,
}

/// Survival rate for every complexity in `config`.
pub fn run_batch(
    engine: &ConsistencyMonteCarlo,
    config: &SweepConfig,
) -> Result<Vec<SurvivalResult>> {
    let never = AtomicBool::new(false);
    Ok(run_batch_cancellable(engine, config, &never)?.results)
}

/// Like [`run_batch`], checking `cancel` before each sweep point.
pub fn run_batch_cancellable(
    engine: &ConsistencyMonteCarlo,
    config: &SweepConfig,
    cancel: &AtomicBool,
) -> Result<SweepOutcome> {
    config.validate()?;
    let mut results = Vec::with_capacity(config.complexities.len());

    for &complexity in &config.complexities {
        if cancel.load(Ordering::Relaxed) {
            info!(
                "sweep cancelled after {} of {} points",
                results.len(),
                config.complexities.len()
            );
            return Ok(SweepOutcome {
                results,
                cancelled: true,
            });
        }
        let result = engine.simulate(&config.point(complexity))?;
        debug!("complexity {} -> {:.4}", complexity, result.survival_rate);
        results.push(result);
    }

    info!(
        "sweep of {} complexities at noise {} complete",
        results.len(),
        config.noise_level
    );
    Ok(SweepOutcome {
        results,
        cancelled: false,
    })
}

/// First complexity whose survival rate drops below `threshold`.
pub fn suppression_onset(results: &[SurvivalResult], threshold: f64) -> Option<usize> {
    results
        .iter()
        .find(|r| r.survival_rate < threshold)
        .map(|r| r.complexity)
}
