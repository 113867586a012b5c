//! Phase diagram over rotation ω and noise level η.
//!
//! Geometry decides whether closed timelike φ-loops exist at all; the
//! information index L_info(η) measures how often complex states survive
//! them. The loop-support index L = [CTC geometry] · L_info(η) is then
//! bucketed into four phases.

use std::fmt;

use log::{info, warn};

use crate::consistency::{validate_noise_level, ConsistencyMonteCarlo, SurvivalResult};
use crate::critical::{CriticalRadiusFinder, ScanConfig};
use crate::error::{LoopSimError, Result};
use crate::sweep::{run_batch, SweepConfig};

/// Thresholds on the loop-support index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseThresholds {
    /// At or below: loops permitted but essentially never self-consistent.
    pub epsilon_low: f64,
    /// At or above: self-consistent loops are common.
    pub epsilon_high: f64,
}

impl Default for PhaseThresholds {
    fn default() -> Self {
        Self {
            epsilon_low: 0.01,
            epsilon_high: 0.20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No closed timelike φ-loops in the scanned range.
    Linear,
    FrustratedCircular,
    Crossover,
    CircularTime,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Linear => "Linear Phase",
            Phase::FrustratedCircular => "Frustrated Circular Phase",
            Phase::Crossover => "Intermediate / Crossover",
            Phase::CircularTime => "Circular Time Phase",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn determine_phase(
    geometry_has_ctc: bool,
    l_combined: f64,
    thresholds: &PhaseThresholds,
) -> Phase {
    if !geometry_has_ctc {
        Phase::Linear
    } else if l_combined <= thresholds.epsilon_low {
        Phase::FrustratedCircular
    } else if l_combined >= thresholds.epsilon_high {
        Phase::CircularTime
    } else {
        Phase::Crossover
    }
}

/// Survival rate at `complexity`, falling back to the nearest available
/// complexity (ties resolve to the smaller one).
pub fn survival_at(results: &[SurvivalResult], complexity: usize) -> Option<f64> {
    results
        .iter()
        .min_by_key(|r| (r.complexity.abs_diff(complexity), r.complexity))
        .map(|r| r.survival_rate)
}

/// Mean survival over `complexities`, using [`survival_at`] for each.
pub fn mean_survival(results: &[SurvivalResult], complexities: &[usize]) -> Option<f64> {
    if complexities.is_empty() {
        return None;
    }
    let mut total = 0.0;
    for &c in complexities {
        total += survival_at(results, c)?;
    }
    Some(total / complexities.len() as f64)
}

/// L_info(η): mean survival over the probe complexities.
pub fn information_index(
    engine: &ConsistencyMonteCarlo,
    noise_level: f64,
    complexities: &[usize],
    iterations: usize,
) -> Result<f64> {
    let mut probes = complexities.to_vec();
    probes.sort_unstable();
    probes.dedup();
    let sweep = SweepConfig::new(noise_level, iterations, probes)?;
    let results = run_batch(engine, &sweep)?;
    mean_survival(&results, complexities).ok_or_else(|| {
        LoopSimError::invalid("complexities", 0.0, "information index needs probe complexities")
    })
}

/// Evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Grid and probe settings for [`generate_phase_diagram`].
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseDiagramConfig {
    pub omegas: Vec<f64>,
    pub noise_levels: Vec<f64>,
    /// Probe complexities averaged into L_info.
    pub complexities: Vec<usize>,
    pub iterations: usize,
    pub thresholds: PhaseThresholds,
    pub scan: ScanConfig,
}

impl PhaseDiagramConfig {
    /// ω ∈ linspace(0.1, 2.0, 10), η ∈ {0, …, 0.5}, probes {100, …, 300}.
    pub fn reference() -> Self {
        Self {
            omegas: linspace(0.1, 2.0, 10),
            noise_levels: vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5],
            complexities: vec![100, 150, 200, 250, 300],
            iterations: 1000,
            thresholds: PhaseThresholds::default(),
            scan: ScanConfig::default(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.omegas.is_empty() || self.noise_levels.is_empty() {
            return Err(LoopSimError::invalid(
                "grid",
                0.0,
                "phase diagram needs at least one omega and one noise level",
            ));
        }
        for &eta in &self.noise_levels {
            validate_noise_level(eta)?;
        }
        Ok(())
    }
}

impl Default for PhaseDiagramConfig {
    fn default() -> Self {
        Self::reference()
    }
}

/// One cell of the phase diagram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhasePoint {
    pub omega: f64,
    pub noise_level: f64,
    pub r_crit: Option<f64>,
    pub geometry_has_ctc: bool,
    pub l_info: f64,
    pub l_combined: f64,
    pub phase: Phase,
}

/// Critical radius from a coarse scan, or `None` when no transition is found.
fn scanned_critical_radius(omega: f64, scan: &ScanConfig) -> Result<Option<f64>> {
    match CriticalRadiusFinder::from_omega(omega)?.scan(scan) {
        Ok(result) => Ok(Some(result.r_crit)),
        Err(LoopSimError::NoSignChange { .. }) => {
            warn!("omega={}: no CTC transition in scan range", omega);
            Ok(None)
        }
        Err(err @ LoopSimError::ConvergenceFailure { .. }) => {
            warn!("omega={}: {}", omega, err);
            Ok(err.best_estimate())
        }
        Err(err) => Err(err),
    }
}

/// Evaluate every (ω, η) cell, ω-major.
pub fn generate_phase_diagram(
    engine: &ConsistencyMonteCarlo,
    config: &PhaseDiagramConfig,
) -> Result<Vec<PhasePoint>> {
    config.validate()?;

    // L_info does not depend on geometry; compute once per noise level.
    let info_index = config
        .noise_levels
        .iter()
        .map(|&eta| information_index(engine, eta, &config.complexities, config.iterations))
        .collect::<Result<Vec<f64>>>()?;

    let mut points = Vec::with_capacity(config.omegas.len() * config.noise_levels.len());
    for &omega in &config.omegas {
        let r_crit = scanned_critical_radius(omega, &config.scan)?;
        let geometry_has_ctc = r_crit.is_some();
        let flag = if geometry_has_ctc { 1.0 } else { 0.0 };

        for (&noise_level, &l_info) in config.noise_levels.iter().zip(&info_index) {
            let l_combined = flag * l_info;
            points.push(PhasePoint {
                omega,
                noise_level,
                r_crit,
                geometry_has_ctc,
                l_info,
                l_combined,
                phase: determine_phase(geometry_has_ctc, l_combined, &config.thresholds),
            });
        }
    }

    info!("phase diagram: {} cells", points.len());
    Ok(points)
}
