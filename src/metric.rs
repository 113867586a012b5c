//! Gödel-type rotating metric in cylindrical coordinates (t, r, φ, z).
//!
//! The off-diagonal g_tφ term carries the rotation. The causal character of
//! a closed φ-loop at radius r is fixed by the sign of
//!
//! ```text
//! g_φφ(r) = -(r² - R²/r²),   R = 1/ω by default
//! ```
//!
//! g_φφ > 0 means the angular Killing vector is spacelike and φ-loops are
//! causal; g_φφ < 0 means φ-loops are closed timelike curves. For r > 0 the
//! coefficient is strictly decreasing, so exactly one crossing exists at
//! r_crit = √R.

use nalgebra::{Matrix4, Vector4};

use crate::error::{LoopSimError, Result};

/// Coordinate ordering used by [`GodelMetric::metric_tensor`].
pub const T_IDX: usize = 0;
pub const R_IDX: usize = 1;
pub const PHI_IDX: usize = 2;
pub const Z_IDX: usize = 3;

/// A coordinate displacement dx^μ in (t, r, φ, z) order.
pub type Displacement = Vector4<f64>;

/// Build a displacement from its four components.
pub fn displacement(dt: f64, dr: f64, dphi: f64, dz: f64) -> Displacement {
    Vector4::new(dt, dr, dphi, dz)
}

/// Rotation parameters of the spacetime model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricParameters {
    /// Rotation parameter ω > 0.
    pub omega: f64,
    /// Length scale R. Defaults to 1/ω.
    pub scale: f64,
}

impl MetricParameters {
    /// Parameters with the default scale R = 1/ω.
    pub fn new(omega: f64) -> Result<Self> {
        validate_omega(omega)?;
        Ok(Self {
            omega,
            scale: 1.0 / omega,
        })
    }

    /// Override the length scale R.
    pub fn with_scale(self, scale: f64) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(LoopSimError::invalid(
                "scale",
                scale,
                "must be positive and finite",
            ));
        }
        Ok(Self { scale, ..self })
    }
}

fn validate_omega(omega: f64) -> Result<()> {
    if !omega.is_finite() || omega <= 0.0 {
        return Err(LoopSimError::invalid(
            "omega",
            omega,
            "rotation parameter must be positive and finite",
        ));
    }
    Ok(())
}

fn validate_radius(r: f64) -> Result<()> {
    if !r.is_finite() || r < 0.0 {
        return Err(LoopSimError::invalid(
            "r",
            r,
            "radius must be non-negative and finite",
        ));
    }
    Ok(())
}

/// Sign-based classification of the angular metric coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CausalClass {
    /// g_φφ ≥ 0: φ-loops are spacelike (or null) and respect causality.
    Causal,
    /// g_φφ < 0: φ-loops are closed timelike curves.
    Timelike,
}

impl CausalClass {
    /// Classify a g_φφ value.
    pub fn of(metric_value: f64) -> Self {
        if metric_value < 0.0 {
            CausalClass::Timelike
        } else {
            CausalClass::Causal
        }
    }

    pub fn is_timelike(self) -> bool {
        self == CausalClass::Timelike
    }
}

/// One evaluation point of the angular coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusSample {
    pub r: f64,
    pub metric_value: f64,
    pub class: CausalClass,
}

/// Evaluates the rotating metric for a fixed set of parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GodelMetric {
    params: MetricParameters,
}

impl GodelMetric {
    pub fn new(params: MetricParameters) -> Self {
        Self { params }
    }

    /// Metric with the default scale R = 1/ω.
    pub fn from_omega(omega: f64) -> Result<Self> {
        Ok(Self::new(MetricParameters::new(omega)?))
    }

    pub fn params(&self) -> MetricParameters {
        self.params
    }

    pub fn omega(&self) -> f64 {
        self.params.omega
    }

    /// Unchecked g_φφ(r). Diverges to +∞ on the axis.
    #[inline]
    pub fn phi_phi(&self, r: f64) -> f64 {
        let scale = self.params.scale;
        scale * scale / (r * r) - r * r
    }

    /// g_φφ at radius `r ≥ 0`.
    pub fn evaluate(&self, r: f64) -> Result<f64> {
        validate_radius(r)?;
        Ok(self.phi_phi(r))
    }

    /// Evaluate and classify the angular coefficient at `r`.
    pub fn sample(&self, r: f64) -> Result<RadiusSample> {
        let metric_value = self.evaluate(r)?;
        Ok(RadiusSample {
            r,
            metric_value,
            class: CausalClass::of(metric_value),
        })
    }

    pub fn classify(&self, r: f64) -> Result<CausalClass> {
        Ok(self.sample(r)?.class)
    }

    /// Closed-form crossing r_crit = √R, used to cross-check the numerical finder.
    pub fn analytic_critical_radius(&self) -> f64 {
        self.params.scale.sqrt()
    }

    /// Full metric tensor g_μν at radius `r > 0`.
    ///
    /// The axis r = 0 is a coordinate singularity of g_tφ and is rejected.
    pub fn metric_tensor(&self, r: f64) -> Result<Matrix4<f64>> {
        validate_radius(r)?;
        if r == 0.0 {
            return Err(LoopSimError::invalid(
                "r",
                r,
                "metric tensor is singular on the axis",
            ));
        }
        let scale = self.params.scale;

        let mut g = Matrix4::zeros();
        g[(T_IDX, T_IDX)] = -1.0;
        g[(R_IDX, R_IDX)] = 1.0;
        g[(PHI_IDX, PHI_IDX)] = self.phi_phi(r);
        g[(T_IDX, PHI_IDX)] = -scale / (r * r);
        g[(PHI_IDX, T_IDX)] = g[(T_IDX, PHI_IDX)];
        g[(Z_IDX, Z_IDX)] = 1.0;
        Ok(g)
    }

    /// Line element ds² = g_μν dx^μ dx^ν at radius `r`.
    pub fn interval_squared(&self, dx: &Displacement, r: f64) -> Result<f64> {
        let g = self.metric_tensor(r)?;
        Ok(dx.dot(&(g * dx)))
    }

    /// `true` when ds² < 0.
    pub fn is_timelike(&self, dx: &Displacement, r: f64) -> Result<bool> {
        Ok(self.interval_squared(dx, r)? < 0.0)
    }

    /// Whether a pure φ-loop (dt = dr = dz = 0) at `r` is timelike.
    pub fn is_phi_loop_timelike(&self, r: f64) -> Result<bool> {
        Ok(self.classify(r)?.is_timelike())
    }
}

/// Evaluate g_φφ at radius `r` for rotation `omega`, with R = 1/ω.
pub fn evaluate(r: f64, omega: f64) -> Result<f64> {
    GodelMetric::from_omega(omega)?.evaluate(r)
}
