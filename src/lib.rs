//! # godel-loop-sim
//!
//! Numerical core for probing closed timelike curves in a Gödel-type
//! rotating universe, and for measuring how state complexity limits
//! self-consistent travel around them.
//!
//! ## Layers
//!
//! ```text
//! GodelMetric (g_φφ sign)
//!   ↓ bisection
//! CriticalRadiusFinder (r_crit where φ-loops turn timelike)
//!
//! ConsistencyMonteCarlo (noisy loop traversal, survival ~ p(η)^complexity)
//!   ↓ sweep over complexity
//! Survival curve → phase diagram over (ω, η)
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use godel_loop_sim::prelude::*;
//!
//! let r = find_critical_radius(0.5, 0.0, 3.0, 1e-4).unwrap();
//! println!("r_crit ≈ {:.3}", r.r_crit);
//!
//! let engine = ConsistencyMonteCarlo::new(123);
//! let config = SimulationConfig::new(0.5, 5, 300).unwrap();
//! let survival = engine.simulate(&config).unwrap();
//! println!("survival at complexity 5: {:.4}", survival.survival_rate);
//! ```

pub mod error;
pub mod metric;
pub mod critical;
pub mod consistency;
pub mod sweep;
pub mod phase;

pub use error::{LoopSimError, Result};

pub mod prelude {
    pub use crate::error::LoopSimError;
    pub use crate::metric::{
        displacement, evaluate, CausalClass, Displacement, GodelMetric, MetricParameters,
        RadiusSample,
    };
    pub use crate::critical::*;
    pub use crate::consistency::*;
    pub use crate::sweep::*;
    pub use crate::phase::*;
}
