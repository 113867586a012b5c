//! Survival curve: self-consistency rate vs state complexity.
//!
//! Outputs CSV: complexity,survival_rate,consistent_trials,iterations
//!
//! Run with:
//!   cargo run --example survival_curve

use godel_loop_sim::prelude::*;

fn main() -> Result<(), LoopSimError> {
    env_logger::init();

    let engine = ConsistencyMonteCarlo::new(DEFAULT_SEED);
    let config = SweepConfig::up_to(200, 300, 0.5)?;
    let results = run_batch(&engine, &config)?;

    println!("complexity,survival_rate,consistent_trials,iterations");
    for r in &results {
        println!(
            "{},{:.4},{},{}",
            r.complexity, r.survival_rate, r.consistent_trials, r.iterations
        );
    }

    println!();
    println!("# Direct simulation (explicit state vectors) at the first few complexities:");
    let direct = engine.with_estimator(Estimator::Direct);
    for complexity in 1..=5 {
        let cfg = SimulationConfig::new(0.5, complexity, 300)?;
        let r = direct.simulate(&cfg)?;
        println!(
            "#   complexity={}: direct={:.4} closed_form={:.4}",
            complexity,
            r.survival_rate,
            direct.expected_survival(&cfg)?
        );
    }
    Ok(())
}
