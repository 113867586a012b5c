//! Phase diagram over rotation ω and noise η.
//!
//! Combines geometric permission for closed timelike curves with the
//! information-theoretic survival index L_info(η).
//! Outputs CSV: omega,noise,r_crit,geometry_has_ctc,L_info,L_combined,phase
//!
//! Run with:
//!   cargo run --release --example phase_diagram

use godel_loop_sim::prelude::*;

fn main() -> Result<(), LoopSimError> {
    env_logger::init();

    let engine = ConsistencyMonteCarlo::default();
    let config = PhaseDiagramConfig::reference();
    let points = generate_phase_diagram(&engine, &config)?;

    println!("omega,noise,r_crit,geometry_has_ctc,L_info,L_combined,phase");
    for p in &points {
        let r_crit = p
            .r_crit
            .map(|r| format!("{:.6}", r))
            .unwrap_or_default();
        println!(
            "{:.4},{:.2},{},{},{:.6},{:.6},{}",
            p.omega, p.noise_level, r_crit, p.geometry_has_ctc, p.l_info, p.l_combined, p.phase
        );
    }
    Ok(())
}
