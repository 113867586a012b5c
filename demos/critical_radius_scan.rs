//! Critical radius across rotation strengths, bracketed vs scanned.
//!
//! Outputs CSV: omega,r_bisect,lower,upper,r_scan,r_analytic
//!
//! Run with:
//!   cargo run --example critical_radius_scan

use godel_loop_sim::prelude::*;

fn main() -> Result<(), LoopSimError> {
    env_logger::init();

    println!("omega,r_bisect,lower,upper,r_scan,r_analytic");
    for omega in linspace(0.1, 2.0, 20) {
        let finder = CriticalRadiusFinder::from_omega(omega)?;
        let analytic = finder.metric().analytic_critical_radius();
        let scanned = finder.scan(&ScanConfig::default())?;

        // The canonical bracket [0, 3] only covers ω > 1/9.
        match finder.find(&SearchBracket::default()) {
            Ok(r) => println!(
                "{:.4},{:.6},{:.6},{:.6},{:.6},{:.6}",
                omega,
                r.r_crit,
                r.confidence_interval.0,
                r.confidence_interval.1,
                scanned.r_crit,
                analytic
            ),
            Err(err @ LoopSimError::NoSignChange { .. }) => {
                println!("{:.4},,,,{:.6},{:.6}", omega, scanned.r_crit, analytic);
                eprintln!("# omega={:.4}: {}", omega, err);
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}
