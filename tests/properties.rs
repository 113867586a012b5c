//! Property checks across the parameter space.

use godel_loop_sim::prelude::*;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn phi_phi_decreases_with_radius(
        omega in 0.05f64..5.0,
        a in 0.01f64..10.0,
        b in 0.01f64..10.0,
    ) {
        let metric = GodelMetric::from_omega(omega).unwrap();
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        prop_assume!(hi - lo > 1e-9);
        prop_assert!(metric.evaluate(lo).unwrap() > metric.evaluate(hi).unwrap());
    }

    #[test]
    fn finder_brackets_closed_form(omega in 0.05f64..5.0) {
        let finder = CriticalRadiusFinder::from_omega(omega).unwrap();
        let expected = finder.metric().analytic_critical_radius();
        let bracket = SearchBracket::new(0.0, 2.0 * expected + 1.0, 1e-6).unwrap();
        let result = finder.find(&bracket).unwrap();
        prop_assert!(result.contains(expected));
        prop_assert!(result.iterations <= bracket.iteration_bound());
    }

    #[test]
    fn dyadic_tolerance_converges(
        omega in 0.2f64..5.0,
        below in 0.0f64..0.95,
        above in 1.05f64..3.0,
        halvings in 0u32..40,
    ) {
        let finder = CriticalRadiusFinder::from_omega(omega).unwrap();
        let expected = finder.metric().analytic_critical_radius();
        let (r_min, r_max) = (expected * below, expected * above);
        let tolerance = (r_max - r_min) / 2f64.powi(halvings as i32);
        let bracket = SearchBracket::new(r_min, r_max, tolerance).unwrap();
        let result = finder.find(&bracket);
        prop_assert!(result.is_ok(), "[{}, {}] tol {}: {:?}", r_min, r_max, tolerance, result);
        let result = result.unwrap();
        prop_assert!(result.iterations <= bracket.iteration_bound());
        prop_assert!((result.r_crit - expected).abs() <= result.width() + 1e-12);
    }

    #[test]
    fn survival_rate_is_a_probability(
        noise in 0.0f64..=1.0,
        complexity in 1usize..50,
        iterations in 1usize..400,
        seed in any::<u64>(),
    ) {
        let config = SimulationConfig::new(noise, complexity, iterations).unwrap();
        for estimator in [Estimator::Stratified, Estimator::Direct] {
            let engine = ConsistencyMonteCarlo::new(seed).with_estimator(estimator);
            let result = engine.simulate(&config).unwrap();
            prop_assert!((0.0..=1.0).contains(&result.survival_rate));
            prop_assert!(result.consistent_trials <= iterations);
            prop_assert_eq!(
                result.survival_rate,
                result.consistent_trials as f64 / iterations as f64
            );
        }
    }

    #[test]
    fn survival_never_rises_with_complexity(
        noise in 0.0f64..=1.0,
        iterations in 1usize..300,
        seed in any::<u64>(),
    ) {
        let engine = ConsistencyMonteCarlo::new(seed);
        let mut previous = f64::INFINITY;
        for complexity in 1..=30 {
            let config = SimulationConfig::new(noise, complexity, iterations).unwrap();
            let rate = engine.simulate(&config).unwrap().survival_rate;
            prop_assert!(rate <= previous, "complexity {}: {} > {}", complexity, rate, previous);
            previous = rate;
        }
    }

    #[test]
    fn same_seed_same_result(
        noise in 0.0f64..=1.0,
        complexity in 1usize..20,
        seed in any::<u64>(),
    ) {
        let config = SimulationConfig::new(noise, complexity, 200).unwrap();
        for estimator in [Estimator::Stratified, Estimator::Direct] {
            let engine = ConsistencyMonteCarlo::new(seed).with_estimator(estimator);
            prop_assert_eq!(engine.simulate(&config).unwrap(), engine.simulate(&config).unwrap());
        }
    }

    #[test]
    fn out_of_range_noise_is_rejected(noise in prop_oneof![-10.0f64..-1e-9, 1.0f64 + 1e-9..10.0]) {
        prop_assert!(
            matches!(
                SimulationConfig::new(noise, 1, 10),
                Err(LoopSimError::InvalidParameter { name: "noise_level", .. })
            ),
            "noise level {} should be rejected",
            noise
        );
    }
}
