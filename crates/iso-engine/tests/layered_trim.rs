mod common;

use common::{composition_strategy, lipid_like, marginal_set};
use iso_core::Summator;
use iso_engine::{
    execute, run_query, CancelToken, EngineSizing, LayeredEngine, Phase, QuantilePolicy, Query,
    SearchGuard, SplinePolicy, Strategy,
};
use proptest::prelude::*;

fn covered(lprobs: &[f64]) -> Summator {
    lprobs.iter().map(|lp| lp.exp()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn trimmed_layered_sets_are_minimal(
        specs in composition_strategy(),
        stop in 0.05f64..0.999,
        estimating in any::<bool>(),
    ) {
        let strategy = if estimating { Strategy::LayeredEstimating } else { Strategy::Layered };
        let dist = run_query(&Query::new(specs, strategy, stop)).expect("query");
        let lprobs = dist.lprobs();
        prop_assert!(!lprobs.is_empty());
        prop_assert!(covered(lprobs).covers(stop));
        prop_assert!(!covered(&lprobs[..lprobs.len() - 1]).covers(stop));
        for pair in lprobs.windows(2) {
            prop_assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn trimmed_layered_matches_ordered(
        specs in composition_strategy(),
        stop in 0.0f64..0.999,
        estimating in any::<bool>(),
    ) {
        let strategy = if estimating { Strategy::LayeredEstimating } else { Strategy::Layered };
        let ordered = run_query(&Query::new(specs.clone(), Strategy::Ordered, stop)).expect("ordered");
        let layered = run_query(&Query::new(specs, strategy, stop)).expect("layered");
        prop_assert_eq!(ordered, layered);
    }
}

#[test]
fn engine_walks_its_phases() {
    let set = marginal_set(&common::toy());
    let mut guard = SearchGuard::unbounded();
    let mut engine = LayeredEngine::new(
        &set,
        QuantilePolicy::default(),
        0.99,
        EngineSizing::default(),
    );
    assert_eq!(engine.phase(), Phase::Seed);
    assert_eq!(engine.step(&mut guard).expect("seed"), Phase::Expanding);
    assert_eq!(engine.accepted().len(), 1);
    assert_eq!(engine.fringe_len(), 1);
    let threshold = match engine.step(&mut guard).expect("expand") {
        Phase::Thresholding(t) => t,
        other => panic!("unexpected phase {other:?}"),
    };
    assert!((threshold - 0.18f64.ln()).abs() < 1e-12);
    assert_eq!(engine.step(&mut guard).expect("threshold"), Phase::Converged);
    assert_eq!(engine.accepted().len(), 2);
    assert_eq!(engine.fringe_len(), 1);
    assert_eq!(engine.rounds(), 1);
    assert_eq!(engine.step(&mut guard).expect("idle"), Phase::Converged);
}

#[test]
fn spline_records_one_knot_per_round() {
    let set = marginal_set(&lipid_like());
    let mut guard = SearchGuard::unbounded();
    let mut engine = LayeredEngine::new(
        &set,
        SplinePolicy::default(),
        0.999,
        EngineSizing::default(),
    );
    while engine.step(&mut guard).expect("step") != Phase::Converged {}
    assert_eq!(engine.policy().knots().len(), engine.rounds() + 1);
    assert!(engine.covered() >= 0.999 - 1e-12);
    let thresholds: Vec<f64> = engine.policy().knots().iter().map(|k| k.0).collect();
    for pair in thresholds.windows(2) {
        assert!(pair[1] <= pair[0]);
    }
}

#[test]
fn layered_policies_agree_on_a_large_molecule() {
    let query = |strategy| Query::new(lipid_like(), strategy, 0.9999);
    let quantile = execute(&query(Strategy::Layered), &CancelToken::new()).expect("layered");
    let spline =
        execute(&query(Strategy::LayeredEstimating), &CancelToken::new()).expect("estimating");
    assert_eq!(quantile.distribution, spline.distribution);
    assert!(spline.stats.rounds >= 1);
    assert!(quantile.stats.visited_states >= quantile.distribution.len());
}
