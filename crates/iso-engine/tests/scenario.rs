mod common;

use common::toy;
use iso_engine::{execute, run_query, CancelToken, Query, QueryOpts, Strategy};

#[test]
fn ordered_returns_the_two_most_probable_rows() {
    let dist = run_query(&Query::new(toy(), Strategy::Ordered, 0.99)).expect("query");
    assert_eq!(dist.len(), 2);
    assert_eq!(dist.masses(), &[2.0, 3.0]);
    assert!((dist.lprobs()[0] - 0.81f64.ln()).abs() < 1e-12);
    assert!((dist.lprobs()[1] - 0.18f64.ln()).abs() < 1e-12);
    assert_eq!(dist.count_rows(), vec![vec![2, 0], vec![1, 1]]);
}

#[test]
fn absolute_floor_keeps_rows_above_it() {
    let dist = run_query(&Query::new(toy(), Strategy::ThresholdAbsolute, 0.05)).expect("query");
    let mut rows = dist.count_rows();
    rows.sort();
    assert_eq!(rows, vec![vec![1, 1], vec![2, 0]]);
}

#[test]
fn relative_floor_scales_with_the_mode() {
    let wide = run_query(&Query::new(toy(), Strategy::ThresholdRelative, 0.2)).expect("query");
    assert_eq!(wide.len(), 2);
    let narrow = run_query(&Query::new(toy(), Strategy::ThresholdRelative, 0.25)).expect("query");
    assert_eq!(narrow.count_rows(), vec![vec![2, 0]]);
}

#[test]
fn layered_strategies_agree_on_the_toy() {
    for strategy in [Strategy::Layered, Strategy::LayeredEstimating] {
        let outcome =
            execute(&Query::new(toy(), strategy, 0.99), &CancelToken::new()).expect("query");
        let dist = outcome.distribution;
        assert_eq!(dist.count_rows(), vec![vec![2, 0], vec![1, 1]], "{strategy}");
        assert_eq!(dist.masses(), &[2.0, 3.0]);
        assert_eq!(outcome.stats.rounds, 1);
        assert!(!outcome.stats.exhausted);
    }
}

#[test]
fn full_target_enumerates_the_whole_space() {
    for strategy in [Strategy::Ordered, Strategy::Layered, Strategy::LayeredEstimating] {
        let outcome =
            execute(&Query::new(toy(), strategy, 1.0), &CancelToken::new()).expect("query");
        assert_eq!(outcome.distribution.len(), 3, "{strategy}");
        assert!(outcome.stats.exhausted);
        assert!((outcome.stats.covered_prob - 1.0).abs() < 1e-12);
    }
}

#[test]
fn zero_target_accepts_nothing() {
    let dist = run_query(&Query::new(toy(), Strategy::Ordered, 0.0)).expect("query");
    assert!(dist.is_empty());
    let layered = run_query(&Query::new(toy(), Strategy::Layered, 0.0)).expect("query");
    assert!(layered.is_empty());
}

#[test]
fn untrimmed_layered_keeps_whole_rounds() {
    let specs = common::water();
    let opts = QueryOpts {
        trim: false,
        ..QueryOpts::default()
    };
    let untrimmed = execute(
        &Query::new(specs.clone(), Strategy::Layered, 0.9999).with_opts(opts),
        &CancelToken::new(),
    )
    .expect("query");
    let trimmed =
        execute(&Query::new(specs, Strategy::Layered, 0.9999), &CancelToken::new()).expect("query");
    assert!(untrimmed.distribution.len() >= trimmed.distribution.len());
    assert_eq!(untrimmed.stats.trimmed, 0);
    assert_eq!(
        trimmed.stats.trimmed,
        untrimmed.distribution.len() - trimmed.distribution.len()
    );
}

#[test]
fn empty_composition_has_one_empty_row() {
    let dist = run_query(&Query::new(Vec::new(), Strategy::Ordered, 0.5)).expect("query");
    assert_eq!(dist.len(), 1);
    assert_eq!(dist.width(), 0);
    assert_eq!(dist.masses(), &[0.0]);
    assert_eq!(dist.lprobs(), &[0.0]);
}

#[test]
fn zero_atom_element_contributes_a_zero_row() {
    let mut specs = toy();
    specs.push(iso_engine::ElementSpec::new(0, vec![12.0, 13.0], vec![0.99, 0.01]));
    let dist = run_query(&Query::new(specs, Strategy::Ordered, 0.99)).expect("query");
    assert_eq!(dist.width(), 4);
    assert_eq!(dist.row_split(0), vec![&[2u32, 0][..], &[0u32, 0][..]]);
}
