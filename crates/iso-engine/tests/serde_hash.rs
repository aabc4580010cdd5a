mod common;

use common::{lipid_like, toy, water};
use iso_engine::{
    canonical_distribution_hash, from_bytes, from_json, hash_query, query_from_json,
    query_to_json, run_query, to_bytes, to_canonical_json_bytes, to_json, IsoDistribution,
    IsoError, Query, QueryOpts, Strategy,
};

#[test]
fn distribution_json_roundtrip_is_identical() {
    let dist = run_query(&Query::new(water(), Strategy::Ordered, 0.99999)).expect("query");
    let json = to_json(&dist).expect("json");
    let restored = from_json(&json).expect("parse");
    assert_eq!(dist, restored);

    let bytes = to_bytes(&dist).expect("bytes");
    assert_eq!(from_bytes(&bytes).expect("decode"), dist);
}

#[test]
fn misaligned_documents_are_rejected() {
    let doc = r#"{"isotope_numbers":[2],"masses":[2.0,3.0],"lprobs":[-0.2],"counts":[2,0,1,1]}"#;
    let err = from_json(doc).expect_err("misaligned");
    assert!(matches!(err, IsoError::Serde(_)));
    assert_eq!(err.code(), "malformed-distribution");

    let err = IsoDistribution::from_parts(vec![2], vec![2.0], vec![-0.2], vec![2])
        .expect_err("short counts");
    assert_eq!(err.code(), "malformed-distribution");
}

#[test]
fn query_documents_roundtrip_with_defaults() {
    let doc = r#"{
        "elements": [{"atom_count": 2, "masses": [1.0, 2.0], "probabilities": [0.9, 0.1]}],
        "strategy": "threshold_relative",
        "stop_condition": 0.1
    }"#;
    let query = query_from_json(doc).expect("parse");
    assert_eq!(query.strategy, Strategy::ThresholdRelative);
    assert_eq!(query.opts, QueryOpts::default());
    assert_eq!(query.elements, toy());
    let again = query_from_json(&query_to_json(&query).expect("json")).expect("reparse");
    assert_eq!(query, again);
}

#[test]
fn repeated_queries_hash_identically() {
    for strategy in Strategy::ALL {
        let stop = if strategy.is_threshold() { 1e-4 } else { 0.99 };
        let query = Query::new(lipid_like(), strategy, stop);
        let first = canonical_distribution_hash(&run_query(&query).expect("first"));
        let second = canonical_distribution_hash(&run_query(&query).expect("second"));
        assert_eq!(first, second, "{strategy}");
        assert_eq!(first.len(), 64);
    }
}

#[test]
fn hash_ignores_row_order_only() {
    let ordered = run_query(&Query::new(toy(), Strategy::Ordered, 0.99)).expect("ordered");
    let threshold =
        run_query(&Query::new(toy(), Strategy::ThresholdAbsolute, 0.05)).expect("threshold");
    assert_eq!(
        canonical_distribution_hash(&ordered),
        canonical_distribution_hash(&threshold)
    );
    let wider = run_query(&Query::new(toy(), Strategy::Ordered, 1.0)).expect("all");
    assert_ne!(
        canonical_distribution_hash(&ordered),
        canonical_distribution_hash(&wider)
    );
}

#[test]
fn query_hash_tracks_options() {
    let query = Query::new(toy(), Strategy::Layered, 0.9);
    let untrimmed = query.clone().with_opts(QueryOpts {
        trim: false,
        ..QueryOpts::default()
    });
    assert_eq!(hash_query(&query).expect("hash"), hash_query(&query.clone()).expect("hash"));
    assert_ne!(hash_query(&query).expect("hash"), hash_query(&untrimmed).expect("hash"));
    let bytes = to_canonical_json_bytes(&query).expect("bytes");
    assert!(bytes.starts_with(br#"{"elements":"#));
}
