use iso_core::{Composition, ElementSpec, IsoError};
use iso_marginal::MarginalTable;

fn table_for(spec: ElementSpec) -> MarginalTable {
    let composition = Composition::new(&[spec]).unwrap();
    MarginalTable::build(0, &composition.elements()[0], None).unwrap()
}

#[test]
fn two_atom_two_isotope_table_matches_binomial() {
    let table = table_for(ElementSpec::new(2, vec![1.0, 2.0], vec![0.9, 0.1]));
    assert_eq!(table.len(), 3);
    assert_eq!(table.counts(0), &[2, 0]);
    assert_eq!(table.counts(1), &[1, 1]);
    assert_eq!(table.counts(2), &[0, 2]);
    assert!((table.prob(0) - 0.81).abs() < 1e-12);
    assert!((table.prob(1) - 0.18).abs() < 1e-12);
    assert!((table.prob(2) - 0.01).abs() < 1e-12);
    assert_eq!(table.masses(), &[2.0, 3.0, 4.0]);
}

#[test]
fn table_is_sorted_and_normalised() {
    let table = table_for(ElementSpec::new(
        12,
        vec![31.972071, 32.971458, 33.967867, 35.967081],
        vec![0.9499, 0.0075, 0.0425, 0.0001],
    ));
    assert_eq!(table.len(), 455);
    for window in table.lprobs().windows(2) {
        assert!(window[0] >= window[1]);
    }
    for idx in 0..table.len() {
        assert_eq!(table.counts(idx).iter().sum::<u32>(), 12);
    }
    assert!((table.total_prob() - 1.0).abs() < 1e-10);
    assert_eq!(table.mode_lprob(), table.lprob(0));
    assert_eq!(table.smallest_lprob(), table.lprob(table.len() - 1));
}

#[test]
fn ties_keep_lexicographic_descending_order() {
    let table = table_for(ElementSpec::new(1, vec![10.0, 11.0], vec![0.5, 0.5]));
    assert_eq!(table.counts(0), &[1, 0]);
    assert_eq!(table.counts(1), &[0, 1]);
}

#[test]
fn large_atom_counts_do_not_overflow() {
    let table = table_for(ElementSpec::new(
        2000,
        vec![12.0, 13.0033548378],
        vec![0.9893, 0.0107],
    ));
    assert_eq!(table.len(), 2001);
    assert!(table.lprobs().iter().all(|lp| lp.is_finite()));
    assert!((table.total_prob() - 1.0).abs() < 1e-9);
    // mode near n * p
    let mode_c13 = table.counts(0)[1];
    assert!((20..=23).contains(&mode_c13));
}

#[test]
fn prefix_above_cutoff() {
    let table = table_for(ElementSpec::new(2, vec![1.0, 2.0], vec![0.9, 0.1]));
    assert_eq!(table.count_above(0.05f64.ln()), 2);
    assert_eq!(table.prefix_above(f64::NEG_INFINITY).len(), 3);
    assert_eq!(table.count_above(0.0), 0);
}

#[test]
fn zero_atoms_yield_single_empty_configuration() {
    let table = table_for(ElementSpec::new(0, vec![1.0, 2.0], vec![0.9, 0.1]));
    assert_eq!(table.len(), 1);
    assert_eq!(table.counts(0), &[0, 0]);
    assert_eq!(table.lprob(0), 0.0);
    assert_eq!(table.lightest_mass(), 0.0);
}

#[test]
fn entry_cap_fails_fast() {
    let composition =
        Composition::new(&[ElementSpec::new(100, vec![1.0, 2.0, 3.0], vec![0.5, 0.3, 0.2])])
            .unwrap();
    let err = MarginalTable::build(0, &composition.elements()[0], Some(100)).unwrap_err();
    assert!(matches!(err, IsoError::ResourceExhausted(_)));
    assert_eq!(err.code(), "marginal-cap");
    assert_eq!(err.info().context["limit"], "100");
}

#[test]
fn element_mass_statistics() {
    let table = table_for(ElementSpec::new(
        3,
        vec![15.9949146, 16.9991317, 17.999161],
        vec![0.99757, 0.00038, 0.00205],
    ));
    assert!((table.lightest_mass() - 3.0 * 15.9949146).abs() < 1e-9);
    assert!((table.heaviest_mass() - 3.0 * 17.999161).abs() < 1e-9);
    assert!((table.monoisotopic_mass() - 3.0 * 15.9949146).abs() < 1e-9);
    let avg = 3.0 * (15.9949146 * 0.99757 + 16.9991317 * 0.00038 + 17.999161 * 0.00205);
    assert!((table.average_mass() - avg).abs() < 1e-9);
}
