#![allow(dead_code)]

use iso_core::Composition;
use iso_engine::{ElementSpec, MarginalOpts, MarginalSet};
use proptest::prelude::*;

/// One element, two atoms, isotopes (1.0, 0.9) and (2.0, 0.1).
pub fn toy() -> Vec<ElementSpec> {
    vec![ElementSpec::new(2, vec![1.0, 2.0], vec![0.9, 0.1])]
}

pub fn water() -> Vec<ElementSpec> {
    vec![
        ElementSpec::new(2, vec![1.00782503207, 2.0141017778], vec![0.999885, 0.000115]),
        ElementSpec::new(
            1,
            vec![15.99491461956, 16.9991317, 17.999161],
            vec![0.99757, 0.00038, 0.00205],
        ),
    ]
}

/// C60 H122 O4 S with natural abundances.
pub fn lipid_like() -> Vec<ElementSpec> {
    vec![
        ElementSpec::new(60, vec![12.0, 13.0033548378], vec![0.9893, 0.0107]),
        ElementSpec::new(122, vec![1.00782503207, 2.0141017778], vec![0.999885, 0.000115]),
        ElementSpec::new(
            4,
            vec![15.99491461956, 16.9991317, 17.999161],
            vec![0.99757, 0.00038, 0.00205],
        ),
        ElementSpec::new(
            1,
            vec![31.97207100, 32.97145876, 33.96786690, 35.96708076],
            vec![0.9493, 0.0076, 0.0429, 0.0002],
        ),
    ]
}

/// C400 H800 O40: a space far too large to enumerate in a test run.
pub fn heavy() -> Vec<ElementSpec> {
    vec![
        ElementSpec::new(400, vec![12.0, 13.0033548378], vec![0.9893, 0.0107]),
        ElementSpec::new(800, vec![1.00782503207, 2.0141017778], vec![0.999885, 0.000115]),
        ElementSpec::new(
            40,
            vec![15.99491461956, 16.9991317, 17.999161],
            vec![0.99757, 0.00038, 0.00205],
        ),
    ]
}

pub fn marginal_set(specs: &[ElementSpec]) -> MarginalSet {
    let composition = Composition::new(specs).expect("composition");
    MarginalSet::build(&composition, &MarginalOpts::default()).expect("marginals")
}

/// Every configuration as (log-probability, flattened counts), in odometer order.
pub fn exhaustive(set: &MarginalSet) -> Vec<(f64, Vec<u32>)> {
    let dims = set.dims();
    let mut indices = vec![0u32; dims];
    let mut out = Vec::new();
    loop {
        let mut counts = Vec::new();
        set.extend_counts(&indices, &mut counts);
        out.push((set.lprob(&indices), counts));
        let mut dim = 0;
        loop {
            if dim == dims {
                return out;
            }
            if set.can_advance(&indices, dim) {
                indices[dim] += 1;
                break;
            }
            indices[dim] = 0;
            dim += 1;
        }
    }
}

fn element_strategy() -> impl Strategy<Value = ElementSpec> {
    (0i64..6, 1usize..4).prop_flat_map(|(atoms, isotopes)| {
        (
            prop::collection::vec(1.0f64..40.0, isotopes),
            prop::collection::vec(0.05f64..1.0, isotopes),
        )
            .prop_map(move |(masses, weights)| {
                let total: f64 = weights.iter().sum();
                let probabilities = weights.iter().map(|w| w / total).collect();
                ElementSpec::new(atoms, masses, probabilities)
            })
    })
}

/// Small random compositions whose full space is cheap to enumerate.
pub fn composition_strategy() -> impl Strategy<Value = Vec<ElementSpec>> {
    prop::collection::vec(element_strategy(), 1..4)
}
