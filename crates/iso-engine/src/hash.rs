use iso_core::IsoError;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::distribution::IsoDistribution;
use crate::params::Query;
use crate::serde::to_canonical_json_bytes;

/// Computes a stable hexadecimal hash for a serializable payload.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, IsoError> {
    let bytes = to_canonical_json_bytes(value)?;
    Ok(format!("{:x}", Sha256::digest(bytes)))
}

/// Hash of a query document, options included.
pub fn hash_query(query: &Query) -> Result<String, IsoError> {
    stable_hash_string(query)
}

/// Order-independent hash of a distribution.
///
/// Rows are hashed in (mass, log-probability, counts) order, so two runs that
/// accept the same configurations hash equally even if they emit them in
/// different orders.
pub fn canonical_distribution_hash(dist: &IsoDistribution) -> String {
    let mut order: Vec<usize> = (0..dist.len()).collect();
    order.sort_by(|&a, &b| {
        dist.masses()[a]
            .total_cmp(&dist.masses()[b])
            .then_with(|| dist.lprobs()[a].total_cmp(&dist.lprobs()[b]))
            .then_with(|| dist.row(a).cmp(dist.row(b)))
    });

    let mut hasher = Sha256::new();
    hasher.update((dist.isotope_numbers().len() as u64).to_le_bytes());
    for &n in dist.isotope_numbers() {
        hasher.update((n as u64).to_le_bytes());
    }
    hasher.update((dist.len() as u64).to_le_bytes());
    for idx in order {
        hasher.update(dist.masses()[idx].to_bits().to_le_bytes());
        hasher.update(dist.lprobs()[idx].to_bits().to_le_bytes());
        for &count in dist.row(idx) {
            hasher.update(count.to_le_bytes());
        }
    }

    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect::<String>()
}
