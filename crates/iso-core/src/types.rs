use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, IsoError};

/// A single isotope of an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Isotope {
    /// Atomic mass of the isotope.
    pub mass: f64,
    /// Natural abundance, in `(0, 1]`.
    pub probability: f64,
}

impl Isotope {
    /// Creates a new isotope descriptor.
    pub fn new(mass: f64, probability: f64) -> Self {
        Self { mass, probability }
    }

    /// Natural logarithm of the abundance.
    pub fn log_probability(&self) -> f64 {
        self.probability.ln()
    }
}

/// Unvalidated element description as supplied by a caller.
///
/// Mirrors the external query shape: parallel mass and probability lists and a
/// signed atom count, so that malformed input can be reported rather than
/// rejected by the type system at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    /// Number of atoms of this element in the molecule.
    pub atom_count: i64,
    /// Isotope masses, one per isotope.
    pub masses: Vec<f64>,
    /// Isotope abundances, aligned with `masses`.
    pub probabilities: Vec<f64>,
}

impl ElementSpec {
    /// Creates a new element description.
    pub fn new(atom_count: i64, masses: Vec<f64>, probabilities: Vec<f64>) -> Self {
        Self {
            atom_count,
            masses,
            probabilities,
        }
    }
}

/// Validated element: an atom count and an ordered list of isotopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    atom_count: u32,
    isotopes: Vec<Isotope>,
}

impl Element {
    /// Validates a caller supplied description; `index` only feeds diagnostics.
    pub fn from_spec(index: usize, spec: &ElementSpec) -> Result<Self, IsoError> {
        let invalid = |code: &str, message: &str| {
            IsoError::InvalidComposition(
                ErrorInfo::new(code, message).with_context("element", index),
            )
        };

        if spec.atom_count < 0 {
            return Err(IsoError::InvalidComposition(
                ErrorInfo::new("negative-atom-count", "atom count must be non-negative")
                    .with_context("element", index)
                    .with_context("atom_count", spec.atom_count),
            ));
        }
        let atom_count = u32::try_from(spec.atom_count).map_err(|_| {
            IsoError::InvalidComposition(
                ErrorInfo::new("atom-count-overflow", "atom count does not fit in 32 bits")
                    .with_context("element", index)
                    .with_context("atom_count", spec.atom_count),
            )
        })?;
        if spec.masses.len() != spec.probabilities.len() {
            return Err(IsoError::InvalidComposition(
                ErrorInfo::new(
                    "isotope-length-mismatch",
                    "mass and probability lists differ in length",
                )
                .with_context("element", index)
                .with_context("masses", spec.masses.len())
                .with_context("probabilities", spec.probabilities.len()),
            ));
        }
        if spec.masses.is_empty() && atom_count > 0 {
            return Err(invalid(
                "no-isotopes",
                "an element with atoms needs at least one isotope",
            ));
        }
        if spec.masses.len() > u32::MAX as usize {
            return Err(invalid("too-many-isotopes", "isotope list is too long"));
        }

        let mut isotopes = Vec::with_capacity(spec.masses.len());
        for (iso, (&mass, &probability)) in spec.masses.iter().zip(&spec.probabilities).enumerate()
        {
            if !mass.is_finite() || mass < 0.0 {
                return Err(IsoError::InvalidComposition(
                    ErrorInfo::new("bad-mass", "isotope mass must be finite and non-negative")
                        .with_context("element", index)
                        .with_context("isotope", iso)
                        .with_context("mass", mass),
                ));
            }
            if !(probability > 0.0 && probability <= 1.0) {
                return Err(IsoError::InvalidComposition(
                    ErrorInfo::new("bad-probability", "isotope probability must lie in (0, 1]")
                        .with_context("element", index)
                        .with_context("isotope", iso)
                        .with_context("probability", probability),
                ));
            }
            isotopes.push(Isotope::new(mass, probability));
        }

        Ok(Self {
            atom_count,
            isotopes,
        })
    }

    /// Number of atoms of this element.
    pub fn atom_count(&self) -> u32 {
        self.atom_count
    }

    /// Isotopes in caller order.
    pub fn isotopes(&self) -> &[Isotope] {
        &self.isotopes
    }

    /// Number of isotopes, i.e. the width of this element's count vectors.
    pub fn isotope_count(&self) -> usize {
        self.isotopes.len()
    }
}

/// An ordered, validated list of elements making up one molecule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    elements: Vec<Element>,
}

impl Composition {
    /// Validates every element of a caller supplied composition.
    pub fn new(specs: &[ElementSpec]) -> Result<Self, IsoError> {
        let elements = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| Element::from_spec(index, spec))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { elements })
    }

    /// Elements in caller order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true when the composition holds no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Isotope counts per element, in element order.
    pub fn isotope_numbers(&self) -> Vec<usize> {
        self.elements.iter().map(Element::isotope_count).collect()
    }

    /// Total width of a configuration row.
    pub fn total_isotopes(&self) -> usize {
        self.elements.iter().map(Element::isotope_count).sum()
    }
}
