use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The four crystal structures the model knows how to build and parameterize.
///
/// Every per-structure quantity is a pure function of this tag, so adding a
/// structure means extending each `match` below rather than subclassing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum CrystalStructure {
    Sc,
    Bcc,
    Fcc,
    Hcp,
}

static STRUCTURE_ALIASES: Map<&'static str, CrystalStructure> = phf_map! {
    "SC" => CrystalStructure::Sc,
    "CUBIC" => CrystalStructure::Sc,
    "SIMPLE-CUBIC" => CrystalStructure::Sc,
    "BCC" => CrystalStructure::Bcc,
    "BODY-CENTERED-CUBIC" => CrystalStructure::Bcc,
    "BODY-CENTRED-CUBIC" => CrystalStructure::Bcc,
    "FCC" => CrystalStructure::Fcc,
    "FACE-CENTERED-CUBIC" => CrystalStructure::Fcc,
    "FACE-CENTRED-CUBIC" => CrystalStructure::Fcc,
    "HCP" => CrystalStructure::Hcp,
    "HEXAGONAL-CLOSE-PACKED" => CrystalStructure::Hcp,
};

const SC_BASIS: &[[f64; 3]] = &[[0.0, 0.0, 0.0]];

const BCC_BASIS: &[[f64; 3]] = &[[0.0, 0.0, 0.0], [0.5, 0.5, 0.5]];

const FCC_BASIS: &[[f64; 3]] = &[
    [0.0, 0.0, 0.0],
    [0.0, 0.5, 0.5],
    [0.5, 0.0, 0.5],
    [0.5, 0.5, 0.0],
];

// Two A/B stacking periods of a hexagonal cell folded into the cube; all
// fractions stay in [0, 1) so neighbouring cells never emit the same point.
const HCP_BASIS: &[[f64; 3]] = &[
    [0.0, 0.0, 0.0],
    [2.0 / 3.0, 1.0 / 3.0, 0.25],
    [1.0 / 3.0, 2.0 / 3.0, 0.25],
    [0.0, 0.0, 0.5],
    [2.0 / 3.0, 1.0 / 3.0, 0.75],
    [1.0 / 3.0, 2.0 / 3.0, 0.75],
];

impl CrystalStructure {
    pub const ALL: [CrystalStructure; 4] = [Self::Sc, Self::Bcc, Self::Fcc, Self::Hcp];

    /// Fractional coordinates of the sites in one cubic cell.
    pub fn basis(self) -> &'static [[f64; 3]] {
        match self {
            Self::Sc => SC_BASIS,
            Self::Bcc => BCC_BASIS,
            Self::Fcc => FCC_BASIS,
            Self::Hcp => HCP_BASIS,
        }
    }

    pub fn packing_factor(self) -> f64 {
        match self {
            Self::Sc => 0.52,
            Self::Bcc => 0.68,
            Self::Fcc | Self::Hcp => 0.74,
        }
    }

    /// Nearest-neighbour distance for lattice constant `a` (same unit as `a`).
    ///
    /// HCP uses `a` directly; the real value depends on c/a, which the model
    /// does not carry.
    pub fn nearest_neighbor_distance(self, a: f64) -> f64 {
        match self {
            Self::Sc | Self::Hcp => a,
            Self::Bcc => 3.0_f64.sqrt() / 2.0 * a,
            Self::Fcc => a / 2.0_f64.sqrt(),
        }
    }

    /// Multiplier on kinematic energy transfer in a binary collision.
    pub fn collision_factor(self) -> f64 {
        match self {
            Self::Sc => 1.0,
            Self::Bcc => 1.08,
            Self::Fcc => 1.15,
            Self::Hcp => 1.18,
        }
    }

    /// Relative ease of vacancy-mediated hopping.
    pub fn diffusion_factor(self) -> f64 {
        match self {
            Self::Sc => 1.0,
            Self::Bcc => 0.9,
            Self::Fcc => 0.75,
            Self::Hcp => 0.7,
        }
    }

    pub fn thermal_conductivity_factor(self) -> f64 {
        match self {
            Self::Sc => 1.0,
            Self::Bcc => 1.2,
            Self::Fcc => 1.35,
            Self::Hcp => 1.4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sc => "SC",
            Self::Bcc => "BCC",
            Self::Fcc => "FCC",
            Self::Hcp => "HCP",
        }
    }
}

impl fmt::Display for CrystalStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unsupported crystal structure: '{0}' (expected SC, BCC, FCC or HCP)")]
pub struct ParseStructureError(pub String);

impl FromStr for CrystalStructure {
    type Err = ParseStructureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_uppercase().replace(['_', ' '], "-");
        STRUCTURE_ALIASES
            .get(key.as_str())
            .copied()
            .ok_or_else(|| ParseStructureError(s.to_string()))
    }
}

impl TryFrom<String> for CrystalStructure {
    type Error = ParseStructureError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
