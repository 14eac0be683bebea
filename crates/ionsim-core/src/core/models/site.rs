use crate::core::lattice::structure::CrystalStructure;
use nalgebra::Vector3;
use serde::Serialize;

/// One lattice site produced for a run. Positions are in metres, velocities
/// in m/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatticeSite {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub structure: CrystalStructure,
}

impl LatticeSite {
    pub fn at_rest(position: Vector3<f64>, structure: CrystalStructure) -> Self {
        Self {
            position,
            velocity: Vector3::zeros(),
            structure,
        }
    }

    #[inline]
    pub fn distance_to(&self, other: &LatticeSite) -> f64 {
        (self.position - other.position).norm()
    }
}
