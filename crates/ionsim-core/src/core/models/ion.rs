use crate::core::constants::ELEMENTARY_CHARGE;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IonSpecies {
    pub name: String,
    /// Ion mass [kg].
    pub mass: f64,
    /// Charge state in multiples of the elementary charge.
    pub charge: i32,
}

impl IonSpecies {
    pub fn new(name: &str, mass: f64, charge: i32) -> Self {
        Self {
            name: name.to_string(),
            mass,
            charge,
        }
    }

    /// Charge in coulombs.
    #[inline]
    pub fn charge_c(&self) -> f64 {
        self.charge as f64 * ELEMENTARY_CHARGE
    }
}
