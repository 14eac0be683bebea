//! Resonance amplification of the energy transfer when an external driving
//! frequency approaches the lattice's Debye frequency.

use crate::core::constants::{BOLTZMANN, HBAR};
use serde::{Deserialize, Serialize};

pub const DEFAULT_EXTERNAL_FREQUENCY: f64 = 1e6;
pub const DEFAULT_DAMPING: f64 = 1e-3;
pub const DEFAULT_EMPIRICAL_GAIN: f64 = 1.0;
/// Natural frequency assumed for species without a Debye temperature [rad/s].
pub const FALLBACK_NATURAL_FREQUENCY: f64 = 1e6;
pub const MAX_AMPLIFICATION: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResonanceInput {
    /// Driving angular frequency [rad/s].
    pub external_frequency: f64,
    /// Natural angular frequency [rad/s]; derived from the Debye temperature when absent.
    pub natural_frequency: Option<f64>,
    pub empirical_gain: f64,
    /// Dimensionless damping ψ.
    pub damping: f64,
}

impl Default for ResonanceInput {
    fn default() -> Self {
        Self {
            external_frequency: DEFAULT_EXTERNAL_FREQUENCY,
            natural_frequency: None,
            empirical_gain: DEFAULT_EMPIRICAL_GAIN,
            damping: DEFAULT_DAMPING,
        }
    }
}

/// Debye angular frequency `k_B θ_D / ħ`.
#[inline]
pub fn debye_frequency(debye_temperature: f64) -> f64 {
    BOLTZMANN * debye_temperature / HBAR
}

/// Natural frequency for a species: explicit value, else the Debye
/// frequency, else the fallback.
pub fn natural_frequency(input: &ResonanceInput, debye_temperature: Option<f64>) -> f64 {
    input.natural_frequency.unwrap_or_else(|| {
        debye_temperature
            .filter(|t| t.is_finite() && *t > 0.0)
            .map(debye_frequency)
            .unwrap_or(FALLBACK_NATURAL_FREQUENCY)
    })
}

/// `ξ = 1 + min(ξ_emp · r / ((r − 1)² + ψ²), 100)` with `r = ω_ext / ω0`.
///
/// Always in `[1, 101]`; degenerate frequencies give 1.
pub fn compute_xi(input: &ResonanceInput, debye_temperature: Option<f64>) -> f64 {
    let omega0 = natural_frequency(input, debye_temperature);
    let omega = input.external_frequency;
    if !(omega.is_finite() && omega > 0.0 && omega0.is_finite() && omega0 > 0.0) {
        return 1.0;
    }

    let ratio = omega / omega0;
    let psi = input.damping;
    let denominator = (ratio - 1.0).powi(2) + psi * psi;
    let gain = if denominator > 0.0 {
        input.empirical_gain * ratio / denominator
    } else {
        MAX_AMPLIFICATION
    };
    let xi = 1.0 + gain.min(MAX_AMPLIFICATION);
    if xi.is_finite() {
        xi.clamp(1.0, 1.0 + MAX_AMPLIFICATION)
    } else {
        1.0
    }
}
