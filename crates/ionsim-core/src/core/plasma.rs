//! Derived discharge parameters.

use crate::core::constants::{ELECTRON_MASS, ELEMENTARY_CHARGE, ev_to_joule};
use crate::core::error::{InputError, require_finite, require_in_range, require_positive};
use crate::core::models::config::SimulationConfig;
use crate::core::models::ion::IonSpecies;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlasmaParameters {
    /// Electron density [m⁻³].
    pub electron_density: f64,
    /// Electron velocity after falling through the discharge voltage [m/s].
    pub electron_velocity: f64,
    /// Current density at the target [A/m²].
    pub current_density: f64,
    /// Kinetic energy of an ion hitting the target [J].
    pub ion_energy: f64,
    /// Ion flux [m⁻² s⁻¹].
    pub ion_flux: f64,
    /// Ion fluence over the exposure [m⁻²].
    pub fluence: f64,
    pub voltage: f64,
    pub pressure: f64,
    /// Electron temperature [eV].
    pub electron_temperature: f64,
}

pub fn compute_plasma(
    config: &SimulationConfig,
    ion: &IonSpecies,
) -> Result<PlasmaParameters, InputError> {
    let voltage = require_finite("voltage", config.voltage)?;
    let pressure = require_in_range("pressure", config.pressure, 0.0, f64::MAX)?;
    let te = require_positive("electron_temperature", config.electron_temperature)?;
    let width = require_positive("chamber_width", config.chamber_width)?;
    let depth = require_positive("chamber_depth", config.chamber_depth)?;
    let exposure = require_positive("exposure_time", config.exposure_time)?;
    let current = require_finite("current", config.current)?;
    let z = require_positive("ion_charge", ion.charge.unsigned_abs() as f64)?;

    let electron_density = pressure / (ELEMENTARY_CHARGE * te);
    let electron_velocity = (2.0 * ELEMENTARY_CHARGE * voltage.abs() / ELECTRON_MASS).sqrt();
    let current_density = current / (width * depth);

    let ion_energy = match config.ion_energy_override {
        Some(ev) => ev_to_joule(require_in_range("ion_energy_override", ev, 0.0, f64::MAX)?),
        None => z * ELEMENTARY_CHARGE * voltage.abs(),
    };

    let ion_flux = current_density.abs() / (z * ELEMENTARY_CHARGE);

    Ok(PlasmaParameters {
        electron_density,
        electron_velocity,
        current_density,
        ion_energy,
        ion_flux,
        fluence: ion_flux * exposure,
        voltage,
        pressure,
        electron_temperature: te,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::joule_to_ev;

    fn argon() -> IonSpecies {
        IonSpecies::new("Ar+", 6.634e-26, 1)
    }

    #[test]
    fn ion_energy_is_charge_times_voltage() {
        let config = SimulationConfig::glow_discharge(500.0, 10.0);
        let plasma = compute_plasma(&config, &argon()).unwrap();
        assert!((joule_to_ev(plasma.ion_energy) - 500.0).abs() < 1e-9);

        let doubly = IonSpecies::new("Ar2+", 6.634e-26, 2);
        let plasma = compute_plasma(&config, &doubly).unwrap();
        assert!((joule_to_ev(plasma.ion_energy) - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn override_replaces_ion_energy_estimate() {
        let mut config = SimulationConfig::glow_discharge(500.0, 10.0);
        config.ion_energy_override = Some(120.0);
        let plasma = compute_plasma(&config, &argon()).unwrap();
        assert!((joule_to_ev(plasma.ion_energy) - 120.0).abs() < 1e-9);
    }

    #[test]
    fn flux_and_fluence_follow_current_density() {
        let config = SimulationConfig::glow_discharge(500.0, 10.0);
        let plasma = compute_plasma(&config, &argon()).unwrap();
        // 0.5 A over 0.1 m × 0.1 m
        assert!((plasma.current_density - 50.0).abs() < 1e-12);
        let flux = 50.0 / ELEMENTARY_CHARGE;
        assert!((plasma.ion_flux / flux - 1.0).abs() < 1e-12);
        assert!((plasma.fluence / (flux * 10.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn electron_density_uses_electron_temperature_in_ev() {
        let config = SimulationConfig::glow_discharge(500.0, 10.0);
        let plasma = compute_plasma(&config, &argon()).unwrap();
        let expected = 100.0 / (ELEMENTARY_CHARGE * 2.0);
        assert!((plasma.electron_density / expected - 1.0).abs() < 1e-12);
        assert!(plasma.electron_velocity > 1e7);
    }

    #[test]
    fn neutral_projectiles_and_degenerate_chambers_are_rejected() {
        let config = SimulationConfig::glow_discharge(500.0, 10.0);
        let neutral = IonSpecies::new("Ar", 6.634e-26, 0);
        assert!(matches!(
            compute_plasma(&config, &neutral),
            Err(InputError::NonPositive { name: "ion_charge", .. })
        ));

        let mut config = SimulationConfig::glow_discharge(500.0, 10.0);
        config.chamber_width = 0.0;
        assert!(compute_plasma(&config, &argon()).is_err());

        let config = SimulationConfig::glow_discharge(500.0, 0.0);
        assert!(matches!(
            compute_plasma(&config, &argon()),
            Err(InputError::NonPositive { name: "exposure_time", .. })
        ));
    }
}
