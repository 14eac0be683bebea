//! Surface-treatment estimates: local ion-flux velocity, fluence, deposited
//! layer thickness and a penalty functional for thickness uniformity.

use crate::core::error::{InputError, require_positive};
use crate::core::numerics::guards::finite_or;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluxVelocityParams {
    /// Velocity scale `v0`.
    pub base_velocity: f64,
    pub incidence_angle_deg: f64,
    /// Distance from the beam axis [m].
    pub radius: f64,
    /// Characteristic radius `r0` [m].
    pub reference_radius: f64,
    /// Ion energy [J].
    pub ion_energy: f64,
    pub screening_factor: f64,
    /// Angular exponent at zero pressure.
    pub gamma0: f64,
    /// Pressure sensitivity of the angular exponent.
    pub gamma_slope: f64,
    /// Pressure [Pa]; also the radial decay exponent.
    pub pressure: f64,
}

/// `v0 · cos(θ)^γ · (1 + r/r0)^(−p) · E · f_screen` with `γ = γ0 + k·p`,
/// never negative.
pub fn local_flux_velocity(params: &FluxVelocityParams) -> Result<f64, InputError> {
    let r0 = require_positive("reference_radius", params.reference_radius)?;
    let gamma = params.gamma0 + params.gamma_slope * params.pressure;
    let cos = params.incidence_angle_deg.to_radians().cos().max(0.0);
    let radial = (1.0 + params.radius / r0).powf(-params.pressure);
    let v = params.base_velocity
        * cos.powf(gamma)
        * radial
        * params.ion_energy
        * params.screening_factor;
    Ok(finite_or(v, 0.0).max(0.0))
}

/// Rectangle-rule fluence `Σ v_i · Δt`.
pub fn integrate_fluence(velocities: &[f64], dt: f64) -> f64 {
    velocities.iter().map(|v| v * dt).sum()
}

/// `k_dose · F · k_θ · k_T`.
#[inline]
pub fn layer_thickness(fluence: f64, dose_factor: f64, angle_factor: f64, temperature_factor: f64) -> f64 {
    dose_factor * fluence * angle_factor * temperature_factor
}

/// `C + Σ_i w_i · max(0, max_xy(c_i − h_xy))²`.
///
/// Each constraint `c_i` is a minimum thickness; the penalty grows with the
/// worst shortfall anywhere on the map.
pub fn regularized_functional(
    uniformity_cost: f64,
    thickness: &[Vec<f64>],
    constraints: &[f64],
    weights: &[f64],
) -> Result<f64, InputError> {
    if weights.len() != constraints.len() {
        return Err(InputError::LengthMismatch {
            name: "weights",
            len: weights.len(),
            expected: constraints.len(),
        });
    }
    let cols = thickness.first().map_or(0, Vec::len);
    if let Some((row, values)) = thickness.iter().enumerate().find(|(_, r)| r.len() != cols) {
        return Err(InputError::RaggedField {
            row,
            len: values.len(),
            expected: cols,
        });
    }

    let penalty: f64 = constraints
        .iter()
        .zip(weights)
        .map(|(&c, &w)| {
            let shortfall = thickness
                .iter()
                .flatten()
                .fold(0.0_f64, |worst, &h| worst.max(c - h));
            w * shortfall * shortfall
        })
        .sum();
    Ok(uniformity_cost + penalty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> FluxVelocityParams {
        FluxVelocityParams {
            base_velocity: 2.0,
            incidence_angle_deg: 0.0,
            radius: 0.0,
            reference_radius: 0.01,
            ion_energy: 3.0,
            screening_factor: 0.5,
            gamma0: 1.0,
            gamma_slope: 0.1,
            pressure: 10.0,
        }
    }

    #[test]
    fn on_axis_normal_incidence_is_the_product_of_scales() {
        assert!((local_flux_velocity(&params()).unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn velocity_decays_with_radius_and_angle() {
        let mut off_axis = params();
        off_axis.radius = 0.01;
        let v = local_flux_velocity(&off_axis).unwrap();
        assert!((v - 3.0 * 2f64.powf(-10.0)).abs() < 1e-12);

        let mut tilted = params();
        tilted.incidence_angle_deg = 60.0;
        // γ = 1 + 0.1 · 10 = 2
        assert!((local_flux_velocity(&tilted).unwrap() - 0.75).abs() < 1e-12);

        tilted.incidence_angle_deg = 120.0;
        assert_eq!(local_flux_velocity(&tilted).unwrap(), 0.0);
    }

    #[test]
    fn overflowing_velocity_collapses_to_zero() {
        let mut hot = params();
        hot.ion_energy = f64::INFINITY;
        assert_eq!(local_flux_velocity(&hot).unwrap(), 0.0);
    }

    #[test]
    fn fluence_and_thickness_are_linear() {
        let fluence = integrate_fluence(&[1.0, 2.0, 3.0], 0.5);
        assert_eq!(fluence, 3.0);
        assert_eq!(layer_thickness(fluence, 2.0, 0.5, 4.0), 12.0);
        assert_eq!(integrate_fluence(&[], 1.0), 0.0);
    }

    #[test]
    fn functional_penalizes_the_worst_shortfall() {
        let thickness = vec![vec![1.0, 2.0], vec![3.0, 0.5]];
        let value = regularized_functional(0.25, &thickness, &[1.5, 0.2], &[2.0, 10.0]).unwrap();
        // Constraint 1.5 is missed by 1.0 at the thinnest cell; 0.2 is met everywhere.
        assert!((value - 2.25).abs() < 1e-12);
    }

    #[test]
    fn functional_validates_shapes() {
        assert!(matches!(
            regularized_functional(0.0, &[vec![1.0]], &[1.0, 2.0], &[1.0]),
            Err(InputError::LengthMismatch { .. })
        ));
        assert!(matches!(
            regularized_functional(0.0, &[vec![1.0], vec![]], &[1.0], &[1.0]),
            Err(InputError::RaggedField { row: 1, .. })
        ));
    }
}
