//! Closed-form pair potentials and their stiffness estimates.
//!
//! Energies are in joules, lengths in metres and stiffnesses in N/m.

/// Screened Coulomb (Yukawa) energy. `coupling` is `Z·e²/(4πε₀)` in J·m; an
/// infinite `screening_length` gives the bare Coulomb term.
#[inline]
pub fn screened_coulomb(r: f64, coupling: f64, screening_length: f64) -> f64 {
    let screening = if screening_length.is_finite() {
        (-r / screening_length).exp()
    } else {
        1.0
    };
    coupling / r * screening
}

#[inline]
pub fn born_mayer(r: f64, amplitude: f64, length: f64) -> f64 {
    amplitude * (-r / length).exp()
}

#[inline]
pub fn born_mayer_stiffness(value: f64, length: f64) -> f64 {
    value / (length * length)
}

#[inline]
pub fn morse(r: f64, well_depth: f64, alpha: f64, equilibrium: f64) -> f64 {
    let x = 1.0 - (-alpha * (r - equilibrium)).exp();
    well_depth * x * x
}

#[inline]
pub fn morse_stiffness(r: f64, well_depth: f64, alpha: f64, equilibrium: f64) -> f64 {
    2.0 * well_depth * alpha * alpha * (-alpha * (r - equilibrium)).exp()
}

/// Smoothstep complement: 1 at `t = 0`, 0 at `t = 1`, zero slope at both ends.
#[inline]
pub fn hermite_switch(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (3.0 * t * t - 2.0 * t * t * t)
}
