//! Lumped thermal relaxation of the bombarded surface layer.
//!
//! The layer is a single heat capacity (Debye model) exchanging heat with its
//! surroundings through a temperature-dependent conductance, driven by the
//! power the ions deposit.

use crate::core::constants::GAS_CONSTANT;
use crate::core::error::{InputError, require_finite, require_in_range, require_positive};
use crate::core::numerics::quadrature::simpson;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, instrument, warn};

pub const REFERENCE_TEMPERATURE: f64 = 300.0;
pub const MAX_STEPS: usize = 1_000_000;
pub const MAX_SUBSTEPS: usize = 32;
pub const FALLBACK_TIME_STEP: f64 = 1e-3;
const DEBYE_INTERVALS: usize = 512;
const MIN_LAYER_MASS: f64 = 1e-12;
const MIN_HEAT_CAPACITY: f64 = 1e-12;
const MIN_CONDUCTANCE: f64 = 0.1;
const MAX_CONDUCTANCE: f64 = 1e6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThermalMode {
    /// Debye heat capacity, temperature-dependent conductance, deposited power.
    #[default]
    Debye,
    /// Pure exponential relaxation toward ambient.
    Lumped,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalInput {
    pub initial_temperature: f64,
    pub total_time: f64,
    pub dt: f64,
    /// Layer thickness [m].
    pub thickness: f64,
    /// Exchange area [m²].
    pub area: f64,
    /// Density [kg/m³].
    pub density: f64,
    /// Conductivity at the reference temperature [W/(m·K)].
    pub conductivity: f64,
    pub debye_temperature: Option<f64>,
    /// Molar mass [kg/mol].
    pub molar_mass: f64,
    pub structure_factor: f64,
    pub potential_factor: f64,
    /// Multiplier on the exchange area.
    pub relief_factor: f64,
    /// Deposited power [W].
    pub power_input: f64,
    pub ambient_temperature: f64,
    pub mode: ThermalMode,
    /// Relaxation rate for [`ThermalMode::Lumped`] [1/s]; derived at `T0`
    /// when absent.
    pub relaxation_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThermalTrace {
    pub temperatures: Vec<f64>,
    pub min: f64,
    pub avg: f64,
    pub max: f64,
    /// Output spacing actually used [s].
    pub dt: f64,
}

impl ThermalTrace {
    fn from_temperatures(temperatures: Vec<f64>, dt: f64) -> Self {
        let (min, max, sum) = temperatures.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), &t| (min.min(t), max.max(t), sum + t),
        );
        let avg = sum / temperatures.len().max(1) as f64;
        Self {
            temperatures,
            min,
            avg,
            max,
            dt,
        }
    }

    pub fn final_temperature(&self) -> f64 {
        self.temperatures.last().copied().unwrap_or(self.avg)
    }
}

/// Molar heat capacity `C_v(T)` [J/(mol·K)] from the Debye model.
///
/// Without a Debye temperature the Dulong-Petit value `3R` is returned.
pub fn debye_heat_capacity(temperature: f64, debye_temperature: Option<f64>) -> f64 {
    if !(temperature > 0.0) || !temperature.is_finite() {
        return 0.0;
    }
    let Some(theta) = debye_temperature.filter(|t| t.is_finite() && *t > 0.0) else {
        return 3.0 * GAS_CONSTANT;
    };

    let x_max = theta / temperature;
    let reduced = (temperature / theta).powi(3);
    if x_max < 1e-6 {
        3.0 * GAS_CONSTANT
    } else if x_max > 50.0 {
        12.0 * PI.powi(4) / 5.0 * GAS_CONSTANT * reduced
    } else {
        let integral = simpson(debye_integrand, 0.0, x_max, DEBYE_INTERVALS);
        9.0 * GAS_CONSTANT * reduced * integral
    }
}

fn debye_integrand(x: f64) -> f64 {
    if x < 1e-8 {
        return x * x;
    }
    let ex = x.exp();
    let denom = ex - 1.0;
    x.powi(4) * ex / (denom * denom)
}

struct LayerModel<'a> {
    input: &'a ThermalInput,
    mass: f64,
    exchange_area: f64,
}

impl LayerModel<'_> {
    fn heat_capacity(&self, temperature: f64) -> f64 {
        let specific = debye_heat_capacity(temperature, self.input.debye_temperature)
            / self.input.molar_mass;
        (specific * self.mass).max(MIN_HEAT_CAPACITY)
    }

    /// Conductance per unit area `h = λ(T)/thickness` [W/(m²·K)].
    fn conductance(&self, temperature: f64) -> f64 {
        let ratio = if temperature > 0.0 {
            (REFERENCE_TEMPERATURE / temperature).clamp(0.2, 5.0)
        } else {
            5.0
        };
        let lambda = self.input.conductivity
            * self.input.structure_factor
            * self.input.potential_factor
            * ratio;
        let h = lambda / self.input.thickness;
        if h.is_nan() {
            MIN_CONDUCTANCE
        } else {
            h.clamp(MIN_CONDUCTANCE, MAX_CONDUCTANCE)
        }
    }

    /// Total conductance `h·A_eff` [W/K] and time constant `C/(h·A_eff)` [s].
    fn coefficients(&self, temperature: f64) -> (f64, f64) {
        let ha = self.conductance(temperature) * self.exchange_area;
        (ha, self.heat_capacity(temperature) / ha)
    }
}

#[instrument(skip_all, name = "thermal_relaxation", fields(mode = ?input.mode))]
pub fn simulate_cooling(input: &ThermalInput) -> Result<ThermalTrace, InputError> {
    let t0 = require_in_range("initial_temperature", input.initial_temperature, 0.0, f64::MAX)?;
    let t_env = require_in_range("ambient_temperature", input.ambient_temperature, 0.0, f64::MAX)?;
    let total_time = require_in_range("total_time", input.total_time, 0.0, f64::MAX)?;
    let thickness = require_positive("thickness", input.thickness)?;
    let area = require_positive("area", input.area)?;
    let density = require_positive("density", input.density)?;
    require_positive("molar_mass", input.molar_mass)?;
    require_finite("conductivity", input.conductivity)?;
    let power = require_finite("power_input", input.power_input)?;

    let mut dt = if input.dt.is_finite() && input.dt > 0.0 {
        input.dt
    } else {
        warn!(dt = input.dt, "Non-positive thermal step; using the fallback.");
        FALLBACK_TIME_STEP
    };
    if (total_time / dt).ceil() > MAX_STEPS as f64 {
        let enlarged = total_time / MAX_STEPS as f64;
        warn!(from = dt, to = enlarged, "Thermal step cap reached; enlarging dt.");
        dt = enlarged;
    }
    let steps = (total_time / dt).ceil() as usize;

    let model = LayerModel {
        input,
        mass: (density * area * thickness).max(MIN_LAYER_MASS),
        exchange_area: area * (1.0 + input.relief_factor.clamp(0.0, 1.0)),
    };

    let mut temperatures = Vec::with_capacity(steps + 1);
    temperatures.push(t0);

    match input.mode {
        ThermalMode::Lumped => {
            let rate = match input.relaxation_rate {
                Some(rate) => require_in_range("relaxation_rate", rate, 0.0, f64::MAX)?,
                None => {
                    let (_, tau) = model.coefficients(t0);
                    1.0 / tau
                }
            };
            debug!(rate, steps, "Lumped relaxation.");
            for j in 1..=steps {
                let t = t_env + (t0 - t_env) * (-rate * j as f64 * dt).exp();
                temperatures.push(sanitize(t, t_env));
            }
        }
        ThermalMode::Debye => {
            let mut t = t0;
            for _ in 0..steps {
                let (_, tau) = model.coefficients(t);
                let substeps = ((dt / tau).ceil() as usize).clamp(1, MAX_SUBSTEPS);
                let h_sub = dt / substeps as f64;
                for _ in 0..substeps {
                    let (ha, tau) = model.coefficients(t);
                    let t_eq = t_env + power / ha;
                    t = sanitize(t_eq + (t - t_eq) * (-h_sub / tau).exp(), t_env);
                }
                temperatures.push(t);
            }
        }
    }

    let trace = ThermalTrace::from_temperatures(temperatures, dt);
    debug!(
        final_temperature = trace.final_temperature(),
        min = trace.min,
        max = trace.max,
        "Thermal trace computed."
    );
    Ok(trace)
}

#[inline]
fn sanitize(t: f64, fallback: f64) -> f64 {
    if t.is_nan() { fallback } else { t.max(0.0) }
}
