use serde::{Deserialize, Serialize};

/// Optional overrides of the thermal material properties.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalOverrides {
    /// Thermal conductivity [W/(m·K)].
    pub conductivity: Option<f64>,
    /// Density [kg/m³].
    pub density: Option<f64>,
    /// Ambient temperature [K].
    pub ambient_temperature: Option<f64>,
}

/// Optional overrides of the diffusion coefficient chain.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffusionOverrides {
    /// Prefactor of the first channel [m²/s].
    pub d1: Option<f64>,
    /// Prefactor of the second channel [m²/s].
    pub d2: Option<f64>,
    /// Activation energy of the first channel [J/mol].
    pub q1: Option<f64>,
    /// Activation energy of the second channel [J/mol].
    pub q2: Option<f64>,
    /// Surface concentration used as the Dirichlet boundary value.
    pub surface_concentration: Option<f64>,
}

/// Plasma chamber and exposure settings for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Discharge voltage [V].
    pub voltage: f64,
    /// Discharge current [A].
    pub current: f64,
    /// Chamber pressure [Pa].
    pub pressure: f64,
    /// Electron temperature [eV].
    pub electron_temperature: f64,
    pub chamber_width: f64,
    pub chamber_height: f64,
    pub chamber_depth: f64,
    /// Anode-to-target distance [m].
    pub electrode_distance: f64,
    /// Exposure time [s].
    pub exposure_time: f64,
    /// Angle between the beam and the surface normal [deg].
    #[serde(default)]
    pub incidence_angle: f64,
    /// Surface binding energy [eV].
    #[serde(default = "default_binding_energy")]
    pub surface_binding_energy: f64,
    /// Ion energy [eV]; when set it replaces the charge × voltage estimate.
    #[serde(default)]
    pub ion_energy_override: Option<f64>,
    #[serde(default)]
    pub thermal: ThermalOverrides,
    #[serde(default)]
    pub diffusion: DiffusionOverrides,
}

fn default_binding_energy() -> f64 {
    4.0
}

impl SimulationConfig {
    /// A DC glow-discharge configuration used as a starting point by tests and
    /// examples in the documentation.
    pub fn glow_discharge(voltage: f64, exposure_time: f64) -> Self {
        Self {
            voltage,
            current: 0.5,
            pressure: 100.0,
            electron_temperature: 2.0,
            chamber_width: 0.1,
            chamber_height: 0.1,
            chamber_depth: 0.1,
            electrode_distance: 0.05,
            exposure_time,
            incidence_angle: 0.0,
            surface_binding_energy: default_binding_energy(),
            ion_energy_override: None,
            thermal: ThermalOverrides::default(),
            diffusion: DiffusionOverrides::default(),
        }
    }
}
