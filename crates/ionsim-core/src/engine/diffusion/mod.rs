//! # Diffusion
//!
//! Enhanced two-channel diffusion of surface species into the target.
//!
//! [`coefficients`] turns material, temperature and bombardment conditions into
//! an effective diffusion coefficient; [`grid`] integrates the 1-D diffusion
//! equation on a depth grid. [`calculate_diffusion_profile`] ties the two
//! together for the three [`DiffusionMode`]s.

pub mod coefficients;
pub mod grid;

use crate::core::error::{InputError, require_in_range, require_positive};
use coefficients::{ArrheniusChannels, CoefficientInputs, DiffusionCoefficients, evaluate_coefficients};
use grid::{GridSpec, StabilityAdjustment, solve_crank_nicolson, solve_explicit};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

pub const ANALYTIC_NODES: usize = 200;
pub const ANALYTIC_SPAN: f64 = 6.0;
pub const MIN_MEAN_DEPTH: f64 = 1e-12;
pub const DEFAULT_DEPTH: f64 = 1e-6;
pub const DEFAULT_DX: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffusionMode {
    /// Exponential profile with the mean diffusion length as decay depth.
    #[default]
    Analytic,
    /// Forward-time, centred-space finite differences.
    Explicit,
    /// Implicit θ-scheme solved with the Thomas algorithm.
    CrankNicolson,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiffusionInput {
    pub channels: ArrheniusChannels,
    /// Conditions at the final (or only) temperature.
    pub conditions: CoefficientInputs,
    /// One temperature per time step; grid modes re-evaluate the coefficient
    /// chain along it.
    pub temperature_profile: Option<Vec<f64>>,
    pub total_time: f64,
    pub mode: DiffusionMode,
    pub depth: f64,
    pub dx: f64,
    pub dt: Option<f64>,
    pub surface_concentration: f64,
}

impl DiffusionInput {
    pub fn new(channels: ArrheniusChannels, conditions: CoefficientInputs, total_time: f64) -> Self {
        Self {
            channels,
            conditions,
            temperature_profile: None,
            total_time,
            mode: DiffusionMode::default(),
            depth: DEFAULT_DEPTH,
            dx: DEFAULT_DX,
            dt: None,
            surface_concentration: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffusionProfile {
    pub d1: f64,
    pub d2: f64,
    pub q1: f64,
    pub q2: f64,
    pub thermal_coefficient: f64,
    pub effective_coefficient: f64,
    /// `√(2 D_eff t)` [m].
    pub mean_depth: f64,
    pub depths: Vec<f64>,
    pub concentrations: Vec<f64>,
    pub mode: DiffusionMode,
    pub adjustments: Vec<StabilityAdjustment>,
    pub theta: Option<f64>,
}

#[instrument(skip_all, name = "diffusion_profile", fields(mode = ?input.mode))]
pub fn calculate_diffusion_profile(input: &DiffusionInput) -> Result<DiffusionProfile, InputError> {
    let total_time = require_positive("total_time", input.total_time)?;
    require_positive("depth", input.depth)?;
    let c0 = require_in_range("surface_concentration", input.surface_concentration, 0.0, f64::MAX)?;

    let DiffusionCoefficients {
        thermal, effective, ..
    } = evaluate_coefficients(&input.channels, &input.conditions);
    let mean_depth = (2.0 * effective * total_time).sqrt().max(MIN_MEAN_DEPTH);

    let (depths, concentrations, adjustments, theta) = match input.mode {
        DiffusionMode::Analytic => {
            let step = ANALYTIC_SPAN * mean_depth / (ANALYTIC_NODES - 1) as f64;
            let depths: Vec<f64> = (0..ANALYTIC_NODES).map(|i| i as f64 * step).collect();
            let concentrations = depths.iter().map(|x| c0 * (-x / mean_depth).exp()).collect();
            (depths, concentrations, Vec::new(), None)
        }
        DiffusionMode::Explicit | DiffusionMode::CrankNicolson => {
            let samples = coefficient_samples(input, effective);
            let spec = GridSpec {
                depth: input.depth,
                dx: input.dx,
                dt: input.dt,
                total_time,
                surface_concentration: c0,
            };
            let solution = if input.mode == DiffusionMode::Explicit {
                solve_explicit(&spec, &samples)?
            } else {
                solve_crank_nicolson(&spec, &samples)?
            };
            (
                solution.depths,
                solution.concentrations,
                solution.adjustments,
                solution.theta,
            )
        }
    };

    info!(
        effective_coefficient = effective,
        mean_depth,
        nodes = depths.len(),
        "Diffusion profile computed."
    );

    Ok(DiffusionProfile {
        d1: input.channels.d1,
        d2: input.channels.d2,
        q1: input.channels.q1,
        q2: input.channels.q2,
        thermal_coefficient: thermal,
        effective_coefficient: effective,
        mean_depth,
        depths,
        concentrations,
        mode: input.mode,
        adjustments,
        theta,
    })
}

fn coefficient_samples(input: &DiffusionInput, effective: f64) -> Vec<f64> {
    match input.temperature_profile.as_deref() {
        Some(profile) if !profile.is_empty() => profile
            .iter()
            .map(|&temperature| {
                let conditions = CoefficientInputs {
                    temperature,
                    ..input.conditions
                };
                evaluate_coefficients(&input.channels, &conditions).effective
            })
            .collect(),
        _ => vec![effective],
    }
}
