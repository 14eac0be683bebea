use crate::core::error::{InputError, require_positive};
use crate::core::numerics::tridiagonal::solve_tridiagonal;
use serde::Serialize;
use tracing::{debug, warn};

pub const MAX_STEPS: usize = 200_000;
/// FTCS stability limit on `D·Δt/Δx²`.
pub const FTCS_LIMIT: f64 = 0.5;
const DEFAULT_STEPS: f64 = 1_000.0;
/// Target mesh ratio when the explicit step has to be shrunk.
const FTCS_TARGET: f64 = 0.45;

/// A numerical safeguard the solver applied to stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StabilityAdjustment {
    TimeStepReduced { from: f64, to: f64 },
    GridCoarsened { from: f64, to: f64 },
    FellBackToImplicit,
    StepCapReached { requested: usize, used: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub depth: f64,
    pub dx: f64,
    pub dt: Option<f64>,
    pub total_time: f64,
    pub surface_concentration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridSolution {
    pub depths: Vec<f64>,
    pub concentrations: Vec<f64>,
    pub adjustments: Vec<StabilityAdjustment>,
    /// Largest implicitness used by the θ-scheme; `None` for FTCS.
    pub theta: Option<f64>,
}

fn node_count(depth: f64, dx: f64) -> Result<usize, InputError> {
    let depth = require_positive("depth", depth)?;
    let dx = require_positive("dx", dx)?;
    let cells = whole_cells(depth, dx);
    if cells < 1.0 || !cells.is_finite() {
        return Err(InputError::TooFewNodes {
            depth,
            step: dx,
            nodes: if cells.is_finite() { cells as usize + 1 } else { 0 },
        });
    }
    Ok(cells as usize + 1)
}

fn require_coefficients(coefficients: &[f64]) -> Result<(), InputError> {
    if coefficients.is_empty() {
        return Err(InputError::LengthMismatch {
            name: "coefficients",
            len: 0,
            expected: 1,
        });
    }
    Ok(())
}

/// `depth / dx` with a relative tolerance so `1e-7 / 1e-9` counts as 100
/// cells rather than 99.
#[inline]
fn whole_cells(depth: f64, dx: f64) -> f64 {
    (depth / dx * (1.0 + 1e-12)).floor()
}

fn initial_profile(nodes: usize, c0: f64) -> Vec<f64> {
    let mut c = vec![0.0; nodes];
    c[0] = c0;
    c
}

/// Coefficient for step `n` of `steps`, sampling `coefficients` uniformly
/// over the run.
#[inline]
fn coefficient_at(coefficients: &[f64], n: usize, steps: usize) -> f64 {
    let idx = (n * coefficients.len() / steps.max(1)).min(coefficients.len() - 1);
    coefficients[idx]
}

/// Number of steps for `total_time` at `dt`, bounded by the step cap.
fn step_count(total_time: f64, dt: f64) -> (usize, bool) {
    let requested = (total_time / dt).ceil();
    if requested > MAX_STEPS as f64 || !requested.is_finite() {
        (MAX_STEPS, true)
    } else {
        ((requested as usize).max(1), false)
    }
}

fn max_coefficient(coefficients: &[f64]) -> f64 {
    coefficients.iter().copied().fold(0.0, f64::max)
}

/// Forward-time, centred-space solve with a Dirichlet surface and a
/// zero-flux far end.
///
/// A requested `dt` above the stability limit is shrunk; if the shrunk step
/// would exceed the step cap the grid is coarsened, and if the coarse grid
/// can no longer hold a single cell the solve is handed to the implicit scheme.
/// Every such change is recorded in the returned adjustments.
pub fn solve_explicit(spec: &GridSpec, coefficients: &[f64]) -> Result<GridSolution, InputError> {
    require_coefficients(coefficients)?;
    let total_time = require_positive("total_time", spec.total_time)?;
    let mut dx = spec.dx;
    node_count(spec.depth, dx)?;
    let d_max = max_coefficient(coefficients).max(f64::MIN_POSITIVE);
    let mut adjustments = Vec::new();

    let stable_dt = |dx: f64| FTCS_TARGET * dx * dx / d_max;
    let dt = match spec.dt {
        Some(dt) => {
            let dt = require_positive("dt", dt)?;
            if d_max * dt / (dx * dx) > FTCS_LIMIT {
                let to = stable_dt(dx);
                warn!(from = dt, to, "FTCS step violates stability; shrinking dt.");
                adjustments.push(StabilityAdjustment::TimeStepReduced { from: dt, to });
                to
            } else {
                dt
            }
        }
        None => (total_time / DEFAULT_STEPS).min(stable_dt(dx)),
    };

    let mut dt = dt;
    if total_time / dt > MAX_STEPS as f64 {
        let requested = (total_time / dt).ceil().min(usize::MAX as f64) as usize;
        dt = total_time / MAX_STEPS as f64;
        let coarse = (d_max * dt / FTCS_TARGET).sqrt();
        if coarse <= dx {
            adjustments.push(StabilityAdjustment::StepCapReached {
                requested,
                used: MAX_STEPS,
            });
        } else if whole_cells(spec.depth, coarse) < 1.0 {
            warn!(dx = coarse, "FTCS grid too coarse for the depth; falling back to the implicit scheme.");
            adjustments.push(StabilityAdjustment::FellBackToImplicit);
            let mut solution = solve_crank_nicolson(spec, coefficients)?;
            adjustments.append(&mut solution.adjustments);
            solution.adjustments = adjustments;
            return Ok(solution);
        } else {
            warn!(from = dx, to = coarse, "FTCS step budget exceeded; coarsening the grid.");
            adjustments.push(StabilityAdjustment::GridCoarsened { from: dx, to: coarse });
            dx = coarse;
        }
    }

    let nodes = node_count(spec.depth, dx)?;
    let (steps, _) = step_count(total_time, dt);
    let dt = total_time / steps as f64;
    debug!(nodes, steps, dt, dx, "Running FTCS diffusion.");

    let mut c = initial_profile(nodes, spec.surface_concentration);
    let mut next = c.clone();
    let last = nodes - 1;
    for n in 0..steps {
        let r = coefficient_at(coefficients, n, steps) * dt / (dx * dx);
        for i in 1..last {
            next[i] = c[i] + r * (c[i + 1] - 2.0 * c[i] + c[i - 1]);
        }
        next[last] = next[last - 1];
        std::mem::swap(&mut c, &mut next);
    }

    Ok(GridSolution {
        depths: (0..nodes).map(|i| i as f64 * dx).collect(),
        concentrations: c,
        adjustments,
        theta: None,
    })
}

/// θ-scheme with `θ = ½`, blended toward backward Euler when the mesh ratio
/// exceeds 1 so the update stays positivity and monotonicity preserving.
pub fn solve_crank_nicolson(
    spec: &GridSpec,
    coefficients: &[f64],
) -> Result<GridSolution, InputError> {
    require_coefficients(coefficients)?;
    let total_time = require_positive("total_time", spec.total_time)?;
    let dx = spec.dx;
    let nodes = node_count(spec.depth, dx)?;
    let mut adjustments = Vec::new();

    let requested_dt = match spec.dt {
        Some(dt) => require_positive("dt", dt)?,
        None => total_time / DEFAULT_STEPS,
    };
    let (steps, capped) = step_count(total_time, requested_dt);
    if capped {
        let requested = (total_time / requested_dt).ceil().min(usize::MAX as f64) as usize;
        warn!(requested, used = steps, "Implicit step cap reached; enlarging dt.");
        adjustments.push(StabilityAdjustment::StepCapReached {
            requested,
            used: steps,
        });
    }
    let dt = total_time / steps as f64;
    debug!(nodes, steps, dt, dx, "Running Crank-Nicolson diffusion.");

    let last = nodes - 1;
    let mut c = initial_profile(nodes, spec.surface_concentration);
    let mut lower = vec![0.0; nodes];
    let mut diag = vec![0.0; nodes];
    let mut upper = vec![0.0; nodes];
    let mut rhs = vec![0.0; nodes];
    let mut theta_max: f64 = 0.5;

    for n in 0..steps {
        let r = coefficient_at(coefficients, n, steps) * dt / (dx * dx);
        let theta = if r > 1.0 { 1.0 - 1.0 / (2.0 * r) } else { 0.5 };
        theta_max = theta_max.max(theta);
        let implicit = theta * r;
        let explicit = (1.0 - theta) * r;

        diag[0] = 1.0;
        upper[0] = 0.0;
        rhs[0] = spec.surface_concentration;
        for i in 1..last {
            lower[i] = -implicit;
            diag[i] = 1.0 + 2.0 * implicit;
            upper[i] = -implicit;
            rhs[i] = c[i] + explicit * (c[i + 1] - 2.0 * c[i] + c[i - 1]);
        }
        lower[last] = -1.0;
        diag[last] = 1.0;
        upper[last] = 0.0;
        rhs[last] = 0.0;

        match solve_tridiagonal(&lower, &diag, &upper, &rhs) {
            Some(solution) => c = solution,
            None => {
                warn!(step = n, "Tridiagonal solve failed; keeping the previous profile.");
                break;
            }
        }
    }

    for value in &mut c {
        if !value.is_finite() {
            *value = 0.0;
        }
    }

    Ok(GridSolution {
        depths: (0..nodes).map(|i| i as f64 * dx).collect(),
        concentrations: c,
        adjustments,
        theta: Some(theta_max),
    })
}
