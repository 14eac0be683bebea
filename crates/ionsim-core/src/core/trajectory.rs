//! Ion flight between the electrode and the target under the Lorentz force.
//!
//! The electric field is uniform, `V/L` along the electrode axis; the
//! magnetic field is uniform and optional. The state `(x, v)` is advanced
//! with classical RK4 until the ion crosses the target plane or the step cap
//! is reached.

use crate::core::error::{InputError, require_finite, require_positive};
use nalgebra::{Point3, Vector3};
use serde::Serialize;
use tracing::{debug, warn};

pub const MAX_STEPS: usize = 10_000;
const STEPS_PER_TRANSIT: f64 = 1_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryInput {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
    /// Potential difference between start and end [V].
    pub voltage: f64,
    /// Uniform magnetic field [T].
    pub magnetic_field: Vector3<f64>,
    pub ion_mass: f64,
    /// Ion charge [C].
    pub ion_charge: f64,
    /// Kinetic energy at the start, directed along the axis [J].
    pub initial_energy: f64,
    /// Integration step [s]; derived from the transit time when absent.
    pub time_step: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    pub path: Vec<Point3<f64>>,
    /// Length of the integrated path [m].
    pub arc_length: f64,
    /// Work done by the electric field, `q ∫ E·dl` [J].
    pub work: f64,
    /// Kinetic energy on arrival [J].
    pub final_energy: f64,
    pub reached_target: bool,
    pub steps: usize,
}

pub fn integrate_trajectory(input: &TrajectoryInput) -> Result<Trajectory, InputError> {
    let mass = require_positive("ion_mass", input.ion_mass)?;
    let q = require_finite("ion_charge", input.ion_charge)?;
    let voltage = require_finite("voltage", input.voltage)?;
    let initial_energy = require_finite("initial_energy", input.initial_energy)?.max(0.0);

    let axis = input.end - input.start;
    let length = require_positive("electrode_distance", axis.norm())?;
    let direction = axis / length;
    let e_field = direction * (voltage / length);
    let b_field = input.magnetic_field;
    let q_over_m = q / mass;

    let acceleration = |v: &Vector3<f64>| q_over_m * (e_field + v.cross(&b_field));

    let v0 = (2.0 * initial_energy / mass).sqrt();
    let dt = match input.time_step {
        Some(dt) => require_positive("time_step", dt)?,
        None => {
            let a = (q_over_m * e_field.norm()).abs();
            let transit = if v0 > 0.0 {
                let from_speed = length / v0;
                if a > 0.0 {
                    from_speed.min((2.0 * length / a).sqrt())
                } else {
                    from_speed
                }
            } else if a > 0.0 {
                (2.0 * length / a).sqrt()
            } else {
                warn!("Ion starts at rest in a field-free gap; it never moves.");
                return Ok(Trajectory {
                    path: vec![input.start],
                    arc_length: 0.0,
                    work: 0.0,
                    final_energy: initial_energy,
                    reached_target: false,
                    steps: 0,
                });
            };
            transit / STEPS_PER_TRANSIT
        }
    };

    let mut position = input.start.coords;
    let mut velocity = direction * v0;
    let mut path = vec![input.start];
    let mut arc_length = 0.0;
    let mut field_integral = 0.0;
    let mut reached_target = false;
    let mut steps = 0;

    while steps < MAX_STEPS {
        let k1x = velocity;
        let k1v = acceleration(&velocity);
        let k2x = velocity + 0.5 * dt * k1v;
        let k2v = acceleration(&k2x);
        let k3x = velocity + 0.5 * dt * k2v;
        let k3v = acceleration(&k3x);
        let k4x = velocity + dt * k3v;
        let k4v = acceleration(&k4x);

        let mut delta = dt / 6.0 * (k1x + 2.0 * k2x + 2.0 * k3x + k4x);
        let next_velocity = velocity + dt / 6.0 * (k1v + 2.0 * k2v + 2.0 * k3v + k4v);
        steps += 1;

        let progress = (position - input.start.coords).dot(&direction);
        let next_progress = progress + delta.dot(&direction);
        if next_progress >= length {
            let step_along = next_progress - progress;
            if step_along > 0.0 {
                delta *= (length - progress) / step_along;
            }
            reached_target = true;
        }

        arc_length += delta.norm();
        field_integral += e_field.dot(&delta);
        position += delta;
        velocity = next_velocity;
        path.push(Point3::from(position));

        if reached_target {
            break;
        }
    }

    if !reached_target {
        warn!(steps, "Trajectory step cap reached before the target plane.");
    }

    let work = q * field_integral;
    let final_energy = (initial_energy + work).max(0.0);
    debug!(steps, arc_length, work, "Trajectory integrated.");

    Ok(Trajectory {
        path,
        arc_length,
        work,
        final_energy,
        reached_target,
        steps,
    })
}
