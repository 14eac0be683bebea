//! Local relief (SLR) operator: a neighbour-difference roughness measure on a
//! rectangular 2-D field.

use crate::core::error::InputError;
use crate::core::numerics::guards::finite_or;
use serde::{Deserialize, Serialize};

const FLUENCE_REFERENCE: f64 = 1e18;
const MAX_SURFACE_RESOLUTION: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliefParams {
    /// Norm exponent `p`; non-positive values fall back to 1.
    pub exponent: f64,
    /// Incidence angle [deg] weighting the differences by `cos θ`.
    pub incidence_angle_deg: Option<f64>,
    /// Ion fluence [m⁻²].
    pub fluence: Option<f64>,
}

impl Default for ReliefParams {
    fn default() -> Self {
        Self {
            exponent: 1.0,
            incidence_angle_deg: None,
            fluence: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReliefResult {
    /// Per-cell relief, same shape as the input field.
    pub local: Vec<Vec<f64>>,
    /// Mean of all local values.
    pub global: f64,
}

/// `1 + log10(1 + F / 1e18)`, or 1 without a fluence.
pub fn fluence_factor(fluence: Option<f64>) -> f64 {
    match fluence {
        Some(f) if f.is_finite() && f > 0.0 => 1.0 + (1.0 + f / FLUENCE_REFERENCE).log10(),
        _ => 1.0,
    }
}

pub fn compute_slr(field: &[Vec<f64>], params: &ReliefParams) -> Result<ReliefResult, InputError> {
    let rows = field.len();
    let cols = field.first().map_or(0, Vec::len);
    for (row, values) in field.iter().enumerate() {
        if values.len() != cols {
            return Err(InputError::RaggedField {
                row,
                len: values.len(),
                expected: cols,
            });
        }
    }
    if rows == 0 || cols == 0 {
        return Ok(ReliefResult {
            local: Vec::new(),
            global: 0.0,
        });
    }

    let p = if params.exponent.is_finite() && params.exponent > 0.0 {
        params.exponent
    } else {
        1.0
    };
    let cos = params
        .incidence_angle_deg
        .map_or(1.0, |theta| theta.to_radians().cos());
    let weight = cos * fluence_factor(params.fluence);

    let mut local = vec![vec![0.0; cols]; rows];
    let mut total = 0.0;
    for i in 0..rows {
        for j in 0..cols {
            let centre = field[i][j];
            let neighbours = [
                (i > 0).then(|| field[i - 1][j]),
                (i + 1 < rows).then(|| field[i + 1][j]),
                (j > 0).then(|| field[i][j - 1]),
                (j + 1 < cols).then(|| field[i][j + 1]),
            ];
            let (sum, count) = neighbours
                .iter()
                .flatten()
                .fold((0.0, 0usize), |(sum, count), &n| {
                    (sum + ((n - centre) * weight).abs().powf(p), count + 1)
                });
            let value = if count == 0 {
                0.0
            } else {
                (sum / count as f64).powf(1.0 / p)
            };
            let value = finite_or(value, 0.0);
            local[i][j] = value;
            total += value;
        }
    }

    Ok(ReliefResult {
        local,
        global: total / (rows * cols) as f64,
    })
}

/// Bins scattered `(x, y, value)` samples onto a square grid spanning their
/// bounding box, averaging samples that share a cell. Empty cells take the
/// mean of all samples so they add no artificial relief.
pub fn surface_field(samples: &[(f64, f64, f64)]) -> Vec<Vec<f64>> {
    if samples.is_empty() {
        return Vec::new();
    }
    let resolution = ((samples.len() as f64).sqrt().ceil() as usize).clamp(1, MAX_SURFACE_RESOLUTION);

    let (mut x_min, mut x_max, mut y_min, mut y_max) =
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
    let mut mean = 0.0;
    for &(x, y, v) in samples {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
        mean += v;
    }
    mean /= samples.len() as f64;

    let cell_index = |value: f64, min: f64, max: f64| -> usize {
        let index = if max > min {
            (((value - min) / (max - min)) * resolution as f64).floor() as usize
        } else {
            0
        };
        index.min(resolution - 1)
    };

    let mut sums = vec![vec![0.0; resolution]; resolution];
    let mut counts = vec![vec![0usize; resolution]; resolution];
    for &(x, y, v) in samples {
        let i = cell_index(x, x_min, x_max);
        let j = cell_index(y, y_min, y_max);
        sums[i][j] += v;
        counts[i][j] += 1;
    }

    sums.into_iter()
        .zip(counts)
        .map(|(row, row_counts)| {
            row.into_iter()
                .zip(row_counts)
                .map(|(sum, n)| if n == 0 { mean } else { sum / n as f64 })
                .collect()
        })
        .collect()
}
