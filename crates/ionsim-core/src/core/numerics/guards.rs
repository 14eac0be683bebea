use tracing::warn;

/// Largest argument passed to `exp` before it is clamped.
pub const MAX_EXPONENT: f64 = 700.0;

/// Replaces a non-finite value with `fallback`.
#[inline]
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

/// Clamps into `[min, max]`, mapping NaN to `min`.
#[inline]
pub fn clamp_finite(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

/// `exp(x)` with the argument clamped to `±MAX_EXPONENT`.
///
/// Only an overflowing argument is logged under `context` as a recovered
/// instability; large negative arguments underflow toward zero silently.
pub fn guarded_exp(x: f64, context: &'static str) -> f64 {
    if x.is_nan() {
        warn!(context, "Exponent is NaN; treating it as zero.");
        return 1.0;
    }
    if x > MAX_EXPONENT {
        warn!(context, exponent = x, "Exponent out of range; clamping.");
        return MAX_EXPONENT.exp();
    }
    x.max(-MAX_EXPONENT).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_finite_maps_nan_to_lower_bound() {
        assert_eq!(clamp_finite(f64::NAN, 1e-40, 1e-6), 1e-40);
        assert_eq!(clamp_finite(f64::INFINITY, 1e-40, 1e-6), 1e-6);
        assert_eq!(clamp_finite(1e-10, 1e-40, 1e-6), 1e-10);
    }

    #[test]
    fn guarded_exp_never_overflows() {
        assert!(guarded_exp(1e6, "test").is_finite());
        assert!(guarded_exp(-1e6, "test") >= 0.0);
        assert_eq!(guarded_exp(f64::NAN, "test"), 1.0);
        assert!((guarded_exp(1.0, "test") - std::f64::consts::E).abs() < 1e-15);
    }

    #[test]
    fn guarded_exp_clamps_underflow_to_the_floor_value() {
        assert_eq!(guarded_exp(-1e6, "test"), (-MAX_EXPONENT).exp());
        assert_eq!(guarded_exp(-MAX_EXPONENT, "test"), (-MAX_EXPONENT).exp());
        assert_eq!(guarded_exp(1e6, "test"), MAX_EXPONENT.exp());
    }

    #[test]
    fn finite_or_replaces_infinities() {
        assert_eq!(finite_or(f64::NEG_INFINITY, 3.0), 3.0);
        assert_eq!(finite_or(2.0, 3.0), 2.0);
    }
}
