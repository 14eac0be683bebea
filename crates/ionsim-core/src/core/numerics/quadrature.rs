/// Composite Simpson rule over `[a, b]` with `intervals` sub-intervals.
///
/// An odd interval count is rounded up to the next even one.
pub fn simpson<F>(f: F, a: f64, b: f64, intervals: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    if b == a {
        return 0.0;
    }
    let n = intervals.max(2).next_multiple_of(2);
    let h = (b - a) / n as f64;

    let mut sum = f(a) + f(b);
    for i in 1..n {
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * f(a + i as f64 * h);
    }
    sum * h / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrates_cubic_polynomials_exactly() {
        let value = simpson(|x| 4.0 * x.powi(3) - 3.0 * x * x + 2.0, 0.0, 2.0, 2);
        // x^4 - x^3 + 2x on [0, 2] = 16 - 8 + 4
        assert!((value - 12.0).abs() < 1e-12);
    }

    #[test]
    fn odd_interval_count_is_rounded_up() {
        let value = simpson(|x| x * x, 0.0, 3.0, 3);
        assert!((value - 9.0).abs() < 1e-12);
    }

    #[test]
    fn converges_for_smooth_transcendental_integrand() {
        let value = simpson(f64::sin, 0.0, std::f64::consts::PI, 512);
        assert!((value - 2.0).abs() < 1e-9);
    }

    #[test]
    fn empty_interval_integrates_to_zero() {
        assert_eq!(simpson(|x| x, 1.0, 1.0, 16), 0.0);
    }
}
