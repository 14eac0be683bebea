/// Solves a tridiagonal system with the Thomas algorithm.
///
/// `lower[i]` multiplies `x[i-1]` and `upper[i]` multiplies `x[i+1]` in row
/// `i`, so `lower[0]` and `upper[n-1]` are ignored. Returns `None` when the
/// slices disagree in length or a pivot vanishes; the caller decides how to
/// recover. Diagonally dominant systems never hit a zero pivot.
pub fn solve_tridiagonal(
    lower: &[f64],
    diag: &[f64],
    upper: &[f64],
    rhs: &[f64],
) -> Option<Vec<f64>> {
    let n = diag.len();
    if n == 0 || lower.len() != n || upper.len() != n || rhs.len() != n {
        return None;
    }

    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];

    let mut pivot = diag[0];
    if pivot == 0.0 || !pivot.is_finite() {
        return None;
    }
    c_prime[0] = upper[0] / pivot;
    d_prime[0] = rhs[0] / pivot;

    for i in 1..n {
        pivot = diag[i] - lower[i] * c_prime[i - 1];
        if pivot == 0.0 || !pivot.is_finite() {
            return None;
        }
        c_prime[i] = if i + 1 < n { upper[i] / pivot } else { 0.0 };
        d_prime[i] = (rhs[i] - lower[i] * d_prime[i - 1]) / pivot;
    }

    let mut x = d_prime;
    for i in (0..n - 1).rev() {
        x[i] -= c_prime[i] * x[i + 1];
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "{a} != {e}");
        }
    }

    #[test]
    fn solves_known_laplacian_system() {
        // [2 -1 0; -1 2 -1; 0 -1 2] x = [1 0 1]  =>  x = [1 1 1]
        let x = solve_tridiagonal(
            &[0.0, -1.0, -1.0],
            &[2.0, 2.0, 2.0],
            &[-1.0, -1.0, 0.0],
            &[1.0, 0.0, 1.0],
        )
        .unwrap();
        assert_close(&x, &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn solves_non_symmetric_system() {
        // [4 1 0 0; 1 4 1 0; 0 2 5 1; 0 0 1 3] x = [5 6 8 4]  =>  x = [1 1 1 1]
        let x = solve_tridiagonal(
            &[0.0, 1.0, 2.0, 1.0],
            &[4.0, 4.0, 5.0, 3.0],
            &[1.0, 1.0, 1.0, 0.0],
            &[5.0, 6.0, 8.0, 4.0],
        )
        .unwrap();
        assert_close(&x, &[1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn single_equation_is_a_division() {
        let x = solve_tridiagonal(&[0.0], &[4.0], &[0.0], &[2.0]).unwrap();
        assert_close(&x, &[0.5]);
    }

    #[test]
    fn zero_pivot_and_length_mismatch_return_none() {
        assert!(solve_tridiagonal(&[0.0, 1.0], &[0.0, 1.0], &[1.0, 0.0], &[1.0, 1.0]).is_none());
        assert!(solve_tridiagonal(&[0.0], &[1.0, 1.0], &[0.0], &[1.0]).is_none());
        assert!(solve_tridiagonal(&[], &[], &[], &[]).is_none());
    }
}
