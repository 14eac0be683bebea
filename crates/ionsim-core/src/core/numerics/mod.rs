//! Small numerical kernels shared by the solvers: the Thomas tridiagonal
//! solver, composite Simpson quadrature and finite-value guards.

pub mod guards;
pub mod quadrature;
pub mod tridiagonal;
