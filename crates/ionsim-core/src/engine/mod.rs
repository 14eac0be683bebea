//! # Engine Module
//!
//! Stateful numerics and the machinery that sequences a simulation run.
//!
//! ## Overview
//!
//! The engine owns everything that integrates in time or iterates over many
//! sites: the diffusion and thermal solvers, the per-site collision loop, and
//! the run-level plumbing (request configuration, resolved context, progress
//! events, errors) that the [`workflows`](crate::workflows) layer drives.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Run request, option groups with defaults, and the request builder
//! - **Run Context** ([`context`]) - Reference records resolved once and shared by every stage
//! - **Diffusion** ([`diffusion`]) - Coefficient chain plus analytic, FTCS and Crank-Nicolson profiles
//! - **Thermal Relaxation** ([`thermal`]) - Debye heat capacity and exponential-Euler cooling
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine-level error type composing the core errors
//!
//! ## Key Capabilities
//!
//! - **Stability control** that shrinks steps, coarsens grids or switches
//!   schemes instead of failing, recording every adjustment
//! - **Deterministic parallelism** through per-site random streams and ordered
//!   reductions
//! - **Bounded loops** with explicit step caps in every time integrator

pub mod config;
pub mod context;
pub mod diffusion;
pub mod error;
pub mod progress;
pub(crate) mod tasks;
pub mod thermal;
pub(crate) mod utils;
