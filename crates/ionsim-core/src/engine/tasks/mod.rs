//! Computational tasks run by the simulation workflow.
//!
//! A task takes the shared [`RunContext`](crate::engine::context::RunContext)
//! plus the stage-specific inputs and reports its own progress.

pub mod collision_loop;
