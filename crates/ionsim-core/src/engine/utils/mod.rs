//! Helpers shared by the engine's tasks.

pub mod sampling;
