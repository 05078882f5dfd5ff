//! Multi-species Game of Life engine.
//!
//! This module implements the toroidal grid, the generation update rule,
//! random seeding, and the session that runs ticks off the caller's thread.

pub mod grid;
pub mod rules;
pub mod seeder;
pub mod simulation;

pub use grid::Grid;
pub use rules::next_generation;
pub use seeder::populate;
pub use simulation::{observer_fn, Generation, GenerationObserver, Simulation, SimulationState};
