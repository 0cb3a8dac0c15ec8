//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One logical tick per call, no wall-clock coupling
//! - Seeded RNG only (level generation)
//! - No rendering or platform dependencies

pub mod engine;
pub mod grid;
pub mod levelgen;
pub mod reachability;
pub mod state;

pub use engine::Engine;
pub use grid::{Board, DIRECTIONS, Direction, Occupant, Position};
pub use levelgen::{LevelGenerator, size_for};
pub use reachability::reachable;
pub use state::{GameState, LevelSpec, RunStatus, SpecError};
