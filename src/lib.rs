//! Redirect - headless core of a grid-puzzle game
//!
//! An actor advances one cell per tick in its current heading; the
//! player places directional indicators to steer it from the start
//! marker to the end marker before the move and time budgets run out,
//! around impassable mountains.
//!
//! Core modules:
//! - `sim`: deterministic simulation (grid, reachability oracle,
//!   level generator, tick engine)
//! - `events`: synchronous in-process event bus
//! - `levels`: level data artifact decoding with generator fallback
//!
//! Rendering, input capture, and persistence are external concerns;
//! the event bus is the only outbound surface.

pub mod events;
pub mod levels;
pub mod sim;

pub use events::{EventBus, EventKind, FinalSnapshot, GameEvent, Subscription};
pub use levels::{decode_levels, load_or_generate};
pub use sim::{
    Board, Direction, Engine, GameState, LevelGenerator, LevelSpec, Occupant, Position, RunStatus,
    reachable,
};

/// Default number of levels in a run.
pub const DEFAULT_LEVEL_COUNT: u32 = 30;
