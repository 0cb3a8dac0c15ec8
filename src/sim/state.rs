//! Level specifications and run state.
//!
//! A `LevelSpec` is immutable once produced (by the generator or the
//! level-data decoder) and is the only thing the engine needs to
//! (re)build a playable board. `GameState` is the engine's live
//! counters, exposed to callers as a plain value snapshot.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::grid::{Direction, Position};
use super::reachability::reachable;

/// Immutable description of one puzzle configuration.
///
/// Field names match the external level-data artifact exactly, so a
/// fetched pack deserializes straight into this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSpec {
    /// 1-based display id.
    pub id: u32,
    /// Grid side length.
    pub size: i32,
    /// Actor heading when the level starts (and after a crash).
    pub dir: Direction,
    /// Indicator placement budget.
    pub moves: u32,
    /// Time budget in ticks.
    pub time: u32,
    pub start: Position,
    pub end: Position,
    pub mountains: Vec<Position>,
}

/// Why a level spec was rejected by validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("grid size {0} out of range")]
    BadSize(i32),
    #[error("start or end cell out of bounds")]
    MarkerOutOfBounds,
    #[error("start and end coincide")]
    StartEqualsEnd,
    #[error("mountain at ({}, {}) is out of bounds", .0.x, .0.y)]
    MountainOutOfBounds(Position),
    #[error("mountain at ({}, {}) sits on a start or end marker", .0.x, .0.y)]
    MountainOnMarker(Position),
    #[error("no path from start to end")]
    Unreachable,
    #[error("moves budget must be at least 1")]
    NoMoves,
    #[error("time budget must be at least 1")]
    NoTime,
}

impl LevelSpec {
    /// Check the invariants every spec must satisfy before it is
    /// allowed anywhere near the engine.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.size < 1 {
            return Err(SpecError::BadSize(self.size));
        }
        if !self.start.in_bounds(self.size) || !self.end.in_bounds(self.size) {
            return Err(SpecError::MarkerOutOfBounds);
        }
        if self.start == self.end {
            return Err(SpecError::StartEqualsEnd);
        }
        for &m in &self.mountains {
            if !m.in_bounds(self.size) {
                return Err(SpecError::MountainOutOfBounds(m));
            }
            if m == self.start || m == self.end {
                return Err(SpecError::MountainOnMarker(m));
            }
        }
        if self.moves == 0 {
            return Err(SpecError::NoMoves);
        }
        if self.time == 0 {
            return Err(SpecError::NoTime);
        }
        if !reachable(self.start, self.end, self.size, &self.mountains) {
            return Err(SpecError::Unreachable);
        }
        Ok(())
    }
}

/// Where the run currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunStatus {
    /// Created but not started.
    #[default]
    Idle,
    /// Ticks are flowing.
    Running,
    /// Ticks suspended, counters frozen.
    Paused,
    /// Terminal. No further ticks or placements.
    Ended,
}

/// Live run counters. Score is cumulative across levels and never
/// reset; moves and time are refilled from each level's spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameState {
    pub level_index: usize,
    pub score: u64,
    pub moves: u32,
    pub time: u32,
    pub status: RunStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_spec() -> LevelSpec {
        LevelSpec {
            id: 1,
            size: 5,
            dir: Direction::Down,
            moves: 6,
            time: 30,
            start: Position::new(0, 2),
            end: Position::new(4, 2),
            mountains: Vec::new(),
        }
    }

    #[test]
    fn test_valid_spec_passes() {
        assert_eq!(open_spec().validate(), Ok(()));
    }

    #[test]
    fn test_start_equals_end_rejected() {
        let mut spec = open_spec();
        spec.end = spec.start;
        assert_eq!(spec.validate(), Err(SpecError::StartEqualsEnd));
    }

    #[test]
    fn test_mountain_on_marker_rejected() {
        let mut spec = open_spec();
        spec.mountains.push(spec.end);
        assert_eq!(
            spec.validate(),
            Err(SpecError::MountainOnMarker(spec.end))
        );
    }

    #[test]
    fn test_unreachable_rejected() {
        let mut spec = open_spec();
        // Wall the end marker in completely.
        spec.mountains = vec![
            Position::new(3, 2),
            Position::new(4, 1),
            Position::new(4, 3),
        ];
        assert_eq!(spec.validate(), Err(SpecError::Unreachable));
    }

    #[test]
    fn test_zero_budgets_rejected() {
        let mut spec = open_spec();
        spec.moves = 0;
        assert_eq!(spec.validate(), Err(SpecError::NoMoves));

        let mut spec = open_spec();
        spec.time = 0;
        assert_eq!(spec.validate(), Err(SpecError::NoTime));
    }

    #[test]
    fn test_spec_serde_matches_artifact_shape() {
        let spec = open_spec();
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["dir"], "down");
        assert_eq!(json["start"]["x"], 0);
        assert_eq!(json["start"]["y"], 2);
        assert_eq!(json["moves"], 6);
        assert_eq!(json["time"], 30);

        let back: LevelSpec = serde_json::from_value(json).unwrap();
        assert_eq!(back, spec);
    }
}
