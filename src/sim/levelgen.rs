//! Procedural level generator.
//!
//! Randomized candidate search constrained by the reachability oracle,
//! with a deterministic open fallback when the search budget runs out.
//! Seeded with a `u64`, so a pack of levels is fully reproducible.

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::grid::{DIRECTIONS, Direction, Position};
use super::reachability::reachable;
use super::state::LevelSpec;

/// Grid side length of the first levels.
const BASE_SIZE: i32 = 5;
/// Largest grid the progression reaches.
const MAX_SIZE: i32 = 15;
/// Levels played before the grid grows by one.
const LEVELS_PER_SIZE_STEP: u32 = 3;
/// Levels per difficulty tier bucket.
const LEVELS_PER_TIER: u32 = 5;
/// Minimum Manhattan distance between start and end markers.
const MIN_MARKER_DISTANCE: i32 = 4;
/// Outer candidate-search budget per level.
const MAX_LAYOUT_ATTEMPTS: u32 = 100;
/// End-cell draws allowed within one layout attempt.
const MAX_END_DRAWS: u32 = 50;
/// Rejection-sampling budget: attempts per requested mountain.
const MOUNTAIN_ATTEMPT_FACTOR: u32 = 4;
/// Share of the mountain target kept by the fallback layout.
const FALLBACK_MOUNTAIN_SHARE: f32 = 0.6;

/// Per-tier generation coefficients. Mountain density and time
/// pressure rise with the tier; the moves and time floors fall.
struct TierParams {
    /// Mountain-count band as a fraction of size².
    mountain_min: f32,
    mountain_max: f32,
    /// Extra moves beyond the marker distance, in units of size.
    moves_slack: f32,
    /// Absolute moves floor, in units of size.
    moves_floor: f32,
    /// Base time, in units of size.
    time_base: f32,
    /// Additional time per budgeted move.
    time_per_move: f32,
    /// Absolute time floor, in units of size.
    time_floor: f32,
}

const TIERS: [TierParams; 5] = [
    TierParams {
        mountain_min: 0.06,
        mountain_max: 0.16,
        moves_slack: 0.8,
        moves_floor: 1.5,
        time_base: 4.0,
        time_per_move: 2.0,
        time_floor: 6.0,
    },
    TierParams {
        mountain_min: 0.08,
        mountain_max: 0.18,
        moves_slack: 0.65,
        moves_floor: 1.35,
        time_base: 3.5,
        time_per_move: 1.75,
        time_floor: 5.0,
    },
    TierParams {
        mountain_min: 0.10,
        mountain_max: 0.21,
        moves_slack: 0.5,
        moves_floor: 1.2,
        time_base: 3.25,
        time_per_move: 1.5,
        time_floor: 4.5,
    },
    TierParams {
        mountain_min: 0.12,
        mountain_max: 0.23,
        moves_slack: 0.4,
        moves_floor: 1.1,
        time_base: 3.0,
        time_per_move: 1.25,
        time_floor: 4.0,
    },
    TierParams {
        mountain_min: 0.14,
        mountain_max: 0.25,
        moves_slack: 0.3,
        moves_floor: 1.0,
        time_base: 2.75,
        time_per_move: 1.0,
        time_floor: 3.5,
    },
];

fn tier_for(level_index: u32) -> &'static TierParams {
    let bucket = (level_index / LEVELS_PER_TIER) as usize;
    &TIERS[bucket.min(TIERS.len() - 1)]
}

/// Grid size for a level index: starts at 5, grows by 1 every 3
/// levels, capped at 15.
pub fn size_for(level_index: u32) -> i32 {
    (BASE_SIZE + (level_index / LEVELS_PER_SIZE_STEP) as i32).min(MAX_SIZE)
}

/// Seeded level generator. Same seed, same level sequence.
pub struct LevelGenerator {
    rng: Pcg32,
}

impl LevelGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Generate one solvable level for the given index.
    pub fn generate(&mut self, level_index: u32) -> LevelSpec {
        let size = size_for(level_index);
        let tier = tier_for(level_index);

        let cells = (size * size) as f32;
        let min_mountains = (cells * tier.mountain_min).floor() as u32;
        let max_mountains = (cells * tier.mountain_max).floor() as u32;
        let target = self.rng.random_range(min_mountains..=max_mountains);

        let mut layout = None;
        for _ in 0..MAX_LAYOUT_ATTEMPTS {
            let start = self.random_cell(size);
            let Some(end) = self.draw_end(size, start) else {
                continue;
            };
            let reserved = HashSet::from([start, end]);
            let mountains = self.place_mountains(size, target, &reserved);
            if reachable(start, end, size, &mountains) {
                layout = Some((start, end, mountains));
                break;
            }
        }

        let (start, end, mountains) =
            layout.unwrap_or_else(|| self.fallback_layout(size, target));

        let distance = start.manhattan_distance(end);
        let moves = (distance + (size as f32 * tier.moves_slack).floor() as i32)
            .max((size as f32 * tier.moves_floor).floor() as i32) as u32;
        let time = ((size as f32 * tier.time_base).floor() as u32
            + (moves as f32 * tier.time_per_move).floor() as u32)
            .max((size as f32 * tier.time_floor).floor() as u32);

        let dir = self.initial_direction(size, start, &mountains);

        let spec = LevelSpec {
            id: level_index + 1,
            size,
            dir,
            moves,
            time,
            start,
            end,
            mountains,
        };
        debug_assert_eq!(spec.validate(), Ok(()));
        spec
    }

    /// Generate an ordered pack of levels for indices [0, count).
    pub fn generate_many(&mut self, count: u32) -> Vec<LevelSpec> {
        (0..count).map(|i| self.generate(i)).collect()
    }

    fn random_cell(&mut self, size: i32) -> Position {
        Position::new(
            self.rng.random_range(0..size),
            self.rng.random_range(0..size),
        )
    }

    /// Draw an end cell distinct from start and far enough away.
    /// Returns `None` when the draw budget is exhausted, which
    /// abandons the enclosing layout attempt.
    fn draw_end(&mut self, size: i32, start: Position) -> Option<Position> {
        for _ in 0..MAX_END_DRAWS {
            let end = self.random_cell(size);
            if end != start && start.manhattan_distance(end) >= MIN_MARKER_DISTANCE {
                return Some(end);
            }
        }
        None
    }

    /// Rejection-sample mountain cells outside the reserved set.
    /// Bounded attempts: fewer mountains than requested is an accepted
    /// outcome, not an error.
    fn place_mountains(
        &mut self,
        size: i32,
        target: u32,
        reserved: &HashSet<Position>,
    ) -> Vec<Position> {
        let mut mountains = Vec::new();
        let mut occupied = reserved.clone();

        let max_attempts = target * MOUNTAIN_ATTEMPT_FACTOR;
        let mut attempts = 0;
        while (mountains.len() as u32) < target && attempts < max_attempts {
            attempts += 1;
            let cell = self.random_cell(size);
            if occupied.contains(&cell) {
                continue;
            }
            occupied.insert(cell);
            mountains.push(cell);
        }

        mountains
    }

    /// Deterministic layout used when the search budget runs out:
    /// start at the grid's left middle, end four cells along the row
    /// (clamped), reduced mountain count. The connecting corridor is
    /// kept clear of mountains, so no reachability re-check is needed.
    fn fallback_layout(&mut self, size: i32, target: u32) -> (Position, Position, Vec<Position>) {
        let mid = size / 2;
        let start = Position::new(0, mid);
        let end = Position::new(MIN_MARKER_DISTANCE.min(size - 1), mid);

        let mut reserved: HashSet<Position> =
            (start.x..=end.x).map(|x| Position::new(x, mid)).collect();
        reserved.insert(start);
        reserved.insert(end);

        let count = (target as f32 * FALLBACK_MOUNTAIN_SHARE).floor() as u32;
        let mountains = self.place_mountains(size, count, &reserved);

        log::debug!("layout search exhausted, using fallback (size {size})");
        (start, end, mountains)
    }

    /// Pick an initial heading whose first step stays in bounds and
    /// off mountains, uniformly at random. Falls back to a fixed
    /// default if no heading qualifies.
    fn initial_direction(&mut self, size: i32, start: Position, mountains: &[Position]) -> Direction {
        let valid: Vec<Direction> = DIRECTIONS
            .into_iter()
            .filter(|&dir| {
                let next = start.step(dir);
                next.in_bounds(size) && !mountains.contains(&next)
            })
            .collect();

        if valid.is_empty() {
            Direction::Up
        } else {
            valid[self.rng.random_range(0..valid.len())]
        }
    }
}
