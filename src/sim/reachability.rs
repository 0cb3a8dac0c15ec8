//! Reachability oracle for the level generator.
//!
//! Decides whether a path of non-mountain cells connects two points on
//! the grid. The generator accepts a candidate layout only when this
//! says yes, so every shipped level is solvable at least in principle.

use std::collections::VecDeque;

use super::grid::{DIRECTIONS, Position};

/// Breadth-first search over the 4-neighbor grid graph. A neighbor is
/// traversable iff it is in bounds and not a mountain.
///
/// Deterministic, O(size²) time and space. Out-of-bounds endpoints or
/// a non-positive size are precondition violations and panic.
pub fn reachable(start: Position, end: Position, size: i32, mountains: &[Position]) -> bool {
    assert!(size > 0, "grid size must be positive");
    assert!(start.in_bounds(size), "start out of bounds");
    assert!(end.in_bounds(size), "end out of bounds");

    let index = |pos: Position| (pos.x * size + pos.y) as usize;

    let mut blocked = vec![false; (size * size) as usize];
    for m in mountains {
        if m.in_bounds(size) {
            blocked[index(*m)] = true;
        }
    }

    if blocked[index(start)] {
        return false;
    }

    let mut visited = vec![false; (size * size) as usize];
    let mut queue = VecDeque::new();
    visited[index(start)] = true;
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        if current == end {
            return true;
        }

        for dir in DIRECTIONS {
            let neighbor = current.step(dir);
            if !neighbor.in_bounds(size) {
                continue;
            }
            let idx = index(neighbor);
            if visited[idx] || blocked[idx] {
                continue;
            }
            visited[idx] = true;
            queue.push_back(neighbor);
        }
    }

    false
}
