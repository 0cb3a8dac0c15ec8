//! Tick-based simulation engine.
//!
//! Owns the live board and actor, advances one cell per tick in the
//! current heading, resolves crashes/redirections, enforces the moves
//! and time budgets, scores solved levels, and reports every state
//! change on the event bus.
//!
//! The engine is purely logical: an embedder calls [`Engine::tick`]
//! once per time unit. Status gating inside `tick` means a call queued
//! before a pause or stop lands as a no-op, so no stale tick can fire
//! after a transition.

use crate::events::{EventBus, FinalSnapshot, GameEvent};

use super::grid::{Board, Direction, Occupant, Position};
use super::state::{GameState, LevelSpec, RunStatus};

pub struct Engine {
    levels: Vec<LevelSpec>,
    board: Board,
    actor: Position,
    heading: Direction,
    state: GameState,
    events: EventBus,
}

impl Engine {
    /// Build an engine over an ordered, validated level pack.
    /// Panics on an empty pack; invalid specs must be filtered out
    /// upstream (generator or decoder).
    pub fn new(levels: Vec<LevelSpec>) -> Self {
        assert!(!levels.is_empty(), "engine needs at least one level");
        debug_assert!(levels.iter().all(|l| l.validate().is_ok()));

        let board = Board::new(levels[0].size);
        let actor = levels[0].start;
        let heading = levels[0].dir;
        Self {
            levels,
            board,
            actor,
            heading,
            state: GameState::default(),
            events: EventBus::new(),
        }
    }

    /// Handle to the bus this engine publishes on.
    pub fn events(&self) -> EventBus {
        self.events.clone()
    }

    /// Snapshot of the live counters.
    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn actor(&self) -> Position {
        self.actor
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    /// The spec currently being played.
    pub fn current_level(&self) -> &LevelSpec {
        let index = self.state.level_index.min(self.levels.len() - 1);
        &self.levels[index]
    }

    /// Idle → Running. Loads the first level.
    pub fn start(&mut self) {
        if self.state.status != RunStatus::Idle {
            return;
        }
        self.state.status = RunStatus::Running;
        self.configure();
    }

    /// Rebuild the board and counters from the current level spec.
    /// Idempotent: a second call yields an identical fresh state.
    fn configure(&mut self) {
        let spec = &self.levels[self.state.level_index];

        let mut board = Board::new(spec.size);
        board.set(spec.start, Occupant::Start);
        board.set(spec.end, Occupant::End);
        for &mountain in &spec.mountains {
            board.set(mountain, Occupant::Mountain);
        }

        self.actor = spec.start;
        self.heading = spec.dir;
        self.state.moves = spec.moves;
        self.state.time = spec.time;
        self.board = board;

        self.emit_snapshot();
    }

    /// Re-configure the current level. Counters refill, score stays.
    pub fn restart(&mut self) {
        if matches!(self.state.status, RunStatus::Running | RunStatus::Paused) {
            self.configure();
        }
    }

    /// Place (or replace) a directional indicator. No-op without a
    /// remaining move, outside the grid, on marker or mountain cells,
    /// or once the run has ended. Never moves the actor.
    pub fn place_indicator(&mut self, pos: Position, dir: Direction) {
        if !matches!(self.state.status, RunStatus::Running | RunStatus::Paused) {
            return;
        }
        if self.state.moves == 0 {
            return;
        }
        if !pos.in_bounds(self.board.size()) {
            return;
        }
        match self.board.occupant(pos) {
            Occupant::Empty | Occupant::Indicator(_) => {}
            _ => return,
        }

        self.board.set(pos, Occupant::Indicator(dir));
        self.state.moves -= 1;
        self.events.emit(&GameEvent::MovesChanged(self.state.moves));
    }

    /// Advance one logical time unit. No-op unless Running.
    pub fn tick(&mut self) {
        if self.state.status != RunStatus::Running {
            return;
        }

        self.state.time = self.state.time.saturating_sub(1);
        if self.state.time == 0 {
            self.stop();
            return;
        }
        self.events.emit(&GameEvent::TimeChanged(self.state.time));

        self.advance_actor();
    }

    /// Running → Paused. Counters frozen, ticks gated off.
    pub fn pause(&mut self) {
        if self.state.status == RunStatus::Running {
            self.state.status = RunStatus::Paused;
        }
    }

    /// Paused → Running.
    pub fn resume(&mut self) {
        if self.state.status == RunStatus::Paused {
            self.state.status = RunStatus::Running;
        }
    }

    /// Terminal transition. Emits `Ended` with the final counters.
    /// Idempotent once ended.
    pub fn stop(&mut self) {
        if !matches!(self.state.status, RunStatus::Running | RunStatus::Paused) {
            return;
        }
        self.state.status = RunStatus::Ended;
        log::info!(
            "run ended at level {} with score {}",
            self.state.level_index,
            self.state.score
        );
        self.events.emit(&GameEvent::Ended(FinalSnapshot {
            moves: self.state.moves,
            time: self.state.time,
        }));
    }

    fn advance_actor(&mut self) {
        let spec = &self.levels[self.state.level_index];
        let candidate = self.actor.step(self.heading);

        // Wall or mountain: crash back to the start marker with the
        // spec's initial heading. No score or move penalty.
        if !candidate.in_bounds(spec.size)
            || self.board.occupant(candidate) == Occupant::Mountain
        {
            self.actor = spec.start;
            self.heading = spec.dir;
            return;
        }

        match self.board.occupant(candidate) {
            Occupant::Indicator(dir) => {
                self.actor = candidate;
                self.heading = dir;
            }
            Occupant::End => self.complete_level(),
            _ => self.actor = candidate,
        }
    }

    fn complete_level(&mut self) {
        let spec = &self.levels[self.state.level_index];
        let gained = u64::from(self.state.time) * 10
            + u64::from(self.state.moves) * 50
            + spec.size as u64 * 20;
        self.state.score += gained;
        log::info!("level {} solved, +{gained} points", spec.id);
        self.events.emit(&GameEvent::ScoreChanged(self.state.score));

        self.state.level_index += 1;
        if self.state.level_index >= self.levels.len() {
            self.stop();
            return;
        }
        self.configure();
    }

    fn emit_snapshot(&self) {
        self.events
            .emit(&GameEvent::LevelChanged(self.state.level_index));
        self.events.emit(&GameEvent::MovesChanged(self.state.moves));
        self.events.emit(&GameEvent::TimeChanged(self.state.time));
        self.events.emit(&GameEvent::ScoreChanged(self.state.score));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::events::EventKind;

    use super::*;

    fn spec(
        size: i32,
        start: Position,
        end: Position,
        dir: Direction,
        mountains: Vec<Position>,
    ) -> LevelSpec {
        LevelSpec {
            id: 1,
            size,
            dir,
            moves: 6,
            time: 30,
            start,
            end,
            mountains,
        }
    }

    fn started(levels: Vec<LevelSpec>) -> Engine {
        let mut engine = Engine::new(levels);
        engine.start();
        engine
    }

    /// Scenario A: straight corridor, no mountains, the actor reaches
    /// the end in exactly distance ticks.
    #[test]
    fn test_straight_run_reaches_end_in_four_ticks() {
        let mut engine = started(vec![spec(
            5,
            Position::new(0, 2),
            Position::new(4, 2),
            Direction::Down,
            Vec::new(),
        )]);

        // An indicator off the actor's path changes nothing.
        engine.place_indicator(Position::new(2, 0), Direction::Left);

        for _ in 0..3 {
            engine.tick();
            assert_eq!(engine.state().status, RunStatus::Running);
        }
        engine.tick();
        assert_eq!(engine.state().status, RunStatus::Ended);
    }

    /// Scenario B: entering an indicator cell adopts its direction.
    #[test]
    fn test_indicator_redirects_heading() {
        let mut engine = started(vec![spec(
            5,
            Position::new(2, 0),
            Position::new(4, 4),
            Direction::Right,
            Vec::new(),
        )]);
        engine.place_indicator(Position::new(2, 3), Direction::Up);

        for _ in 0..3 {
            engine.tick();
        }
        assert_eq!(engine.actor(), Position::new(2, 3));
        assert_eq!(engine.heading(), Direction::Up);

        engine.tick();
        assert_eq!(engine.actor(), Position::new(1, 3));
    }

    /// Scenario C: stepping into a mountain teleports the actor back
    /// to start with the initial heading and no extra penalty.
    #[test]
    fn test_mountain_crash_resets_actor() {
        let mut engine = started(vec![spec(
            5,
            Position::new(0, 3),
            Position::new(4, 0),
            Direction::Down,
            vec![Position::new(3, 3)],
        )]);

        let moves_before = engine.state().moves;
        let score_before = engine.state().score;

        for _ in 0..2 {
            engine.tick();
        }
        assert_eq!(engine.actor(), Position::new(2, 3));

        engine.tick();
        assert_eq!(engine.actor(), Position::new(0, 3));
        assert_eq!(engine.heading(), Direction::Down);
        assert_eq!(engine.state().moves, moves_before);
        assert_eq!(engine.state().score, score_before);
    }

    /// Leaving the grid crashes the same way, and the heading reset is
    /// observable after an indicator changed it.
    #[test]
    fn test_wall_crash_resets_heading() {
        let mut engine = started(vec![spec(
            5,
            Position::new(0, 3),
            Position::new(4, 0),
            Direction::Down,
            Vec::new(),
        )]);
        engine.place_indicator(Position::new(1, 3), Direction::Right);

        engine.tick(); // onto the indicator, heading becomes Right
        assert_eq!(engine.heading(), Direction::Right);
        engine.tick(); // (1,4)
        engine.tick(); // (1,5) is out of bounds -> crash
        assert_eq!(engine.actor(), Position::new(0, 3));
        assert_eq!(engine.heading(), Direction::Down);
    }

    /// Scenario D: with no moves left, placement is a silent no-op.
    #[test]
    fn test_placement_without_moves_is_noop() {
        let mut level = spec(
            5,
            Position::new(0, 2),
            Position::new(4, 2),
            Direction::Down,
            Vec::new(),
        );
        level.moves = 1;
        let mut engine = started(vec![level]);

        let events = Rc::new(RefCell::new(Vec::new()));
        let recorded = Rc::clone(&events);
        engine
            .events()
            .subscribe(EventKind::MovesChanged, move |event| {
                recorded.borrow_mut().push(*event);
            });

        engine.place_indicator(Position::new(2, 2), Direction::Left);
        assert_eq!(engine.state().moves, 0);
        assert_eq!(events.borrow().len(), 1);

        engine.place_indicator(Position::new(1, 1), Direction::Left);
        assert_eq!(engine.state().moves, 0);
        assert_eq!(events.borrow().len(), 1, "no event for a rejected placement");
        assert_eq!(
            engine.board().occupant(Position::new(1, 1)),
            Occupant::Empty
        );
    }

    /// Placement onto marker or mountain cells is rejected silently.
    #[test]
    fn test_placement_on_occupied_cells_rejected() {
        let mountain = Position::new(2, 0);
        let mut engine = started(vec![spec(
            5,
            Position::new(0, 2),
            Position::new(4, 2),
            Direction::Down,
            vec![mountain],
        )]);

        let moves = engine.state().moves;
        engine.place_indicator(mountain, Direction::Up);
        engine.place_indicator(Position::new(0, 2), Direction::Up);
        engine.place_indicator(Position::new(4, 2), Direction::Up);
        engine.place_indicator(Position::new(9, 9), Direction::Up);
        assert_eq!(engine.state().moves, moves);

        // Replacing an existing indicator costs a move but keeps one
        // indicator per cell.
        engine.place_indicator(Position::new(1, 1), Direction::Up);
        engine.place_indicator(Position::new(1, 1), Direction::Left);
        assert_eq!(engine.state().moves, moves - 2);
        assert_eq!(
            engine.board().occupant(Position::new(1, 1)),
            Occupant::Indicator(Direction::Left)
        );
    }

    /// Scenario E: time expiry ends the run; later ticks and
    /// placements are no-ops.
    #[test]
    fn test_time_expiry_ends_run() {
        let mut level = spec(
            5,
            Position::new(0, 0),
            Position::new(4, 4),
            Direction::Down,
            Vec::new(),
        );
        level.time = 3;
        let mut engine = started(vec![level]);

        let ended = Rc::new(RefCell::new(Vec::new()));
        let recorded = Rc::clone(&ended);
        engine.events().subscribe(EventKind::Ended, move |event| {
            recorded.borrow_mut().push(*event);
        });

        engine.tick();
        engine.tick();
        assert_eq!(engine.state().status, RunStatus::Running);

        engine.tick();
        assert_eq!(engine.state().status, RunStatus::Ended);
        assert_eq!(
            *ended.borrow(),
            vec![GameEvent::Ended(FinalSnapshot { moves: 6, time: 0 })]
        );

        let frozen = engine.state();
        let actor = engine.actor();
        engine.tick();
        engine.place_indicator(Position::new(1, 1), Direction::Left);
        assert_eq!(engine.state(), frozen);
        assert_eq!(engine.actor(), actor);
        assert_eq!(ended.borrow().len(), 1, "ended fires exactly once");
    }

    /// Solving a level scores it and loads the next spec.
    #[test]
    fn test_level_transition_and_scoring() {
        let first = spec(
            5,
            Position::new(0, 2),
            Position::new(4, 2),
            Direction::Down,
            Vec::new(),
        );
        let mut second = spec(
            6,
            Position::new(0, 0),
            Position::new(5, 5),
            Direction::Right,
            Vec::new(),
        );
        second.id = 2;
        second.moves = 9;
        second.time = 40;
        let mut engine = started(vec![first, second.clone()]);

        for _ in 0..4 {
            engine.tick();
        }

        // time was 30, decremented 4 times before solving.
        let expected = 26 * 10 + 6 * 50 + 5 * 20;
        let state = engine.state();
        assert_eq!(state.score, expected);
        assert_eq!(state.level_index, 1);
        assert_eq!(state.status, RunStatus::Running);
        assert_eq!(state.moves, second.moves);
        assert_eq!(state.time, second.time);
        assert_eq!(engine.actor(), second.start);
        assert_eq!(engine.heading(), second.dir);
    }

    /// Solving the last level ends the run with the score kept.
    #[test]
    fn test_last_level_solved_ends_run() {
        let mut engine = started(vec![spec(
            5,
            Position::new(0, 2),
            Position::new(4, 2),
            Direction::Down,
            Vec::new(),
        )]);
        for _ in 0..4 {
            engine.tick();
        }
        let state = engine.state();
        assert_eq!(state.status, RunStatus::Ended);
        assert!(state.score > 0);
    }

    #[test]
    fn test_pause_freezes_ticks_not_placement() {
        let mut engine = started(vec![spec(
            5,
            Position::new(0, 2),
            Position::new(4, 2),
            Direction::Down,
            Vec::new(),
        )]);

        engine.tick();
        let state = engine.state();
        let actor = engine.actor();

        engine.pause();
        assert_eq!(engine.state().status, RunStatus::Paused);
        engine.tick();
        engine.tick();
        assert_eq!(engine.state().time, state.time);
        assert_eq!(engine.actor(), actor);

        engine.place_indicator(Position::new(3, 3), Direction::Left);
        assert_eq!(engine.state().moves, state.moves - 1);

        engine.resume();
        engine.tick();
        assert_eq!(engine.state().time, state.time - 1);
    }

    /// Restart produces an identical fresh state with no residue.
    #[test]
    fn test_restart_is_full_reset() {
        let level = spec(
            5,
            Position::new(0, 2),
            Position::new(4, 2),
            Direction::Down,
            Vec::new(),
        );
        let mut engine = started(vec![level.clone()]);
        let mut fresh = started(vec![level]);

        engine.place_indicator(Position::new(2, 3), Direction::Left);
        engine.tick();
        engine.tick();
        engine.restart();

        assert_eq!(engine.state(), fresh.state());
        assert_eq!(engine.actor(), fresh.actor());
        assert_eq!(engine.heading(), fresh.heading());
        assert_eq!(engine.board(), fresh.board());

        // Restarting the fresh engine changes nothing either.
        fresh.restart();
        assert_eq!(engine.board(), fresh.board());
    }

    /// The simulation itself has no hidden randomness.
    #[test]
    fn test_tick_determinism() {
        let level = spec(
            7,
            Position::new(0, 3),
            Position::new(6, 3),
            Direction::Down,
            vec![Position::new(3, 3)],
        );
        let mut a = started(vec![level.clone()]);
        let mut b = started(vec![level]);

        for engine in [&mut a, &mut b] {
            engine.place_indicator(Position::new(2, 3), Direction::Right);
            engine.place_indicator(Position::new(2, 5), Direction::Down);
        }
        for _ in 0..12 {
            a.tick();
            b.tick();
            assert_eq!(a.actor(), b.actor());
            assert_eq!(a.heading(), b.heading());
            assert_eq!(a.state(), b.state());
        }
    }

    #[test]
    fn test_start_only_from_idle() {
        let mut engine = started(vec![spec(
            5,
            Position::new(0, 2),
            Position::new(4, 2),
            Direction::Down,
            Vec::new(),
        )]);
        engine.tick();
        let state = engine.state();
        engine.start();
        assert_eq!(engine.state(), state, "start is a no-op once running");
    }

    #[test]
    fn test_configure_emits_full_snapshot() {
        let mut engine = Engine::new(vec![spec(
            5,
            Position::new(0, 2),
            Position::new(4, 2),
            Direction::Down,
            Vec::new(),
        )]);

        let kinds = Rc::new(RefCell::new(Vec::new()));
        for kind in [
            EventKind::LevelChanged,
            EventKind::MovesChanged,
            EventKind::TimeChanged,
            EventKind::ScoreChanged,
        ] {
            let recorded = Rc::clone(&kinds);
            engine.events().subscribe(kind, move |event| {
                recorded.borrow_mut().push(event.kind());
            });
        }

        engine.start();
        assert_eq!(
            *kinds.borrow(),
            vec![
                EventKind::LevelChanged,
                EventKind::MovesChanged,
                EventKind::TimeChanged,
                EventKind::ScoreChanged,
            ]
        );
    }
}
