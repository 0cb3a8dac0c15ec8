//! Synchronous in-process event bus.
//!
//! The simulation engine publishes state changes here; a presentation
//! layer subscribes. Delivery is synchronous, in subscription order,
//! against a snapshot of the subscriber list taken at emit time, so
//! callbacks may subscribe or unsubscribe without disturbing the
//! in-flight delivery. Single-threaded by design, like the rest of
//! the core.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::Serialize;

/// Final `{moves, time}` counters carried by the `Ended` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FinalSnapshot {
    pub moves: u32,
    pub time: u32,
}

/// Subscription key: which family of events a callback wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    LevelChanged,
    MovesChanged,
    TimeChanged,
    ScoreChanged,
    Ended,
}

/// A state-change notification from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Current level index.
    LevelChanged(usize),
    /// Moves remaining.
    MovesChanged(u32),
    /// Time remaining, in ticks.
    TimeChanged(u32),
    /// Cumulative score.
    ScoreChanged(u64),
    /// The run is over. Terminal; fires exactly once.
    Ended(FinalSnapshot),
}

impl GameEvent {
    pub const fn kind(&self) -> EventKind {
        match self {
            GameEvent::LevelChanged(_) => EventKind::LevelChanged,
            GameEvent::MovesChanged(_) => EventKind::MovesChanged,
            GameEvent::TimeChanged(_) => EventKind::TimeChanged,
            GameEvent::ScoreChanged(_) => EventKind::ScoreChanged,
            GameEvent::Ended(_) => EventKind::Ended,
        }
    }
}

type Callback = Rc<RefCell<dyn FnMut(&GameEvent)>>;

struct Subscriber {
    id: u64,
    kind: EventKind,
    callback: Callback,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

/// Cheaply clonable handle to a shared subscriber registry.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Rc<RefCell<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for one event kind. Callbacks are invoked
    /// in subscription order.
    pub fn subscribe(
        &self,
        kind: EventKind,
        callback: impl FnMut(&GameEvent) + 'static,
    ) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.subscribers.push(Subscriber {
            id,
            kind,
            callback: Rc::new(RefCell::new(callback)),
        });
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Deliver an event to every subscriber of its kind.
    pub fn emit(&self, event: &GameEvent) {
        // Snapshot the matching callbacks first; the registry borrow
        // must not be held while callbacks run, or re-entrant
        // subscribe/unsubscribe calls would panic.
        let snapshot: Vec<Callback> = self
            .registry
            .borrow()
            .subscribers
            .iter()
            .filter(|s| s.kind == event.kind())
            .map(|s| Rc::clone(&s.callback))
            .collect();

        for callback in snapshot {
            (callback.borrow_mut())(event);
        }
    }
}

/// Handle returned by [`EventBus::subscribe`]. Dropping it does not
/// unsubscribe; call [`Subscription::unsubscribe`].
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    /// Remove the callback. Idempotent; a second call (or a call after
    /// the bus is gone) is a no-op.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .subscribers
                .retain(|s| s.id != self.id);
        }
    }
}
