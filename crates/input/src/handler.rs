//! DAS/ARR input handler for terminal environments.
//!
//! A press fires its action once. Moves and soft drop then repeat while held:
//! nothing until the DAS delay has passed, then one action per ARR interval.
//! Rotations and hard drop never repeat.
//!
//! Supports terminals that do not emit key release events by using a timeout.

use std::time::{Duration, Instant};

use arrayvec::ArrayVec;
use crossterm::event::KeyCode;

use crate::map::KeyMap;
use crate::types::{GameAction, DEFAULT_ARR_MS, DEFAULT_DAS_MS};

// In terminals without key-release events, a short timeout prevents a single tap
// from turning into a sustained "held" state that triggers DAS/ARR repeats.
const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u32 = 150;

/// Repeating actions that can be held at once (left, right, soft drop).
const MAX_HELD: usize = 3;

#[derive(Debug, Clone, Copy)]
struct HeldKey {
    action: GameAction,
    das_timer: u32,
    arr_accumulator: u32,
    last_seen: Instant,
}

impl HeldKey {
    fn new(action: GameAction) -> Self {
        Self {
            action,
            das_timer: 0,
            arr_accumulator: 0,
            last_seen: Instant::now(),
        }
    }
}

/// Tracks held keys for one board.
#[derive(Debug, Clone)]
pub struct InputHandler {
    map: KeyMap,
    held: ArrayVec<HeldKey, MAX_HELD>,
    das_delay: u32,
    arr_rate: u32,
    key_release_timeout_ms: u32,
}

impl InputHandler {
    pub fn new(map: KeyMap) -> Self {
        Self::with_config(map, DEFAULT_DAS_MS, DEFAULT_ARR_MS)
    }

    pub fn with_config(map: KeyMap, das_delay: u32, arr_rate: u32) -> Self {
        Self {
            map,
            held: ArrayVec::new(),
            das_delay,
            arr_rate: arr_rate.max(1),
            key_release_timeout_ms: DEFAULT_KEY_RELEASE_TIMEOUT_MS,
        }
    }

    pub fn with_key_release_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.key_release_timeout_ms = timeout_ms;
        self
    }

    pub fn key_release_timeout_ms(&self) -> u32 {
        self.key_release_timeout_ms
    }

    pub fn map(&self) -> KeyMap {
        self.map
    }

    /// Whether `action` is currently held.
    pub fn is_held(&self, action: GameAction) -> bool {
        self.held.iter().any(|h| h.action == action)
    }

    /// Handle a key press, returning the action to apply immediately.
    ///
    /// A press of a key that is already held (terminal auto-repeat) only
    /// refreshes the release timeout.
    pub fn handle_key_press(&mut self, code: KeyCode) -> Option<GameAction> {
        let action = self.map.action_for(code)?;
        if !action.repeats() {
            return Some(action);
        }

        if let Some(held) = self.held.iter_mut().find(|h| h.action == action) {
            held.last_seen = Instant::now();
            return None;
        }

        // Left and right cancel each other.
        let opposite = match action {
            GameAction::MoveLeft => Some(GameAction::MoveRight),
            GameAction::MoveRight => Some(GameAction::MoveLeft),
            _ => None,
        };
        if let Some(opposite) = opposite {
            self.held.retain(|h| h.action != opposite);
        }

        let _ = self.held.try_push(HeldKey::new(action));
        Some(action)
    }

    pub fn handle_key_release(&mut self, code: KeyCode) {
        if let Some(action) = self.map.action_for(code) {
            self.held.retain(|h| h.action != action);
        }
    }

    /// Advance held keys by `elapsed_ms` and return the repeats that fell due.
    pub fn update(&mut self, elapsed_ms: u32) -> ArrayVec<GameAction, 32> {
        let mut actions = ArrayVec::<GameAction, 32>::new();

        // Auto-release when terminal does not emit release events.
        let timeout = Duration::from_millis(u64::from(self.key_release_timeout_ms));
        self.held.retain(|h| h.last_seen.elapsed() <= timeout);

        for held in self.held.iter_mut() {
            let prev_das = held.das_timer;
            held.das_timer = held.das_timer.saturating_add(elapsed_ms);
            if held.das_timer < self.das_delay {
                continue;
            }

            let excess = if prev_das < self.das_delay {
                held.das_timer - self.das_delay
            } else {
                elapsed_ms
            };
            held.arr_accumulator = held.arr_accumulator.saturating_add(excess);

            while held.arr_accumulator >= self.arr_rate {
                let _ = actions.try_push(held.action);
                held.arr_accumulator -= self.arr_rate;
            }
        }

        actions
    }

    pub fn reset(&mut self) {
        self.held.clear();
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new(KeyMap::Solo)
    }
}
