//! Local head-to-head match: two independent games in one process.
//!
//! The games share nothing. After every step the lines-cleared events of each
//! side are turned into garbage for the other side.

use crate::config::RulesConfig;
use crate::game_state::GameState;
use crate::rng::Randomizer;
use crate::types::{CoreEvent, GameAction, PlayerSide};

#[derive(Debug, Clone)]
pub struct Versus {
    p1: GameState,
    p2: GameState,
    winner: Option<PlayerSide>,
}

impl Versus {
    /// Both players on free-running randomizers.
    pub fn new(rules: RulesConfig) -> Self {
        Self::from_games(
            GameState::new(rules, Randomizer::from_entropy()),
            GameState::new(rules, Randomizer::from_entropy()),
        )
    }

    /// Deterministic match.
    pub fn with_seeds(rules: RulesConfig, p1_seed: i64, p2_seed: i64) -> Self {
        Self::from_games(
            GameState::new(rules, Randomizer::seeded(p1_seed)),
            GameState::new(rules, Randomizer::seeded(p2_seed)),
        )
    }

    pub fn from_games(p1: GameState, p2: GameState) -> Self {
        let mut versus = Self {
            p1,
            p2,
            winner: None,
        };
        versus.check_outcome();
        versus
    }

    pub fn player(&self, side: PlayerSide) -> &GameState {
        match side {
            PlayerSide::One => &self.p1,
            PlayerSide::Two => &self.p2,
        }
    }

    fn player_mut(&mut self, side: PlayerSide) -> &mut GameState {
        match side {
            PlayerSide::One => &mut self.p1,
            PlayerSide::Two => &mut self.p2,
        }
    }

    pub fn winner(&self) -> Option<PlayerSide> {
        self.winner
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    /// Route an input to one side. Ignored once the match is decided.
    pub fn apply(&mut self, side: PlayerSide, action: GameAction) -> bool {
        if self.is_finished() {
            return false;
        }
        self.player_mut(side).apply_action(action)
    }

    /// Step both games, exchange garbage and return the winner once decided.
    pub fn step(&mut self, elapsed_ms: u32) -> Option<PlayerSide> {
        if self.is_finished() {
            return self.winner;
        }

        self.p1.step(elapsed_ms);
        self.p2.step(elapsed_ms);

        let to_p2 = garbage_sent(&self.p1.drain_events());
        let to_p1 = garbage_sent(&self.p2.drain_events());
        if to_p2 > 0 {
            self.p2.add_garbage(to_p2);
        }
        if to_p1 > 0 {
            self.p1.add_garbage(to_p1);
        }

        self.check_outcome();
        self.winner
    }

    /// Player one topping out hands the win to player two, checked first.
    fn check_outcome(&mut self) {
        if self.winner.is_some() {
            return;
        }
        if self.p1.game_over() {
            self.winner = Some(PlayerSide::Two);
        } else if self.p2.game_over() {
            self.winner = Some(PlayerSide::One);
        }
    }
}

/// Total garbage owed to the opponent by a batch of events.
pub fn garbage_sent(events: &[CoreEvent]) -> u32 {
    events
        .iter()
        .map(|e| match e {
            CoreEvent::LinesCleared { garbage, .. } => *garbage,
            _ => 0,
        })
        .sum()
}
