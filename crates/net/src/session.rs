//! Match session - the client side of an online match
//!
//! Owns the local engine and the opponent view, consumes relay messages and
//! produces the messages the client must send. It does no I/O itself, so the
//! same code runs behind a real socket and in tests.
//!
//! ```text
//! Lobby -> Waiting(code) -> Matched -> Countdown -> Playing -> Finished(Won|Lost)
//!                                          ^                        |
//!                                          +------ game_start ------+
//! ```
//!
//! Only the seed crosses the wire to start a match. Both engines then draw the
//! same piece sequence on their own; board snapshots are sent purely for display.

use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::opponent::OpponentView;
use crate::protocol::{BoardState, ClientMessage, ServerMessage};
use duel_tetris_core::config::RulesConfig;
use duel_tetris_core::rng::Randomizer;
use duel_tetris_core::types::{CoreEvent, GameAction};
use duel_tetris_core::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    Won,
    Lost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchPhase {
    /// Connected, not in a room
    Lobby,
    /// In a room, waiting for a second player
    Waiting { code: String },
    /// Both players present, waiting for `game_start`
    Matched,
    /// Seed received; the game starts when the countdown runs out
    Countdown { seed: i64, remaining_ms: u32 },
    Playing,
    Finished(MatchResult),
}

pub struct MatchSession {
    config: ClientConfig,
    rules: RulesConfig,
    phase: MatchPhase,
    game: Option<GameState>,
    opponent: OpponentView,
    my_name: Option<String>,
    opponent_name: Option<String>,
    player_index: Option<u8>,
    room_code: Option<String>,
    last_error: Option<String>,
    opponent_wants_rematch: bool,
    opponent_left: bool,
    snapshot_acc_ms: u32,
}

impl MatchSession {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_rules(config, RulesConfig::online())
    }

    pub fn with_rules(config: ClientConfig, rules: RulesConfig) -> Self {
        Self {
            config,
            opponent: OpponentView::new(rules.width, rules.height),
            rules,
            phase: MatchPhase::Lobby,
            game: None,
            my_name: None,
            opponent_name: None,
            player_index: None,
            room_code: None,
            last_error: None,
            opponent_wants_rematch: false,
            opponent_left: false,
            snapshot_acc_ms: 0,
        }
    }

    pub fn phase(&self) -> &MatchPhase {
        &self.phase
    }

    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    pub fn opponent(&self) -> &OpponentView {
        &self.opponent
    }

    pub fn my_name(&self) -> Option<&str> {
        self.my_name.as_deref()
    }

    pub fn opponent_name(&self) -> Option<&str> {
        self.opponent_name.as_deref()
    }

    /// 0 for the room host, 1 for the guest.
    pub fn player_index(&self) -> Option<u8> {
        self.player_index
    }

    pub fn room_code(&self) -> Option<&str> {
        self.room_code.as_deref()
    }

    /// Last error reported by the relay.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn opponent_wants_rematch(&self) -> bool {
        self.opponent_wants_rematch
    }

    /// The opponent disconnected; no rematch is possible in this room.
    pub fn opponent_left(&self) -> bool {
        self.opponent_left
    }

    pub fn is_playing(&self) -> bool {
        self.phase == MatchPhase::Playing
    }

    pub fn create_room(&mut self, name: &str) -> ClientMessage {
        self.last_error = None;
        ClientMessage::CreateRoom {
            name: Some(name.to_string()),
        }
    }

    pub fn join_room(&mut self, name: &str, code: &str) -> ClientMessage {
        self.last_error = None;
        ClientMessage::JoinRoom {
            name: Some(name.to_string()),
            code: code.trim().to_string(),
        }
    }

    /// Ask for another round. Only meaningful once a match has finished.
    pub fn request_rematch(&mut self) -> Option<ClientMessage> {
        match self.phase {
            MatchPhase::Finished(_) if !self.opponent_left => Some(ClientMessage::RequestRematch),
            _ => None,
        }
    }

    /// Apply a relay message.
    pub fn handle(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::RoomCreated { code, name } => {
                info!("room {} created", code);
                self.my_name = Some(name);
                self.room_code = Some(code.clone());
                self.phase = MatchPhase::Waiting { code };
            }
            ServerMessage::RoomJoined { code, name } => {
                info!("joined room {}", code);
                self.my_name = Some(name);
                self.room_code = Some(code.clone());
                self.phase = MatchPhase::Waiting { code };
            }
            ServerMessage::Error { message } => {
                warn!("relay error: {}", message);
                self.last_error = Some(message);
            }
            ServerMessage::OpponentJoined {
                opponent,
                you,
                player_index,
            } => {
                info!("matched against {}", opponent);
                self.my_name = Some(you);
                self.opponent_name = Some(opponent);
                self.player_index = Some(player_index);
                self.opponent_left = false;
                self.phase = MatchPhase::Matched;
            }
            ServerMessage::GameStart { seed } => {
                info!("game start, seed {}", seed);
                self.opponent_wants_rematch = false;
                self.opponent.reset();
                if self.config.countdown_ms == 0 {
                    self.start_game(seed);
                } else {
                    self.game = None;
                    self.phase = MatchPhase::Countdown {
                        seed,
                        remaining_ms: self.config.countdown_ms,
                    };
                }
            }
            ServerMessage::OpponentUpdate(state) => {
                // Rejected updates leave the previous view in place.
                let _ = self.opponent.apply(&state);
            }
            ServerMessage::ReceiveGarbage { count } => {
                if let (MatchPhase::Playing, Some(game)) = (&self.phase, self.game.as_mut()) {
                    debug!("receiving {} garbage lines", count);
                    game.add_garbage(count);
                }
            }
            ServerMessage::OpponentLost { winner } => {
                debug!("opponent lost, winner {}", winner);
                if self.is_playing() {
                    self.phase = MatchPhase::Finished(MatchResult::Won);
                }
            }
            ServerMessage::YouLost { winner } => {
                // The local top-out already finished the match.
                debug!("relay confirms loss, winner {}", winner);
            }
            ServerMessage::OpponentWantsRematch => {
                self.opponent_wants_rematch = true;
            }
            ServerMessage::OpponentDisconnected => {
                info!("opponent disconnected");
                self.opponent_left = true;
                if matches!(
                    self.phase,
                    MatchPhase::Playing | MatchPhase::Countdown { .. } | MatchPhase::Matched
                ) {
                    self.phase = MatchPhase::Finished(MatchResult::Won);
                }
            }
        }
    }

    /// The link to the relay dropped. An unfinished game counts as lost.
    pub fn connection_lost(&mut self) {
        if matches!(self.phase, MatchPhase::Playing | MatchPhase::Countdown { .. }) {
            self.phase = MatchPhase::Finished(MatchResult::Lost);
        }
    }

    fn start_game(&mut self, seed: i64) {
        self.game = Some(GameState::new(self.rules, Randomizer::seeded(seed)));
        self.snapshot_acc_ms = 0;
        self.phase = MatchPhase::Playing;
    }

    /// Route a local input to the engine. Ignored unless playing.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.game
            .as_mut()
            .is_some_and(|game| game.apply_action(action))
    }

    /// Advance time and collect the messages to send.
    ///
    /// While playing this yields one `send_garbage` per qualifying clear, a
    /// `game_over` exactly once when the local game ends, and at most one
    /// `game_update` per call on the snapshot cadence.
    pub fn step(&mut self, elapsed_ms: u32) -> Vec<ClientMessage> {
        let mut out = Vec::new();

        if let MatchPhase::Countdown { seed, remaining_ms } = self.phase {
            let remaining_ms = remaining_ms.saturating_sub(elapsed_ms);
            if remaining_ms == 0 {
                self.start_game(seed);
            } else {
                self.phase = MatchPhase::Countdown { seed, remaining_ms };
            }
            return out;
        }

        if !self.is_playing() {
            return out;
        }
        let Some(game) = self.game.as_mut() else {
            return out;
        };

        game.step(elapsed_ms);
        for event in game.drain_events() {
            if let CoreEvent::LinesCleared { garbage, .. } = event {
                if garbage > 0 {
                    out.push(ClientMessage::SendGarbage { count: garbage });
                }
            }
        }

        if game.game_over() {
            info!("topped out with {} points", game.score());
            out.push(ClientMessage::GameOver);
            self.phase = MatchPhase::Finished(MatchResult::Lost);
            return out;
        }

        let interval = self.config.snapshot_interval_ms.max(1);
        self.snapshot_acc_ms = self.snapshot_acc_ms.saturating_add(elapsed_ms);
        if self.snapshot_acc_ms >= interval {
            self.snapshot_acc_ms %= interval;
            out.push(ClientMessage::GameUpdate(BoardState::from_snapshot(
                &game.snapshot(),
            )));
        }

        out
    }
}

/// Each of 3, 2 and 1 is shown this long.
pub const COUNTDOWN_STEP_MS: u32 = 800;
/// "GO!" fills the last part of the countdown.
pub const COUNTDOWN_GO_MS: u32 = 400;

/// Label for a countdown with `remaining_ms` left: 3, 2, 1, then GO!.
pub fn countdown_label(remaining_ms: u32) -> &'static str {
    if remaining_ms <= COUNTDOWN_GO_MS {
        return "GO!";
    }
    match (remaining_ms - COUNTDOWN_GO_MS).div_ceil(COUNTDOWN_STEP_MS) {
        1 => "1",
        2 => "2",
        _ => "3",
    }
}
