//! Room registry for the relay
//!
//! Pure bookkeeping: every operation returns the messages to deliver and never
//! touches a socket. Rooms hold at most two players, are keyed by a fresh
//! 4-digit code and disappear when their last player leaves.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use tracing::{debug, info};

use crate::config::sanitize_name;
use crate::protocol::{ClientMessage, ServerMessage};

pub type ClientId = u64;

/// Largest seed handed out in `game_start`
pub const MAX_SEED: i64 = 999_999;

/// Message addressed to one connected client
#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub to: ClientId,
    pub msg: ServerMessage,
}

impl Outgoing {
    fn new(to: ClientId, msg: ServerMessage) -> Self {
        Self { to, msg }
    }
}

/// A `game_start` to deliver once the start delay has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingStart {
    pub code: String,
    pub seed: i64,
}

/// Result of handling one client message
#[derive(Debug, Default)]
pub struct Dispatch {
    pub out: Vec<Outgoing>,
    pub start: Option<PendingStart>,
}

impl From<Vec<Outgoing>> for Dispatch {
    fn from(out: Vec<Outgoing>) -> Self {
        Self { out, start: None }
    }
}

#[derive(Debug, Clone)]
struct Player {
    id: ClientId,
    name: String,
}

#[derive(Debug, Clone)]
struct Room {
    players: Vec<Player>,
    started: bool,
    rematch_requests: HashSet<ClientId>,
}

impl Room {
    fn is_full(&self) -> bool {
        self.players.len() >= 2
    }

    fn opponent_of(&self, id: ClientId) -> Option<&Player> {
        self.players.iter().find(|p| p.id != id)
    }
}

#[derive(Debug, Default)]
pub struct Lobby {
    rooms: HashMap<String, Room>,
    /// Which room each client is in
    membership: HashMap<ClientId, String>,
    max_name_len: usize,
}

impl Lobby {
    pub fn new(max_name_len: usize) -> Self {
        Self {
            rooms: HashMap::new(),
            membership: HashMap::new(),
            max_name_len,
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room_of(&self, client: ClientId) -> Option<&str> {
        self.membership.get(&client).map(String::as_str)
    }

    /// Players in a room, host first.
    pub fn players(&self, code: &str) -> Vec<ClientId> {
        self.rooms
            .get(code)
            .map(|r| r.players.iter().map(|p| p.id).collect())
            .unwrap_or_default()
    }

    pub fn handle(&mut self, client: ClientId, msg: ClientMessage) -> Dispatch {
        match msg {
            ClientMessage::CreateRoom { name } => self.create_room(client, name.as_deref()).into(),
            ClientMessage::JoinRoom { name, code } => self.join_room(client, name.as_deref(), &code),
            ClientMessage::GameUpdate(state) => self
                .to_opponent(client, ServerMessage::OpponentUpdate(state))
                .into(),
            ClientMessage::SendGarbage { count } => {
                debug!("client {} sends {} garbage", client, count);
                self.to_opponent(client, ServerMessage::ReceiveGarbage { count })
                    .into()
            }
            ClientMessage::GameOver => self.game_over(client).into(),
            ClientMessage::RequestRematch => self.request_rematch(client),
        }
    }

    fn generate_code(&self) -> String {
        let mut rng = rand::rng();
        loop {
            let code = format!("{:04}", rng.random_range(0..10_000u32));
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }

    fn generate_seed() -> i64 {
        rand::rng().random_range(0..=MAX_SEED)
    }

    fn create_room(&mut self, client: ClientId, name: Option<&str>) -> Vec<Outgoing> {
        let mut out = self.leave(client);
        let name = sanitize_name(name, self.max_name_len);
        let code = self.generate_code();
        info!("client {} ({}) created room {}", client, name, code);

        self.rooms.insert(
            code.clone(),
            Room {
                players: vec![Player {
                    id: client,
                    name: name.clone(),
                }],
                started: false,
                rematch_requests: HashSet::new(),
            },
        );
        self.membership.insert(client, code.clone());
        out.push(Outgoing::new(client, ServerMessage::RoomCreated { code, name }));
        out
    }

    fn join_room(&mut self, client: ClientId, name: Option<&str>, code: &str) -> Dispatch {
        let code = code.trim();
        let name = sanitize_name(name, self.max_name_len);

        let refusal = match self.rooms.get(code) {
            None => Some("Room not found"),
            Some(room) if room.players.iter().any(|p| p.id == client) => Some("Already in this room"),
            Some(room) if room.is_full() => Some("Room is full"),
            Some(room) if room.started => Some("Game already started"),
            Some(_) => None,
        };
        if let Some(message) = refusal {
            debug!("client {} refused from room {}: {}", client, code, message);
            return vec![Outgoing::new(client, ServerMessage::error(message))].into();
        }

        let mut out = self.leave(client);
        let Some(room) = self.rooms.get_mut(code) else {
            return out.into();
        };
        room.players.push(Player {
            id: client,
            name: name.clone(),
        });
        room.started = true;
        self.membership.insert(client, code.to_string());
        info!("client {} ({}) joined room {}", client, name, code);

        out.push(Outgoing::new(
            client,
            ServerMessage::RoomJoined {
                code: code.to_string(),
                name,
            },
        ));
        if let [host, guest] = room.players.as_slice() {
            out.push(Outgoing::new(
                host.id,
                ServerMessage::OpponentJoined {
                    opponent: guest.name.clone(),
                    you: host.name.clone(),
                    player_index: 0,
                },
            ));
            out.push(Outgoing::new(
                guest.id,
                ServerMessage::OpponentJoined {
                    opponent: host.name.clone(),
                    you: guest.name.clone(),
                    player_index: 1,
                },
            ));
        }

        Dispatch {
            out,
            start: Some(PendingStart {
                code: code.to_string(),
                seed: Self::generate_seed(),
            }),
        }
    }

    /// `game_start` for everyone still in the room.
    pub fn start_game(&self, start: &PendingStart) -> Vec<Outgoing> {
        let Some(room) = self.rooms.get(&start.code) else {
            return Vec::new();
        };
        info!("room {} starting with seed {}", start.code, start.seed);
        room.players
            .iter()
            .map(|p| Outgoing::new(p.id, ServerMessage::GameStart { seed: start.seed }))
            .collect()
    }

    fn room_and_opponent(&self, client: ClientId) -> Option<(&Room, Option<&Player>)> {
        let code = self.membership.get(&client)?;
        let room = self.rooms.get(code)?;
        Some((room, room.opponent_of(client)))
    }

    fn to_opponent(&self, client: ClientId, msg: ServerMessage) -> Vec<Outgoing> {
        match self.room_and_opponent(client) {
            Some((_, Some(opp))) => vec![Outgoing::new(opp.id, msg)],
            _ => Vec::new(),
        }
    }

    fn game_over(&self, client: ClientId) -> Vec<Outgoing> {
        let Some((_, opp)) = self.room_and_opponent(client) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(2);
        let winner = match opp {
            Some(opp) => {
                out.push(Outgoing::new(
                    opp.id,
                    ServerMessage::OpponentLost {
                        winner: opp.name.clone(),
                    },
                ));
                opp.name.clone()
            }
            None => "Opponent".to_string(),
        };
        out.push(Outgoing::new(client, ServerMessage::YouLost { winner }));
        out
    }

    fn request_rematch(&mut self, client: ClientId) -> Dispatch {
        let Some(code) = self.membership.get(&client).cloned() else {
            return Dispatch::default();
        };
        let Some(room) = self.rooms.get_mut(&code) else {
            return Dispatch::default();
        };

        room.rematch_requests.insert(client);
        if room.rematch_requests.len() >= 2 {
            room.rematch_requests.clear();
            let start = PendingStart {
                code,
                seed: Self::generate_seed(),
            };
            // Rematches start right away.
            return self.start_game(&start).into();
        }

        match room.opponent_of(client) {
            Some(opp) => vec![Outgoing::new(opp.id, ServerMessage::OpponentWantsRematch)].into(),
            None => Dispatch::default(),
        }
    }

    /// Remove a client from its room, telling the opponent. Empty rooms are deleted.
    pub fn leave(&mut self, client: ClientId) -> Vec<Outgoing> {
        let Some(code) = self.membership.remove(&client) else {
            return Vec::new();
        };
        let Some(room) = self.rooms.get_mut(&code) else {
            return Vec::new();
        };

        room.players.retain(|p| p.id != client);
        room.rematch_requests.remove(&client);
        let out = room
            .players
            .iter()
            .map(|p| Outgoing::new(p.id, ServerMessage::OpponentDisconnected))
            .collect();

        if room.players.is_empty() {
            info!("room {} closed", code);
            self.rooms.remove(&code);
        }
        out
    }
}
