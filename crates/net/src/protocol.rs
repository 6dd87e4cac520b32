//! Wire protocol
//!
//! One JSON object per line. Every message carries an `action` field naming its
//! kind; the remaining fields depend on the kind. Client and relay messages are
//! closed enums, so an unexpected kind is reported as
//! [`ParsedMessage::Unknown`] instead of being silently dropped.
//!
//! ```text
//! -> {"action":"create_room","name":"ada"}
//! <- {"action":"room_created","code":"0427","name":"ada"}
//! <- {"action":"game_start","seed":81723}
//! -> {"action":"send_garbage","count":2}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{NetError, Result};
use duel_tetris_core::pieces::Shape;
use duel_tetris_core::snapshot::{ActiveSnapshot, GameSnapshot};
use duel_tetris_core::types::{Cell, PieceKind, Rotation};

/// Board rows, row 0 first; `None` is empty, otherwise a kind letter or `"G"`.
pub type WireBoard = Vec<Vec<Option<String>>>;

/// Active piece as sent in board updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePiece {
    #[serde(rename = "type")]
    pub kind: String,
    /// Square 0/1 matrix, row 0 first
    pub shape: Vec<Vec<u8>>,
    pub x: i32,
    pub y: i32,
}

/// Display-only snapshot of one player's board.
///
/// Sent as `game_update` and relayed unchanged as `opponent_update`. Never fed
/// back into a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoardState {
    #[serde(default)]
    pub board: WireBoard,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub lines: u32,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub current: Option<WirePiece>,
    #[serde(rename = "nextType", default)]
    pub next_type: Option<String>,
}

impl BoardState {
    pub fn from_snapshot(snap: &GameSnapshot) -> Self {
        let board = (0..snap.height as usize)
            .map(|y| {
                (0..snap.width as usize)
                    .map(|x| snap.cell(x, y).letter().map(str::to_string))
                    .collect()
            })
            .collect();

        let current = snap.active.map(|a| WirePiece {
            kind: a.kind.as_str().to_string(),
            shape: a.shape.to_rows(),
            x: a.x as i32,
            y: a.y as i32,
        });

        Self {
            board,
            score: snap.score,
            lines: snap.lines,
            level: snap.level,
            current,
            next_type: snap.next.map(|k| k.as_str().to_string()),
        }
    }

    /// Decode into a render snapshot, checking it against the expected board size.
    ///
    /// Rejects wrong dimensions, unknown cell letters, unknown piece kinds and
    /// non-square piece grids.
    pub fn to_snapshot(&self, width: u8, height: u8) -> Result<GameSnapshot> {
        if self.board.len() != height as usize {
            return Err(NetError::MalformedMessage(format!(
                "board has {} rows, expected {}",
                self.board.len(),
                height
            )));
        }

        let mut snap = GameSnapshot::empty(width, height);
        snap.cells.clear();
        for (y, row) in self.board.iter().enumerate() {
            if row.len() != width as usize {
                return Err(NetError::MalformedMessage(format!(
                    "row {} has {} cells, expected {}",
                    y,
                    row.len(),
                    width
                )));
            }
            for cell in row {
                let cell = match cell.as_deref() {
                    None => Cell::Empty,
                    Some(letter) => Cell::from_letter(letter).ok_or_else(|| {
                        NetError::MalformedMessage(format!("unknown cell {letter:?}"))
                    })?,
                };
                snap.cells.push(cell);
            }
        }

        snap.active = self.current.as_ref().map(decode_piece).transpose()?;
        snap.next = match self.next_type.as_deref() {
            None => None,
            Some(k) => Some(parse_kind(k)?),
        };
        snap.score = self.score;
        snap.lines = self.lines;
        snap.level = self.level;
        Ok(snap)
    }
}

fn parse_kind(s: &str) -> Result<PieceKind> {
    PieceKind::from_str(s).ok_or_else(|| NetError::MalformedMessage(format!("unknown piece {s:?}")))
}

fn decode_piece(p: &WirePiece) -> Result<ActiveSnapshot> {
    let kind = parse_kind(&p.kind)?;
    let shape = Shape::from_rows(&p.shape)
        .ok_or_else(|| NetError::MalformedMessage("piece shape is not a square grid".into()))?;
    let x = i8::try_from(p.x).map_err(|_| NetError::MalformedMessage("piece x out of range".into()))?;
    let y = i8::try_from(p.y).map_err(|_| NetError::MalformedMessage("piece y out of range".into()))?;
    Ok(ActiveSnapshot {
        kind,
        // Orientation is not on the wire; only the grid matters for drawing.
        rotation: Rotation::North,
        shape,
        x,
        y,
    })
}

/// Client -> relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom {
        #[serde(default)]
        name: Option<String>,
    },
    JoinRoom {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        code: String,
    },
    GameUpdate(BoardState),
    SendGarbage {
        #[serde(default)]
        count: u32,
    },
    GameOver,
    RequestRematch,
}

impl ClientMessage {
    pub const ACTIONS: [&'static str; 6] = [
        "create_room",
        "join_room",
        "game_update",
        "send_garbage",
        "game_over",
        "request_rematch",
    ];
}

/// Relay -> client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ServerMessage {
    RoomCreated {
        code: String,
        name: String,
    },
    RoomJoined {
        code: String,
        name: String,
    },
    Error {
        message: String,
    },
    OpponentJoined {
        opponent: String,
        you: String,
        #[serde(rename = "playerIndex")]
        player_index: u8,
    },
    GameStart {
        seed: i64,
    },
    OpponentUpdate(BoardState),
    ReceiveGarbage {
        count: u32,
    },
    OpponentLost {
        winner: String,
    },
    YouLost {
        winner: String,
    },
    OpponentWantsRematch,
    OpponentDisconnected,
}

impl ServerMessage {
    pub const ACTIONS: [&'static str; 11] = [
        "room_created",
        "room_joined",
        "error",
        "opponent_joined",
        "game_start",
        "opponent_update",
        "receive_garbage",
        "opponent_lost",
        "you_lost",
        "opponent_wants_rematch",
        "opponent_disconnected",
    ];

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}

/// Parsed incoming line
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedMessage<M> {
    Message(M),
    /// Valid JSON object with an `action` this side does not know
    Unknown(String),
}

/// Parse a line sent by a client.
pub fn parse_client(json: &str) -> Result<ParsedMessage<ClientMessage>> {
    parse_with(json, &ClientMessage::ACTIONS)
}

/// Parse a line sent by the relay.
pub fn parse_server(json: &str) -> Result<ParsedMessage<ServerMessage>> {
    parse_with(json, &ServerMessage::ACTIONS)
}

fn parse_with<M>(json: &str, known: &[&str]) -> Result<ParsedMessage<M>>
where
    M: for<'de> Deserialize<'de>,
{
    match serde_json::from_str::<M>(json) {
        Ok(msg) => Ok(ParsedMessage::Message(msg)),
        Err(e) => {
            // An unknown action is not a hard parse error for the protocol.
            #[derive(Debug, Deserialize)]
            struct ActionOnly {
                action: Option<String>,
            }
            let action = serde_json::from_str::<ActionOnly>(json)?
                .action
                .ok_or_else(|| NetError::MalformedMessage("missing action".into()))?;
            if known.contains(&action.as_str()) {
                return Err(NetError::Json(e));
            }
            Ok(ParsedMessage::Unknown(action))
        }
    }
}

/// Serialize a message as one newline-terminated line.
pub fn to_line<M: Serialize>(msg: &M) -> Result<String> {
    let mut line = serde_json::to_string(msg)?;
    line.push('\n');
    Ok(line)
}

/// Serialize a message into `buf` (cleared first), newline included.
pub fn encode_into<M: Serialize>(buf: &mut Vec<u8>, msg: &M) -> Result<()> {
    buf.clear();
    serde_json::to_writer(&mut *buf, msg)?;
    buf.push(b'\n');
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_tetris_core::GameState;

    #[test]
    fn test_parse_create_room() {
        let json = r#"{"action":"create_room","name":"ada"}"#;
        match parse_client(json).unwrap() {
            ParsedMessage::Message(ClientMessage::CreateRoom { name }) => {
                assert_eq!(name.as_deref(), Some("ada"));
            }
            other => panic!("Expected CreateRoom, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_unit_actions() {
        assert_eq!(
            parse_client(r#"{"action":"game_over"}"#).unwrap(),
            ParsedMessage::Message(ClientMessage::GameOver)
        );
        assert_eq!(
            parse_server(r#"{"action":"opponent_disconnected"}"#).unwrap(),
            ParsedMessage::Message(ServerMessage::OpponentDisconnected)
        );
    }

    #[test]
    fn test_unknown_action_is_not_an_error() {
        let parsed = parse_client(r#"{"action":"hold","seq":3}"#).unwrap();
        assert_eq!(parsed, ParsedMessage::Unknown("hold".to_string()));
    }

    #[test]
    fn test_known_action_with_bad_fields_is_an_error() {
        let err = parse_server(r#"{"action":"game_start","seed":"abc"}"#).unwrap_err();
        assert!(matches!(err, NetError::Json(_)));
    }

    #[test]
    fn test_missing_action_is_malformed() {
        let err = parse_client(r#"{"name":"ada"}"#).unwrap_err();
        assert!(matches!(err, NetError::MalformedMessage(_)));
        assert!(matches!(parse_client("not json"), Err(NetError::Json(_))));
    }

    #[test]
    fn test_opponent_joined_uses_camel_case_index() {
        let msg = ServerMessage::OpponentJoined {
            opponent: "bob".into(),
            you: "ada".into(),
            player_index: 1,
        };
        let line = to_line(&msg).unwrap();
        assert!(line.ends_with('\n'));
        let v: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(v["action"], "opponent_joined");
        assert_eq!(v["playerIndex"], 1);
    }

    #[test]
    fn test_game_update_wire_shape() {
        let game = GameState::with_seed(1);
        let state = BoardState::from_snapshot(&game.snapshot());
        let line = to_line(&ClientMessage::GameUpdate(state)).unwrap();
        let v: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();

        assert_eq!(v["action"], "game_update");
        assert_eq!(v["board"].as_array().unwrap().len(), 20);
        assert_eq!(v["board"][0].as_array().unwrap().len(), 10);
        assert!(v["board"][19][0].is_null());
        assert_eq!(v["level"], 1);
        assert!(v["current"]["type"].is_string());
        assert!(v["current"]["shape"].is_array());
        assert!(v["nextType"].is_string());
    }

    #[test]
    fn test_board_state_decodes_back() {
        let mut game = GameState::with_seed(9);
        game.apply_action(duel_tetris_core::types::GameAction::HardDrop);
        let snap = game.snapshot();
        let state = BoardState::from_snapshot(&snap);
        let decoded = state.to_snapshot(10, 20).unwrap();
        assert_eq!(decoded.cells, snap.cells);
        assert_eq!(decoded.active.map(|a| (a.kind, a.x, a.y)), snap.active.map(|a| (a.kind, a.x, a.y)));
        assert_eq!(decoded.next, snap.next);
        assert_eq!(decoded.score, snap.score);
    }

    #[test]
    fn test_board_state_rejects_bad_boards() {
        let mut state = BoardState::from_snapshot(&GameSnapshot::default());
        assert!(state.to_snapshot(10, 20).is_ok());
        assert!(state.to_snapshot(10, 21).is_err());

        state.board[3][3] = Some("X".into());
        assert!(state.to_snapshot(10, 20).is_err());

        let mut state = BoardState::from_snapshot(&GameSnapshot::default());
        state.board[5].pop();
        assert!(state.to_snapshot(10, 20).is_err());

        let mut state = BoardState::from_snapshot(&GameSnapshot::default());
        state.current = Some(WirePiece {
            kind: "T".into(),
            shape: vec![vec![1, 1], vec![1]],
            x: 3,
            y: 0,
        });
        assert!(state.to_snapshot(10, 20).is_err());
    }

    #[test]
    fn test_relay_fields_default_when_missing() {
        let parsed = parse_client(r#"{"action":"game_update"}"#).unwrap();
        assert_eq!(
            parsed,
            ParsedMessage::Message(ClientMessage::GameUpdate(BoardState::default()))
        );
        let parsed = parse_client(r#"{"action":"join_room","name":"x"}"#).unwrap();
        assert!(matches!(
            parsed,
            ParsedMessage::Message(ClientMessage::JoinRoom { ref code, .. }) if code.is_empty()
        ));
    }

    #[test]
    fn test_encode_into_reuses_buffer() {
        let mut buf = b"stale".to_vec();
        encode_into(&mut buf, &ServerMessage::GameStart { seed: 42 }).unwrap();
        assert_eq!(buf, b"{\"action\":\"game_start\",\"seed\":42}\n");
    }
}
