//! Wire format checks against literal JSON lines

use duel_tetris::core::GameState;
use duel_tetris::net::{
    parse_client, parse_server, to_line, BoardState, ClientMessage, ParsedMessage, ServerMessage,
};
use serde_json::{json, Value};

fn as_json(line: &str) -> Value {
    assert!(line.ends_with('\n'));
    assert_eq!(line.matches('\n').count(), 1);
    serde_json::from_str(line.trim_end()).unwrap()
}

#[test]
fn client_messages_use_action_tags() {
    let line = to_line(&ClientMessage::CreateRoom {
        name: Some("ada".into()),
    })
    .unwrap();
    assert_eq!(as_json(&line), json!({"action": "create_room", "name": "ada"}));

    let line = to_line(&ClientMessage::JoinRoom {
        name: Some("bob".into()),
        code: "0427".into(),
    })
    .unwrap();
    assert_eq!(
        as_json(&line),
        json!({"action": "join_room", "name": "bob", "code": "0427"})
    );

    let line = to_line(&ClientMessage::SendGarbage { count: 4 }).unwrap();
    assert_eq!(as_json(&line), json!({"action": "send_garbage", "count": 4}));

    let line = to_line(&ClientMessage::GameOver).unwrap();
    assert_eq!(as_json(&line), json!({"action": "game_over"}));

    let line = to_line(&ClientMessage::RequestRematch).unwrap();
    assert_eq!(as_json(&line), json!({"action": "request_rematch"}));
}

#[test]
fn opponent_joined_uses_camel_case_index() {
    let line = to_line(&ServerMessage::OpponentJoined {
        opponent: "bob".into(),
        you: "ada".into(),
        player_index: 1,
    })
    .unwrap();
    assert_eq!(
        as_json(&line),
        json!({"action": "opponent_joined", "opponent": "bob", "you": "ada", "playerIndex": 1})
    );
}

#[test]
fn parses_relay_lines() {
    let parsed = parse_server(r#"{"action":"game_start","seed":81723}"#).unwrap();
    assert_eq!(
        parsed,
        ParsedMessage::Message(ServerMessage::GameStart { seed: 81723 })
    );

    let parsed = parse_server(r#"{"action":"receive_garbage","count":2}"#).unwrap();
    assert_eq!(
        parsed,
        ParsedMessage::Message(ServerMessage::ReceiveGarbage { count: 2 })
    );

    let parsed = parse_server(r#"{"action":"opponent_disconnected"}"#).unwrap();
    assert_eq!(
        parsed,
        ParsedMessage::Message(ServerMessage::OpponentDisconnected)
    );
}

#[test]
fn missing_name_parses_as_none() {
    let parsed = parse_client(r#"{"action":"create_room"}"#).unwrap();
    assert_eq!(
        parsed,
        ParsedMessage::Message(ClientMessage::CreateRoom { name: None })
    );
}

#[test]
fn unknown_action_is_reported_not_dropped() {
    let parsed = parse_client(r#"{"action":"spectate","code":"1234"}"#).unwrap();
    assert_eq!(parsed, ParsedMessage::Unknown("spectate".into()));

    let parsed = parse_server(r#"{"action":"chat","text":"hi"}"#).unwrap();
    assert_eq!(parsed, ParsedMessage::Unknown("chat".into()));
}

#[test]
fn malformed_lines_are_errors() {
    assert!(parse_client("not json").is_err());
    assert!(parse_client(r#"{"name":"ada"}"#).is_err());
    // Known action with a wrongly typed field.
    assert!(parse_client(r#"{"action":"send_garbage","count":"two"}"#).is_err());
}

#[test]
fn game_update_carries_board_and_piece() {
    let mut game = GameState::with_seed(31);
    game.hard_drop();
    let state = BoardState::from_snapshot(&game.snapshot());
    let line = to_line(&ClientMessage::GameUpdate(state.clone())).unwrap();
    let value = as_json(&line);

    assert_eq!(value["action"], "game_update");
    assert_eq!(value["board"].as_array().unwrap().len(), 20);
    assert_eq!(value["board"][0].as_array().unwrap().len(), 10);
    assert_eq!(value["score"], json!(game.score()));
    assert_eq!(value["nextType"], json!(game.next_kind().as_str()));

    let current = game.current().unwrap();
    assert_eq!(value["current"]["type"], json!(current.kind.as_str()));
    assert_eq!(value["current"]["x"], json!(current.x));
    assert_eq!(value["current"]["y"], json!(current.y));

    let filled = value["board"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|row| row.as_array().unwrap())
        .filter(|c| !c.is_null())
        .count();
    assert_eq!(filled, 4);

    // The relay forwards the same fields as `opponent_update`.
    let relayed = to_line(&ServerMessage::OpponentUpdate(state.clone())).unwrap();
    match parse_server(relayed.trim_end()).unwrap() {
        ParsedMessage::Message(ServerMessage::OpponentUpdate(back)) => assert_eq!(back, state),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn board_state_rejects_wrong_dimensions() {
    let game = GameState::with_seed(3);
    let state = BoardState::from_snapshot(&game.snapshot());
    assert!(state.to_snapshot(10, 20).is_ok());
    assert!(state.to_snapshot(10, 22).is_err());
    assert!(state.to_snapshot(8, 20).is_err());

    let mut bad = state.clone();
    bad.board[19][0] = Some("X".into());
    assert!(bad.to_snapshot(10, 20).is_err());

    let mut bad = state;
    if let Some(piece) = bad.current.as_mut() {
        piece.shape.pop();
    }
    assert!(bad.to_snapshot(10, 20).is_err());
}

#[test]
fn garbage_cells_travel_as_g() {
    let mut game = GameState::with_seed(3);
    game.add_garbage(1);
    game.hard_drop();
    let state = BoardState::from_snapshot(&game.snapshot());
    let row = &state.board[19];
    assert_eq!(row.iter().filter(|c| c.as_deref() == Some("G")).count(), 9);
    assert_eq!(row.iter().filter(|c| c.is_none()).count(), 1);
}
