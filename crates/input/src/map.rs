//! Key mapping from terminal events to game actions.

use crate::types::GameAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which set of keys drives a board.
///
/// Hot-seat play splits the keyboard between [`KeyMap::PlayerOne`] (left hand)
/// and [`KeyMap::PlayerTwo`] (right hand). Online play has a single local board
/// and accepts both layouts through [`KeyMap::Solo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMap {
    /// `A`/`D` move, `S` soft drop, `W` hard drop, `Q` rotate CCW, `E` rotate CW
    PlayerOne,
    /// Arrows move, `Down` soft drop, `Up` hard drop, `N` rotate CCW, `M` rotate CW
    PlayerTwo,
    /// Union of both layouts
    Solo,
}

impl KeyMap {
    /// Map a key code to the action it triggers under this layout.
    pub fn action_for(&self, code: KeyCode) -> Option<GameAction> {
        match self {
            KeyMap::PlayerOne => player_one(code),
            KeyMap::PlayerTwo => player_two(code),
            KeyMap::Solo => player_one(code).or_else(|| player_two(code)),
        }
    }
}

fn player_one(code: KeyCode) -> Option<GameAction> {
    let KeyCode::Char(c) = code else {
        return None;
    };
    match c.to_ascii_lowercase() {
        'a' => Some(GameAction::MoveLeft),
        'd' => Some(GameAction::MoveRight),
        's' => Some(GameAction::SoftDrop),
        'w' => Some(GameAction::HardDrop),
        'q' => Some(GameAction::RotateCcw),
        'e' => Some(GameAction::RotateCw),
        _ => None,
    }
}

fn player_two(code: KeyCode) -> Option<GameAction> {
    match code {
        KeyCode::Left => Some(GameAction::MoveLeft),
        KeyCode::Right => Some(GameAction::MoveRight),
        KeyCode::Down => Some(GameAction::SoftDrop),
        KeyCode::Up => Some(GameAction::HardDrop),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(GameAction::RotateCcw),
        KeyCode::Char('m') | KeyCode::Char('M') => Some(GameAction::RotateCw),
        _ => None,
    }
}

/// Map keyboard input to a game action under `map`.
///
/// Control-modified keys never map to actions.
pub fn handle_key_event(map: KeyMap, key: KeyEvent) -> Option<GameAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    map.action_for(key.code)
}

/// Check if key should quit the game.
///
/// `Q` is a rotation key for player one, so quitting uses `Esc` or `Ctrl+C`.
pub fn should_quit(key: KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
            && key.modifiers.contains(KeyModifiers::CONTROL))
}
