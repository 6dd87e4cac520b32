//! Shared-keyboard input driving a local versus match

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use duel_tetris::core::{RulesConfig, Versus};
use duel_tetris::input::{handle_key_event, should_quit, InputHandler, KeyMap};
use duel_tetris::types::{GameAction, PlayerSide};

const SIDES: [PlayerSide; 2] = [PlayerSide::One, PlayerSide::Two];

fn hot_seat() -> [InputHandler; 2] {
    [
        InputHandler::new(KeyMap::PlayerOne).with_key_release_timeout_ms(10_000),
        InputHandler::new(KeyMap::PlayerTwo).with_key_release_timeout_ms(10_000),
    ]
}

fn press(inputs: &mut [InputHandler; 2], versus: &mut Versus, code: KeyCode) {
    for (handler, side) in inputs.iter_mut().zip(SIDES) {
        if let Some(action) = handler.handle_key_press(code) {
            versus.apply(side, action);
        }
    }
}

fn tick(inputs: &mut [InputHandler; 2], versus: &mut Versus, elapsed_ms: u32) {
    for (handler, side) in inputs.iter_mut().zip(SIDES) {
        for action in handler.update(elapsed_ms) {
            versus.apply(side, action);
        }
    }
}

fn x_of(versus: &Versus, side: PlayerSide) -> i8 {
    versus.player(side).current().unwrap().x
}

#[test]
fn each_layout_drives_its_own_board() {
    let mut versus = Versus::with_seeds(RulesConfig::default(), 7, 7);
    let mut inputs = hot_seat();
    let start = x_of(&versus, PlayerSide::One);
    assert_eq!(start, x_of(&versus, PlayerSide::Two));

    press(&mut inputs, &mut versus, KeyCode::Char('a'));
    assert_eq!(x_of(&versus, PlayerSide::One), start - 1);
    assert_eq!(x_of(&versus, PlayerSide::Two), start);

    press(&mut inputs, &mut versus, KeyCode::Right);
    assert_eq!(x_of(&versus, PlayerSide::Two), start + 1);
    assert_eq!(x_of(&versus, PlayerSide::One), start - 1);
}

#[test]
fn both_players_can_hold_keys_at_once() {
    let mut versus = Versus::with_seeds(RulesConfig::default(), 7, 7);
    let mut inputs = hot_seat();

    press(&mut inputs, &mut versus, KeyCode::Char('a'));
    press(&mut inputs, &mut versus, KeyCode::Right);
    assert!(inputs[0].is_held(GameAction::MoveLeft));
    assert!(inputs[1].is_held(GameAction::MoveRight));

    // Long enough for DAS plus plenty of repeats: both pieces reach their walls.
    for _ in 0..41 {
        tick(&mut inputs, &mut versus, 16);
    }

    let one = versus.player(PlayerSide::One).current().unwrap();
    let two = versus.player(PlayerSide::Two).current().unwrap();
    assert!(!versus.player(PlayerSide::One).can_place(&one.shape, one.x - 1, one.y));
    assert!(!versus.player(PlayerSide::Two).can_place(&two.shape, two.x + 1, two.y));
}

#[test]
fn releasing_one_key_keeps_the_other_repeating() {
    let mut inputs = hot_seat();
    inputs[0].handle_key_press(KeyCode::Char('s'));
    inputs[1].handle_key_press(KeyCode::Down);

    for handler in inputs.iter_mut() {
        handler.handle_key_release(KeyCode::Char('s'));
    }
    assert!(!inputs[0].is_held(GameAction::SoftDrop));
    assert!(inputs[1].is_held(GameAction::SoftDrop));

    assert!(inputs[0].update(300).is_empty());
    assert!(!inputs[1].update(300).is_empty());
}

#[test]
fn solo_map_accepts_both_layouts() {
    let mut solo = InputHandler::new(KeyMap::Solo);
    assert_eq!(solo.handle_key_press(KeyCode::Up), Some(GameAction::HardDrop));
    assert_eq!(solo.handle_key_press(KeyCode::Char('w')), Some(GameAction::HardDrop));
    assert_eq!(solo.handle_key_press(KeyCode::Char('E')), Some(GameAction::RotateCw));
    assert_eq!(solo.handle_key_press(KeyCode::Char('m')), Some(GameAction::RotateCw));
    assert_eq!(solo.handle_key_press(KeyCode::Char('x')), None);
}

#[test]
fn quit_keys_do_not_collide_with_rotation() {
    let q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
    assert!(!should_quit(q));
    assert_eq!(handle_key_event(KeyMap::PlayerOne, q), Some(GameAction::RotateCcw));

    assert!(should_quit(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
    let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert!(should_quit(ctrl_c));
    assert_eq!(handle_key_event(KeyMap::Solo, ctrl_c), None);
}
