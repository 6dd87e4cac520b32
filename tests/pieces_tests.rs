//! Pieces tests: orientation grids and SRS wall kicks

use duel_tetris::core::pieces::{kicks, try_rotate, MinoOffset};
use duel_tetris::core::{Board, Shape};
use duel_tetris::types::{PieceKind, Rotation};

fn minos(shape: &Shape) -> Vec<MinoOffset> {
    shape.minos().collect()
}

// ============== Shape Tests ==============

#[test]
fn test_i_piece_rotations() {
    let north = Shape::base(PieceKind::I);
    assert_eq!(minos(&north), vec![(0, 1), (1, 1), (2, 1), (3, 1)]);

    let east = north.rotated_cw();
    assert_eq!(minos(&east), vec![(2, 0), (2, 1), (2, 2), (2, 3)]);

    let south = east.rotated_cw();
    assert_eq!(minos(&south), vec![(0, 2), (1, 2), (2, 2), (3, 2)]);

    let west = south.rotated_cw();
    assert_eq!(minos(&west), vec![(1, 0), (1, 1), (1, 2), (1, 3)]);
}

#[test]
fn test_t_piece_rotations() {
    let north = Shape::base(PieceKind::T);
    assert_eq!(minos(&north), vec![(1, 0), (0, 1), (1, 1), (2, 1)]);

    let east = north.rotated_cw();
    assert_eq!(minos(&east), vec![(1, 0), (1, 1), (2, 1), (1, 2)]);

    let west = north.rotated_ccw();
    assert_eq!(minos(&west), vec![(1, 0), (0, 1), (1, 1), (1, 2)]);
}

#[test]
fn test_rotations_compose() {
    for kind in PieceKind::ALL {
        let base = Shape::base(kind);
        assert_eq!(base.rotated_cw().rotated_ccw(), base, "{:?}", kind);
        assert_eq!(
            base.rotated_cw().rotated_cw().rotated_cw().rotated_cw(),
            base,
            "{:?}",
            kind
        );
        assert_eq!(base.rotated_cw().minos().count(), 4);
    }
}

#[test]
fn test_shape_rows_round_trip() {
    let s = Shape::base(PieceKind::S);
    assert_eq!(s.to_rows(), vec![vec![0, 1, 1], vec![1, 1, 0], vec![0, 0, 0]]);
    assert_eq!(Shape::from_rows(&s.to_rows()), Some(s));

    assert_eq!(Shape::from_rows(&[vec![1, 1, 0], vec![1, 1, 0]]), None);
    assert_eq!(Shape::from_rows::<Vec<u8>>(&[]), None);
}

// ============== Kick Tests ==============

#[test]
fn test_o_never_rotates() {
    let board = Board::new();
    let o = Shape::base(PieceKind::O);
    assert!(kicks(PieceKind::O, Rotation::North, true).is_none());
    assert!(try_rotate(PieceKind::O, &o, Rotation::North, 4, 0, true, |s, x, y| {
        board.can_place(s, x, y)
    })
    .is_none());
}

#[test]
fn test_free_rotation_uses_first_offset() {
    let board = Board::new();
    let t = Shape::base(PieceKind::T);
    let result = try_rotate(PieceKind::T, &t, Rotation::North, 3, 5, true, |s, x, y| {
        board.can_place(s, x, y)
    })
    .unwrap();
    assert_eq!(result.kick, (0, 0));
    assert_eq!((result.x, result.y), (3, 5));
    assert_eq!(result.rotation, Rotation::East);
    assert_eq!(result.shape, t.rotated_cw());
}

#[test]
fn test_wall_kick_off_left_wall() {
    let board = Board::new();
    // East T hugging the left wall: its grid column 0 is empty, so x = -1 fits.
    let east = Shape::base(PieceKind::T).rotated_cw();
    assert!(board.can_place(&east, -1, 5));

    let result = try_rotate(PieceKind::T, &east, Rotation::East, -1, 5, false, |s, x, y| {
        board.can_place(s, x, y)
    })
    .unwrap();
    assert_eq!(result.rotation, Rotation::North);
    assert_eq!(result.kick, (1, 0));
    assert_eq!((result.x, result.y), (0, 5));
}

#[test]
fn test_floor_kick_moves_up() {
    let board = Board::new();
    let t = Shape::base(PieceKind::T);
    // Resting on the floor, the East grid needs one more row.
    let result = try_rotate(PieceKind::T, &t, Rotation::North, 3, 18, true, |s, x, y| {
        board.can_place(s, x, y)
    })
    .unwrap();
    // Positive kick dy means up, applied as y - dy.
    assert_eq!(result.kick, (-1, 1));
    assert_eq!((result.x, result.y), (2, 17));
}

#[test]
fn test_i_kick_off_left_wall() {
    let board = Board::new();
    let east = Shape::base(PieceKind::I).rotated_cw();
    // Vertical bar on column 0.
    let result = try_rotate(PieceKind::I, &east, Rotation::East, -2, 5, false, |s, x, y| {
        board.can_place(s, x, y)
    })
    .unwrap();
    assert_eq!(result.kick, (2, 0));
    assert_eq!(result.x, 0);
}

#[test]
fn test_blocked_rotation_fails() {
    let board = Board::new();
    let t = Shape::base(PieceKind::T);
    let result = try_rotate(PieceKind::T, &t, Rotation::North, 3, 5, true, |_, _, _| false);
    assert!(result.is_none());
    assert!(board.can_place(&t, 3, 5));
}
