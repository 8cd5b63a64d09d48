//! Tests for board evaluation.

use nexus_tictactoe::rules::win::LINES;
use nexus_tictactoe::{Board, Outcome, Player, Position, Square, evaluate};

const X: Option<Player> = Some(Player::X);
const O: Option<Player> = Some(Player::O);
const E: Option<Player> = None;

/// Decodes a base-3 number into a board (0 empty, 1 X, 2 O).
fn board_from_code(mut code: u32) -> Board {
    let mut squares = [Square::Empty; 9];
    for square in squares.iter_mut() {
        *square = match code % 3 {
            0 => Square::Empty,
            1 => Square::Occupied(Player::X),
            _ => Square::Occupied(Player::O),
        };
        code /= 3;
    }
    Board::from(squares)
}

fn completed_lines(board: &Board) -> Vec<Player> {
    LINES
        .iter()
        .filter_map(|&[a, b, c]| match board.get(a) {
            Square::Occupied(p)
                if board.get(b) == Square::Occupied(p) && board.get(c) == Square::Occupied(p) =>
            {
                Some(p)
            }
            _ => None,
        })
        .collect()
}

#[test]
fn test_top_row_winner_scenario() {
    let board = Board::from([X, X, X, E, O, O, E, E, E]);
    assert_eq!(evaluate(&board), Outcome::Winner(Player::X));
}

#[test]
fn test_full_board_without_line_is_draw() {
    let board = Board::from([X, O, X, O, X, O, O, X, O]);
    assert_eq!(evaluate(&board), Outcome::Draw);
}

#[test]
fn test_empty_board_in_progress() {
    assert_eq!(evaluate(&Board::new()), Outcome::InProgress);
}

#[test]
fn test_win_on_full_board_beats_draw() {
    let board = Board::from([X, O, X, O, X, O, O, X, X]);
    assert_eq!(evaluate(&board), Outcome::Winner(Player::X));
}

#[test]
fn test_evaluate_does_not_mutate() {
    let board = Board::from([X, X, E, O, O, E, E, E, E]);
    let before = board.clone();
    let first = evaluate(&board);
    let second = evaluate(&board);
    assert_eq!(first, second);
    assert_eq!(board, before);
}

#[test]
fn test_single_completed_line_decides_every_board() {
    let mut checked = 0;
    for code in 0..3u32.pow(9) {
        let board = board_from_code(code);
        let lines = completed_lines(&board);
        if lines.len() == 1 {
            assert_eq!(evaluate(&board), Outcome::Winner(lines[0]), "{}", board.display());
            checked += 1;
        }
    }
    assert!(checked > 0);
}

#[test]
fn test_every_full_board_without_line_is_draw() {
    for bits in 0..(1u32 << 9) {
        let mut squares = [Square::Empty; 9];
        for (idx, square) in squares.iter_mut().enumerate() {
            *square = if bits & (1 << idx) == 0 {
                Square::Occupied(Player::X)
            } else {
                Square::Occupied(Player::O)
            };
        }
        let board = Board::from(squares);
        if completed_lines(&board).is_empty() {
            assert_eq!(evaluate(&board), Outcome::Draw, "{}", board.display());
        }
    }
}

#[test]
fn test_partial_board_without_line_in_progress() {
    let board = Board::from([X, O, X, E, E, E, E, E, E]);
    assert_eq!(evaluate(&board), Outcome::InProgress);
    assert_eq!(Position::valid_moves(&board).len(), 6);
}
