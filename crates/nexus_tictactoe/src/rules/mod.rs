//! Game rules for tic-tac-toe.
//!
//! This module contains pure functions for evaluating game state
//! according to tic-tac-toe rules. Rules are separated from board
//! storage so that the engine and any caller holding a board share them.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::check_winner;

use tracing::instrument;

use crate::{Board, Outcome};

/// Evaluates a board without mutating it.
///
/// A completed line takes precedence over a full board.
#[instrument]
pub fn evaluate(board: &Board) -> Outcome {
    if let Some(winner) = check_winner(board) {
        Outcome::Winner(winner)
    } else if is_full(board) {
        Outcome::Draw
    } else {
        Outcome::InProgress
    }
}
