//! Turn engine for tic-tac-toe.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{Board, Move, MoveError, Outcome, Player, Position, Square, rules};

/// Tic-tac-toe game engine.
///
/// X always moves first and marks alternate. Once [`Game::outcome`] is no
/// longer [`Outcome::InProgress`] every placement is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    board: Board,
    to_move: Player,
    outcome: Outcome,
    history: Vec<Move>,
}

impl Game {
    /// Creates a new game with an empty board and X to move.
    #[instrument]
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            to_move: Player::X,
            outcome: Outcome::InProgress,
            history: Vec::new(),
        }
    }

    /// Returns a reference to the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the player whose turn it is.
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    /// Returns the current outcome.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Returns the moves played so far.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Places the current player's mark at `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::GameOver`] once the game is decided and
    /// [`MoveError::SquareOccupied`] if `pos` already holds a mark.
    #[instrument(skip(self), fields(player = %self.to_move))]
    pub fn place(&mut self, pos: Position) -> Result<Outcome, MoveError> {
        if self.outcome.is_over() {
            debug!(outcome = %self.outcome, "Placement after game end");
            return Err(MoveError::GameOver);
        }
        if !self.board.is_empty(pos) {
            debug!(position = %pos, "Placement on occupied square");
            return Err(MoveError::SquareOccupied(pos));
        }

        let mov = Move::new(self.to_move, pos);
        self.board.set(pos, Square::Occupied(mov.player));
        self.history.push(mov);
        self.outcome = rules::evaluate(&self.board);

        if self.outcome.is_over() {
            info!(outcome = %self.outcome, moves = self.history.len(), "Game decided");
        } else {
            self.to_move = self.to_move.opponent();
        }

        Ok(self.outcome)
    }

    /// Clears the board for a new game.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        debug!("Resetting game");
        *self = Self::new();
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
