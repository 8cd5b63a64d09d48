//! Tic-tac-toe game logic.
//!
//! The crate is split into storage ([`Board`]), rules ([`rules`]) and the
//! turn engine ([`Game`]). Rules are pure functions over a board so they can
//! be reused by anything that holds nine cells.
//!
//! # Example
//!
//! ```
//! use nexus_tictactoe::{Board, Outcome, Player, evaluate};
//!
//! let board = Board::from([
//!     Some(Player::X), Some(Player::X), Some(Player::X),
//!     None, Some(Player::O), Some(Player::O),
//!     None, None, None,
//! ]);
//! assert_eq!(evaluate(&board), Outcome::Winner(Player::X));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod game;
mod outcome;
mod position;
pub mod rules;
mod types;

pub use action::{Move, MoveError};
pub use game::Game;
pub use outcome::Outcome;
pub use position::Position;
pub use rules::{check_winner, evaluate, is_full};
pub use types::{Board, Player, Square};

/// Alias for clarity in session management.
pub type Mark = Player;
