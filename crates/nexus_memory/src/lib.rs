//! Memory-matching game logic.
//!
//! A [`Deck`] is built from a driver roster by [`DeckBuilder`], then played
//! through a [`MatchResolver`]. The resolver never sleeps: a mismatch hands
//! back a [`MismatchTicket`] and the caller schedules
//! [`MatchResolver::resolve_mismatch`] once the cards have been on show long
//! enough.
//!
//! Randomness is injected. Any [`rand::Rng`] works, so tests pass a seeded
//! generator and get the same deck every run.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod card;
mod deck;
mod resolver;
pub mod roster;

pub use card::{Card, CardId};
pub use deck::{DEFAULT_SAMPLE, Deck, DeckBuilder, DeckError};
pub use resolver::{
    BudgetPolicy, IgnoreReason, MatchResolver, MismatchTicket, ResolverConfig, ResolverStatus,
    TapOutcome,
};
pub use roster::Driver;
