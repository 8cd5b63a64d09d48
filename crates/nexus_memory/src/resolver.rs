//! Turn engine for the memory game.

use std::collections::BTreeSet;
use std::time::Duration;

use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{CardId, Deck};

/// When a tap spends from the move budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPolicy {
    /// Only the second card of a pair-attempt costs a move.
    #[default]
    SecondFlip,
    /// Every accepted tap costs a move.
    EveryFlip,
}

/// Tunables for a [`MatchResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Setters)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct ResolverConfig {
    /// Starting move budget; `None` plays without one.
    pub budget: Option<u32>,
    /// Which taps spend from the budget.
    pub budget_policy: BudgetPolicy,
    /// Moves returned to the budget for a match that does not finish the deck.
    pub match_bonus: u32,
    /// How long a mismatched pair stays face up, in milliseconds.
    pub mismatch_delay_ms: u64,
}

impl ResolverConfig {
    /// Mismatch display time as a [`Duration`].
    pub fn mismatch_delay(&self) -> Duration {
        Duration::from_millis(self.mismatch_delay_ms)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            budget: Some(30),
            budget_policy: BudgetPolicy::SecondFlip,
            match_bonus: 2,
            mismatch_delay_ms: 800,
        }
    }
}

/// Lifecycle of one deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum ResolverStatus {
    /// Taps are accepted.
    #[display("playing")]
    Playing,
    /// Every card is solved.
    #[display("won")]
    Won,
    /// The move budget ran out first.
    #[display("lost")]
    Lost,
}

/// Identifies one scheduled hide of a mismatched pair.
///
/// Tickets are never reused within a resolver, including across resets, so
/// a callback scheduled for an earlier deal can never act on a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MismatchTicket(u64);

/// Why a tap changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum IgnoreReason {
    /// A mismatched pair is still on show.
    #[display("board is locked")]
    Locked,
    /// The card is already face up in the current attempt.
    #[display("card already flipped")]
    AlreadyFlipped,
    /// The card belongs to a found pair.
    #[display("card already solved")]
    AlreadySolved,
    /// The deal is won or lost.
    #[display("game is over")]
    GameOver,
    /// No card with this id is on the table.
    #[display("unknown card")]
    UnknownCard,
}

/// Result of a single tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// Nothing changed.
    Ignored(IgnoreReason),
    /// First card of a pair-attempt turned face up.
    Flipped(CardId),
    /// Both cards matched and stay face up.
    Matched {
        /// The solved pair.
        pair: [CardId; 2],
        /// Moves added to the budget.
        bonus: u32,
    },
    /// The cards differ. Call [`MatchResolver::resolve_mismatch`] with the
    /// ticket once `hide_after` has elapsed.
    Mismatched {
        /// Ticket for the scheduled hide.
        ticket: MismatchTicket,
        /// How long the pair stays on show.
        hide_after: Duration,
    },
    /// The last pair was found. Reported once per deal.
    Won {
        /// Pair-attempts used.
        moves: u32,
    },
    /// The budget ran out. Reported once per deal.
    Lost {
        /// Pair-attempts used.
        moves: u32,
    },
}

/// Tracks flipped and solved cards, the move budget and win/loss.
#[derive(Debug, Clone)]
pub struct MatchResolver {
    config: ResolverConfig,
    deck: Deck,
    flipped: Vec<CardId>,
    solved: BTreeSet<CardId>,
    locked: bool,
    status: ResolverStatus,
    remaining: Option<u32>,
    moves: u32,
    pending: Option<MismatchTicket>,
    next_ticket: u64,
}

impl MatchResolver {
    /// Starts a deal over `deck`.
    #[instrument(skip(deck), fields(cards = deck.len()))]
    pub fn new(config: ResolverConfig, deck: Deck) -> Self {
        Self {
            config,
            deck,
            flipped: Vec::with_capacity(2),
            solved: BTreeSet::new(),
            locked: false,
            status: ResolverStatus::Playing,
            remaining: config.budget,
            moves: 0,
            pending: None,
            next_ticket: 0,
        }
    }

    /// Deals `deck` afresh. Any outstanding ticket becomes stale.
    #[instrument(skip(self, deck), fields(cards = deck.len()))]
    pub fn reset(&mut self, deck: Deck) {
        if let Some(ticket) = self.pending.take() {
            debug!(?ticket, "Dropping pending hide on reset");
        }
        self.deck = deck;
        self.flipped.clear();
        self.solved.clear();
        self.locked = false;
        self.status = ResolverStatus::Playing;
        self.remaining = self.config.budget;
        self.moves = 0;
    }

    /// Handles a tap on card `id`.
    #[instrument(skip(self), fields(card = %id, status = %self.status))]
    pub fn tap(&mut self, id: CardId) -> TapOutcome {
        if let Some(reason) = self.reject(id) {
            debug!(%reason, "Tap ignored");
            return TapOutcome::Ignored(reason);
        }

        let second = self.flipped.len() == 1;
        if second {
            self.moves += 1;
        }

        if self.spend(second) {
            self.flipped.push(id);
            self.locked = true;
            self.pending = None;
            self.status = ResolverStatus::Lost;
            info!(moves = self.moves, "Move budget exhausted");
            return TapOutcome::Lost { moves: self.moves };
        }

        self.flipped.push(id);
        if !second {
            return TapOutcome::Flipped(id);
        }

        self.locked = true;
        let pair = [self.flipped[0], id];
        let matched = match (self.deck.get(pair[0]), self.deck.get(pair[1])) {
            (Some(a), Some(b)) => a.pairs_with(b),
            _ => false,
        };

        if matched {
            self.solved.extend(pair);
            self.flipped.clear();
            self.locked = false;

            if self.solved.len() == self.deck.len() {
                self.locked = true;
                self.status = ResolverStatus::Won;
                info!(moves = self.moves, "All pairs found");
                return TapOutcome::Won { moves: self.moves };
            }

            let bonus = match self.remaining.as_mut() {
                Some(remaining) => {
                    *remaining += self.config.match_bonus;
                    self.config.match_bonus
                }
                None => 0,
            };
            debug!(?pair, bonus, remaining = ?self.remaining, "Pair matched");
            TapOutcome::Matched { pair, bonus }
        } else {
            let ticket = MismatchTicket(self.next_ticket);
            self.next_ticket += 1;
            self.pending = Some(ticket);
            debug!(?pair, ?ticket, "Pair mismatched");
            TapOutcome::Mismatched {
                ticket,
                hide_after: self.config.mismatch_delay(),
            }
        }
    }

    /// Turns a mismatched pair face down and unlocks the board.
    ///
    /// Returns `false` without touching state when `ticket` is not the
    /// outstanding one.
    #[instrument(skip(self))]
    pub fn resolve_mismatch(&mut self, ticket: MismatchTicket) -> bool {
        if self.pending != Some(ticket) || self.status != ResolverStatus::Playing {
            warn!(pending = ?self.pending, "Stale mismatch ticket ignored");
            return false;
        }
        self.pending = None;
        self.flipped.clear();
        self.locked = false;
        debug!("Mismatched pair hidden");
        true
    }

    fn reject(&self, id: CardId) -> Option<IgnoreReason> {
        if self.status != ResolverStatus::Playing {
            Some(IgnoreReason::GameOver)
        } else if self.locked {
            Some(IgnoreReason::Locked)
        } else if !self.deck.contains(id) {
            Some(IgnoreReason::UnknownCard)
        } else if self.solved.contains(&id) {
            Some(IgnoreReason::AlreadySolved)
        } else if self.flipped.contains(&id) {
            Some(IgnoreReason::AlreadyFlipped)
        } else {
            None
        }
    }

    /// Charges the budget for an accepted tap; true when it is now empty.
    fn spend(&mut self, second: bool) -> bool {
        let charged = second || self.config.budget_policy == BudgetPolicy::EveryFlip;
        match self.remaining.as_mut() {
            Some(remaining) if charged => {
                *remaining = remaining.saturating_sub(1);
                *remaining == 0
            }
            _ => false,
        }
    }

    /// Current lifecycle state.
    pub fn status(&self) -> ResolverStatus {
        self.status
    }

    /// The deck being played.
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Cards face up in the current attempt (0–2).
    pub fn flipped(&self) -> &[CardId] {
        &self.flipped
    }

    /// Cards in found pairs.
    pub fn solved(&self) -> &BTreeSet<CardId> {
        &self.solved
    }

    /// Whether taps are currently suspended.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Moves left, if a budget is in play.
    pub fn remaining_budget(&self) -> Option<u32> {
        self.remaining
    }

    /// Completed pair-attempts.
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// The hide currently awaited, if any.
    pub fn pending_ticket(&self) -> Option<MismatchTicket> {
        self.pending
    }

    /// Whether the card shows its face.
    pub fn is_face_up(&self, id: CardId) -> bool {
        self.flipped.contains(&id) || self.solved.contains(&id)
    }

    /// The configuration in force.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }
}
