//! Memory game session.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use nexus_memory::{
    CardId, DeckBuilder, DeckError, MatchResolver, MismatchTicket, ResolverConfig, ResolverStatus,
    TapOutcome,
};
use rand::Rng;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use super::lock;
use crate::scores::ScoreAdapter;

/// One player's memory game, with the mismatch timer and score reporting.
#[derive(Debug)]
pub struct MemorySession<R> {
    resolver: Arc<Mutex<MatchResolver>>,
    hide_task: Option<JoinHandle<()>>,
    builder: DeckBuilder,
    roster: Vec<String>,
    rng: R,
    scores: ScoreAdapter,
}

impl<R: Rng> MemorySession<R> {
    /// Deals a first deck from `roster`.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError`] if the roster cannot produce a deck.
    #[instrument(skip(builder, roster, rng, scores), fields(roster = roster.len()))]
    pub fn new(
        config: ResolverConfig,
        builder: DeckBuilder,
        roster: Vec<String>,
        mut rng: R,
        scores: ScoreAdapter,
    ) -> Result<Self, DeckError> {
        let deck = builder.build(&roster, &mut rng)?;
        info!(cards = deck.len(), "Memory session dealt");
        Ok(Self {
            resolver: Arc::new(Mutex::new(MatchResolver::new(config, deck))),
            hide_task: None,
            builder,
            roster,
            rng,
            scores,
        })
    }

    /// Taps a card. Must be called from within a Tokio runtime.
    #[instrument(skip(self))]
    pub fn tap(&mut self, id: CardId) -> TapOutcome {
        let outcome = lock(&self.resolver).tap(id);
        match outcome {
            TapOutcome::Mismatched { ticket, hide_after } => self.schedule_hide(ticket, hide_after),
            TapOutcome::Won { moves } => {
                info!(moves, "Memory game won");
                self.scores.report_win();
            }
            TapOutcome::Lost { moves } => {
                info!(moves, "Memory game lost");
                self.cancel_hide();
                self.scores.report_loss();
            }
            _ => {}
        }
        outcome
    }

    /// Deals a new deck and cancels any pending hide.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError`] if the roster cannot produce a deck.
    #[instrument(skip(self))]
    pub fn restart(&mut self) -> Result<(), DeckError> {
        self.cancel_hide();
        let deck = self.builder.build(&self.roster, &mut self.rng)?;
        lock(&self.resolver).reset(deck);
        info!("Memory session restarted");
        Ok(())
    }

    fn schedule_hide(&mut self, ticket: MismatchTicket, hide_after: Duration) {
        self.cancel_hide();
        let deadline = tokio::time::Instant::now() + hide_after;
        let resolver = Arc::clone(&self.resolver);
        self.hide_task = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if lock(&resolver).resolve_mismatch(ticket) {
                debug!(?ticket, "Mismatched pair hidden");
            }
        }));
    }

    fn cancel_hide(&mut self) {
        if let Some(task) = self.hide_task.take() {
            task.abort();
        }
    }

    /// Copy of the engine state.
    pub fn snapshot(&self) -> MatchResolver {
        lock(&self.resolver).clone()
    }

    /// Current status.
    pub fn status(&self) -> ResolverStatus {
        lock(&self.resolver).status()
    }

    /// Whether taps are currently ignored.
    pub fn is_locked(&self) -> bool {
        lock(&self.resolver).is_locked()
    }

    /// The score adapter results go to.
    pub fn scores(&self) -> &ScoreAdapter {
        &self.scores
    }
}

impl<R> Drop for MemorySession<R> {
    fn drop(&mut self) {
        if let Some(task) = self.hide_task.take() {
            task.abort();
        }
    }
}
