//! Reaction game session.

use std::sync::{Arc, Mutex};

use nexus_reaction::{ArmPlan, LightPhase, PressOutcome, Reaction, Sequencer, SequencerConfig};
use rand::Rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, instrument, warn};

use super::lock;
use crate::scores::ScoreAdapter;

/// What a front end needs to draw the gantry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightsView {
    /// Current phase.
    pub phase: LightPhase,
    /// Lights on.
    pub lit: u8,
}

impl LightsView {
    fn of(sequencer: &Sequencer) -> Self {
        Self {
            phase: sequencer.phase(),
            lit: sequencer.lit(),
        }
    }
}

fn publish(view: &watch::Sender<LightsView>, sequencer: &Sequencer) {
    view.send_replace(LightsView::of(sequencer));
}

/// One player's reaction game, driving the light countdown on Tokio timers.
#[derive(Debug)]
pub struct ReactionSession<R> {
    sequencer: Arc<Mutex<Sequencer>>,
    countdown: Option<JoinHandle<()>>,
    view: Arc<watch::Sender<LightsView>>,
    rng: R,
    scores: ScoreAdapter,
}

impl<R: Rng> ReactionSession<R> {
    /// Creates an idle session seeded with the player's stored best.
    #[instrument(skip(rng, scores))]
    pub fn new(config: SequencerConfig, rng: R, scores: ScoreAdapter) -> Self {
        let sequencer = Sequencer::new(config);
        let (view, _) = watch::channel(LightsView::of(&sequencer));
        let session = Self {
            sequencer: Arc::new(Mutex::new(sequencer)),
            countdown: None,
            view: Arc::new(view),
            rng,
            scores,
        };
        session.sync_best();
        session
    }

    /// Reloads the personal best from the signed-in player's record.
    pub fn sync_best(&self) {
        let best = self
            .scores
            .local_record()
            .and_then(|record| *record.best_reaction_ms())
            .and_then(|ms| u64::try_from(ms).ok());
        lock(&self.sequencer).set_best(best);
    }

    /// Starts a run, cancelling any countdown in progress.
    ///
    /// Must be called from within a Tokio runtime.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> ArmPlan {
        self.cancel_countdown();
        let started = Instant::now();
        let plan = {
            let mut sequencer = lock(&self.sequencer);
            let plan = sequencer.start(&mut self.rng);
            publish(&self.view, &sequencer);
            plan
        };

        let sequencer = Arc::clone(&self.sequencer);
        let view = Arc::clone(&self.view);
        let ticket = plan.ticket;
        let steps = plan.steps.clone();
        let arm_after = plan.arm_at;
        self.countdown = Some(tokio::spawn(async move {
            for step in steps {
                let Some(at) = started.checked_add(step.at) else {
                    warn!(?ticket, lit = step.lit, "Light step beyond the clock's range");
                    return;
                };
                sleep_until(at).await;
                let mut sequencer = lock(&sequencer);
                if !sequencer.light(ticket, step.lit) {
                    debug!(?ticket, "Countdown superseded");
                    return;
                }
                publish(&view, &sequencer);
            }
            let Some(arm_at) = started.checked_add(arm_after) else {
                warn!(?ticket, "Lights out beyond the clock's range");
                return;
            };
            sleep_until(arm_at).await;
            let mut sequencer = lock(&sequencer);
            if sequencer.arm(ticket, Instant::now().into_std()) {
                publish(&view, &sequencer);
            }
        }));
        plan
    }

    /// Handles player input.
    #[instrument(skip(self))]
    pub fn press(&mut self) -> PressOutcome {
        let outcome = {
            let mut sequencer = lock(&self.sequencer);
            let outcome = sequencer.press(Instant::now().into_std());
            publish(&self.view, &sequencer);
            outcome
        };
        debug!(%outcome, "Press handled");
        match outcome {
            PressOutcome::Foul => self.cancel_countdown(),
            PressOutcome::Reaction(reaction) => {
                info!(elapsed_ms = reaction.elapsed_ms, "Reaction reported");
                self.scores.report_reaction(reaction.elapsed_ms, reaction.tier.xp());
            }
            PressOutcome::Ignored(_) => {}
        }
        outcome
    }

    /// Abandons the current run.
    #[instrument(skip(self))]
    pub fn cancel(&mut self) {
        self.cancel_countdown();
        let mut sequencer = lock(&self.sequencer);
        sequencer.cancel();
        publish(&self.view, &sequencer);
    }

    fn cancel_countdown(&mut self) {
        if let Some(task) = self.countdown.take() {
            task.abort();
        }
    }

    /// Receives every phase and light change.
    pub fn subscribe(&self) -> watch::Receiver<LightsView> {
        self.view.subscribe()
    }

    /// Current phase and lights.
    pub fn view(&self) -> LightsView {
        LightsView::of(&lock(&self.sequencer))
    }

    /// Result of the latest completed run.
    pub fn last_reaction(&self) -> Option<Reaction> {
        lock(&self.sequencer).last_reaction()
    }

    /// Best reaction known to this session, in milliseconds.
    pub fn best_ms(&self) -> Option<u64> {
        lock(&self.sequencer).best_ms()
    }

    /// The score adapter results go to.
    pub fn scores(&self) -> &ScoreAdapter {
        &self.scores
    }
}

impl<R> Drop for ReactionSession<R> {
    fn drop(&mut self) {
        if let Some(task) = self.countdown.take() {
            task.abort();
        }
    }
}
