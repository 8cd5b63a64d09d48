//! Start-light state machine.

use std::time::{Duration, Instant};

use derive_more::Display;
use derive_setters::Setters;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::XpTier;

/// Timing of a light sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Setters)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct SequencerConfig {
    /// Lights switched on during the countdown.
    pub lights: u8,
    /// Gap between lights, in milliseconds.
    pub light_interval_ms: u64,
    /// Shortest wait after the last light, in milliseconds.
    pub arm_delay_min_ms: u64,
    /// Longest wait after the last light, in milliseconds.
    pub arm_delay_max_ms: u64,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            lights: 5,
            light_interval_ms: 1_000,
            arm_delay_min_ms: 2_000,
            arm_delay_max_ms: 5_000,
        }
    }
}

impl SequencerConfig {
    /// Offset of the last light from the start.
    pub fn countdown(&self) -> Duration {
        Duration::from_millis(self.light_interval_ms.saturating_mul(u64::from(self.lights)))
    }

    fn draw_extra_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let lo = self.arm_delay_min_ms.min(self.arm_delay_max_ms);
        let hi = self.arm_delay_min_ms.max(self.arm_delay_max_ms);
        Duration::from_millis(rng.gen_range(lo..=hi))
    }
}

/// Where the gantry is in its cycle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum LightPhase {
    /// Waiting for a start.
    #[default]
    Idle,
    /// Lights are coming on; input now is a jump start.
    Counting,
    /// Lights are out; the next input is timed.
    Ready,
    /// Input arrived before the lights went out.
    Foul,
    /// A reaction time was recorded.
    Result,
}

/// Identifies one run's scheduled callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArmTicket(u64);

/// One cosmetic countdown step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightStep {
    /// Lights on after this step.
    pub lit: u8,
    /// Offset from the start of the run.
    pub at: Duration,
}

/// Schedule for one run, returned by [`Sequencer::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmPlan {
    /// Ticket to present with every callback of this run.
    pub ticket: ArmTicket,
    /// Countdown steps in order.
    pub steps: Vec<LightStep>,
    /// Random wait drawn after the last light.
    pub extra_delay: Duration,
    /// Offset from the start at which to call [`Sequencer::arm`].
    pub arm_at: Duration,
}

/// A timed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display("{elapsed_ms} ms  {tier} +{} XP", tier.xp())]
pub struct Reaction {
    /// Milliseconds from lights out to input, rounded.
    pub elapsed_ms: u64,
    /// Experience band.
    pub tier: XpTier,
    /// Whether this beat the previous best.
    pub personal_best: bool,
}

/// What an input did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PressOutcome {
    /// Input had no effect in this phase.
    #[display("ignored while {_0}")]
    Ignored(LightPhase),
    /// Jump start.
    #[display("JUMP START!")]
    Foul,
    /// Valid reaction.
    #[display("{_0}")]
    Reaction(Reaction),
}

/// Start-light state machine.
#[derive(Debug, Clone)]
pub struct Sequencer {
    config: SequencerConfig,
    phase: LightPhase,
    lit: u8,
    ticket: Option<ArmTicket>,
    next_ticket: u64,
    go_at: Option<Instant>,
    last: Option<Reaction>,
    best_ms: Option<u64>,
}

impl Sequencer {
    /// Creates an idle sequencer.
    #[instrument]
    pub fn new(config: SequencerConfig) -> Self {
        Self {
            config,
            phase: LightPhase::Idle,
            lit: 0,
            ticket: None,
            next_ticket: 0,
            go_at: None,
            last: None,
            best_ms: None,
        }
    }

    /// Begins a run from any phase, invalidating the previous run's ticket.
    #[instrument(skip(self, rng), fields(phase = %self.phase))]
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ArmPlan {
        if let Some(stale) = self.ticket.take() {
            debug!(?stale, "Cancelling previous run");
        }
        let ticket = ArmTicket(self.next_ticket);
        self.next_ticket += 1;
        self.ticket = Some(ticket);
        self.phase = LightPhase::Counting;
        self.lit = 0;
        self.go_at = None;
        self.last = None;

        let interval = Duration::from_millis(self.config.light_interval_ms);
        let steps = (1..=self.config.lights)
            .map(|lit| LightStep {
                lit,
                at: interval.saturating_mul(u32::from(lit)),
            })
            .collect();
        let extra_delay = self.config.draw_extra_delay(rng);
        let arm_at = self.config.countdown().saturating_add(extra_delay);

        info!(?ticket, extra_ms = extra_delay.as_millis() as u64, "Sequence started");
        ArmPlan {
            ticket,
            steps,
            extra_delay,
            arm_at,
        }
    }

    /// Applies a countdown step. Returns false for a stale ticket.
    #[instrument(skip(self))]
    pub fn light(&mut self, ticket: ArmTicket, lit: u8) -> bool {
        if !self.is_current(ticket) || self.phase != LightPhase::Counting {
            return false;
        }
        self.lit = lit.min(self.config.lights);
        true
    }

    /// Puts the lights out and opens the response window at `now`.
    ///
    /// Returns false for a stale ticket or when the run already fouled.
    #[instrument(skip(self, now))]
    pub fn arm(&mut self, ticket: ArmTicket, now: Instant) -> bool {
        if !self.is_current(ticket) || self.phase != LightPhase::Counting {
            debug!(phase = %self.phase, "Arm ignored");
            return false;
        }
        self.ticket = None;
        self.phase = LightPhase::Ready;
        self.lit = 0;
        self.go_at = Some(now);
        info!("Lights out");
        true
    }

    /// Handles player input at `now`.
    #[instrument(skip(self, now), fields(phase = %self.phase))]
    pub fn press(&mut self, now: Instant) -> PressOutcome {
        match (self.phase, self.go_at) {
            (LightPhase::Counting, _) => {
                self.ticket = None;
                self.phase = LightPhase::Foul;
                self.lit = self.config.lights;
                info!("Jump start");
                PressOutcome::Foul
            }
            (LightPhase::Ready, Some(go_at)) => {
                let elapsed = now.saturating_duration_since(go_at);
                let elapsed_ms = (elapsed.as_secs_f64() * 1_000.0).round() as u64;
                let personal_best = self.best_ms.is_none_or(|best| elapsed_ms < best);
                if personal_best {
                    self.best_ms = Some(elapsed_ms);
                }
                let reaction = Reaction {
                    elapsed_ms,
                    tier: XpTier::for_reaction(elapsed_ms),
                    personal_best,
                };
                self.phase = LightPhase::Result;
                self.last = Some(reaction);
                info!(elapsed_ms, tier = %reaction.tier, personal_best, "Reaction recorded");
                PressOutcome::Reaction(reaction)
            }
            (phase, _) => PressOutcome::Ignored(phase),
        }
    }

    /// Abandons the current run and returns to idle.
    #[instrument(skip(self))]
    pub fn cancel(&mut self) {
        self.ticket = None;
        self.phase = LightPhase::Idle;
        self.lit = 0;
        self.go_at = None;
    }

    /// Seeds the personal best, e.g. from a stored profile.
    pub fn set_best(&mut self, best_ms: Option<u64>) {
        self.best_ms = best_ms;
    }

    fn is_current(&self, ticket: ArmTicket) -> bool {
        self.ticket == Some(ticket)
    }

    /// Current phase.
    pub fn phase(&self) -> LightPhase {
        self.phase
    }

    /// Lights currently on.
    pub fn lit(&self) -> u8 {
        self.lit
    }

    /// Instant the lights went out in this run.
    pub fn go_at(&self) -> Option<Instant> {
        self.go_at
    }

    /// Ticket of the run still waiting to arm.
    pub fn pending_ticket(&self) -> Option<ArmTicket> {
        self.ticket
    }

    /// Result of the latest completed run.
    pub fn last_reaction(&self) -> Option<Reaction> {
        self.last
    }

    /// Best reaction seen, in milliseconds.
    pub fn best_ms(&self) -> Option<u64> {
        self.best_ms
    }

    /// The configuration in force.
    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }
}
