//! Reaction-time game logic.
//!
//! The [`Sequencer`] models a start-light gantry. It owns no timers: a call
//! to [`Sequencer::start`] returns an [`ArmPlan`] describing when each light
//! comes on and when the lights go out, and the caller drives the sequencer
//! by feeding those moments back with the plan's [`ArmTicket`]. Restarting
//! issues a new ticket, so callbacks scheduled for an earlier run are
//! ignored even if they fire late.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod sequencer;
mod tier;

pub use sequencer::{
    ArmPlan, ArmTicket, LightPhase, LightStep, PressOutcome, Reaction, Sequencer, SequencerConfig,
};
pub use tier::XpTier;
