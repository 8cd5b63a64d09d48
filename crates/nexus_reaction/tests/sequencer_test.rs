//! Tests for the start-light sequencer.

use std::time::{Duration, Instant};

use nexus_reaction::{LightPhase, PressOutcome, Sequencer, SequencerConfig, XpTier};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn test_plan_has_five_steps_then_random_arm() {
    let mut seq = Sequencer::new(SequencerConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let plan = seq.start(&mut rng);

    assert_eq!(seq.phase(), LightPhase::Counting);
    let offsets: Vec<_> = plan.steps.iter().map(|s| (s.lit, s.at)).collect();
    assert_eq!(
        offsets,
        vec![(1, ms(1000)), (2, ms(2000)), (3, ms(3000)), (4, ms(4000)), (5, ms(5000))]
    );
    assert!(plan.extra_delay >= ms(2000) && plan.extra_delay <= ms(5000));
    assert_eq!(plan.arm_at, ms(5000) + plan.extra_delay);
}

#[test]
fn test_arm_delay_varies_between_runs() {
    let mut seq = Sequencer::new(SequencerConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let delays: Vec<_> = (0..20).map(|_| seq.start(&mut rng).extra_delay).collect();
    assert!(delays.iter().any(|d| *d != delays[0]));
}

#[test]
fn test_input_before_arm_is_foul() {
    let base = Instant::now();
    let mut seq = Sequencer::new(SequencerConfig::default());
    let plan = seq.start(&mut ChaCha8Rng::seed_from_u64(3));

    assert!(seq.light(plan.ticket, 3));
    assert_eq!(seq.press(base + ms(3500)), PressOutcome::Foul);
    assert_eq!(seq.phase(), LightPhase::Foul);
    assert_eq!(seq.lit(), 5);
    assert!(seq.last_reaction().is_none());

    // The arm callback of the fouled run must not fire late.
    assert!(!seq.arm(plan.ticket, base + plan.arm_at));
    assert_eq!(seq.phase(), LightPhase::Foul);
    assert!(seq.go_at().is_none());
}

#[test]
fn test_valid_reaction_measures_from_go() {
    let base = Instant::now();
    let mut seq = Sequencer::new(SequencerConfig::default());
    let plan = seq.start(&mut ChaCha8Rng::seed_from_u64(4));

    let go = base + plan.arm_at;
    assert!(seq.arm(plan.ticket, go));
    assert_eq!(seq.phase(), LightPhase::Ready);
    assert_eq!(seq.lit(), 0);

    let outcome = seq.press(go + ms(245));
    let PressOutcome::Reaction(reaction) = outcome else {
        panic!("Expected reaction, got {:?}", outcome);
    };
    assert_eq!(reaction.elapsed_ms, 245);
    assert_eq!(reaction.tier, XpTier::Pro);
    assert!(reaction.personal_best);
    assert_eq!(seq.phase(), LightPhase::Result);
    assert_eq!(seq.best_ms(), Some(245));
}

#[test]
fn test_press_at_go_instant_is_zero() {
    let base = Instant::now();
    let mut seq = Sequencer::new(SequencerConfig::default());
    let plan = seq.start(&mut ChaCha8Rng::seed_from_u64(5));
    seq.arm(plan.ticket, base);

    let PressOutcome::Reaction(reaction) = seq.press(base) else {
        panic!("Expected reaction");
    };
    assert_eq!(reaction.elapsed_ms, 0);
    assert_eq!(reaction.tier, XpTier::Godlike);
}

#[test]
fn test_elapsed_is_rounded() {
    let base = Instant::now();
    let mut seq = Sequencer::new(SequencerConfig::default());
    let plan = seq.start(&mut ChaCha8Rng::seed_from_u64(6));
    seq.arm(plan.ticket, base);

    let PressOutcome::Reaction(reaction) = seq.press(base + Duration::from_micros(312_600)) else {
        panic!("Expected reaction");
    };
    assert_eq!(reaction.elapsed_ms, 313);
    assert_eq!(reaction.tier, XpTier::Rookie);
}

#[test]
fn test_input_inert_outside_counting_and_ready() {
    let base = Instant::now();
    let mut seq = Sequencer::new(SequencerConfig::default());
    assert_eq!(seq.press(base), PressOutcome::Ignored(LightPhase::Idle));

    let plan = seq.start(&mut ChaCha8Rng::seed_from_u64(7));
    seq.arm(plan.ticket, base);
    seq.press(base + ms(180));
    assert_eq!(
        seq.press(base + ms(400)),
        PressOutcome::Ignored(LightPhase::Result)
    );
    assert_eq!(seq.last_reaction().map(|r| r.elapsed_ms), Some(180));

    seq.start(&mut ChaCha8Rng::seed_from_u64(8));
    seq.press(base);
    assert_eq!(seq.press(base + ms(10)), PressOutcome::Ignored(LightPhase::Foul));
}

#[test]
fn test_restart_invalidates_previous_ticket() {
    let base = Instant::now();
    let mut seq = Sequencer::new(SequencerConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let first = seq.start(&mut rng);
    let second = seq.start(&mut rng);
    assert_ne!(first.ticket, second.ticket);

    assert!(!seq.light(first.ticket, 4));
    assert!(!seq.arm(first.ticket, base));
    assert_eq!(seq.phase(), LightPhase::Counting);
    assert_eq!(seq.pending_ticket(), Some(second.ticket));

    assert!(seq.arm(second.ticket, base + ms(50)));
    assert_eq!(seq.go_at(), Some(base + ms(50)));
}

#[test]
fn test_slower_run_keeps_best() {
    let base = Instant::now();
    let mut seq = Sequencer::new(SequencerConfig::default());
    seq.set_best(Some(210));

    let plan = seq.start(&mut ChaCha8Rng::seed_from_u64(10));
    seq.arm(plan.ticket, base);
    let PressOutcome::Reaction(reaction) = seq.press(base + ms(260)) else {
        panic!("Expected reaction");
    };
    assert!(!reaction.personal_best);
    assert_eq!(seq.best_ms(), Some(210));
}

#[test]
fn test_cancel_returns_to_idle() {
    let base = Instant::now();
    let mut seq = Sequencer::new(SequencerConfig::default());
    let plan = seq.start(&mut ChaCha8Rng::seed_from_u64(11));
    seq.cancel();
    assert_eq!(seq.phase(), LightPhase::Idle);
    assert!(!seq.arm(plan.ticket, base));
}

#[test]
fn test_config_from_toml() {
    let config: SequencerConfig = toml::from_str("lights = 3\narm_delay_max_ms = 2500").expect("Parse");
    assert_eq!(config.lights, 3);
    assert_eq!(config.light_interval_ms, 1_000);
    assert_eq!(config.countdown(), ms(3000));

    let mut seq = Sequencer::new(config.with_arm_delay_min_ms(2_500));
    let plan = seq.start(&mut ChaCha8Rng::seed_from_u64(12));
    assert_eq!(plan.steps.len(), 3);
    assert_eq!(plan.extra_delay, ms(2500));
}

#[test]
fn test_huge_config_saturates_instead_of_overflowing() {
    let config = SequencerConfig::default()
        .with_light_interval_ms(u64::MAX)
        .with_arm_delay_min_ms(u64::MAX)
        .with_arm_delay_max_ms(u64::MAX);
    let mut seq = Sequencer::new(config);
    let plan = seq.start(&mut ChaCha8Rng::seed_from_u64(13));

    assert_eq!(config.countdown(), ms(u64::MAX));
    assert_eq!(plan.steps.len(), 5);
    assert!(plan.steps.windows(2).all(|w| w[0].at <= w[1].at));
    assert!(plan.arm_at >= plan.extra_delay);
    assert_eq!(seq.phase(), LightPhase::Counting);
}

#[test]
fn test_press_outcomes_display() {
    let base = Instant::now();
    let mut seq = Sequencer::new(SequencerConfig::default());
    assert_eq!(seq.press(base).to_string(), "ignored while idle");

    let plan = seq.start(&mut ChaCha8Rng::seed_from_u64(14));
    assert_eq!(seq.press(base).to_string(), "JUMP START!");

    let plan_again = seq.start(&mut ChaCha8Rng::seed_from_u64(14));
    assert!(seq.arm(plan_again.ticket, base));
    assert_ne!(plan.ticket, plan_again.ticket);
    let outcome = seq.press(base + ms(180));
    assert_eq!(outcome.to_string(), "180 ms  GODLIKE REFLEXES! +100 XP");
}
