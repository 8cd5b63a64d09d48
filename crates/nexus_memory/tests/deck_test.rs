//! Tests for deck construction.

use std::collections::{HashMap, HashSet};

use nexus_memory::roster::{CLASSIC_GRID, FULL_GRID, names};
use nexus_memory::{DEFAULT_SAMPLE, DeckBuilder, DeckError};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::mock::StepRng;
use rand_chacha::ChaCha8Rng;

fn identity_counts(deck: &nexus_memory::Deck) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for card in deck.cards() {
        *counts.entry(card.identity().clone()).or_insert(0) += 1;
    }
    counts
}

#[test]
fn test_classic_grid_builds_sixteen_cards() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let deck = DeckBuilder::new()
        .build(&names(&CLASSIC_GRID), &mut rng)
        .expect("Build failed");

    assert_eq!(deck.len(), 16);
    let counts = identity_counts(&deck);
    assert_eq!(counts.len(), 8);
    assert!(counts.values().all(|&n| n == 2));
}

#[test]
fn test_full_grid_samples_default_pairs() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let roster = names(&FULL_GRID);
    let deck = DeckBuilder::new().build(&roster, &mut rng).expect("Build failed");

    assert_eq!(deck.len(), DEFAULT_SAMPLE * 2);
    assert!(deck.identities().iter().all(|name| roster.contains(name)));
}

#[test]
fn test_instance_ids_unique() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let deck = DeckBuilder::new()
        .build(&names(&CLASSIC_GRID), &mut rng)
        .expect("Build failed");

    let ids: HashSet<_> = deck.cards().iter().map(|c| c.instance()).collect();
    assert_eq!(ids.len(), deck.len());
}

#[test]
fn test_deterministic_source_builds_valid_deck() {
    let mut rng = StepRng::new(0, 1);
    let deck = DeckBuilder::new()
        .build(&names(&CLASSIC_GRID), &mut rng)
        .expect("Build failed");
    assert_eq!(deck.len(), 16);
    assert!(identity_counts(&deck).values().all(|&n| n == 2));
}

#[test]
fn test_empty_roster_rejected() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let roster: [&str; 0] = [];
    assert_eq!(
        DeckBuilder::new().build(&roster, &mut rng),
        Err(DeckError::EmptyRoster)
    );
}

#[test]
fn test_duplicate_identity_rejected() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let result = DeckBuilder::new().build(&["Norris", "Piastri", "Norris"], &mut rng);
    assert_eq!(result, Err(DeckError::DuplicateIdentity("Norris".to_string())));
}

#[test]
fn test_bad_sample_sizes_rejected() {
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let roster = names(&CLASSIC_GRID);
    assert_eq!(
        DeckBuilder::with_sample(0).build(&roster, &mut rng),
        Err(DeckError::EmptySample)
    );
    let err = DeckBuilder::with_sample(9)
        .build(&roster, &mut rng)
        .expect_err("Oversized sample should fail");
    assert_eq!(
        err,
        DeckError::SampleTooLarge {
            requested: 9,
            available: 8
        }
    );
    assert_eq!(err.to_string(), "Requested 9 pairs from a roster of 8");
}

proptest! {
    #[test]
    fn prop_every_identity_exactly_twice(seed in any::<u64>(), pairs in 1usize..=20) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let deck = DeckBuilder::with_sample(pairs)
            .build(&names(&FULL_GRID), &mut rng)
            .expect("Build failed");

        prop_assert_eq!(deck.len(), pairs * 2);
        let counts = identity_counts(&deck);
        prop_assert_eq!(counts.len(), pairs);
        prop_assert!(counts.values().all(|&n| n == 2));
    }
}
