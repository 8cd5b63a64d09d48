//! Deck construction.

use std::collections::HashSet;

use derive_more::Display;
use rand::Rng;
use rand::seq::{SliceRandom, index};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{Card, CardId};

/// Pairs drawn from a roster larger than this when no sample size is given.
pub const DEFAULT_SAMPLE: usize = 8;

/// Error building a deck from a roster.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum DeckError {
    /// The roster has no identities.
    #[display("Roster is empty")]
    EmptyRoster,

    /// The same identity appears twice in the roster.
    #[display("Identity '{}' appears more than once in the roster", _0)]
    DuplicateIdentity(String),

    /// A sample of zero pairs was requested.
    #[display("Sample size must be at least 1")]
    EmptySample,

    /// More pairs were requested than the roster holds.
    #[display("Requested {} pairs from a roster of {}", requested, available)]
    SampleTooLarge {
        /// Pairs requested.
        requested: usize,
        /// Distinct identities available.
        available: usize,
    },
}

impl std::error::Error for DeckError {}

/// An ordered, shuffled sequence of paired cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Returns the cards in table order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Number of cards.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the deck holds no cards.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Looks up a card by instance id.
    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.instance() == id)
    }

    /// Whether `id` belongs to this deck.
    pub fn contains(&self, id: CardId) -> bool {
        self.get(id).is_some()
    }

    /// Returns the instance id of the other half of `id`'s pair.
    pub fn partner(&self, id: CardId) -> Option<CardId> {
        let card = self.get(id)?;
        self.cards
            .iter()
            .find(|other| card.pairs_with(other))
            .map(Card::instance)
    }

    /// Distinct identities in play.
    pub fn identities(&self) -> HashSet<&str> {
        self.cards.iter().map(Card::pair_key).collect()
    }
}

/// Builds decks from a roster of distinct identities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckBuilder {
    sample: Option<usize>,
}

impl DeckBuilder {
    /// A builder using the default sample rule.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder drawing exactly `pairs` identities.
    pub fn with_sample(pairs: usize) -> Self {
        Self {
            sample: Some(pairs),
        }
    }

    /// Number of pairs a roster of `roster_len` yields.
    ///
    /// Without an explicit sample, small rosters are used whole and larger
    /// ones contribute [`DEFAULT_SAMPLE`] pairs.
    pub fn pairs_for(&self, roster_len: usize) -> usize {
        self.sample
            .unwrap_or_else(|| roster_len.min(DEFAULT_SAMPLE))
    }

    /// Builds a shuffled deck holding each selected identity exactly twice.
    ///
    /// Instance ids are assigned before shuffling, so a card's id says
    /// nothing about where it lies on the table.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError`] for an empty or duplicated roster, or a sample
    /// size of zero or larger than the roster.
    #[instrument(skip(self, roster, rng), fields(roster_len = roster.len(), sample = ?self.sample))]
    pub fn build<S, R>(&self, roster: &[S], rng: &mut R) -> Result<Deck, DeckError>
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        if roster.is_empty() {
            return Err(DeckError::EmptyRoster);
        }

        let mut seen = HashSet::with_capacity(roster.len());
        for name in roster {
            if !seen.insert(name.as_ref()) {
                return Err(DeckError::DuplicateIdentity(name.as_ref().to_string()));
            }
        }

        let pairs = self.pairs_for(roster.len());
        if pairs == 0 {
            return Err(DeckError::EmptySample);
        }
        if pairs > roster.len() {
            return Err(DeckError::SampleTooLarge {
                requested: pairs,
                available: roster.len(),
            });
        }

        let selected: Vec<&str> = if pairs < roster.len() {
            index::sample(rng, roster.len(), pairs)
                .into_iter()
                .map(|i| roster[i].as_ref())
                .collect()
        } else {
            roster.iter().map(AsRef::as_ref).collect()
        };
        debug!(?selected, "Identities selected");

        let mut cards: Vec<Card> = selected
            .iter()
            .flat_map(|name| [*name, *name])
            .zip(0u32..)
            .map(|(name, id)| Card::new(name, CardId::from(id)))
            .collect();
        cards.shuffle(rng);

        info!(cards = cards.len(), pairs, "Deck built");
        Ok(Deck { cards })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_default_sample_rule() {
        let builder = DeckBuilder::new();
        assert_eq!(builder.pairs_for(4), 4);
        assert_eq!(builder.pairs_for(8), 8);
        assert_eq!(builder.pairs_for(20), DEFAULT_SAMPLE);
        assert_eq!(DeckBuilder::with_sample(3).pairs_for(20), 3);
    }

    #[test]
    fn test_partner_lookup() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let deck = DeckBuilder::new()
            .build(&["Hamilton", "Leclerc"], &mut rng)
            .expect("Build failed");

        for card in deck.cards() {
            let partner = deck.partner(card.instance()).expect("Every card has a partner");
            assert_ne!(partner, card.instance());
            assert_eq!(deck.get(partner).map(Card::pair_key), Some(card.pair_key()));
        }
        assert_eq!(deck.partner(CardId::from(99)), None);
    }

    #[test]
    fn test_same_seed_same_deck() {
        let roster = ["A", "B", "C", "D", "E"];
        let a = DeckBuilder::new()
            .build(&roster, &mut ChaCha8Rng::seed_from_u64(42))
            .expect("Build failed");
        let b = DeckBuilder::new()
            .build(&roster, &mut ChaCha8Rng::seed_from_u64(42))
            .expect("Build failed");
        assert_eq!(a, b);
    }
}
