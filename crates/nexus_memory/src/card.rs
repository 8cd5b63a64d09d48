//! Cards and their instance identifiers.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Identifies one physical card, even between the two halves of a pair.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[display("#{}", _0)]
pub struct CardId(u32);

impl CardId {
    /// Returns the raw identifier.
    pub fn get(self) -> u32 {
        self.0
    }
}

/// A card in a deck.
///
/// Two cards match when their identities are equal; the instance id is
/// only used to track which physical card was flipped or solved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct Card {
    /// Face shown when flipped (a driver name).
    identity: String,
    /// Unique per physical card.
    #[getter(skip)]
    instance: CardId,
}

impl Card {
    /// Creates a card.
    pub fn new(identity: impl Into<String>, instance: CardId) -> Self {
        Self {
            identity: identity.into(),
            instance,
        }
    }

    /// Returns this card's instance id.
    pub fn instance(&self) -> CardId {
        self.instance
    }

    /// Returns the key used for match comparison.
    pub fn pair_key(&self) -> &str {
        &self.identity
    }

    /// Whether `other` is this card's partner.
    pub fn pairs_with(&self, other: &Card) -> bool {
        self.instance != other.instance && self.identity == other.identity
    }
}
