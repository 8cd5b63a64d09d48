//! Experience awarded per reaction time.

use serde::{Deserialize, Serialize};

/// Experience band for a valid reaction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
pub enum XpTier {
    /// Under 200 ms.
    #[strum(to_string = "GODLIKE REFLEXES!")]
    Godlike,
    /// Under 300 ms.
    #[strum(to_string = "PRO DRIVER!")]
    Pro,
    /// Anything slower.
    #[strum(to_string = "KEEP PRACTICING!")]
    Rookie,
}

impl XpTier {
    /// Upper bound (exclusive) of the godlike band, in milliseconds.
    pub const GODLIKE_BELOW_MS: u64 = 200;
    /// Upper bound (exclusive) of the pro band, in milliseconds.
    pub const PRO_BELOW_MS: u64 = 300;

    /// Classifies a reaction time.
    pub fn for_reaction(elapsed_ms: u64) -> Self {
        if elapsed_ms < Self::GODLIKE_BELOW_MS {
            XpTier::Godlike
        } else if elapsed_ms < Self::PRO_BELOW_MS {
            XpTier::Pro
        } else {
            XpTier::Rookie
        }
    }

    /// Experience points awarded.
    pub fn xp(self) -> u32 {
        match self {
            XpTier::Godlike => 100,
            XpTier::Pro => 50,
            XpTier::Rookie => 10,
        }
    }
}
