//! Arcade configuration.

use std::path::Path;

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use nexus_memory::ResolverConfig;
use nexus_reaction::SequencerConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::leaderboard::DEFAULT_LEADERBOARD_SIZE;

/// Environment variable overriding [`ArcadeConfig::database_url`].
pub const DATABASE_ENV: &str = "NEXUS_ARCADE_DATABASE";

/// Configuration for the arcade hub.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct ArcadeConfig {
    /// Path of the SQLite database file.
    #[serde(default = "default_database_url")]
    database_url: String,

    /// Entries per leaderboard fetch.
    #[serde(default = "default_leaderboard_size")]
    leaderboard_size: usize,

    /// Pairs dealt per memory game; `None` deals the roster default.
    #[serde(default)]
    deck_pairs: Option<usize>,

    /// Memory game rules.
    #[serde(default)]
    memory: ResolverConfig,

    /// Start-light timing.
    #[serde(default)]
    reaction: SequencerConfig,
}

#[instrument]
fn default_database_url() -> String {
    "nexus_arcade.db".to_string()
}

#[instrument]
fn default_leaderboard_size() -> usize {
    DEFAULT_LEADERBOARD_SIZE
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            leaderboard_size: default_leaderboard_size(),
            deck_pairs: None,
            memory: ResolverConfig::default(),
            reaction: SequencerConfig::default(),
        }
    }
}

impl ArcadeConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(database = %config.database_url, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not a valid configuration.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Applies overrides from the environment.
    #[instrument(skip(self))]
    pub fn with_env_overrides(self) -> Self {
        match std::env::var(DATABASE_ENV) {
            Ok(url) if !url.trim().is_empty() => {
                debug!(url = %url, "Database path overridden from environment");
                self.with_database_url(url)
            }
            _ => self,
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_memory::BudgetPolicy;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ArcadeConfig::from_toml("").expect("Parse failed");
        assert_eq!(config, ArcadeConfig::default());
        assert_eq!(config.database_url(), "nexus_arcade.db");
        assert_eq!(*config.leaderboard_size(), 10);
    }

    #[test]
    fn test_sections_parse() {
        let config = ArcadeConfig::from_toml(
            r#"
            database_url = "/tmp/arcade.db"
            leaderboard_size = 5
            deck_pairs = 6

            [memory]
            budget = 20
            budget_policy = "every_flip"
            match_bonus = 0

            [reaction]
            lights = 3
            "#,
        )
        .expect("Parse failed");
        assert_eq!(config.database_url(), "/tmp/arcade.db");
        assert_eq!(*config.deck_pairs(), Some(6));
        assert_eq!(config.memory().budget, Some(20));
        assert_eq!(config.memory().budget_policy, BudgetPolicy::EveryFlip);
        assert_eq!(config.memory().match_bonus, 0);
        assert_eq!(config.memory().mismatch_delay_ms, 800);
        assert_eq!(config.reaction().lights, 3);
        assert_eq!(config.reaction().arm_delay_max_ms, 5_000);
    }

    #[test]
    fn test_setters_build_config() {
        let config = ArcadeConfig::default()
            .with_database_url("/tmp/other.db".to_string())
            .with_leaderboard_size(3)
            .with_deck_pairs(Some(6));
        assert_eq!(config.database_url(), "/tmp/other.db");
        assert_eq!(*config.leaderboard_size(), 3);
        assert_eq!(*config.deck_pairs(), Some(6));
        assert_eq!(*config.memory(), ResolverConfig::default());
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = ArcadeConfig::from_toml("leaderboard_size = \"ten\"").expect_err("Should fail");
        assert!(err.to_string().starts_with("Config error: Failed to parse config"));
    }
}
