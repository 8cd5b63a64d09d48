//! Player identity.

use async_trait::async_trait;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// A signed-in player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters, new)]
pub struct Identity {
    user_id: String,
    display_name: String,
    photo_url: Option<String>,
}

/// Sign-in failure with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Authentication error: {} at {}:{}", message, file, line)]
pub struct AuthError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl AuthError {
    /// Creates a new authentication error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Source of player identities.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Signs a player in.
    async fn sign_in(&self) -> Result<Identity, AuthError>;
}

/// Offline provider keyed by display name.
///
/// The user id is a slug of the name, so the same name always maps to the
/// same record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalProfile {
    display_name: String,
    photo_url: Option<String>,
}

impl LocalProfile {
    /// Prefix for ids issued by this provider.
    pub const ID_PREFIX: &'static str = "local:";

    /// Creates a provider for `display_name`.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            photo_url: None,
        }
    }

    /// Attaches an avatar URL.
    pub fn with_photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }

    /// The id this profile signs in as, or `None` if the name has no usable characters.
    pub fn user_id(&self) -> Option<String> {
        let mut slug = String::with_capacity(self.display_name.len());
        for c in self.display_name.trim().chars() {
            if c.is_alphanumeric() {
                slug.extend(c.to_lowercase());
            } else if !slug.ends_with('-') && !slug.is_empty() {
                slug.push('-');
            }
        }
        let slug = slug.trim_end_matches('-');
        (!slug.is_empty()).then(|| format!("{}{}", Self::ID_PREFIX, slug))
    }
}

#[async_trait]
impl IdentityProvider for LocalProfile {
    #[instrument(skip(self), fields(display_name = %self.display_name))]
    async fn sign_in(&self) -> Result<Identity, AuthError> {
        let user_id = self
            .user_id()
            .ok_or_else(|| AuthError::new("Display name must contain a letter or digit"))?;
        info!(user_id = %user_id, "Local profile signed in");
        Ok(Identity::new(
            user_id,
            self.display_name.trim().to_string(),
            self.photo_url.clone(),
        ))
    }
}
