//! Score reporting on behalf of the signed-in player.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::db::UserRecord;
use crate::identity::{Identity, IdentityProvider};
use crate::store::{RecordDelta, UserRecordStore};

#[derive(Debug, Clone)]
struct Profile {
    identity: Identity,
    mirror: UserRecord,
    synced: bool,
}

#[derive(Debug, Default)]
struct AdapterState {
    epoch: u64,
    profile: Option<Profile>,
}

/// Reports game results to a [`UserRecordStore`].
///
/// Reports update a local mirror immediately and write to the store from a
/// background task, so gameplay never waits on persistence. A write that
/// completes after the player signed out (or signed in again) is ignored.
/// Anonymous reports are dropped.
///
/// Reports spawn onto the current Tokio runtime.
#[derive(Debug, Clone)]
pub struct ScoreAdapter {
    store: Arc<dyn UserRecordStore>,
    state: Arc<Mutex<AdapterState>>,
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl ScoreAdapter {
    /// Creates an anonymous adapter over `store`.
    #[instrument(skip(store))]
    pub fn new(store: Arc<dyn UserRecordStore>) -> Self {
        info!("Creating ScoreAdapter");
        Self {
            store,
            state: Arc::new(Mutex::new(AdapterState::default())),
            tasks: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<dyn UserRecordStore> {
        &self.store
    }

    fn state(&self) -> MutexGuard<'_, AdapterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Signs in through `provider` and loads (or creates) the player's record.
    ///
    /// A provider failure leaves the adapter anonymous. A store failure
    /// leaves the player signed in with a zeroed, unsynced mirror.
    #[instrument(skip(self, provider))]
    pub async fn sign_in(&self, provider: &dyn IdentityProvider) -> Option<Identity> {
        let identity = match provider.sign_in().await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(error = %e, "Sign-in failed, continuing anonymously");
                return None;
            }
        };
        let user_id = identity.user_id().clone();
        let fresh = || {
            UserRecord::fresh(
                user_id.clone(),
                identity.display_name().clone(),
                identity.photo_url().clone(),
            )
        };

        let (mirror, synced) = match self.store.get_record(&user_id).await {
            Ok(Some(record)) => {
                debug!(user_id = %user_id, "Existing record loaded");
                (record, true)
            }
            Ok(None) => match self.store.create_record(fresh()).await {
                Ok(record) => {
                    info!(user_id = %user_id, "Record created on first sign-in");
                    (record, true)
                }
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "Could not create record");
                    (fresh(), false)
                }
            },
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Could not load record");
                (fresh(), false)
            }
        };

        let mut state = self.state();
        state.epoch += 1;
        state.profile = Some(Profile {
            identity: identity.clone(),
            mirror,
            synced,
        });
        info!(user_id = %user_id, epoch = state.epoch, synced, "Signed in");
        Some(identity)
    }

    /// Drops the identity. In-flight writes complete but are not observed.
    #[instrument(skip(self))]
    pub fn sign_out(&self) {
        let mut state = self.state();
        if let Some(profile) = state.profile.take() {
            state.epoch += 1;
            info!(user_id = %profile.identity.user_id(), "Signed out");
        }
    }

    /// Records a won decisive game.
    #[instrument(skip(self))]
    pub fn report_win(&self) {
        self.dispatch(RecordDelta::win());
    }

    /// Records a lost decisive game.
    #[instrument(skip(self))]
    pub fn report_loss(&self) {
        self.dispatch(RecordDelta::loss());
    }

    /// Records a reaction run.
    #[instrument(skip(self))]
    pub fn report_reaction(&self, elapsed_ms: u64, xp: u32) {
        self.dispatch(RecordDelta::reaction(elapsed_ms, xp));
    }

    fn dispatch(&self, delta: RecordDelta) {
        let (user_id, epoch) = {
            let mut state = self.state();
            let epoch = state.epoch;
            let Some(profile) = state.profile.as_mut() else {
                debug!("Anonymous report dropped");
                return;
            };
            profile.mirror.apply(&delta);
            (profile.identity.user_id().clone(), epoch)
        };

        let store = Arc::clone(&self.store);
        let state = Arc::clone(&self.state);
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            let result = store.apply_delta(&user_id, &delta).await;
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.epoch != epoch {
                debug!(user_id = %user_id, "Identity changed, write result ignored");
                return;
            }
            match result {
                Ok(record) => debug!(user_id = %user_id, wins = record.wins(), "Write confirmed"),
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "Score write failed");
                    if let Some(profile) = state.profile.as_mut() {
                        profile.synced = false;
                    }
                }
            }
        });
    }

    /// Waits for every outstanding write.
    #[instrument(skip(self))]
    pub async fn flush(&self) {
        let mut pending = {
            let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *tasks)
        };
        while let Some(joined) = pending.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "Score task did not complete");
            }
        }
    }

    /// The signed-in identity.
    pub fn identity(&self) -> Option<Identity> {
        self.state().profile.as_ref().map(|p| p.identity.clone())
    }

    /// Local copy of the player's record, including unconfirmed writes.
    pub fn local_record(&self) -> Option<UserRecord> {
        self.state().profile.as_ref().map(|p| p.mirror.clone())
    }

    /// Whether every store call for the current identity succeeded.
    pub fn is_synced(&self) -> bool {
        self.state().profile.as_ref().is_some_and(|p| p.synced)
    }
}
