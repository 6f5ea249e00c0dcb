//! Live wizard sessions
//!
//! One controller per in-progress submission, keyed by session id. Each
//! controller sits behind its own async mutex; a request that finds the
//! mutex held is rejected instead of queued, so a session never has two
//! advancing operations in flight.

use super::{WizardController, WizardError, WizardSettings};
use crate::notifications::NotificationCenter;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

struct SessionEntry {
    controller: Arc<Mutex<WizardController>>,
    cancel: CancellationToken,
}

pub struct WizardRegistry {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    settings: WizardSettings,
    notifications: NotificationCenter,
}

impl WizardRegistry {
    pub fn new(settings: WizardSettings, notifications: NotificationCenter) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            settings,
            notifications,
        }
    }

    /// Start a new session
    pub fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let controller = WizardController::new(
            id,
            self.settings.clone(),
            self.notifications.clone(),
            cancel.clone(),
        );

        self.write_sessions().insert(
            id,
            SessionEntry {
                controller: Arc::new(Mutex::new(controller)),
                cancel,
            },
        );
        tracing::info!("Wizard session {} created", id);
        id
    }

    fn controller(&self, id: Uuid) -> Result<Arc<Mutex<WizardController>>, WizardError> {
        self.read_sessions()
            .get(&id)
            .map(|entry| entry.controller.clone())
            .ok_or(WizardError::SessionNotFound)
    }

    /// Exclusive access for a mutating operation; `Busy` if one is running
    pub fn acquire(&self, id: Uuid) -> Result<OwnedMutexGuard<WizardController>, WizardError> {
        self.controller(id)?
            .try_lock_owned()
            .map_err(|_| WizardError::Busy)
    }

    /// Access for reads, waiting for any running operation to finish
    pub async fn inspect(&self, id: Uuid) -> Result<OwnedMutexGuard<WizardController>, WizardError> {
        Ok(self.controller(id)?.lock_owned().await)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.read_sessions().contains_key(&id)
    }

    /// Drop a session and cancel whatever it is waiting on
    pub fn remove(&self, id: Uuid) -> bool {
        match self.write_sessions().remove(&id) {
            Some(entry) => {
                entry.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Remove sessions idle for longer than `max_idle`. Sessions with an
    /// operation in flight are never idle.
    pub fn expire_idle(&self, max_idle: Duration) -> Vec<Uuid> {
        let expired: Vec<Uuid> = self
            .read_sessions()
            .iter()
            .filter(|(_, entry)| {
                entry
                    .controller
                    .try_lock()
                    .map(|controller| controller.idle_for() > max_idle)
                    .unwrap_or(false)
            })
            .map(|(id, _)| *id)
            .collect();

        for id in &expired {
            if self.remove(*id) {
                tracing::info!("Wizard session {} expired after inactivity", id);
            }
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.read_sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_sessions(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Uuid, SessionEntry>> {
        // The map holds no invariants a panicking writer could break
        self.sessions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_sessions(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Uuid, SessionEntry>> {
        self.sessions.write().unwrap_or_else(|e| e.into_inner())
    }
}
