//! Transient notification channel
//!
//! Recoverable problems (failed persistence, finished submissions) are
//! published here instead of being returned as errors. Live subscribers get
//! them over a broadcast channel; the most recent ones are kept for polling.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Number of notifications retained for `recent()`
pub const RECENT_CAPACITY: usize = 50;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NotificationCenter {
    tx: broadcast::Sender<Notification>,
    recent: Arc<Mutex<VecDeque<Notification>>>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            recent: Arc::new(Mutex::new(VecDeque::with_capacity(RECENT_CAPACITY))),
        }
    }

    pub fn publish(
        &self,
        level: NotificationLevel,
        title: impl Into<String>,
        message: Option<String>,
    ) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4(),
            level,
            title: title.into(),
            message,
            created_at: Utc::now(),
        };

        if let Ok(mut recent) = self.recent.lock() {
            if recent.len() == RECENT_CAPACITY {
                recent.pop_front();
            }
            recent.push_back(notification.clone());
        }

        // No subscribers is fine; the notification is still retained
        let _ = self.tx.send(notification.clone());
        notification
    }

    pub fn error(&self, title: impl Into<String>, message: impl Into<String>) -> Notification {
        self.publish(NotificationLevel::Error, title, Some(message.into()))
    }

    pub fn success(&self, title: impl Into<String>, message: impl Into<String>) -> Notification {
        self.publish(NotificationLevel::Success, title, Some(message.into()))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Retained notifications, newest first
    pub fn recent(&self) -> Vec<Notification> {
        self.recent
            .lock()
            .map(|recent| recent.iter().rev().cloned().collect())
            .unwrap_or_default()
    }
}

/// Mirror published notifications into the log until shutdown.
/// Returns how many were forwarded.
pub async fn forward_to_log(center: NotificationCenter, shutdown: CancellationToken) -> usize {
    let mut rx = center.subscribe();
    let mut forwarded = 0;
    loop {
        let notification = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = rx.recv() => match received {
                Ok(n) => n,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Notification log lagged, {} skipped", skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            },
        };

        let message = notification.message.as_deref().unwrap_or("");
        match notification.level {
            NotificationLevel::Error => tracing::error!("{} {}", notification.title, message),
            NotificationLevel::Warning => tracing::warn!("{} {}", notification.title, message),
            NotificationLevel::Success | NotificationLevel::Info => {
                tracing::info!("{} {}", notification.title, message)
            }
        }
        forwarded += 1;
    }
    forwarded
}
