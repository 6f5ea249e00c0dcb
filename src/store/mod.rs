//! Local record store
//!
//! Process-wide list of submitted records, most recent first, persisted as a
//! single JSON array under [`RECORDS_KEY`]. Writes are best-effort: a failed
//! write keeps the in-memory list and raises a notification instead of an
//! error.

pub mod backend;

use crate::models::{Record, RecordPatch};
use crate::notifications::NotificationCenter;
use backend::{read_json, StorageBackend, StorageError};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub use backend::{FileStorage, MemoryStorage};

pub const RECORDS_KEY: &str = "participadf-manifestacoes";

#[derive(Default)]
struct Inner {
    records: Vec<Record>,
    current: Option<Uuid>,
}

pub struct RecordStore {
    backend: Arc<dyn StorageBackend>,
    notifications: NotificationCenter,
    inner: RwLock<Inner>,
}

impl RecordStore {
    /// Load the persisted list. A missing or corrupt value starts empty.
    pub async fn open(backend: Arc<dyn StorageBackend>, notifications: NotificationCenter) -> Self {
        let records: Vec<Record> = read_json(backend.as_ref(), RECORDS_KEY).await;
        tracing::info!(
            "Record store opened with {} record(s) from {} storage",
            records.len(),
            backend.name()
        );

        Self {
            backend,
            notifications,
            inner: RwLock::new(Inner {
                records,
                current: None,
            }),
        }
    }

    /// Prepend a record and make it current.
    ///
    /// Returns whether the list was durably persisted. The record stays in
    /// memory either way.
    pub async fn add(&self, record: Record) -> bool {
        let mut inner = self.inner.write().await;
        tracing::info!("Registering record {}", record.tracking_code);
        inner.current = Some(record.id);
        inner.records.insert(0, record);
        self.persist(&inner.records).await
    }

    pub async fn find_by_tracking_code(&self, code: &str) -> Option<Record> {
        let code = code.trim();
        let inner = self.inner.read().await;
        inner
            .records
            .iter()
            .find(|r| r.tracking_code.eq_ignore_ascii_case(code))
            .cloned()
    }

    pub async fn contains_tracking_code(&self, code: &str) -> bool {
        self.find_by_tracking_code(code).await.is_some()
    }

    /// Merge a patch into the record with `id`. Unknown ids are a no-op.
    pub async fn update(&self, id: Uuid, patch: RecordPatch) -> Option<Record> {
        let mut inner = self.inner.write().await;
        let record = inner.records.iter_mut().find(|r| r.id == id)?;
        record.apply(patch, Utc::now());
        let updated = record.clone();

        self.persist(&inner.records).await;
        Some(updated)
    }

    /// Record most recently added in this process
    pub async fn current(&self) -> Option<Record> {
        let inner = self.inner.read().await;
        let id = inner.current?;
        inner.records.iter().find(|r| r.id == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    /// Write the full list, surfacing errors to the caller (used on shutdown)
    pub async fn flush(&self) -> Result<(), StorageError> {
        let inner = self.inner.read().await;
        let json = serde_json::to_string(&inner.records)?;
        self.backend.set_item(RECORDS_KEY, &json).await
    }

    async fn persist(&self, records: &[Record]) -> bool {
        let result = match serde_json::to_string(records) {
            Ok(json) => self.backend.set_item(RECORDS_KEY, &json).await,
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to persist records to {} storage: {}", self.backend.name(), e);
                self.notifications.error(
                    "Não foi possível salvar a manifestação neste dispositivo",
                    "Guarde o número de protocolo exibido.",
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryType, Department, RecordStatus};
    use std::collections::BTreeMap;

    fn record(code: &str) -> Record {
        let now = Utc::now();
        Record {
            id: Uuid::new_v4(),
            tracking_code: code.to_string(),
            category_type: CategoryType::Complaint,
            department: Department::Novacap,
            status: RecordStatus::Registered,
            subject_id: Some("buraco-via".to_string()),
            subject_text: "Buraco na Via/Calçada".to_string(),
            narrative_text: "Há um buraco enorme na via principal do Gama.".to_string(),
            extra_fields: BTreeMap::new(),
            location: None,
            attachments: Vec::new(),
            is_anonymous: true,
            identity: None,
            created_at: now,
            updated_at: now,
            response_text: None,
            responded_at: None,
        }
    }

    async fn store_with(backend: Arc<MemoryStorage>) -> (RecordStore, NotificationCenter) {
        let notifications = NotificationCenter::new();
        let store = RecordStore::open(backend, notifications.clone()).await;
        (store, notifications)
    }

    #[tokio::test]
    async fn test_add_then_find_roundtrip() {
        let (store, _) = store_with(Arc::new(MemoryStorage::new())).await;
        let r = record("PARTICIPADF-202601-A1B2C3D4");

        assert!(store.add(r.clone()).await);
        assert_eq!(
            store.find_by_tracking_code("PARTICIPADF-202601-A1B2C3D4").await,
            Some(r.clone())
        );
        assert_eq!(store.current().await, Some(r));
    }

    #[tokio::test]
    async fn test_find_is_case_insensitive() {
        let (store, _) = store_with(Arc::new(MemoryStorage::new())).await;
        store.add(record("PARTICIPADF-202601-A1B2C3D4")).await;

        assert!(store
            .find_by_tracking_code(" participadf-202601-a1b2c3d4 ")
            .await
            .is_some());
        assert!(store
            .find_by_tracking_code("PARTICIPADF-202601-ZZZZZZZZ")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_newest_first_and_persisted() {
        let backend = Arc::new(MemoryStorage::new());
        let (store, _) = store_with(backend.clone()).await;
        store.add(record("PARTICIPADF-202601-AAAAAAAA")).await;
        store.add(record("PARTICIPADF-202601-BBBBBBBB")).await;

        let reopened = RecordStore::open(backend, NotificationCenter::new()).await;
        assert_eq!(reopened.len().await, 2);
        let raw = reopened.backend.get_item(RECORDS_KEY).await.unwrap().unwrap();
        let stored: Vec<Record> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored[0].tracking_code, "PARTICIPADF-202601-BBBBBBBB");
    }

    #[tokio::test]
    async fn test_failed_write_keeps_record_and_notifies() {
        let backend = Arc::new(MemoryStorage::new());
        backend.set_failing(true);
        let (store, notifications) = store_with(backend).await;

        let persisted = store.add(record("PARTICIPADF-202601-CCCCCCCC")).await;

        assert!(!persisted);
        assert!(store.contains_tracking_code("PARTICIPADF-202601-CCCCCCCC").await);
        assert_eq!(notifications.recent().len(), 1);
    }

    #[tokio::test]
    async fn test_update_merges_and_ignores_unknown_ids() {
        let (store, _) = store_with(Arc::new(MemoryStorage::new())).await;
        let r = record("PARTICIPADF-202601-DDDDDDDD");
        store.add(r.clone()).await;

        let patch = RecordPatch {
            status: Some(RecordStatus::Forwarded),
            ..Default::default()
        };
        let updated = store.update(r.id, patch.clone()).await.unwrap();
        assert_eq!(updated.status, RecordStatus::Forwarded);
        assert!(updated.updated_at >= r.updated_at);
        assert_eq!(updated.tracking_code, r.tracking_code);

        assert!(store.update(Uuid::new_v4(), patch).await.is_none());
    }

    #[tokio::test]
    async fn test_open_tolerates_corrupt_value() {
        let backend = Arc::new(MemoryStorage::new());
        backend.set_item(RECORDS_KEY, "not json at all").await.unwrap();
        let (store, _) = store_with(backend).await;
        assert_eq!(store.len().await, 0);
    }
}
