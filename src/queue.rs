//! In-memory queue state manager
//!
//! Sole mutator of the entry list. Every mutation writes the full list
//! through to the persistent store; a failed write is logged and the
//! in-memory state stays authoritative for the rest of the process.

use crate::models::{PhotoDraft, QueueEntry, QueueEntryPatch, UploadStatus};
use crate::store::{KeyValueStore, QueueStore};
use tokio::sync::watch;

/// Authoritative list of queued photos plus the observable upload state
pub struct UploadQueue<S: KeyValueStore> {
    entries: Vec<QueueEntry>,
    store: QueueStore<S>,
    currently_uploading: Option<String>,
    uploading_all: bool,
    progress: u8,
    progress_tx: watch::Sender<u8>,
}

impl<S: KeyValueStore> UploadQueue<S> {
    /// Creates an empty queue on top of the given store
    ///
    /// Call [`load_from_storage`](Self::load_from_storage) once during
    /// application startup to restore persisted entries.
    pub fn new(store: QueueStore<S>) -> Self {
        let (progress_tx, _rx) = watch::channel(0);
        Self {
            entries: Vec::new(),
            store,
            currently_uploading: None,
            uploading_all: false,
            progress: 0,
            progress_tx,
        }
    }

    /// Replaces the in-memory list with the persisted one
    ///
    /// Entries persisted mid-transfer are reset to pending: the transfer
    /// cannot have survived the restart and its remote outcome is unknown.
    pub fn load_from_storage(&mut self) {
        let mut entries = self.store.load();
        for entry in &mut entries {
            if entry.status == UploadStatus::Uploading {
                log::info!("Resetting interrupted upload {} to pending", entry.id);
                entry.status = UploadStatus::Pending;
            }
        }
        log::debug!("Loaded {} queued photos from storage", entries.len());
        self.entries = entries;
    }

    /// Queues a new photo at the end of the list, returns its id
    pub fn add_photo(&mut self, draft: PhotoDraft) -> String {
        let entry = QueueEntry::new(draft);
        let id = entry.id.clone();
        self.entries.push(entry);
        self.persist();
        id
    }

    /// Removes the entry with the given id, no-op if absent
    pub fn remove_photo(&mut self, id: &str) {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() == before {
            log::debug!("remove_photo: no entry with id {}", id);
            return;
        }
        self.persist();
    }

    /// Merges the given fields into the matching entry, no-op if absent
    pub fn update_photo(&mut self, id: &str, patch: QueueEntryPatch) {
        let entry = match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => entry,
            None => {
                log::debug!("update_photo: no entry with id {}", id);
                return;
            }
        };

        if let Some(status) = patch.status {
            entry.status = status;
        }
        if let Some(error) = patch.error {
            entry.error = error;
        }
        if let Some(retry_count) = patch.retry_count {
            entry.retry_count = retry_count;
        }
        if let Some(last_attempt_at) = patch.last_attempt_at {
            entry.last_attempt_at = Some(last_attempt_at);
        }
        if let Some(caption) = patch.caption {
            entry.caption = Some(caption);
        }
        if let Some(notes) = patch.notes {
            entry.notes = Some(notes);
        }
        if let Some(tags) = patch.tags {
            entry.tags = Some(tags);
        }
        if let Some(gps) = patch.gps_coordinates {
            entry.gps_coordinates = Some(gps);
        }
        if let Some(trade_category) = patch.trade_category {
            entry.trade_category = Some(trade_category);
        }
        if let Some(room_id) = patch.room_id {
            entry.room_id = Some(room_id);
        }
        if let Some(room_name) = patch.room_name {
            entry.room_name = Some(room_name);
        }

        self.persist();
    }

    /// Removes every uploaded entry, preserving the order of the rest
    pub fn clear_completed(&mut self) {
        self.entries.retain(|e| e.status != UploadStatus::Uploaded);
        self.persist();
    }

    /// Full entry list in insertion order
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// Looks up a single entry by id
    pub fn entry(&self, id: &str) -> Option<&QueueEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Number of entries awaiting upload
    pub fn pending_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == UploadStatus::Pending)
            .count()
    }

    /// Number of entries whose last attempt failed
    pub fn failed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == UploadStatus::Failed)
            .count()
    }

    /// Id of the entry currently being transferred, if any
    pub fn currently_uploading(&self) -> Option<&str> {
        self.currently_uploading.as_deref()
    }

    /// Whether a batch upload is running
    pub fn is_uploading_all(&self) -> bool {
        self.uploading_all
    }

    /// Batch progress, 0 to 100
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Subscribe to batch progress updates
    pub fn subscribe_progress(&self) -> watch::Receiver<u8> {
        self.progress_tx.subscribe()
    }

    /// Read access to the underlying store
    pub fn store(&self) -> &QueueStore<S> {
        &self.store
    }

    pub(crate) fn set_currently_uploading(&mut self, id: Option<String>) {
        self.currently_uploading = id;
    }

    pub(crate) fn set_uploading_all(&mut self, value: bool) {
        self.uploading_all = value;
    }

    pub(crate) fn set_progress(&mut self, value: u8) {
        self.progress = value;
        let _ = self.progress_tx.send(value);
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.entries) {
            log::warn!("Failed to persist upload queue: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UploadQueueError;
    use crate::store::SqliteKeyValueStore;

    fn draft(caption: &str) -> PhotoDraft {
        PhotoDraft {
            source_uri: format!("/tmp/{}.jpg", caption),
            project_id: "proj-1".to_string(),
            project_name: "Maple Street Renovation".to_string(),
            room_id: None,
            room_name: None,
            caption: Some(caption.to_string()),
            notes: None,
            tags: None,
            gps_coordinates: None,
            trade_category: None,
            taken_at: "2026-03-14T10:30:00Z".to_string(),
        }
    }

    fn queue() -> UploadQueue<SqliteKeyValueStore> {
        UploadQueue::new(QueueStore::new(
            SqliteKeyValueStore::open_in_memory().unwrap(),
        ))
    }

    #[test]
    fn test_add_photo_appends_in_order_with_unique_ids() {
        let mut q = queue();
        let id1 = q.add_photo(draft("p1"));
        let id2 = q.add_photo(draft("p2"));
        let id3 = q.add_photo(draft("p3"));

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);

        let captions: Vec<_> = q
            .entries()
            .iter()
            .map(|e| e.caption.clone().unwrap())
            .collect();
        assert_eq!(captions, vec!["p1", "p2", "p3"]);
        assert!(q
            .entries()
            .iter()
            .all(|e| e.status == UploadStatus::Pending && e.retry_count == 0));
    }

    #[test]
    fn test_remove_photo_absent_is_noop() {
        let mut q = queue();
        let id = q.add_photo(draft("p1"));
        q.remove_photo("does-not-exist");
        assert_eq!(q.entries().len(), 1);

        q.remove_photo(&id);
        assert!(q.entries().is_empty());
    }

    #[test]
    fn test_update_photo_merges_fields() {
        let mut q = queue();
        let id = q.add_photo(draft("p1"));

        q.update_photo(
            &id,
            QueueEntryPatch {
                status: Some(UploadStatus::Failed),
                error: Some(Some("network down".to_string())),
                retry_count: Some(1),
                notes: Some("retake later".to_string()),
                ..Default::default()
            },
        );

        let entry = q.entry(&id).unwrap();
        assert_eq!(entry.status, UploadStatus::Failed);
        assert_eq!(entry.error.as_deref(), Some("network down"));
        assert_eq!(entry.retry_count, 1);
        assert_eq!(entry.notes.as_deref(), Some("retake later"));
        // untouched fields keep their values
        assert_eq!(entry.caption.as_deref(), Some("p1"));

        // a patch can clear the failure message again
        q.update_photo(
            &id,
            QueueEntryPatch {
                error: Some(None),
                ..Default::default()
            },
        );
        assert!(q.entry(&id).unwrap().error.is_none());
    }

    #[test]
    fn test_clear_completed_removes_only_uploaded_and_keeps_order() {
        let mut q = queue();
        let id1 = q.add_photo(draft("p1"));
        let id2 = q.add_photo(draft("p2"));
        let id3 = q.add_photo(draft("p3"));
        let id4 = q.add_photo(draft("p4"));

        q.update_photo(
            &id1,
            QueueEntryPatch {
                status: Some(UploadStatus::Uploaded),
                ..Default::default()
            },
        );
        q.update_photo(
            &id3,
            QueueEntryPatch {
                status: Some(UploadStatus::Failed),
                error: Some(Some("boom".to_string())),
                ..Default::default()
            },
        );

        q.clear_completed();

        let remaining: Vec<_> = q.entries().iter().map(|e| e.id.clone()).collect();
        assert_eq!(remaining, vec![id2, id3, id4]);
    }

    #[test]
    fn test_every_mutation_persists() {
        let mut q = queue();
        let id1 = q.add_photo(draft("p1"));
        let id2 = q.add_photo(draft("p2"));
        assert_eq!(q.store().load().len(), 2);

        q.update_photo(
            &id1,
            QueueEntryPatch {
                status: Some(UploadStatus::Uploaded),
                ..Default::default()
            },
        );
        assert_eq!(
            q.store().load()[0].status,
            UploadStatus::Uploaded
        );

        q.remove_photo(&id2);
        assert_eq!(q.store().load().len(), 1);

        q.clear_completed();
        assert!(q.store().load().is_empty());
    }

    #[test]
    fn test_load_from_storage_resets_only_uploading_entries() {
        let store = QueueStore::new(SqliteKeyValueStore::open_in_memory().unwrap());

        let mut interrupted = QueueEntry::new(draft("interrupted"));
        interrupted.status = UploadStatus::Uploading;
        let mut failed = QueueEntry::new(draft("failed"));
        failed.status = UploadStatus::Failed;
        failed.error = Some("server error".to_string());
        failed.retry_count = 1;
        let mut done = QueueEntry::new(draft("done"));
        done.status = UploadStatus::Uploaded;

        store
            .save(&[interrupted.clone(), failed.clone(), done.clone()])
            .unwrap();

        let mut q = UploadQueue::new(store);
        q.load_from_storage();

        assert_eq!(q.entry(&interrupted.id).unwrap().status, UploadStatus::Pending);
        let failed_after = q.entry(&failed.id).unwrap();
        assert_eq!(failed_after.status, UploadStatus::Failed);
        assert_eq!(failed_after.retry_count, 1);
        assert_eq!(failed_after.error.as_deref(), Some("server error"));
        assert_eq!(q.entry(&done.id).unwrap().status, UploadStatus::Uploaded);
    }

    #[test]
    fn test_counts() {
        let mut q = queue();
        q.add_photo(draft("p1"));
        let id2 = q.add_photo(draft("p2"));
        q.update_photo(
            &id2,
            QueueEntryPatch {
                status: Some(UploadStatus::Failed),
                ..Default::default()
            },
        );

        assert_eq!(q.pending_count(), 1);
        assert_eq!(q.failed_count(), 1);
    }

    /// Store whose writes always fail, for checking that persistence
    /// errors never poison the in-memory state.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, UploadQueueError> {
            Err(UploadQueueError::Other("read failed".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), UploadQueueError> {
            Err(UploadQueueError::Other("write failed".to_string()))
        }
    }

    #[test]
    fn test_persistence_failure_is_swallowed() {
        let mut q = UploadQueue::new(QueueStore::new(BrokenStore));
        let id = q.add_photo(draft("p1"));
        assert_eq!(q.entries().len(), 1);
        assert_eq!(q.entry(&id).unwrap().caption.as_deref(), Some("p1"));

        // loading from a broken store falls back to an empty list
        q.load_from_storage();
        assert!(q.entries().is_empty());
    }
}
