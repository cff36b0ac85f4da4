//! Sequential upload driver
//!
//! Drains pending queue entries one at a time against the project API.
//! A failed transfer marks only its own entry; the rest of the batch
//! continues. Uploads are never concurrent: the driver holds the queue
//! mutably for the whole batch, so the currently-uploading marker and the
//! persisted list are only ever touched by one operation at a time.

use crate::api::{read_photo_file, CreateUpdateRequest, ProjectApi};
use crate::error::UploadQueueError;
use crate::models::{QueueEntry, QueueEntryPatch, UploadStatus};
use crate::queue::UploadQueue;
use crate::store::KeyValueStore;

/// Failed attempts allowed per entry before retries become no-ops
pub const MAX_RETRIES: u32 = 3;

/// Drives queued photos through the remote transfer
pub struct UploadDriver<A: ProjectApi> {
    api: A,
}

impl<A: ProjectApi> UploadDriver<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Uploads a single entry, recording the outcome on the entry itself
    ///
    /// No-op when the id is unknown. Transfer errors are converted into
    /// the failed status with a message and never propagate.
    pub async fn upload_photo<S: KeyValueStore>(&self, queue: &mut UploadQueue<S>, id: &str) {
        let entry = match queue.entry(id) {
            Some(entry) => entry.clone(),
            None => {
                log::warn!("upload_photo: no entry with id {}", id);
                return;
            }
        };

        queue.set_currently_uploading(Some(id.to_string()));
        queue.update_photo(
            id,
            QueueEntryPatch {
                status: Some(UploadStatus::Uploading),
                last_attempt_at: Some(chrono::Utc::now().to_rfc3339()),
                ..Default::default()
            },
        );

        match self.transfer(&entry).await {
            Ok(()) => {
                log::info!("Uploaded photo {}", id);
                queue.update_photo(
                    id,
                    QueueEntryPatch {
                        status: Some(UploadStatus::Uploaded),
                        error: Some(None),
                        ..Default::default()
                    },
                );
            }
            Err(e) => {
                let mut message = e.to_string();
                if message.is_empty() {
                    message = "Upload failed".to_string();
                }
                log::error!("Photo {}: {}", id, message);
                queue.update_photo(
                    id,
                    QueueEntryPatch {
                        status: Some(UploadStatus::Failed),
                        error: Some(Some(message)),
                        retry_count: Some(entry.retry_count + 1),
                        ..Default::default()
                    },
                );
            }
        }

        queue.set_currently_uploading(None);
    }

    /// Uploads every entry that was pending when the call was made
    ///
    /// The snapshot is processed strictly in list order, one entry at a
    /// time, with progress published after each entry completes. Entries
    /// queued while the batch runs wait for the next call.
    pub async fn upload_all<S: KeyValueStore>(&self, queue: &mut UploadQueue<S>) {
        let snapshot: Vec<String> = queue
            .entries()
            .iter()
            .filter(|e| e.status == UploadStatus::Pending)
            .map(|e| e.id.clone())
            .collect();

        if snapshot.is_empty() {
            log::debug!("upload_all: nothing pending");
            return;
        }

        let total = snapshot.len();
        log::info!("Uploading {} queued photos", total);
        queue.set_uploading_all(true);

        for (index, id) in snapshot.iter().enumerate() {
            self.upload_photo(queue, id).await;
            queue.set_progress(batch_progress(index + 1, total));
        }

        queue.set_uploading_all(false);
        queue.set_progress(0);
    }

    /// Resets a failed entry to pending and uploads it again immediately
    ///
    /// No-op when the entry is unknown or has exhausted its retries.
    pub async fn retry_upload<S: KeyValueStore>(&self, queue: &mut UploadQueue<S>, id: &str) {
        let entry = match queue.entry(id) {
            Some(entry) => entry.clone(),
            None => {
                log::warn!("retry_upload: no entry with id {}", id);
                return;
            }
        };

        if entry.retry_count >= MAX_RETRIES {
            log::debug!(
                "Photo {} has failed {} times, not retrying",
                id,
                entry.retry_count
            );
            return;
        }

        queue.update_photo(
            id,
            QueueEntryPatch {
                status: Some(UploadStatus::Pending),
                error: Some(None),
                ..Default::default()
            },
        );
        self.upload_photo(queue, id).await;
    }

    /// Runs the remote transfer for one entry
    ///
    /// Creates the anchoring update record first, then posts the image
    /// bytes against it. When a later step fails the update record is left
    /// behind on the server; the orphan id is logged so it can be found.
    async fn transfer(&self, entry: &QueueEntry) -> Result<(), UploadQueueError> {
        let request = CreateUpdateRequest::for_entry(entry);
        let update_id = self.api.create_update(&entry.project_id, &request).await?;
        log::debug!("Created update record {} for photo {}", update_id, entry.id);

        let (bytes, size) = match read_photo_file(&entry.source_uri) {
            Ok(file) => file,
            Err(e) => {
                log::warn!(
                    "Photo {}: file read failed, update record {} is orphaned",
                    entry.id,
                    update_id
                );
                return Err(e);
            }
        };
        log::debug!("Read {} ({} bytes)", entry.source_uri, size);

        if let Err(e) = self
            .api
            .upload_survey_photo(&entry.project_id, &update_id, entry, bytes)
            .await
        {
            log::warn!(
                "Photo {}: upload failed, update record {} is orphaned",
                entry.id,
                update_id
            );
            return Err(e);
        }

        Ok(())
    }
}

/// Progress after `done` of `total` batch entries, as a 0 to 100 value
fn batch_progress(done: usize, total: usize) -> u8 {
    ((done as f64 / total as f64) * 100.0).round() as u8
}
