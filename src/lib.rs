//! # Photo Upload Queue
//!
//! A persistent upload queue for project site photos.
//!
//! Captured photos are queued locally with their project/room association
//! and descriptive metadata, survive app restarts via a SQLite-backed
//! key-value store, and are drained strictly one at a time against the
//! project API. A failed transfer marks only its own entry and can be
//! retried up to a fixed cap.
//!
//! ## Platform Separation
//!
//! This crate focuses on cross-platform queue logic. Platform-specific
//! code (camera capture, pickers, UI) should remain in the application
//! crate.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use photo_upload_queue::{
//!     ApiConfig, HttpProjectApi, QueueStore, SqliteKeyValueStore, UploadDriver, UploadQueue,
//! };
//!
//! let store = QueueStore::new(SqliteKeyValueStore::open("./data/queue.db")?);
//! let mut queue = UploadQueue::new(store);
//! queue.load_from_storage();
//!
//! let driver = UploadDriver::new(HttpProjectApi::new(ApiConfig {
//!     base_url: "https://api.example.com".to_string(),
//!     auth_token: token,
//! }));
//! driver.upload_all(&mut queue).await;
//! ```

pub mod api;
pub mod driver;
pub mod error;
pub mod models;
pub mod queue;
pub mod schema;
pub mod store;

pub use api::{read_photo_file, ApiConfig, CreateUpdateRequest, HttpProjectApi, ProjectApi};
pub use driver::{UploadDriver, MAX_RETRIES};
pub use error::UploadQueueError;
pub use models::{GpsCoordinates, PhotoDraft, QueueEntry, QueueEntryPatch, UploadStatus};
pub use queue::UploadQueue;
pub use schema::init_queue_schema;
pub use store::{KeyValueStore, QueueStore, SqliteKeyValueStore, QUEUE_STORAGE_KEY};
