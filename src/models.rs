use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Upload state of a queued photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Uploaded,
    Failed,
}

/// GPS position recorded at capture time, forwarded verbatim to the server
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One captured photo pending or undergoing upload
///
/// Field names serialize in the camelCase form the persisted blob and the
/// project API both use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub id: String,
    pub source_uri: String,
    pub project_id: String,
    pub project_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gps_coordinates: Option<GpsCoordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_category: Option<String>,
    /// Capture timestamp, ISO 8601
    pub taken_at: String,
    pub status: UploadStatus,
    /// Last failure message, present only while the entry is failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_attempt_at: Option<String>,
}

impl QueueEntry {
    /// Creates a fresh entry from a capture draft
    ///
    /// The id is a ULID: millisecond timestamp plus random suffix, so ids
    /// are unique within the queue and sort in capture order.
    pub fn new(draft: PhotoDraft) -> Self {
        Self {
            id: Ulid::new().to_string(),
            source_uri: draft.source_uri,
            project_id: draft.project_id,
            project_name: draft.project_name,
            room_id: draft.room_id,
            room_name: draft.room_name,
            caption: draft.caption,
            notes: draft.notes,
            tags: draft.tags,
            gps_coordinates: draft.gps_coordinates,
            trade_category: draft.trade_category,
            taken_at: draft.taken_at,
            status: UploadStatus::Pending,
            error: None,
            retry_count: 0,
            last_attempt_at: None,
        }
    }
}

/// Everything the capture flow provides when queueing a photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDraft {
    pub source_uri: String,
    pub project_id: String,
    pub project_name: String,
    pub room_id: Option<String>,
    pub room_name: Option<String>,
    pub caption: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
    pub gps_coordinates: Option<GpsCoordinates>,
    pub trade_category: Option<String>,
    pub taken_at: String,
}

/// Partial update applied to a queued entry
///
/// `None` leaves a field unchanged. The `error` field is doubly optional
/// so a patch can also clear a previously recorded failure message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueEntryPatch {
    pub status: Option<UploadStatus>,
    pub error: Option<Option<String>>,
    pub retry_count: Option<u32>,
    pub last_attempt_at: Option<String>,
    pub caption: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
    pub gps_coordinates: Option<GpsCoordinates>,
    pub trade_category: Option<String>,
    pub room_id: Option<String>,
    pub room_name: Option<String>,
}
