//! Remote project API contracts
//!
//! Uploading a photo is a two-step exchange: create an update record on
//! the project timeline, then post the image as multipart form data
//! against that record. The [`ProjectApi`] trait is the seam between the
//! upload driver and the HTTP client, so driver behavior is testable
//! without a server.

use crate::error::UploadQueueError;
use crate::models::QueueEntry;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Connection settings for the project API
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub auth_token: String,
}

/// Body of the project-scoped "create update" call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUpdateRequest {
    #[serde(rename = "type")]
    pub update_type: String,
    pub category: String,
    pub priority: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    pub metadata: serde_json::Value,
}

impl CreateUpdateRequest {
    /// Builds the update record that anchors a queued photo
    ///
    /// Classification is fixed for photos from the field: type "photo",
    /// category "progress", priority "medium". Title and description are
    /// generated from the entry's room/project and caption.
    pub fn for_entry(entry: &QueueEntry) -> Self {
        let place = entry
            .room_name
            .as_deref()
            .unwrap_or(entry.project_name.as_str());
        let description = entry
            .caption
            .clone()
            .unwrap_or_else(|| format!("Photo taken {}", entry.taken_at));

        Self {
            update_type: "photo".to_string(),
            category: "progress".to_string(),
            priority: "medium".to_string(),
            title: format!("Site photo: {}", place),
            description,
            room_id: entry.room_id.clone(),
            metadata: serde_json::json!({
                "source": "mobile-capture",
                "takenAt": entry.taken_at,
                "queueEntryId": entry.id,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateUpdateResponse {
    id: String,
}

/// Remote operations the upload driver depends on
#[allow(async_fn_in_trait)]
pub trait ProjectApi {
    /// Creates an update record on the project timeline, returns its id
    async fn create_update(
        &self,
        project_id: &str,
        request: &CreateUpdateRequest,
    ) -> Result<String, UploadQueueError>;

    /// Posts the photo bytes plus metadata against an update record
    async fn upload_survey_photo(
        &self,
        project_id: &str,
        update_id: &str,
        entry: &QueueEntry,
        bytes: Vec<u8>,
    ) -> Result<(), UploadQueueError>;
}

/// reqwest-backed implementation of [`ProjectApi`]
pub struct HttpProjectApi {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpProjectApi {
    pub fn new(config: ApiConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Uses a caller-provided client, e.g. one configured with timeouts
    pub fn with_client(client: reqwest::Client, config: ApiConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

impl ProjectApi for HttpProjectApi {
    async fn create_update(
        &self,
        project_id: &str,
        request: &CreateUpdateRequest,
    ) -> Result<String, UploadQueueError> {
        let url = self.endpoint(&format!("/api/projects/{}/updates", project_id));

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.auth_token)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(UploadQueueError::Api(format!(
                "Create update returned {}: {}",
                status, body
            )));
        }

        let created: CreateUpdateResponse = response.json().await?;
        Ok(created.id)
    }

    async fn upload_survey_photo(
        &self,
        project_id: &str,
        update_id: &str,
        entry: &QueueEntry,
        bytes: Vec<u8>,
    ) -> Result<(), UploadQueueError> {
        let url = self.endpoint(&format!(
            "/api/projects/{}/updates/{}/photos",
            project_id, update_id
        ));

        let file_part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name_for(&entry.source_uri))
            .mime_str("image/jpeg")?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("projectId", project_id.to_string())
            .text("updateId", update_id.to_string())
            .text("takenAt", entry.taken_at.clone());

        if let Some(caption) = &entry.caption {
            form = form.text("caption", caption.clone());
        }
        if let Some(notes) = &entry.notes {
            form = form.text("notes", notes.clone());
        }
        if let Some(room_id) = &entry.room_id {
            form = form.text("roomId", room_id.clone());
        }
        if let Some(tags) = &entry.tags {
            form = form.text("tags", serde_json::to_string(tags)?);
        }
        if let Some(gps) = &entry.gps_coordinates {
            form = form.text("gpsCoordinates", serde_json::to_string(gps)?);
        }
        if let Some(trade_category) = &entry.trade_category {
            form = form.text("tradeCategory", trade_category.clone());
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.auth_token)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(UploadQueueError::Api(format!(
                "Photo upload returned {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}

/// Reads a queued photo from local storage, returning its bytes and size
pub fn read_photo_file(path: &str) -> Result<(Vec<u8>, u64), UploadQueueError> {
    let file_path = Path::new(path);
    if !file_path.exists() {
        return Err(UploadQueueError::NotFound(format!(
            "Photo file not found locally: {}",
            path
        )));
    }

    let size = std::fs::metadata(file_path)?.len();
    let bytes = std::fs::read(file_path)?;
    Ok((bytes, size))
}

/// File name for the multipart part, derived from the source uri
fn file_name_for(source_uri: &str) -> String {
    source_uri
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("photo.jpg")
        .to_string()
}
