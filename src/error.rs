use std::fmt;

/// Error type for upload queue operations
#[derive(Debug)]
pub enum UploadQueueError {
    /// Persistence error (rusqlite)
    Storage(rusqlite::Error),
    /// Queue blob or payload (de)serialization error
    Serialization(serde_json::Error),
    /// Local file access error
    Io(std::io::Error),
    /// HTTP transport error
    Http(reqwest::Error),
    /// Remote endpoint returned a non-success response
    Api(String),
    /// Resource not found (entry or local file)
    NotFound(String),
    /// General error
    Other(String),
}

impl fmt::Display for UploadQueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadQueueError::Storage(e) => write!(f, "Storage error: {}", e),
            UploadQueueError::Serialization(e) => write!(f, "Serialization error: {}", e),
            UploadQueueError::Io(e) => write!(f, "IO error: {}", e),
            UploadQueueError::Http(e) => write!(f, "HTTP error: {}", e),
            UploadQueueError::Api(msg) => write!(f, "API error: {}", msg),
            UploadQueueError::NotFound(msg) => write!(f, "Not found: {}", msg),
            UploadQueueError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for UploadQueueError {}

impl From<rusqlite::Error> for UploadQueueError {
    fn from(e: rusqlite::Error) -> Self {
        UploadQueueError::Storage(e)
    }
}

impl From<serde_json::Error> for UploadQueueError {
    fn from(e: serde_json::Error) -> Self {
        UploadQueueError::Serialization(e)
    }
}

impl From<std::io::Error> for UploadQueueError {
    fn from(e: std::io::Error) -> Self {
        UploadQueueError::Io(e)
    }
}

impl From<reqwest::Error> for UploadQueueError {
    fn from(e: reqwest::Error) -> Self {
        UploadQueueError::Http(e)
    }
}
