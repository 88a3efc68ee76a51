//! Error types for the page editor.

use axum::http::StatusCode;
use thiserror::Error;

use crate::models::PageId;

/// Result type alias for editor operations
pub type Result<T> = std::result::Result<T, EditorError>;

/// Errors that can occur while editing, persisting or exporting pages
#[derive(Error, Debug)]
pub enum EditorError {
    /// The HTML editor has no page attached
    #[error("No page is selected; select a page before editing its HTML")]
    NoActivePage,

    /// No page with this id exists in the registry
    #[error("Page {0} not found")]
    PageNotFound(PageId),

    /// A persisted document could not be parsed or failed validation
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// The render collaborator was unreachable or answered with an error
    #[error("Rendering failed: {0}")]
    RenderFailed(String),

    /// The local key-value store failed
    #[error("Store error: {0}")]
    Store(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EditorError {
    /// HTTP status used when this error crosses the JSON API.
    pub fn status_code(&self) -> StatusCode {
        match self {
            EditorError::NoActivePage => StatusCode::CONFLICT,
            EditorError::PageNotFound(_) => StatusCode::NOT_FOUND,
            EditorError::MalformedDocument(_) => StatusCode::BAD_REQUEST,
            EditorError::RenderFailed(_) => StatusCode::BAD_GATEWAY,
            EditorError::Store(_) | EditorError::Config(_) | EditorError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<sled::Error> for EditorError {
    fn from(err: sled::Error) -> Self {
        EditorError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for EditorError {
    fn from(err: serde_json::Error) -> Self {
        EditorError::MalformedDocument(err.to_string())
    }
}
