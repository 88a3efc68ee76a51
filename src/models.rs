//! Data models for the page editor.
//!
//! This module contains the serialized shapes shared between the editor
//! controller, the persistence layer and the JSON API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Identifiers
// ============================================================================

/// Stable page identifier. Drawn from a counter that never goes backwards,
/// so it stays unique after deletions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub u64);

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Persisted Document
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedPage {
    pub id: PageId,
    pub content: String,
}

/// Full editable state: `{ "pages": [{"id", "content"}], "style": "..." }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedDocument {
    pub pages: Vec<PersistedPage>,
    pub style: String,
}

// ============================================================================
// Editor Layout
// ============================================================================

/// Editor panel dimensions, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

// ============================================================================
// API Views
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub id: PageId,
    pub content: String,
    /// Rendered visual element, including the delete control
    pub element: String,
}

/// Everything the front-end needs to redraw itself.
#[derive(Debug, Clone, Serialize)]
pub struct StateView {
    pub pages: Vec<PageView>,
    pub style: String,
    pub selected: Option<PageId>,
    /// Text of the buffer the HTML editor is attached to, if any
    pub html_buffer: Option<String>,
    pub css_buffer: String,
    pub last_saved: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// A client-side download: bytes plus the filename the browser should use.
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub filename: &'static str,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}
