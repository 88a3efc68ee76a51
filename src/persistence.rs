//! Persistence: save and load the editor state as a JSON document.
//!
//! Two targets share one format (`PersistedDocument`):
//! - a downloadable `data.json` file, loaded back through an upload
//! - the local key-value store (sled), written by the autosave loop and
//!   replayed once at startup
//!
//! Both load paths go through [`Editor::reconstruct_from`].

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::editor::Editor;
use crate::error::{EditorError, Result};
use crate::models::{Download, PersistedDocument, PersistedPage};
use crate::registry::MAX_PAGE_ID;

/// Key the autosave snapshot is stored under.
pub const STORAGE_KEY: &str = "data";

/// Filename offered for the JSON download.
pub const DATA_FILENAME: &str = "data.json";

const STORE_TREE: &str = "local";

// ============================================================================
// Snapshot / Reconstruct
// ============================================================================

impl Editor {
    pub fn snapshot(&self) -> PersistedDocument {
        PersistedDocument {
            pages: self
                .registry
                .iter()
                .map(|page| PersistedPage {
                    id: page.id(),
                    content: page.content(),
                })
                .collect(),
            style: self.style.text().to_string(),
        }
    }

    /// Replace every page and the style with the document's contents.
    ///
    /// Serialized ids are kept as they are. The document is validated before
    /// anything is touched, so a rejected document leaves the editor as it was.
    pub fn reconstruct_from(&mut self, document: &PersistedDocument) -> Result<()> {
        validate_document(document)?;

        self.registry.clear();
        self.html.detach();
        for page in &document.pages {
            self.registry.restore(page.id, &page.content)?;
        }
        self.edit_css(&document.style);
        Ok(())
    }
}

fn validate_document(document: &PersistedDocument) -> Result<()> {
    let mut seen = HashSet::new();
    for page in &document.pages {
        if page.id.0 > MAX_PAGE_ID {
            return Err(EditorError::MalformedDocument(format!(
                "page id {} out of range",
                page.id
            )));
        }
        if !seen.insert(page.id) {
            return Err(EditorError::MalformedDocument(format!(
                "duplicate page id {}",
                page.id
            )));
        }
    }
    Ok(())
}

pub fn parse_document(text: &str) -> Result<PersistedDocument> {
    let document: PersistedDocument = serde_json::from_str(text)?;
    validate_document(&document)?;
    Ok(document)
}

pub fn serialize_document(document: &PersistedDocument) -> Result<String> {
    serde_json::to_string(document).map_err(|e| EditorError::Store(e.to_string()))
}

// ============================================================================
// File Download / Upload
// ============================================================================

/// Current state as a `data.json` download.
pub fn export_to_file(editor: &Editor) -> Result<Download> {
    let json = serialize_document(&editor.snapshot())?;
    Ok(Download {
        filename: DATA_FILENAME,
        content_type: "application/json",
        bytes: json.into_bytes(),
    })
}

/// Load an uploaded JSON file, replacing the current state.
pub fn import_from_file(editor: &mut Editor, bytes: &[u8]) -> Result<()> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| EditorError::MalformedDocument(format!("not UTF-8: {}", e)))?;
    let document = parse_document(text)?;
    editor.reconstruct_from(&document)?;
    log::info!("Imported {} page(s) from file", document.pages.len());
    Ok(())
}

// ============================================================================
// Key-Value Store
// ============================================================================

/// Local key-value store holding the autosave snapshot.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
}

/// Store backed by a sled tree.
pub struct SledStore {
    tree: sled::Tree,
}

impl SledStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path)?;
        Self::from_db(&db)
    }

    pub fn from_db(db: &sled::Db) -> Result<Self> {
        Ok(Self {
            tree: db.open_tree(STORE_TREE)?,
        })
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.tree.get(key.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|e| EditorError::Store(e.to_string())),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.tree.insert(key.as_bytes(), value.as_bytes())?;
        self.tree.flush()?;
        Ok(())
    }
}

/// In-process store, for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| EditorError::Store("memory store poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| EditorError::Store("memory store poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Write the current state under [`STORAGE_KEY`], overwriting any previous
/// snapshot.
pub fn save_to_store(editor: &Editor, store: &dyn KeyValueStore) -> Result<()> {
    let json = serialize_document(&editor.snapshot())?;
    store.put(STORAGE_KEY, &json)
}

/// Replay the stored snapshot, if any. Returns whether one was found.
pub fn load_from_store(editor: &mut Editor, store: &dyn KeyValueStore) -> Result<bool> {
    let Some(json) = store.get(STORAGE_KEY)? else {
        return Ok(false);
    };
    let document = parse_document(&json)?;
    editor.reconstruct_from(&document)?;
    Ok(true)
}

// ============================================================================
// Autosave Loop
// ============================================================================

/// Snapshot the editor into the store every `period`, whether or not anything
/// changed. Store failures are logged and the loop keeps going.
pub fn spawn_autosave(
    editor: Arc<RwLock<Editor>>,
    store: Arc<dyn KeyValueStore>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            autosave_once(&editor, store.as_ref()).await;
        }
    })
}

/// One autosave pass, shared by the timer and by add-page.
pub async fn autosave_once(editor: &RwLock<Editor>, store: &dyn KeyValueStore) {
    let json = {
        let editor = editor.read().await;
        serialize_document(&editor.snapshot())
    };
    let result = json.and_then(|json| store.put(STORAGE_KEY, &json));
    match result {
        Ok(()) => {
            log::trace!("Autosaved editor state");
            editor.write().await.record_saved(Utc::now());
        }
        Err(e) => log::error!("Autosave failed: {}", e),
    }
}
