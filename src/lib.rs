//! pagepress library - page editor state, persistence, export and the HTTP app.
//!
//! This module provides public access to all the application's modules
//! for testing purposes and potential library use.

use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod handlers;
pub mod markup;
pub mod models;
pub mod persistence;
pub mod registry;
pub mod render;
pub mod templates;

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use config::Config;
use editor::Editor;
use export::RenderClient;
use persistence::{load_from_store, KeyValueStore, SledStore};
use render::{ChromeRenderer, PdfRenderer, RenderService};

// ============================================================================
// Application State
// ============================================================================

pub struct AppState {
    pub config: Config,
    pub editor: Arc<RwLock<Editor>>,
    pub store: Arc<dyn KeyValueStore>,
    pub render_client: RenderClient,
    pub render_service: RenderService,
}

impl AppState {
    /// Open the sled store, replay the last snapshot and set up headless
    /// Chrome rendering.
    pub fn new(config: Config) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(SledStore::open(&config.db_path)?);
        let renderer: Arc<dyn PdfRenderer> = Arc::new(ChromeRenderer::default());
        Ok(Self::with_parts(config, store, renderer))
    }

    pub fn with_parts(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        renderer: Arc<dyn PdfRenderer>,
    ) -> Self {
        let editor = autoload(store.as_ref());
        Self {
            render_client: RenderClient::new(config.render_url.clone()),
            render_service: RenderService::new(renderer, config.render_output.clone()),
            editor: Arc::new(RwLock::new(editor)),
            store,
            config,
        }
    }
}

/// Startup state: one empty page, replaced by the stored snapshot if there is
/// a usable one.
pub fn autoload(store: &dyn KeyValueStore) -> Editor {
    let mut editor = Editor::with_initial_page();
    match load_from_store(&mut editor, store) {
        Ok(true) => log::info!("Restored {} page(s) from local store", editor.registry().len()),
        Ok(false) => log::info!("No saved state; starting with an empty page"),
        Err(e) => log::warn!("Ignoring saved state: {}", e),
    }
    editor
}

// ============================================================================
// Router
// ============================================================================

pub fn app(state: Arc<AppState>) -> Router {
    let cors = match HeaderValue::from_str(&state.config.cors_origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers(Any),
        Err(e) => {
            log::warn!("Invalid CORS origin {:?}: {}", state.config.cors_origin, e);
            CorsLayer::new()
        }
    };

    Router::new()
        // Editor page
        .route("/", get(handlers::index))
        .route("/api/state", get(handlers::get_state))
        // Pages
        .route("/api/pages", post(handlers::add_page))
        .route("/api/pages/{id}", delete(handlers::delete_page))
        .route("/api/pages/{id}/select", post(handlers::select_page))
        // Editor bindings
        .route("/api/editor/html", put(handlers::edit_html))
        .route("/api/editor/paste", post(handlers::paste_html))
        .route("/api/editor/css", put(handlers::edit_css))
        .route("/api/editor/layout", post(handlers::layout))
        // Persistence
        .route("/api/data.json", get(handlers::save_data))
        .route("/api/data", post(handlers::load_data))
        // Export
        .route("/api/export", post(handlers::export))
        // Render collaborator
        .route("/generate-pdf", post(handlers::generate_pdf))
        .route("/test", get(handlers::test))
        .layer(cors)
        .with_state(state)
}

// Re-export commonly used types
pub use error::{EditorError, Result};
pub use export::{build_export_document, export_document, ExportOutcome};
pub use models::{Download, PageId, PersistedDocument, PersistedPage, StateView, Viewport};
pub use persistence::{
    export_to_file, import_from_file, parse_document, save_to_store, serialize_document,
    spawn_autosave, MemoryStore, STORAGE_KEY,
};
