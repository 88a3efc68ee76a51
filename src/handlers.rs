//! HTTP route handlers.
//!
//! The editor routes forward one UI event each to the [`Editor`] and answer
//! with the redrawn state. `/generate-pdf` is the render collaborator.

use crate::editor::Editor;
use crate::error::{EditorError, Result};
use crate::export::{export_document, ExportOutcome};
use crate::models::{Download, PageId, StateView, Viewport};
use crate::persistence::{autosave_once, export_to_file, import_from_file};
use crate::templates::render_editor;
use crate::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        StatusCode,
    },
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

// ============================================================================
// Helpers
// ============================================================================

fn error_response(e: EditorError) -> Response {
    (e.status_code(), e.to_string()).into_response()
}

/// Answer an editor event: the new state on success, the error otherwise.
fn state_response(editor: &Editor, result: Result<()>) -> Response {
    match result {
        Ok(()) => Json(editor.view()).into_response(),
        Err(e) => error_response(e),
    }
}

fn download_response(download: Download) -> Response {
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, download.content_type.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download.filename),
            ),
        ],
        download.bytes,
    )
        .into_response()
}

#[derive(Deserialize)]
pub struct TextBody {
    pub text: String,
}

// ============================================================================
// Editor Page
// ============================================================================

pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let editor = state.editor.read().await;
    Html(render_editor(&editor))
}

pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateView> {
    Json(state.editor.read().await.view())
}

// ============================================================================
// Pages
// ============================================================================

/// POST /api/pages - append an empty page and snapshot right away.
pub async fn add_page(State(state): State<Arc<AppState>>) -> Response {
    state.editor.write().await.add_page();
    autosave_once(&state.editor, state.store.as_ref()).await;
    Json(state.editor.read().await.view()).into_response()
}

/// DELETE /api/pages/{id}
pub async fn delete_page(Path(id): Path<u64>, State(state): State<Arc<AppState>>) -> Response {
    let mut editor = state.editor.write().await;
    let result = editor.delete_page(PageId(id));
    state_response(&editor, result)
}

/// POST /api/pages/{id}/select - click on a page in the preview.
pub async fn select_page(Path(id): Path<u64>, State(state): State<Arc<AppState>>) -> Response {
    let mut editor = state.editor.write().await;
    let result = editor.select_page(PageId(id));
    state_response(&editor, result)
}

// ============================================================================
// Editor Bindings
// ============================================================================

/// PUT /api/editor/html - the HTML buffer changed.
pub async fn edit_html(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TextBody>,
) -> Response {
    let mut editor = state.editor.write().await;
    let result = editor.edit_html(&body.text);
    state_response(&editor, result)
}

/// POST /api/editor/paste - pasted text is appended to the HTML buffer.
pub async fn paste_html(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TextBody>,
) -> Response {
    let mut editor = state.editor.write().await;
    let result = editor.paste_html(&body.text);
    state_response(&editor, result)
}

/// PUT /api/editor/css - the CSS buffer changed.
pub async fn edit_css(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TextBody>,
) -> Response {
    let mut editor = state.editor.write().await;
    editor.edit_css(&body.text);
    Json(editor.view()).into_response()
}

/// POST /api/editor/layout - the editor panel finished a transition.
pub async fn layout(
    State(state): State<Arc<AppState>>,
    Json(viewport): Json<Viewport>,
) -> Response {
    let mut editor = state.editor.write().await;
    editor.layout(viewport);
    Json(editor.view()).into_response()
}

// ============================================================================
// Save / Load
// ============================================================================

/// GET /api/data.json - download the current state.
pub async fn save_data(State(state): State<Arc<AppState>>) -> Response {
    let editor = state.editor.read().await;
    match export_to_file(&editor) {
        Ok(download) => download_response(download),
        Err(e) => error_response(e),
    }
}

/// POST /api/data - upload a `data.json`, replacing every page and the style.
pub async fn load_data(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let mut file_data = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            match field.bytes().await {
                Ok(bytes) => file_data = Some(bytes.to_vec()),
                Err(e) => {
                    return (StatusCode::BAD_REQUEST, format!("Failed to read file: {}", e))
                        .into_response()
                }
            }
            break;
        }
    }

    // An empty file still goes through the parser and is rejected there.
    let Some(file_data) = file_data else {
        return (StatusCode::BAD_REQUEST, "No file uploaded").into_response();
    };

    let mut editor = state.editor.write().await;
    match import_from_file(&mut editor, &file_data) {
        Ok(()) => {
            editor.clear_error();
            Json(editor.view()).into_response()
        }
        Err(e) => {
            log::warn!("Rejected uploaded document: {}", e);
            editor.record_error(e.to_string());
            error_response(e)
        }
    }
}

// ============================================================================
// Export
// ============================================================================

/// POST /api/export - render every page and download `file.pdf`.
pub async fn export(State(state): State<Arc<AppState>>) -> Response {
    match export_document(&state.editor, &state.render_client).await {
        Ok(ExportOutcome::Downloaded(download)) => download_response(download),
        Ok(ExportOutcome::Skipped) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

// ============================================================================
// Render Collaborator
// ============================================================================

/// POST /generate-pdf - plain-text HTML in, PDF out.
pub async fn generate_pdf(State(state): State<Arc<AppState>>, body: String) -> Response {
    log::debug!("Render request: {} bytes", body.len());
    match state.render_service.generate(body).await {
        Ok(pdf) => {
            log::info!("PDF generated successfully");
            (StatusCode::OK, [(CONTENT_TYPE, "application/pdf")], pdf).into_response()
        }
        Err(e) => {
            log::error!("Error generating PDF: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error generating PDF").into_response()
        }
    }
}

/// GET /test - liveness probe.
pub async fn test() -> &'static str {
    "Hello World"
}
