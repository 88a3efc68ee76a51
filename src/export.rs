//! Export pipeline: flatten every page plus the style into one HTML document
//! and hand it to the render collaborator.

use reqwest::header::CONTENT_TYPE;
use tokio::sync::RwLock;
use url::Url;

use crate::editor::Editor;
use crate::error::{EditorError, Result};
use crate::models::Download;

/// Filename offered for the rendered PDF.
pub const PDF_FILENAME: &str = "file.pdf";

#[derive(Debug, PartialEq)]
pub enum ExportOutcome {
    /// The registry was empty; nothing was sent to the renderer.
    Skipped,
    Downloaded(Download),
}

/// One `<div>` holding a `<style>` with the shared CSS followed by a copy of
/// every page element, in registry order, without editor controls.
pub fn build_export_document(editor: &Editor) -> String {
    editor.export_tree().outer_html()
}

// ============================================================================
// Render Client
// ============================================================================

/// HTTP client for `POST /generate-pdf`.
#[derive(Clone)]
pub struct RenderClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl RenderClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Submit an HTML document and return the PDF bytes.
    pub async fn render(&self, html: String) -> Result<Vec<u8>> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "text/plain")
            .body(html)
            .send()
            .await
            .map_err(|e| EditorError::RenderFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EditorError::RenderFailed(format!("{}: {}", status, message)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| EditorError::RenderFailed(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

// ============================================================================
// Export
// ============================================================================

/// Render the current pages to `file.pdf`.
///
/// The markup is captured under a read lock that is released before the
/// network call. Failures are logged and recorded on the editor status; there
/// is no retry.
pub async fn export_document(editor: &RwLock<Editor>, client: &RenderClient) -> Result<ExportOutcome> {
    let html = {
        let editor = editor.read().await;
        if editor.registry().is_empty() {
            log::info!("Export requested with no pages; skipping");
            return Ok(ExportOutcome::Skipped);
        }
        build_export_document(&editor)
    };

    log::info!("Exporting {} bytes of HTML to {}", html.len(), client.endpoint());
    match client.render(html).await {
        Ok(bytes) => {
            editor.write().await.clear_error();
            Ok(ExportOutcome::Downloaded(Download {
                filename: PDF_FILENAME,
                content_type: "application/pdf",
                bytes,
            }))
        }
        Err(e) => {
            log::error!("Export failed: {}", e);
            editor.write().await.record_error(e.to_string());
            Err(e)
        }
    }
}
