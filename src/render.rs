//! Render collaborator: turns a full HTML document into a PDF with headless
//! Chrome.
//!
//! Every render goes through the same output file on disk, which is then read
//! back and returned. A lock keeps renders single-flight so two requests never
//! race on that file.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use tokio::sync::Mutex;
use url::Url;

use crate::error::{EditorError, Result};

/// A4 in inches.
const A4_WIDTH_IN: f64 = 8.27;
const A4_HEIGHT_IN: f64 = 11.69;

/// Anything that can write a PDF for an HTML document to a path.
pub trait PdfRenderer: Send + Sync {
    fn render(&self, html: &str, output: &Path) -> Result<()>;
}

// ============================================================================
// Chrome Renderer
// ============================================================================

/// Launches a fresh headless Chrome per document.
pub struct ChromeRenderer {
    timeout: Duration,
}

impl ChromeRenderer {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for ChromeRenderer {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl PdfRenderer for ChromeRenderer {
    fn render(&self, html: &str, output: &Path) -> Result<()> {
        // Chrome loads the document from a file next to the output.
        let source = absolute(&output.with_extension("html"))?;
        std::fs::write(&source, html)?;
        let source_url = Url::from_file_path(&source).map_err(|_| {
            EditorError::RenderFailed(format!("Bad source path: {}", source.display()))
        })?;

        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .idle_browser_timeout(self.timeout)
            .build()
            .map_err(|e| EditorError::RenderFailed(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| EditorError::RenderFailed(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| EditorError::RenderFailed(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(self.timeout);

        tab.navigate_to(source_url.as_str())
            .map_err(|e| EditorError::RenderFailed(format!("Navigation failed: {}", e)))?
            .wait_until_navigated()
            .map_err(|e| EditorError::RenderFailed(format!("Wait for navigation failed: {}", e)))?;

        let pdf = tab
            .print_to_pdf(Some(PrintToPdfOptions {
                paper_width: Some(A4_WIDTH_IN),
                paper_height: Some(A4_HEIGHT_IN),
                print_background: Some(true),
                ..Default::default()
            }))
            .map_err(|e| EditorError::RenderFailed(format!("Failed to print PDF: {}", e)))?;

        std::fs::write(output, pdf)?;
        std::fs::remove_file(&source).ok();
        Ok(())
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

// ============================================================================
// Render Service
// ============================================================================

/// Serializes renders through the fixed output path.
pub struct RenderService {
    renderer: Arc<dyn PdfRenderer>,
    output: PathBuf,
    lock: Mutex<()>,
}

impl RenderService {
    pub fn new(renderer: Arc<dyn PdfRenderer>, output: PathBuf) -> Self {
        Self {
            renderer,
            output,
            lock: Mutex::new(()),
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Render `html` and return the PDF bytes read back from the output path.
    pub async fn generate(&self, html: String) -> Result<Vec<u8>> {
        let _guard = self.lock.lock().await;

        let renderer = self.renderer.clone();
        let output = self.output.clone();
        tokio::task::spawn_blocking(move || renderer.render(&html, &output))
            .await
            .map_err(|e| EditorError::RenderFailed(format!("Render task failed: {}", e)))??;

        Ok(tokio::fs::read(&self.output).await?)
    }
}
