//! pagepress - a multi-page HTML/CSS editor with PDF export.
//!
//! This is the main entry point for the editor web server.
//! The application is organized into the following modules:
//!
//! - `editor`: Editor controller, style store and editor bindings
//! - `registry`: Ordered pages and their visual elements
//! - `persistence`: JSON save/load, local store, autosave loop
//! - `export`: Flattening pages into one document and requesting a PDF
//! - `render`: Headless Chrome PDF rendering behind `/generate-pdf`
//! - `handlers`: HTTP route handlers
//! - `templates`: The editor page

use std::sync::Arc;

use pagepress::config::Config;
use pagepress::persistence::spawn_autosave;
use pagepress::{app, AppState};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> pagepress::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let state = Arc::new(AppState::new(config.clone())?);

    spawn_autosave(
        state.editor.clone(),
        state.store.clone(),
        config.autosave_period,
    );

    let listener = tokio::net::TcpListener::bind(config.addr).await?;

    log::info!("Editor running at http://{}", config.addr);
    log::info!("Local store: {}", config.db_path.display());
    log::info!("Render endpoint: {}", config.render_url);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
