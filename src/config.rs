//! Server configuration.
//!
//! Defaults are constants; each one can be overridden by an environment
//! variable read once at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{EditorError, Result};

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_DB_PATH: &str = ".pagepress_db";
pub const DEFAULT_RENDER_URL: &str = "http://localhost:3000/generate-pdf";
pub const DEFAULT_RENDER_OUTPUT: &str = "yourDoc.pdf";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_AUTOSAVE_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub addr: SocketAddr,
    /// sled database holding the autosave snapshot
    pub db_path: PathBuf,
    /// Where the export pipeline posts documents
    pub render_url: Url,
    /// Fixed path every render is written to before being sent back
    pub render_output: PathBuf,
    /// Front-end origin allowed by CORS
    pub cors_origin: String,
    pub autosave_period: Duration,
}

impl Config {
    /// Read `PAGEPRESS_*` environment variables over the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (useful for testing).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let addr = get("PAGEPRESS_ADDR", DEFAULT_ADDR);
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| EditorError::Config(format!("PAGEPRESS_ADDR {:?}: {}", addr, e)))?;

        let render_url = get("PAGEPRESS_RENDER_URL", DEFAULT_RENDER_URL);
        let render_url = Url::parse(&render_url).map_err(|e| {
            EditorError::Config(format!("PAGEPRESS_RENDER_URL {:?}: {}", render_url, e))
        })?;
        if !matches!(render_url.scheme(), "http" | "https") {
            return Err(EditorError::Config(format!(
                "PAGEPRESS_RENDER_URL must be http(s), got {}",
                render_url.scheme()
            )));
        }

        let autosave_ms = match lookup("PAGEPRESS_AUTOSAVE_MS") {
            Some(ms) => ms
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| EditorError::Config(format!("PAGEPRESS_AUTOSAVE_MS {:?}", ms)))?,
            None => DEFAULT_AUTOSAVE_MS,
        };

        Ok(Self {
            addr,
            db_path: PathBuf::from(get("PAGEPRESS_DB", DEFAULT_DB_PATH)),
            render_url,
            render_output: PathBuf::from(get("PAGEPRESS_RENDER_OUTPUT", DEFAULT_RENDER_OUTPUT)),
            cors_origin: get("PAGEPRESS_CORS_ORIGIN", DEFAULT_CORS_ORIGIN),
            autosave_period: Duration::from_millis(autosave_ms),
        })
    }
}
