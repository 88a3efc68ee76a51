//! End-to-end tests for the HTTP app.
//!
//! Each test serves the real router on an ephemeral port. The export pipeline
//! posts to that same server's `/generate-pdf`, where a recording renderer
//! stands in for headless Chrome.

use super::*;
use crate::persistence::{save_to_store, serialize_document, MemoryStore, STORAGE_KEY};
use crate::render::PdfRenderer;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Mutex;

const FAKE_PDF: &[u8] = b"%PDF-1.4 fake";

// ============================================================================
// Helpers
// ============================================================================

#[derive(Default)]
struct RecordingRenderer {
    bodies: Mutex<Vec<String>>,
}

impl PdfRenderer for RecordingRenderer {
    fn render(&self, html: &str, output: &Path) -> Result<()> {
        self.bodies.lock().unwrap().push(html.to_string());
        std::fs::write(output, FAKE_PDF)?;
        Ok(())
    }
}

struct FailingRenderer;

impl PdfRenderer for FailingRenderer {
    fn render(&self, _html: &str, _output: &Path) -> Result<()> {
        Err(EditorError::RenderFailed("browser crashed".to_string()))
    }
}

struct TestApp {
    state: Arc<AppState>,
    base: String,
    http: reqwest::Client,
    _dir: tempfile::TempDir,
}

impl TestApp {
    async fn spawn(store: Arc<dyn KeyValueStore>, renderer: Arc<dyn PdfRenderer>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let output = dir.path().join("render.pdf");

        let config = Config::from_lookup(|key| match key {
            "PAGEPRESS_ADDR" => Some(addr.to_string()),
            "PAGEPRESS_RENDER_URL" => Some(format!("http://{}/generate-pdf", addr)),
            "PAGEPRESS_RENDER_OUTPUT" => Some(output.display().to_string()),
            _ => None,
        })
        .unwrap();

        let state = Arc::new(AppState::with_parts(config, store, renderer));
        let router = app(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Self {
            state,
            base: format!("http://{}", addr),
            http: reqwest::Client::new(),
            _dir: dir,
        }
    }

    async fn call(&self, method: reqwest::Method, path: &str, body: Option<Value>) -> reqwest::Response {
        let mut request = self.http.request(method, format!("{}{}", self.base, path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        request.send().await.unwrap()
    }

    async fn state(&self) -> Value {
        self.call(reqwest::Method::GET, "/api/state", None)
            .await
            .json()
            .await
            .unwrap()
    }
}

fn page_ids(state: &Value) -> Vec<u64> {
    state["pages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_u64().unwrap())
        .collect()
}

// ============================================================================
// Export
// ============================================================================

#[tokio::test]
async fn test_export_end_to_end() {
    let renderer = Arc::new(RecordingRenderer::default());
    let app = TestApp::spawn(Arc::new(MemoryStore::new()), renderer.clone()).await;

    assert_eq!(page_ids(&app.state().await), vec![0]);

    let added: Value = app
        .call(reqwest::Method::POST, "/api/pages", None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(page_ids(&added), vec![0, 1]);

    let response = app.call(reqwest::Method::POST, "/api/pages/1/select", None).await;
    assert_eq!(response.status(), 200);
    let response = app
        .call(reqwest::Method::PUT, "/api/editor/html", Some(json!({ "text": "<h1>Hi</h1>" })))
        .await;
    assert_eq!(response.status(), 200);

    let response = app.call(reqwest::Method::POST, "/api/export", None).await;
    assert_eq!(response.status(), 200);
    let disposition = response.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.contains("file.pdf"));
    assert_eq!(response.bytes().await.unwrap().as_ref(), FAKE_PDF);

    let bodies = renderer.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    let body = &bodies[0];
    assert_eq!(body.matches("<h1>Hi</h1>").count(), 1);
    assert!(!body.contains("deleteButton"));
    assert!(!body.contains(">Delete</button>"));
    assert!(!body.contains(crate::markup::CONTROL_MARKER));
}

#[tokio::test]
async fn test_export_with_no_pages_returns_no_content() {
    let renderer = Arc::new(RecordingRenderer::default());
    let app = TestApp::spawn(Arc::new(MemoryStore::new()), renderer.clone()).await;

    let response = app.call(reqwest::Method::DELETE, "/api/pages/0", None).await;
    assert_eq!(response.status(), 200);

    let response = app.call(reqwest::Method::POST, "/api/export", None).await;
    assert_eq!(response.status(), 204);
    assert!(renderer.bodies.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_render_failure_is_visible() {
    let app = TestApp::spawn(Arc::new(MemoryStore::new()), Arc::new(FailingRenderer)).await;

    let response = app
        .call(reqwest::Method::POST, "/generate-pdf", None)
        .await;
    assert_eq!(response.status(), 500);
    assert_eq!(response.text().await.unwrap(), "Error generating PDF");

    let response = app.call(reqwest::Method::POST, "/api/export", None).await;
    assert_eq!(response.status(), 502);

    let state = app.state().await;
    assert!(state["last_error"].as_str().unwrap().contains("500"));
    // Nothing else changed
    assert_eq!(page_ids(&state), vec![0]);
}

// ============================================================================
// Editing
// ============================================================================

#[tokio::test]
async fn test_html_editing_requires_a_selection() {
    let app = TestApp::spawn(Arc::new(MemoryStore::new()), Arc::new(RecordingRenderer::default())).await;

    let response = app
        .call(reqwest::Method::PUT, "/api/editor/html", Some(json!({ "text": "<p>x</p>" })))
        .await;
    assert_eq!(response.status(), 409);

    let response = app.call(reqwest::Method::POST, "/api/pages/7/select", None).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_paste_and_css_round_through_the_api() {
    let app = TestApp::spawn(Arc::new(MemoryStore::new()), Arc::new(RecordingRenderer::default())).await;

    app.call(reqwest::Method::POST, "/api/pages/0/select", None).await;
    app.call(reqwest::Method::PUT, "/api/editor/html", Some(json!({ "text": "<p>a</p>" })))
        .await;
    let state: Value = app
        .call(reqwest::Method::POST, "/api/editor/paste", Some(json!({ "text": "<p>b</p>" })))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(state["html_buffer"], "<p>a</p><p>b</p>");
    assert_eq!(state["pages"][0]["content"], "<p>a</p><p>b</p>");

    let state: Value = app
        .call(reqwest::Method::PUT, "/api/editor/css", Some(json!({ "text": "p { margin: 0; }" })))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(state["style"], "p { margin: 0; }");
    assert_eq!(state["css_buffer"], "p { margin: 0; }");

    let response = app
        .call(reqwest::Method::POST, "/api/editor/layout", Some(json!({ "width": 640, "height": 480 })))
        .await;
    assert_eq!(response.status(), 200);
    let editor = app.state.editor.read().await;
    assert_eq!(editor.html_editor().viewport(), Viewport { width: 640, height: 480 });
}

#[tokio::test]
async fn test_delete_then_add_gives_fresh_id() {
    let app = TestApp::spawn(Arc::new(MemoryStore::new()), Arc::new(RecordingRenderer::default())).await;

    app.call(reqwest::Method::POST, "/api/pages", None).await;
    app.call(reqwest::Method::POST, "/api/pages", None).await;
    app.call(reqwest::Method::DELETE, "/api/pages/1", None).await;
    let state: Value = app
        .call(reqwest::Method::POST, "/api/pages", None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(page_ids(&state), vec![0, 2, 3]);

    let response = app.call(reqwest::Method::DELETE, "/api/pages/1", None).await;
    assert_eq!(response.status(), 404);
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_add_page_autosaves() {
    let store = Arc::new(MemoryStore::new());
    let app = TestApp::spawn(store.clone(), Arc::new(RecordingRenderer::default())).await;

    app.call(reqwest::Method::POST, "/api/pages", None).await;
    let saved = parse_document(&store.get(STORAGE_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(saved.pages.len(), 2);
    assert!(app.state().await["last_saved"].is_string());
}

#[tokio::test]
async fn test_reload_from_local_store_matches() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let app = TestApp::spawn(store.clone(), Arc::new(RecordingRenderer::default())).await;

    app.call(reqwest::Method::POST, "/api/pages", None).await;
    app.call(reqwest::Method::POST, "/api/pages/1/select", None).await;
    app.call(
        reqwest::Method::PUT,
        "/api/editor/html",
        Some(json!({ "text": "<h1>Title</h1>\n<p>&nbsp;ünïcode</p>" })),
    )
    .await;
    app.call(reqwest::Method::PUT, "/api/editor/css", Some(json!({ "text": "h1 { color: red; }" })))
        .await;

    let before = {
        let editor = app.state.editor.read().await;
        save_to_store(&editor, store.as_ref()).unwrap();
        serialize_document(&editor.snapshot()).unwrap()
    };

    // Fresh session over the same store
    let reloaded = autoload(store.as_ref());
    let after = serialize_document(&reloaded.snapshot()).unwrap();
    assert_eq!(before, after);
    assert_eq!(reloaded.style().text(), "h1 { color: red; }");
}

#[test]
fn test_autoload_ignores_malformed_snapshot() {
    let store = MemoryStore::new();
    store.put(STORAGE_KEY, "{\"pages\": [").unwrap();
    let editor = autoload(&store);
    assert_eq!(editor.registry().len(), 1);
}

#[tokio::test]
async fn test_download_and_upload_data_file() {
    let source = TestApp::spawn(Arc::new(MemoryStore::new()), Arc::new(RecordingRenderer::default())).await;
    source.call(reqwest::Method::POST, "/api/pages/0/select", None).await;
    source
        .call(reqwest::Method::PUT, "/api/editor/html", Some(json!({ "text": "<p>saved</p>" })))
        .await;
    source
        .call(reqwest::Method::PUT, "/api/editor/css", Some(json!({ "text": "p { color: blue; }" })))
        .await;

    let response = source.call(reqwest::Method::GET, "/api/data.json", None).await;
    assert_eq!(response.status(), 200);
    assert!(response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .contains("data.json"));
    let data = response.bytes().await.unwrap().to_vec();

    let target = TestApp::spawn(Arc::new(MemoryStore::new()), Arc::new(RecordingRenderer::default())).await;
    target.call(reqwest::Method::POST, "/api/pages", None).await;

    let form = reqwest::multipart::Form::new()
        .part("file", reqwest::multipart::Part::bytes(data).file_name("data.json"));
    let response = target
        .http
        .post(format!("{}/api/data", target.base))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let state = target.state().await;
    assert_eq!(page_ids(&state), vec![0]);
    assert_eq!(state["pages"][0]["content"], "<p>saved</p>");
    assert_eq!(state["style"], "p { color: blue; }");
    assert_eq!(state["css_buffer"], "p { color: blue; }");
    assert!(state["selected"].is_null());
}

#[tokio::test]
async fn test_malformed_upload_is_rejected() {
    let app = TestApp::spawn(Arc::new(MemoryStore::new()), Arc::new(RecordingRenderer::default())).await;
    app.call(reqwest::Method::POST, "/api/pages", None).await;

    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(b"{\"pages\": 3}".to_vec()).file_name("data.json"),
    );
    let response = app
        .http
        .post(format!("{}/api/data", app.base))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let state = app.state().await;
    assert_eq!(page_ids(&state), vec![0, 1]);
    assert!(state["last_error"].as_str().unwrap().starts_with("Malformed document"));
}

async fn upload(app: &TestApp, bytes: Vec<u8>) -> reqwest::Response {
    let form = reqwest::multipart::Form::new()
        .part("file", reqwest::multipart::Part::bytes(bytes).file_name("data.json"));
    app.http
        .post(format!("{}/api/data", app.base))
        .multipart(form)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_empty_upload_is_a_malformed_document() {
    let app = TestApp::spawn(Arc::new(MemoryStore::new()), Arc::new(RecordingRenderer::default())).await;

    let response = upload(&app, Vec::new()).await;
    assert_eq!(response.status(), 400);
    assert!(response.text().await.unwrap().starts_with("Malformed document"));
    assert_eq!(page_ids(&app.state().await), vec![0]);
}

#[tokio::test]
async fn test_upload_with_out_of_range_id_is_rejected() {
    let app = TestApp::spawn(Arc::new(MemoryStore::new()), Arc::new(RecordingRenderer::default())).await;
    app.call(reqwest::Method::PUT, "/api/editor/css", Some(json!({ "text": "p {}" })))
        .await;

    let body = r#"{"pages":[{"id":0,"content":"a"},{"id":18446744073709551615,"content":"b"}],"style":"s"}"#;
    let response = upload(&app, body.as_bytes().to_vec()).await;
    assert_eq!(response.status(), 400);

    let state = app.state().await;
    assert_eq!(page_ids(&state), vec![0]);
    assert_eq!(state["pages"][0]["content"], "");
    assert_eq!(state["style"], "p {}");
}

// ============================================================================
// Misc
// ============================================================================

#[tokio::test]
async fn test_liveness_and_index() {
    let app = TestApp::spawn(Arc::new(MemoryStore::new()), Arc::new(RecordingRenderer::default())).await;

    let response = app.call(reqwest::Method::GET, "/test", None).await;
    assert_eq!(response.text().await.unwrap(), "Hello World");

    let page = app
        .call(reqwest::Method::GET, "/", None)
        .await
        .text()
        .await
        .unwrap();
    assert!(page.contains(r#"<div id="pageContainer"></div>"#));
}
