//! CSS for the editor chrome.
//!
//! Page content is styled only by the user's shared stylesheet; these rules
//! cover the toolbar, the editor panel and the page frames.

// ============================================================================
// CSS Styles
// ============================================================================

pub const STYLE: &str = r#"
/* Solarized Light Theme */
:root {
    --base01: #586e75;
    --base00: #657b83;
    --base1: #93a1a1;
    --base2: #eee8d5;
    --base3: #fdf6e3;

    --red: #dc322f;
    --blue: #268bd2;
    --green: #859900;

    --bg: var(--base3);
    --fg: var(--base00);
    --muted: var(--base1);
    --border: var(--base2);
}

* { box-sizing: border-box; margin: 0; padding: 0; }

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
    color: var(--fg);
    background: var(--base2);
    height: 100vh;
    display: flex;
    flex-direction: column;
    overflow: hidden;
}

.toolbar {
    display: flex;
    gap: 0.5rem;
    align-items: center;
    padding: 0.5rem 1rem;
    background: var(--bg);
    border-bottom: 1px solid var(--base1);
}

.toolbar .spacer { flex: 1; }

.btn {
    padding: 0.35rem 0.8rem;
    border: 1px solid var(--base1);
    border-radius: 4px;
    background: var(--bg);
    color: var(--fg);
    cursor: pointer;
    font-size: 0.85rem;
    font-family: inherit;
}
.btn:hover { background: var(--base2); }
.btn.primary { background: var(--blue); color: var(--base3); border-color: var(--blue); }

.file-label input { display: none; }

.editor-status { font-size: 0.8rem; color: var(--muted); }
.editor-status.error { color: var(--red); }
.editor-status.saved { color: var(--green); }

.workspace { flex: 1; display: flex; min-height: 0; }

#editor {
    width: 45%;
    display: flex;
    flex-direction: column;
    border-right: 1px solid var(--base1);
    transition: width 0.2s ease;
}
#editor.collapsed { width: 0; overflow: hidden; }

.editor-pane { flex: 1; min-height: 0; position: relative; }
.editor-pane + .editor-pane { border-top: 1px solid var(--base1); }
.editor-pane .pane-label {
    position: absolute;
    top: 0.25rem;
    right: 0.75rem;
    z-index: 5;
    font-size: 0.7rem;
    letter-spacing: 0.05em;
    color: var(--muted);
    text-transform: uppercase;
}
#editorHTML, #editorCSS { position: absolute; inset: 0; }
#editorHTML.disabled { opacity: 0.5; }

#pageContainer {
    flex: 1;
    overflow-y: auto;
    padding: 1.5rem;
    display: flex;
    flex-direction: column;
    align-items: center;
    gap: 1.5rem;
}

.page {
    position: relative;
    width: 210mm;
    min-height: 297mm;
    background: white;
    box-shadow: 0 1px 4px rgba(0, 0, 0, 0.2);
    cursor: pointer;
}
.page.selected { outline: 2px solid var(--blue); }
.page .content { min-height: 297mm; padding: 1rem; }
.page .deleteButton { position: absolute; top: 0.5rem; right: -5rem; }
"#;
