//! Editor page: two Monaco surfaces (HTML and CSS) next to the live page preview.
//!
//! The page holds no state of its own. Every click, change, paste and layout
//! event is sent to the JSON API and the returned state is drawn back.

use crate::editor::{Editor, STYLE_ELEMENT_ID};
use crate::registry::PAGE_CONTAINER_ID;

use super::styles::STYLE;

// ============================================================================
// Editor Template
// ============================================================================

pub fn render_editor(editor: &Editor) -> String {
    // Use serde_json for proper escaping, and keep the payload from closing
    // the surrounding <script> early.
    let state_json = serde_json::to_string(&editor.view())
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/");

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>pagepress</title>
    <style>{STYLE}</style>
    <style id="{style_id}"></style>
</head>
<body>
    <div class="toolbar">
        <button class="btn" id="toggleEditor" title="Show/hide the editors">Editors</button>
        <button class="btn" id="addButton">Add page</button>
        <button class="btn" id="SaveData">Save data</button>
        <label class="btn file-label">Load data<input type="file" id="LoadData" accept="application/json,.json"></label>
        <button class="btn primary" id="Export">Export PDF</button>
        <span class="spacer"></span>
        <span class="editor-status" id="editor-status">Ready</span>
    </div>
    <div class="workspace">
        <div id="editor">
            <div class="editor-pane"><span class="pane-label">HTML</span><div id="editorHTML"></div></div>
            <div class="editor-pane"><span class="pane-label">CSS</span><div id="editorCSS"></div></div>
        </div>
        <div id="{container_id}"></div>
    </div>

    <script src="https://cdnjs.cloudflare.com/ajax/libs/monaco-editor/0.45.0/min/vs/loader.min.js"></script>
    <script>
    (function() {{
        'use strict';

        let state = {state_json};
        let htmlEditor = null;
        let cssEditor = null;
        // Set while server state is written into the editors, so the
        // resulting change events are not sent back.
        let applying = false;

        const pagesCont = document.getElementById('{container_id}');
        const styleEl = document.getElementById('{style_id}');
        const editorPanel = document.getElementById('editor');

        function updateStatus(cls, text) {{
            const statusEl = document.getElementById('editor-status');
            statusEl.className = 'editor-status ' + cls;
            statusEl.textContent = text;
        }}

        async function api(method, path, body) {{
            const options = {{ method: method, headers: {{}} }};
            if (body !== undefined) {{
                options.headers['Content-Type'] = 'application/json';
                options.body = JSON.stringify(body);
            }}
            const response = await fetch(path, options);
            if (!response.ok) {{
                throw new Error(await response.text());
            }}
            return response.json();
        }}

        // Run an API call and redraw from its result. Editor buffers are only
        // overwritten when the server changed them (select, paste, load...),
        // never in answer to the user's own typing.
        // Calls are chained so the server applies events in the order they
        // happened here; a failed call does not break the chain.
        let queue = Promise.resolve();
        function enqueue(task) {{
            queue = queue.then(task).catch(e => {{
                updateStatus('error', e.message);
                console.error(e);
            }});
            return queue;
        }}

        function act(method, path, body, withBuffers) {{
            return enqueue(() => api(method, path, body)
                .then(next => render(next, withBuffers !== false)));
        }}

        function render(next, withBuffers) {{
            state = next;
            styleEl.textContent = state.style;
            pagesCont.innerHTML = state.pages.map(p => p.element).join('');
            if (state.selected !== null) {{
                const selected = document.getElementById('page' + state.selected);
                if (selected) selected.classList.add('selected');
            }}
            if (withBuffers) applyBuffers();

            if (state.last_error) {{
                updateStatus('error', state.last_error);
            }} else if (state.last_saved) {{
                updateStatus('saved', 'Saved at ' + new Date(state.last_saved).toLocaleTimeString());
            }}
        }}

        function applyBuffers() {{
            if (!htmlEditor || !cssEditor) return;
            applying = true;
            const html = state.html_buffer;
            // No page selected: nothing to edit.
            htmlEditor.updateOptions({{ readOnly: html === null }});
            document.getElementById('editorHTML').classList.toggle('disabled', html === null);
            if ((html ?? '') !== htmlEditor.getValue()) htmlEditor.setValue(html ?? '');
            if (state.css_buffer !== cssEditor.getValue()) cssEditor.setValue(state.css_buffer);
            applying = false;
        }}

        // One listener for every page, present and future.
        pagesCont.addEventListener('click', function(event) {{
            const del = event.target.closest('[data-delete]');
            if (del) {{
                event.stopPropagation();
                act('DELETE', '/api/pages/' + del.dataset.delete);
                return;
            }}
            const page = event.target.closest('.page');
            if (page) act('POST', '/api/pages/' + page.dataset.pageId + '/select');
        }});

        document.getElementById('addButton').addEventListener('click', function() {{
            act('POST', '/api/pages');
        }});

        document.getElementById('toggleEditor').addEventListener('click', function() {{
            editorPanel.classList.toggle('collapsed');
        }});

        editorPanel.addEventListener('transitionend', function(event) {{
            if (event.target !== editorPanel) return;
            if (htmlEditor) htmlEditor.layout();
            if (cssEditor) cssEditor.layout();
            const rect = editorPanel.getBoundingClientRect();
            act('POST', '/api/editor/layout', {{
                width: Math.round(rect.width),
                height: Math.round(rect.height)
            }}, false);
        }});

        // Paste appends to the end of the buffer instead of replacing the
        // selection. Capture phase, so Monaco never sees the event.
        document.getElementById('editorHTML').addEventListener('paste', function(event) {{
            event.preventDefault();
            event.stopPropagation();
            if (state.html_buffer === null) return;
            const text = event.clipboardData.getData('text/plain');
            act('POST', '/api/editor/paste', {{ text: text }});
        }}, true);

        document.getElementById('SaveData').addEventListener('click', function() {{
            const link = document.createElement('a');
            link.href = '/api/data.json';
            link.download = 'data.json';
            link.click();
        }});

        document.getElementById('LoadData').addEventListener('change', function(event) {{
            const file = event.target.files[0];
            if (!file) return;
            const form = new FormData();
            form.append('file', file);
            event.target.value = '';
            enqueue(async () => {{
                const response = await fetch('/api/data', {{ method: 'POST', body: form }});
                if (!response.ok) throw new Error(await response.text());
                render(await response.json(), true);
                updateStatus('saved', 'Loaded ' + file.name);
            }});
        }});

        document.getElementById('Export').addEventListener('click', function() {{
            updateStatus('saving', 'PDF will be downloaded');
            enqueue(async () => {{
                const response = await fetch('/api/export', {{ method: 'POST' }});
                if (response.status === 204) {{
                    updateStatus('', 'Nothing to export');
                    return;
                }}
                if (!response.ok) throw new Error(await response.text());
                const blob = await response.blob();
                const url = URL.createObjectURL(blob);
                const link = document.createElement('a');
                link.href = url;
                link.download = 'file.pdf';
                link.click();
                URL.revokeObjectURL(url);
                updateStatus('saved', 'PDF exported');
            }});
        }});

        require.config({{ paths: {{ vs: 'https://cdnjs.cloudflare.com/ajax/libs/monaco-editor/0.45.0/min/vs' }} }});

        require(['vs/editor/editor.main'], function() {{
            const options = {{
                theme: 'vs-dark',
                codeLens: true,
                minimap: {{ enabled: false }},
                automaticLayout: false,
                tabSize: 2,
            }};
            htmlEditor = monaco.editor.create(document.getElementById('editorHTML'),
                Object.assign({{ value: '', language: 'html' }}, options));
            cssEditor = monaco.editor.create(document.getElementById('editorCSS'),
                Object.assign({{ value: '', language: 'css' }}, options));

            htmlEditor.onDidChangeModelContent(function() {{
                if (applying || state.html_buffer === null) return;
                act('PUT', '/api/editor/html', {{ text: htmlEditor.getValue() }}, false);
            }});

            cssEditor.onDidChangeModelContent(function() {{
                if (applying) return;
                act('PUT', '/api/editor/css', {{ text: cssEditor.getValue() }}, false);
            }});

            render(state, true);
        }});

        render(state, false);
    }})();
    </script>
</body>
</html>"##,
        STYLE = STYLE,
        style_id = STYLE_ELEMENT_ID,
        container_id = PAGE_CONTAINER_ID,
        state_json = state_json,
    )
}

// ============================================================================
// Tests
// ============================================================================
