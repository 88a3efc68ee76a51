//! Editor controller: page registry, style store and the two editor bindings.
//!
//! All editable state lives in one [`Editor`]. The front-end forwards every
//! UI event (click, change, paste, layout) to one of its methods; nothing
//! else mutates pages or the style.

use chrono::{DateTime, Utc};

use crate::error::{EditorError, Result};
use crate::markup::{Element, Node};
use crate::models::{PageId, PageView, StateView, Viewport};
use crate::registry::{Page, PageRegistry};

// ============================================================================
// Text Buffer
// ============================================================================

/// Editable text model behind an editor surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBuffer {
    text: String,
    /// Bumped on every change
    version: u64,
}

impl TextBuffer {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            version: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.version += 1;
    }

    pub fn append(&mut self, text: &str) {
        self.text.push_str(text);
        self.version += 1;
    }
}

// ============================================================================
// Style Store
// ============================================================================

/// Id of the `<style>` element the shared CSS is materialized into.
pub const STYLE_ELEMENT_ID: &str = "CSS";

#[derive(Debug, Clone)]
pub struct StyleStore {
    text: String,
    element: Element,
}

impl StyleStore {
    pub fn new(text: &str) -> Self {
        let mut store = Self {
            text: String::new(),
            element: Element::new("style").with_attr("id", STYLE_ELEMENT_ID),
        };
        store.replace(text);
        store
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The `<style>` element carrying the CSS.
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn replace(&mut self, text: &str) {
        self.text = text.to_string();
        self.element.set_inner_html(text);
    }
}

impl Default for StyleStore {
    fn default() -> Self {
        Self::new("")
    }
}

// ============================================================================
// Editor Bindings
// ============================================================================

/// HTML surface. Shows the model of the selected page, if any.
#[derive(Debug, Default)]
pub struct HtmlEditor {
    attached: Option<PageId>,
    viewport: Viewport,
}

impl HtmlEditor {
    pub fn attached(&self) -> Option<PageId> {
        self.attached
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub(crate) fn detach(&mut self) {
        self.attached = None;
    }
}

/// CSS surface. Always bound to the style store.
#[derive(Debug, Default)]
pub struct CssEditor {
    buffer: TextBuffer,
    viewport: Viewport,
}

impl CssEditor {
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
}

// ============================================================================
// Status
// ============================================================================

/// User-visible outcome of the last save and the last failure.
#[derive(Debug, Clone, Default)]
pub struct EditorStatus {
    pub last_saved: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

// ============================================================================
// Editor
// ============================================================================

#[derive(Debug, Default)]
pub struct Editor {
    pub(crate) registry: PageRegistry,
    pub(crate) style: StyleStore,
    pub(crate) html: HtmlEditor,
    pub(crate) css: CssEditor,
    status: EditorStatus,
}

impl Editor {
    /// An editor with no pages and an empty style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Startup state: one empty page, nothing selected.
    pub fn with_initial_page() -> Self {
        let mut editor = Self::new();
        editor.registry.add();
        editor
    }

    pub fn registry(&self) -> &PageRegistry {
        &self.registry
    }

    pub fn style(&self) -> &StyleStore {
        &self.style
    }

    pub fn html_editor(&self) -> &HtmlEditor {
        &self.html
    }

    pub fn css_editor(&self) -> &CssEditor {
        &self.css
    }

    pub fn status(&self) -> &EditorStatus {
        &self.status
    }

    pub fn selected(&self) -> Option<PageId> {
        self.html.attached
    }

    /// Buffer currently shown in the HTML editor.
    pub fn html_buffer(&self) -> Option<&TextBuffer> {
        self.html
            .attached
            .and_then(|id| self.registry.get(id))
            .map(|page| page.model())
    }

    pub fn add_page(&mut self) -> PageId {
        let id = self.registry.add();
        log::debug!("Added page {}", id);
        id
    }

    pub fn delete_page(&mut self, id: PageId) -> Result<()> {
        self.registry.delete(id)?;
        if self.html.attached == Some(id) {
            self.html.detach();
        }
        log::debug!("Deleted page {}", id);
        Ok(())
    }

    /// Click on a page: the container's single listener resolves the clicked
    /// child to its id and lands here.
    pub fn select_page(&mut self, id: PageId) -> Result<()> {
        if self.registry.get(id).is_none() {
            return Err(EditorError::PageNotFound(id));
        }
        self.html.attached = Some(id);
        Ok(())
    }

    /// Change event from the HTML editor: the buffer now holds `text`.
    pub fn edit_html(&mut self, text: &str) -> Result<()> {
        let page = self.active_page_mut()?;
        page.model_mut().set_text(text);
        page.sync_content();
        Ok(())
    }

    /// Paste into the HTML editor. Pasted text is appended to the end of the
    /// buffer rather than inserted at the cursor.
    pub fn paste_html(&mut self, pasted: &str) -> Result<()> {
        let page = self.active_page_mut()?;
        page.model_mut().append(pasted);
        page.sync_content();
        Ok(())
    }

    /// Change event from the CSS editor.
    pub fn edit_css(&mut self, text: &str) {
        self.css.buffer.set_text(text);
        self.style.replace(self.css.buffer.text());
    }

    /// Panel finished resizing; recompute both editor layouts.
    pub fn layout(&mut self, viewport: Viewport) {
        self.html.viewport = viewport;
        self.css.viewport = viewport;
    }

    pub fn record_saved(&mut self, at: DateTime<Utc>) {
        self.status.last_saved = Some(at);
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.status.last_error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.status.last_error = None;
    }

    pub fn view(&self) -> StateView {
        StateView {
            pages: self
                .registry
                .iter()
                .map(|page| PageView {
                    id: page.id(),
                    content: page.content(),
                    element: page.element().outer_html(),
                })
                .collect(),
            style: self.style.text().to_string(),
            selected: self.html.attached,
            html_buffer: self.html_buffer().map(|b| b.text().to_string()),
            css_buffer: self.css.buffer.text().to_string(),
            last_saved: self.status.last_saved,
            last_error: self.status.last_error.clone(),
        }
    }

    /// Deep copy of every page element plus the style, as one container.
    pub(crate) fn export_tree(&self) -> Element {
        let styles = Element::new("style").with_child(Node::Raw(self.style.text().to_string()));
        self.registry.iter().fold(
            Element::new("div").with_child(Node::Element(styles)),
            |body, page| body.with_child(Node::Element(page.element().exportable_clone())),
        )
    }

    fn active_page_mut(&mut self) -> Result<&mut Page> {
        let id = self.html.attached.ok_or(EditorError::NoActivePage)?;
        self.registry
            .get_mut(id)
            .ok_or(EditorError::PageNotFound(id))
    }
}
