//! Page registry: the ordered list of pages and their visual elements.
//!
//! Registry order is visual order and export order. Page ids come from a
//! counter that is never rewound while pages exist, so deleting a page and
//! adding another can not hand out an id twice.

use crate::editor::TextBuffer;
use crate::error::{EditorError, Result};
use crate::markup::{Element, Node};
use crate::models::PageId;

/// Id of the container element every page element is rendered into.
pub const PAGE_CONTAINER_ID: &str = "pageContainer";

/// Largest id a page may carry. The front-end reads ids back as JS numbers,
/// which are exact only up to 2^53 - 1.
pub const MAX_PAGE_ID: u64 = (1 << 53) - 1;

// ============================================================================
// Page
// ============================================================================

#[derive(Debug, Clone)]
pub struct Page {
    id: PageId,
    /// `div.page` owning the delete control and the `div.content` fragment
    element: Element,
    model: TextBuffer,
}

impl Page {
    fn new(id: PageId, content: &str) -> Self {
        let mut fragment = Element::new("div").with_class("content");
        fragment.set_inner_html(content);

        // The control remembers its own page id; deletion never goes through
        // shared state.
        let delete = Element::new("button")
            .with_class("deleteButton")
            .with_class("btn")
            .with_attr("data-delete", &id.to_string())
            .as_control()
            .with_child(Node::Text("Delete".to_string()));

        let element = Element::new("div")
            .with_class("page")
            .with_attr("id", &format!("page{}", id))
            .with_attr("data-page-id", &id.to_string())
            .with_child(Node::Element(delete))
            .with_child(Node::Element(fragment));

        Self {
            id,
            element,
            model: TextBuffer::new(content),
        }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn model(&self) -> &TextBuffer {
        &self.model
    }

    pub(crate) fn model_mut(&mut self) -> &mut TextBuffer {
        &mut self.model
    }

    /// Inner markup of the content fragment.
    pub fn content(&self) -> String {
        self.element
            .child_by_class("content")
            .map(Element::inner_html)
            .unwrap_or_default()
    }

    /// Copy the model's text into the content fragment.
    pub(crate) fn sync_content(&mut self) {
        let text = self.model.text().to_string();
        if let Some(fragment) = self.element.child_by_class_mut("content") {
            fragment.set_inner_html(&text);
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Default)]
pub struct PageRegistry {
    pages: Vec<Page>,
    next_id: u64,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an empty page and return its id.
    ///
    /// Restored ids are capped at `MAX_PAGE_ID`, so the counter starts at most
    /// at 2^53 and one increment per page can not overflow it.
    pub fn add(&mut self) -> PageId {
        let id = PageId(self.next_id);
        self.next_id += 1;
        self.pages.push(Page::new(id, ""));
        id
    }

    /// Append a page with a known id, as read back from a persisted document.
    /// Callers guarantee the id is not already present.
    pub(crate) fn restore(&mut self, id: PageId, content: &str) -> Result<()> {
        let next = id
            .0
            .checked_add(1)
            .filter(|_| id.0 <= MAX_PAGE_ID)
            .ok_or_else(|| EditorError::MalformedDocument(format!("page id {} out of range", id)))?;
        self.next_id = self.next_id.max(next);
        self.pages.push(Page::new(id, content));
        Ok(())
    }

    /// Remove exactly the page with this id.
    pub fn delete(&mut self, id: PageId) -> Result<Page> {
        let index = self.position(id).ok_or(EditorError::PageNotFound(id))?;
        Ok(self.pages.remove(index))
    }

    pub fn clear(&mut self) {
        self.pages.clear();
        self.next_id = 0;
    }

    fn position(&self, id: PageId) -> Option<usize> {
        self.pages.iter().position(|p| p.id == id)
    }

    pub fn get(&self, id: PageId) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PageId) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// The visual tree: every page element, in registry order.
    pub fn render_container(&self) -> Element {
        self.pages.iter().fold(
            Element::new("div").with_attr("id", PAGE_CONTAINER_ID),
            |container, page| container.with_child(Node::Element(page.element.clone())),
        )
    }
}
