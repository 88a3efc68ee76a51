//! Minimal element tree for page markup.
//!
//! Pages are kept as small owned trees instead of strings so that editor-only
//! controls can be dropped structurally when a page is exported. User markup
//! typed into the HTML editor is stored as an opaque `Raw` node and written
//! back verbatim.

/// Attribute marking elements that belong to the editor UI and never to the
/// exported document.
pub const CONTROL_MARKER: &str = "data-editor-control";

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Escaped on serialization
    Text(String),
    /// Serialized verbatim
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        match self.attrs.iter_mut().find(|(k, _)| k == "class") {
            Some((_, v)) if !v.is_empty() => {
                v.push(' ');
                v.push_str(class);
            }
            Some((_, v)) => v.push_str(class),
            None => self.attrs.push(("class".to_string(), class.to_string())),
        }
        self
    }

    pub fn with_child(mut self, node: Node) -> Self {
        self.children.push(node);
        self
    }

    /// Tag the element as editor UI so exports leave it out.
    pub fn as_control(self) -> Self {
        self.with_attr(CONTROL_MARKER, "")
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn is_control(&self) -> bool {
        self.attr(CONTROL_MARKER).is_some()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements only, skipping text and raw nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn child_by_class(&self, class: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.has_class(class))
    }

    pub fn child_by_class_mut(&mut self, class: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|n| match n {
            Node::Element(e) if e.has_class(class) => Some(e),
            _ => None,
        })
    }

    /// Replace all children with one verbatim markup node.
    pub fn set_inner_html(&mut self, html: &str) {
        self.children.clear();
        if !html.is_empty() {
            self.children.push(Node::Raw(html.to_string()));
        }
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            write_node(child, &mut out);
        }
        out
    }

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }

    /// Deep copy without any element tagged as an editor control.
    pub fn exportable_clone(&self) -> Element {
        Element {
            tag: self.tag.clone(),
            attrs: self.attrs.clone(),
            children: self
                .children
                .iter()
                .filter_map(|n| match n {
                    Node::Element(e) if e.is_control() => None,
                    Node::Element(e) => Some(Node::Element(e.exportable_clone())),
                    other => Some(other.clone()),
                })
                .collect(),
        }
    }
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(e) => write_element(e, out),
        Node::Text(t) => out.push_str(&html_escape(t)),
        Node::Raw(r) => out.push_str(r),
    }
}

fn write_element(e: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&e.tag);
    for (name, value) in &e.attrs {
        out.push(' ');
        out.push_str(name);
        if !value.is_empty() {
            out.push_str("=\"");
            out.push_str(&html_escape(value));
            out.push('"');
        }
    }
    out.push('>');
    for child in &e.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&e.tag);
    out.push('>');
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
