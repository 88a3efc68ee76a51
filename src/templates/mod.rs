//! HTML templates and styling for the page editor.
//!
//! ## Module Structure
//!
//! - `styles` - CSS for the editor chrome
//! - `editor` - Monaco-based HTML/CSS editor with the live page preview

mod editor;
mod styles;

pub use editor::render_editor;
pub use styles::STYLE;
