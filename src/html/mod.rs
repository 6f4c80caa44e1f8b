//! HTML front and back end for the document tree.
//!
//! - `parse()`, `parse_nodes()` - markup to [`Document`](crate::dom::Document) / [`Node`](crate::dom::Node) via `tl`
//! - `render()`, `render_children()` - outer / inner HTML
//! - `escape()`, `unescape()` and element classification helpers

mod escape;
mod parse;
mod render;

pub use escape::{escape, escape_attr, is_raw_text_element, is_void_element, unescape};
pub use parse::{parse, parse_nodes};
pub use render::{render, render_children};

use thiserror::Error;

/// HTML processing errors.
#[derive(Debug, Error)]
pub enum HtmlError {
    #[error("failed to parse HTML: {0}")]
    Parse(String),
}
