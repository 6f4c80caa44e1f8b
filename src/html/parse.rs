//! HTML to document tree, via `tl`.

use crate::dom::{Attrs, Document, Node};

use super::HtmlError;
use super::escape::{is_raw_text_element, unescape};

/// Parse an HTML string into a new [`Document`].
///
/// Top-level nodes become children of [`Document::root`]. Tag names are
/// lowercased, comments are dropped, and entities in text and attribute
/// values are decoded (except inside `script` / `style`).
pub fn parse(html: &str) -> Result<Document, HtmlError> {
    let mut doc = Document::new();
    let root = doc.root();
    for node in parse_nodes(html)? {
        let id = doc.materialize(node);
        doc.append_child(root, id);
    }
    Ok(doc)
}

/// Parse an HTML fragment into detached [`Node`]s, e.g. for replacements.
pub fn parse_nodes(html: &str) -> Result<Vec<Node>, HtmlError> {
    let dom = tl::parse(html, tl::ParserOptions::default())
        .map_err(|err| HtmlError::Parse(format!("{err:?}")))?;

    let parser = dom.parser();
    Ok(dom
        .children()
        .iter()
        .filter_map(|handle| convert(*handle, parser, false))
        .collect())
}

/// Convert a tl node handle to a detached node.
fn convert(handle: tl::NodeHandle, parser: &tl::Parser, raw_text: bool) -> Option<Node> {
    let node = handle.get(parser)?;

    match node {
        tl::Node::Tag(tag) => {
            let tag_name = tag.name().as_utf8_str().to_lowercase();

            // Collect attributes
            let mut attrs = Attrs::new();
            for (key, value) in tag.attributes().iter() {
                let key_str: &str = key.as_ref();
                let value_str = value.map(|v| unescape(&v).into_owned()).unwrap_or_default();
                attrs.set(key_str, &value_str);
            }

            // Recursively process children
            let raw_text = is_raw_text_element(&tag_name);
            let children = tag
                .children()
                .top()
                .iter()
                .filter_map(|child| convert(*child, parser, raw_text))
                .collect();

            Some(Node::Element {
                tag: tag_name,
                attrs,
                children,
            })
        }
        tl::Node::Raw(bytes) => {
            let text = bytes.as_utf8_str();
            if text.is_empty() {
                return None;
            }
            let text = if raw_text {
                text.into_owned()
            } else {
                unescape(&text).into_owned()
            };
            Some(Node::Text(text))
        }
        tl::Node::Comment(_) => None, // Skip comments
    }
}
