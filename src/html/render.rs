//! Document tree to HTML.

use std::fmt::Write;

use crate::dom::{Document, NodeData, NodeId};

use super::escape::{escape, escape_attr, is_raw_text_element, is_void_element};

/// Serialize a node (outer HTML). A fragment renders as its children.
pub fn render(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, false, &mut out);
    out
}

/// Serialize only the children of a node (inner HTML).
pub fn render_children(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    let raw_text = matches!(doc.data(id), NodeData::Element { tag, .. } if is_raw_text_element(tag));
    for child in doc.children(id) {
        write_node(doc, child, raw_text, &mut out);
    }
    out
}

fn write_node(doc: &Document, id: NodeId, raw_text: bool, out: &mut String) {
    match doc.data(id) {
        NodeData::Text(text) if raw_text => out.push_str(text),
        NodeData::Text(text) => out.push_str(&escape(text)),
        NodeData::Fragment => {
            for child in doc.children(id) {
                write_node(doc, child, raw_text, out);
            }
        }
        NodeData::Element { tag, attrs } => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in attrs.iter() {
                if value.is_empty() {
                    let _ = write!(out, " {name}");
                } else {
                    let _ = write!(out, " {name}=\"{}\"", escape_attr(value));
                }
            }
            out.push('>');

            if is_void_element(tag) {
                return;
            }

            let raw_text = is_raw_text_element(tag);
            for child in doc.children(id) {
                write_node(doc, child, raw_text, out);
            }
            let _ = write!(out, "</{tag}>");
        }
    }
}
