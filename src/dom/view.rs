//! Read-only node view handed to transforms.

use std::fmt;

use super::{Attrs, Document, Node, NodeData, NodeId};

/// A borrowed view of one node and the document it lives in.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub(super) fn new(doc: &'a Document, id: NodeId) -> Self {
        Self { doc, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn data(&self) -> &'a NodeData {
        self.doc.data(self.id)
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data(), NodeData::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.data(), NodeData::Text(_))
    }

    /// Tag name for elements.
    pub fn tag(&self) -> Option<&'a str> {
        match self.data() {
            NodeData::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    /// `true` if this is an element with the given tag name.
    pub fn is(&self, tag: &str) -> bool {
        self.tag() == Some(tag)
    }

    pub fn attrs(&self) -> Option<&'a Attrs> {
        match self.data() {
            NodeData::Element { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.attrs()?.get(name)
    }

    /// Payload of a text node.
    pub fn text(&self) -> Option<&'a str> {
        match self.data() {
            NodeData::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn text_content(&self) -> String {
        self.doc.text_content(self.id)
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.doc.parent(self.id).map(|id| self.doc.get(id))
    }

    pub fn first_child(&self) -> Option<NodeRef<'a>> {
        self.doc.first_child(self.id).map(|id| self.doc.get(id))
    }

    pub fn next_sibling(&self) -> Option<NodeRef<'a>> {
        self.doc.next_sibling(self.id).map(|id| self.doc.get(id))
    }

    pub fn prev_sibling(&self) -> Option<NodeRef<'a>> {
        self.doc.prev_sibling(self.id).map(|id| self.doc.get(id))
    }

    pub fn children(self) -> impl Iterator<Item = NodeRef<'a>> {
        let doc = self.doc;
        doc.children(self.id).map(move |id| doc.get(id))
    }

    /// Detached copy of this subtree, e.g. to wrap it in a replacement.
    pub fn to_node(&self) -> Node {
        self.doc.to_node(self.id)
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self)
    }
}

/// Short label used in logs: `<p>`, `"text"` or `#fragment`.
impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data() {
            NodeData::Element { tag, .. } => write!(f, "<{tag}>"),
            NodeData::Text(text) => write!(f, "{text:?}"),
            NodeData::Fragment => f.write_str("#fragment"),
        }
    }
}
