//! Detached, owned node trees.
//!
//! A [`Node`] lives outside any [`Document`](super::Document). Transforms use
//! it to describe replacements; the document turns it into arena nodes with
//! [`Document::materialize`](super::Document::materialize).

use super::Attrs;

/// An owned node tree that is not attached to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element {
        tag: String,
        attrs: Attrs,
        children: Vec<Node>,
    },
    Text(String),
    /// Ordered bundle of siblings. Splicing it moves the children, never the
    /// fragment itself.
    Fragment(Vec<Node>),
}

impl Node {
    /// Create an empty element.
    pub fn element(tag: impl Into<String>) -> Self {
        Self::Element {
            tag: tag.into(),
            attrs: Attrs::new(),
            children: Vec::new(),
        }
    }

    /// Create a text node. Numbers and other `Display` values are stringified.
    pub fn text(value: impl ToString) -> Self {
        Self::Text(value.to_string())
    }

    pub fn fragment(children: impl IntoIterator<Item = Node>) -> Self {
        Self::Fragment(children.into_iter().collect())
    }

    /// Builder: set an attribute on an element (no-op for other kinds).
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        if let Self::Element { attrs, .. } = &mut self {
            attrs.set(name, value);
        }
        self
    }

    /// Builder: append a child to an element or fragment (no-op for text).
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        match &mut self {
            Self::Element { children, .. } | Self::Fragment(children) => {
                children.push(child.into());
            }
            Self::Text(_) => {}
        }
        self
    }

    pub fn is_fragment(&self) -> bool {
        matches!(self, Self::Fragment(_))
    }

    /// `true` for a fragment that splices in no nodes at all, nested empty
    /// fragments included.
    pub fn is_empty_fragment(&self) -> bool {
        match self {
            Self::Fragment(children) => children.iter().all(Self::is_empty_fragment),
            _ => false,
        }
    }

    /// Concatenated text of this tree in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(text),
            Self::Element { children, .. } | Self::Fragment(children) => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}
