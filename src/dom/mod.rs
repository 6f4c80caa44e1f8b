//! Arena-backed mutable document tree.
//!
//! Nodes live in a single `Vec` and are addressed by [`NodeId`]. Removing a
//! node only detaches it; its slot stays valid, so ids held across mutations
//! never dangle. Siblings are doubly linked, which keeps insert, remove and
//! replace O(1).
//!
//! # Module Structure
//!
//! ```text
//! dom/
//! ├── attrs    # Attrs (ordered attribute list)
//! ├── iter     # TreeIter, Cursor (document-order traversal)
//! ├── node     # Node (detached owned trees)
//! ├── view     # NodeRef (read-only view handed to transforms)
//! └── mod.rs   # Document (this file)
//! ```

mod attrs;
pub mod iter;
mod node;
mod view;

pub use attrs::Attrs;
pub use iter::{Cursor, Descendants, TreeIter};
pub use node::Node;
pub use view::NodeRef;

use std::fmt;

// ============================================================================
// Types
// ============================================================================

/// Stable handle to a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind-specific payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element { tag: String, attrs: Attrs },
    Text(String),
    Fragment,
}

impl NodeData {
    /// Elements and fragments can hold children; text cannot.
    pub fn is_container(&self) -> bool {
        !matches!(self, Self::Text(_))
    }
}

#[derive(Debug, Clone)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

impl Slot {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }
}

/// A mutable document tree.
///
/// The document also acts as the node factory: every node is created through
/// it, so there is no ambient "current document".
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Slot>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document whose root is an empty fragment.
    pub fn new() -> Self {
        Self {
            nodes: vec![Slot::new(NodeData::Fragment)],
            root: NodeId(0),
        }
    }

    /// The document's own root node (a fragment holding top-level nodes).
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of node slots ever allocated, detached ones included.
    ///
    /// Slots are never reclaimed: every materialized replacement adds to
    /// this, so a long-lived document reused across many runs keeps growing.
    /// Render and re-parse to compact.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    // ========================================================================
    // Factory
    // ========================================================================

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Slot::new(data));
        id
    }

    pub fn create_element(&mut self, tag: &str, attrs: Attrs) -> NodeId {
        self.alloc(NodeData::Element {
            tag: tag.to_string(),
            attrs,
        })
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(NodeData::Fragment)
    }

    /// Turn a detached [`Node`] tree into arena nodes. The result is detached.
    pub fn materialize(&mut self, node: Node) -> NodeId {
        match node {
            Node::Text(text) => self.create_text(text),
            Node::Element {
                tag,
                attrs,
                children,
            } => {
                let id = self.alloc(NodeData::Element { tag, attrs });
                for child in children {
                    let child = self.materialize(child);
                    self.append_child(id, child);
                }
                id
            }
            Node::Fragment(children) => {
                let id = self.create_fragment();
                for child in children {
                    let child = self.materialize(child);
                    self.append_child(id, child);
                }
                id
            }
        }
    }

    /// Copy a subtree out of the arena as a detached [`Node`].
    pub fn to_node(&self, id: NodeId) -> Node {
        let children = || -> Vec<Node> {
            self.children(id).map(|child| self.to_node(child)).collect()
        };
        match self.data(id) {
            NodeData::Text(text) => Node::Text(text.clone()),
            NodeData::Element { tag, attrs } => Node::Element {
                tag: tag.clone(),
                attrs: attrs.clone(),
                children: children(),
            },
            NodeData::Fragment => Node::Fragment(children()),
        }
    }

    /// Deep-copy a subtree inside this document. The copy is detached.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let node = self.to_node(id);
        self.materialize(node)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn get(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef::new(self, id)
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    pub fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0].data
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].first_child
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].last_child
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].next_sibling
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].prev_sibling
    }

    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.first_child(id),
        }
    }

    /// All nodes under `root` in document order, `root` excluded.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants::new(self, root)
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.data(id), NodeData::Text(_))
    }

    /// `true` if `ancestor` is `id` itself or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Concatenated text payloads under `id` in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        if let NodeData::Text(text) = self.data(id) {
            return text.clone();
        }
        self.descendants(id)
            .filter_map(|node| match self.data(node) {
                NodeData::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Unlink a node from its parent and siblings. Its subtree stays intact.
    pub fn detach(&mut self, id: NodeId) {
        let slot = &self.nodes[id.0];
        let (parent, prev, next) = (slot.parent, slot.prev_sibling, slot.next_sibling);

        match prev {
            Some(prev) => self.nodes[prev.0].next_sibling = next,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.0].first_child = next;
                }
            }
        }
        match next {
            Some(next) => self.nodes[next.0].prev_sibling = prev,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.0].last_child = prev;
                }
            }
        }

        let slot = &mut self.nodes[id.0];
        slot.parent = None;
        slot.prev_sibling = None;
        slot.next_sibling = None;
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// Appending a fragment moves the fragment's children instead and leaves
    /// the fragment empty.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Insert `child` before `reference` (or at the end when `None`).
    ///
    /// # Panics
    ///
    /// Panics if `parent` is a text node, if `reference` is not a child of
    /// `parent`, or if the insertion would make a node its own ancestor.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        assert!(
            self.data(parent).is_container(),
            "cannot insert into text node {parent}"
        );
        if reference == Some(child) {
            return;
        }
        if let Some(reference) = reference {
            assert_eq!(
                self.parent(reference),
                Some(parent),
                "{reference} is not a child of {parent}"
            );
        }

        if matches!(self.data(child), NodeData::Fragment) {
            while let Some(grandchild) = self.first_child(child) {
                self.insert_before(parent, grandchild, reference);
            }
            return;
        }

        assert!(
            !self.is_inclusive_ancestor(child, parent),
            "{child} cannot be inserted under its own descendant {parent}"
        );

        self.detach(child);

        let prev = match reference {
            Some(reference) => self.prev_sibling(reference),
            None => self.last_child(parent),
        };

        {
            let slot = &mut self.nodes[child.0];
            slot.parent = Some(parent);
            slot.prev_sibling = prev;
            slot.next_sibling = reference;
        }

        match prev {
            Some(prev) => self.nodes[prev.0].next_sibling = Some(child),
            None => self.nodes[parent.0].first_child = Some(child),
        }
        match reference {
            Some(reference) => self.nodes[reference.0].prev_sibling = Some(child),
            None => self.nodes[parent.0].last_child = Some(child),
        }
    }

    /// Put `new` where `old` is and detach `old`.
    ///
    /// A fragment `new` splices its children into `old`'s position. A detached
    /// `old` makes this a no-op for the tree (the fragment keeps its children).
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        if old == new {
            return;
        }
        let Some(parent) = self.parent(old) else {
            return;
        };
        self.insert_before(parent, new, Some(old));
        self.detach(old);
    }

    /// Replace `id` with its own children, in order, and detach it.
    ///
    /// Allocates nothing. A detached `id` is left as is.
    pub fn unwrap(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        while let Some(child) = self.first_child(id) {
            self.insert_before(parent, child, Some(id));
        }
        self.detach(id);
    }

    /// Move every child of `id` into a new detached fragment, keeping order.
    pub fn take_children(&mut self, id: NodeId) -> NodeId {
        let fragment = self.create_fragment();
        while let Some(child) = self.first_child(id) {
            self.append_child(fragment, child);
        }
        fragment
    }

    /// Merge adjacent text nodes and drop empty ones under `root`.
    pub fn normalize(&mut self, root: NodeId) {
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            let mut cursor = self.first_child(id);

            while let Some(current) = cursor {
                if !self.is_text(current) {
                    stack.push(current);
                    cursor = self.next_sibling(current);
                    continue;
                }

                // Absorb every text sibling that directly follows.
                while let Some(next) = self.next_sibling(current) {
                    let NodeData::Text(tail) = self.data(next) else {
                        break;
                    };
                    let tail = tail.clone();
                    if let NodeData::Text(head) = self.data_mut(current) {
                        head.push_str(&tail);
                    }
                    self.detach(next);
                }

                cursor = self.next_sibling(current);
                if matches!(self.data(current), NodeData::Text(text) if text.is_empty()) {
                    self.detach(current);
                }
            }
        }
    }
}

/// Iterator over the direct children of a node.
pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.next_sibling(current);
        Some(current)
    }
}
