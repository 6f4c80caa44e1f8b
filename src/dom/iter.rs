//! Document-order traversal with explicit repositioning.
//!
//! [`TreeIter`] holds nothing but a [`Cursor`] and a boundary root. Every
//! call to [`TreeIter::next`] derives the successor from the current tree,
//! so a caller that mutates the tree only has to [`reset`](TreeIter::reset)
//! the cursor onto a node that is still attached.
//!
//! # Traversal Order
//!
//! Pre-order, children left to right. Climbing out of a subtree never yields
//! the ancestor again, and the boundary root is never yielded at all.
//!
//! ```text
//! <root>            Enter(root) -> a
//!   <a>             Enter(a)    -> b   (first child)
//!     <b/>          Leave(a)    -> c   (skips a's subtree)
//!   </a>            Enter(b)    -> c   (no child, no sibling: climb)
//!   <c/>            Enter(c)    -> None
//! </root>
//! ```

use super::{Document, NodeId};

/// Logical traversal position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// On a node: its descendants come next.
    Enter(NodeId),
    /// Past a node's subtree: its next sibling (or an ancestor's) comes next.
    Leave(NodeId),
}

/// Restartable pre-order iterator bounded by a root node.
#[derive(Debug, Clone)]
pub struct TreeIter {
    root: NodeId,
    cursor: Cursor,
}

impl TreeIter {
    /// Start before the first child of `root`.
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            cursor: Cursor::Enter(root),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Reposition the cursor. Required after any mutation that detaches the
    /// node under the cursor.
    pub fn reset(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    /// Advance to the next node in document order.
    ///
    /// On exhaustion the cursor is left where it was.
    pub fn next(&mut self, doc: &Document) -> Option<NodeId> {
        let next = match self.cursor {
            Cursor::Enter(id) => doc.first_child(id).or_else(|| self.following(doc, id)),
            Cursor::Leave(id) => self.following(doc, id),
        }?;
        self.cursor = Cursor::Enter(next);
        Some(next)
    }

    /// First node after `id`'s subtree that is still inside the root.
    ///
    /// Returns `None` when `id` is the root, when nothing follows, or when
    /// `id` is no longer connected to the root.
    pub fn following(&self, doc: &Document, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            if current == self.root {
                return None;
            }
            if let Some(sibling) = doc.next_sibling(current) {
                return Some(sibling);
            }
            current = doc.parent(current)?;
        }
    }
}

/// Borrowing iterator over the descendants of a node, see
/// [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    iter: TreeIter,
}

impl<'a> Descendants<'a> {
    pub(super) fn new(doc: &'a Document, root: NodeId) -> Self {
        Self {
            doc,
            iter: TreeIter::new(root),
        }
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.iter.next(self.doc)
    }
}
