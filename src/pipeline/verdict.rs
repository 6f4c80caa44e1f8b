//! What a transform decides about a node.

use crate::dom::Node;

/// Outcome of applying one transform to one node.
///
/// | Verdict      | Effect on the node                                   |
/// |--------------|------------------------------------------------------|
/// | `Pass`       | none, the next transform gets the node               |
/// | `Delete`     | removed with its subtree                             |
/// | `Unwrap`     | replaced by its own children                         |
/// | `Keep`       | accepted as is, its subtree is not visited           |
/// | `Replace(n)` | replaced by `n`, remaining transforms run on `n`     |
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Verdict {
    #[default]
    Pass,
    Delete,
    Unwrap,
    Keep,
    /// Replace with a text node, an element subtree, or the children of a
    /// fragment. An empty fragment behaves like [`Verdict::Delete`].
    Replace(Node),
}

impl Verdict {
    /// Replace with a text node. Numbers are stringified.
    pub fn text(value: impl ToString) -> Self {
        Self::Replace(Node::text(value))
    }

    pub fn replace(node: impl Into<Node>) -> Self {
        Self::Replace(node.into())
    }

    /// Replace with the given siblings, spliced in order.
    pub fn fragment(children: impl IntoIterator<Item = Node>) -> Self {
        Self::Replace(Node::fragment(children))
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl From<Node> for Verdict {
    fn from(node: Node) -> Self {
        Self::Replace(node)
    }
}
