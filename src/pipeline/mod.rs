//! Single-pass DOM rewriting pipeline.
//!
//! Walks the subtree under a root once, in document order, and hands every
//! visited node to each transform in registration order. The first verdict
//! that is not [`Verdict::Pass`] decides what happens to the node.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Pipeline::run                        │
//! │                                                         │
//! │  TreeIter ──► node ──► t[0] ─► t[1] ─► ... ─► t[n-1]    │
//! │     ▲                    │ first non-Pass verdict       │
//! │     │                    ▼                              │
//! │     └──── reset(cursor) ◄── mutate Document             │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! - `Delete` / `Unwrap`: cursor moves to the previous sibling (or parent)
//!   before the mutation, so the next visit is whatever now follows it.
//! - `Keep`: the node following the kept subtree is visited next.
//! - `Replace`: the replacement takes the node's place and the *remaining*
//!   transforms run on it (never the one that produced it).
//!
//! Normalization (merging adjacent text) runs once after the traversal.

mod error;
mod transform;
mod verdict;

#[cfg(test)]
mod tests;

pub use error::PipelineError;
pub use transform::{FnTransform, Transform, from_fn};
pub use verdict::Verdict;

use std::fmt;

use anyhow::Result;

use crate::debug;
use crate::dom::{Cursor, Document, Node, NodeId, NodeRef, TreeIter};

// =============================================================================
// Types
// =============================================================================

/// Run options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Merge adjacent text nodes under the root after the traversal.
    pub normalize: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { normalize: true }
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub visited: usize,
    pub deleted: usize,
    pub unwrapped: usize,
    pub kept: usize,
    pub replaced: usize,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "visited {} nodes: {} deleted, {} unwrapped, {} kept, {} replaced",
            self.visited, self.deleted, self.unwrapped, self.kept, self.replaced
        )
    }
}

/// How traversal continues after a node has been handled.
enum Step {
    /// Ask the iterator for the successor of its (possibly reset) cursor.
    Advance,
    /// Visit this node next. Set by `Keep`, overrides the iterator.
    Jump(Option<NodeId>),
}

/// Ordered list of transforms plus the traversal engine.
///
/// ```ignore
/// let mut pipeline = Pipeline::new()
///     .pipe_fn(|node| Ok(if node.is("script") { Verdict::Delete } else { Verdict::Pass }))
///     .pipe_fn(|node| Ok(if node.is("font") { Verdict::Unwrap } else { Verdict::Pass }));
///
/// pipeline.run(&mut doc, body)?;
/// ```
#[derive(Default)]
pub struct Pipeline<'a> {
    transforms: Vec<Box<dyn Transform + 'a>>,
    options: PipelineOptions,
    stats: RunStats,
}

impl<'a> Pipeline<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: PipelineOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Toggle the post-run text normalization.
    pub fn normalize(mut self, normalize: bool) -> Self {
        self.options.normalize = normalize;
        self
    }

    /// Append a transform. Insertion order is application order.
    pub fn pipe(mut self, transform: impl Transform + 'a) -> Self {
        self.transforms.push(Box::new(transform));
        self
    }

    /// Append a closure as a transform.
    pub fn pipe_fn<F>(self, f: F) -> Self
    where
        F: FnMut(NodeRef<'_>) -> Result<Verdict> + 'a,
    {
        self.pipe(from_fn(f))
    }

    /// Append a transform without consuming the pipeline.
    pub fn push(&mut self, transform: impl Transform + 'a) -> &mut Self {
        self.transforms.push(Box::new(transform));
        self
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    /// Counters of the most recent run.
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    // =========================================================================
    // Run
    // =========================================================================

    /// Rewrite the subtree under `root` in place and return `root`.
    ///
    /// `root` itself is never visited, removed or replaced. A transform error
    /// aborts the run and leaves the tree as it was at that point; run on
    /// [`Document::clone_subtree`] and swap in on success if that matters.
    pub fn run(&mut self, doc: &mut Document, root: NodeId) -> Result<NodeId, PipelineError> {
        if !doc.data(root).is_container() {
            return Err(PipelineError::NotAContainer(root));
        }

        self.stats = RunStats::default();
        let mut iter = TreeIter::new(root);
        let mut next = iter.next(doc);

        while let Some(node) = next {
            self.stats.visited += 1;
            next = match self.visit(doc, &mut iter, node)? {
                Step::Advance => iter.next(doc),
                Step::Jump(target) => {
                    if let Some(target) = target {
                        iter.reset(Cursor::Enter(target));
                    }
                    target
                }
            };
        }

        if self.options.normalize {
            doc.normalize(root);
        }

        debug!("pipeline"; "{}", self.stats);
        Ok(root)
    }

    /// Apply the transforms to one node, mutating the tree and repositioning
    /// the iterator as the first non-`Pass` verdict demands.
    fn visit(
        &mut self,
        doc: &mut Document,
        iter: &mut TreeIter,
        mut node: NodeId,
    ) -> Result<Step, PipelineError> {
        let stats = &mut self.stats;

        for (index, transform) in self.transforms.iter_mut().enumerate() {
            let verdict = transform
                .apply(doc.get(node))
                .map_err(|source| PipelineError::Transform {
                    index,
                    name: transform.name().to_string(),
                    source,
                })?;

            match verdict {
                Verdict::Pass => {}
                Verdict::Delete => {
                    debug!("pipeline"; "delete {}", doc.get(node));
                    remove(doc, iter, node);
                    stats.deleted += 1;
                    return Ok(Step::Advance);
                }
                Verdict::Unwrap => {
                    debug!("pipeline"; "unwrap {}", doc.get(node));
                    iter.reset(anchor_before(doc, iter.root(), node));
                    doc.unwrap(node);
                    stats.unwrapped += 1;
                    return Ok(Step::Advance);
                }
                Verdict::Keep => {
                    stats.kept += 1;
                    return Ok(Step::Jump(iter.following(doc, node)));
                }
                Verdict::Replace(replacement) => {
                    let Some(first) = splice(doc, node, replacement) else {
                        debug!("pipeline"; "replace {} with nothing", doc.get(node));
                        remove(doc, iter, node);
                        stats.deleted += 1;
                        return Ok(Step::Advance);
                    };
                    debug!("pipeline"; "replace {} with {}", doc.get(node), doc.get(first));
                    iter.reset(Cursor::Enter(first));
                    node = first;
                    stats.replaced += 1;
                }
            }
        }

        Ok(Step::Advance)
    }
}

/// Cursor that makes the iterator yield whatever ends up in `node`'s place:
/// past the previous sibling, or at the start of the parent.
fn anchor_before(doc: &Document, root: NodeId, node: NodeId) -> Cursor {
    match doc.prev_sibling(node) {
        Some(prev) => Cursor::Leave(prev),
        None => Cursor::Enter(doc.parent(node).unwrap_or(root)),
    }
}

fn remove(doc: &mut Document, iter: &mut TreeIter, node: NodeId) {
    iter.reset(anchor_before(doc, iter.root(), node));
    doc.detach(node);
}

/// Put `replacement` in `node`'s place and return the node to continue with:
/// the replacement itself, or a fragment's first child. Returns `None` (and
/// leaves the tree untouched) for a fragment without children.
fn splice(doc: &mut Document, node: NodeId, replacement: Node) -> Option<NodeId> {
    if replacement.is_empty_fragment() {
        return None;
    }
    let is_fragment = replacement.is_fragment();
    let new = doc.materialize(replacement);
    let first = if is_fragment {
        doc.first_child(new)?
    } else {
        new
    };
    doc.replace(node, new);
    Some(first)
}
