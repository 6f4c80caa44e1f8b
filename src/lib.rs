//! Single-pass DOM rewriting.
//!
//! A [`Pipeline`](pipeline::Pipeline) walks a [`Document`](dom::Document)
//! in pre-order and hands every node to an ordered list of transforms. The
//! first transform that returns something other than
//! [`Verdict::Pass`](pipeline::Verdict::Pass) decides what happens to the
//! node: it is deleted, unwrapped, kept (its subtree skipped) or replaced.
//!
//! ```
//! use html_pipeline::{html, pipeline::{Pipeline, Verdict}};
//!
//! let mut doc = html::parse("<p><b>bold</b> text</p><script>x()</script>").unwrap();
//! let root = doc.root();
//!
//! Pipeline::new()
//!     .pipe_fn(|node| Ok(if node.is("script") { Verdict::Delete } else { Verdict::Pass }))
//!     .pipe_fn(|node| Ok(if node.is("b") { Verdict::Unwrap } else { Verdict::Pass }))
//!     .run(&mut doc, root)
//!     .unwrap();
//!
//! assert_eq!(html::render_children(&doc, root), "<p>bold text</p>");
//! ```

pub mod config;
pub mod dom;
pub mod html;
pub mod logger;
pub mod pipeline;
pub mod rules;
