//! The unit of pipeline composition.

use std::borrow::Cow;

use anyhow::Result;

use crate::dom::NodeRef;

use super::Verdict;

/// A node-to-verdict mapping applied to every visited node.
///
/// Returning an error aborts the whole run.
pub trait Transform {
    fn apply(&mut self, node: NodeRef<'_>) -> Result<Verdict>;

    /// Name shown in logs and errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<T: Transform + ?Sized> Transform for Box<T> {
    fn apply(&mut self, node: NodeRef<'_>) -> Result<Verdict> {
        (**self).apply(node)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Transform backed by a closure, see [`from_fn`].
pub struct FnTransform<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> FnTransform<F> {
    /// Give the transform a readable name for logs and errors.
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }
}

impl<F> Transform for FnTransform<F>
where
    F: FnMut(NodeRef<'_>) -> Result<Verdict>,
{
    fn apply(&mut self, node: NodeRef<'_>) -> Result<Verdict> {
        (self.f)(node)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Build a transform from a closure.
///
/// ```ignore
/// let drop_ads = from_fn(|node| {
///     Ok(if node.attr("class") == Some("ad") { Verdict::Delete } else { Verdict::Pass })
/// });
/// ```
pub fn from_fn<F>(f: F) -> FnTransform<F>
where
    F: FnMut(NodeRef<'_>) -> Result<Verdict>,
{
    FnTransform {
        name: Cow::Borrowed("fn"),
        f,
    }
}
