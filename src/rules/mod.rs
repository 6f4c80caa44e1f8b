//! Declarative transforms.
//!
//! A [`Rule`] is the TOML-friendly description of a transform: a selector,
//! optional text / attribute filters and an action. [`Rule::compile`] turns
//! it into a [`RuleTransform`] that plugs into a [`Pipeline`](crate::pipeline::Pipeline).
//!
//! ```toml
//! [[rule]]
//! match = "p"
//! text = "advertisement"
//! action = "delete"
//!
//! [[rule]]
//! match = "b"
//! action = "replace"
//! with = "<strong>bold</strong>"
//! ```

mod selector;

pub use selector::{AttrFilter, Selector};

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dom::{Node, NodeRef};
use crate::html::{self, HtmlError};
use crate::pipeline::{Transform, Verdict};

// ============================================================================
// Rule
// ============================================================================

/// What a matching rule does to the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Delete,
    Unwrap,
    Keep,
    Replace,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Delete => "delete",
            Self::Unwrap => "unwrap",
            Self::Keep => "keep",
            Self::Replace => "replace",
        })
    }
}

/// One `[[rule]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Tag name, `#text` for text nodes, or `*` for any element.
    #[serde(rename = "match")]
    pub selector: String,

    /// Only match nodes whose trimmed text content equals this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Attribute filter: `name` (presence) or `name=value`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<String>,

    pub action: Action,

    /// Replacement markup, required when `action = "replace"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with: Option<String>,

    /// Label used in logs and errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Problems found while compiling a rule.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("`match` must not be empty")]
    EmptySelector,

    #[error("`{0}` is not a tag name, `#text` or `*`")]
    InvalidSelector(String),

    #[error("`attr` must be `name` or `name=value`, got `{0}`")]
    InvalidAttr(String),

    #[error("`action = \"replace\"` needs a `with` value")]
    MissingReplacement,

    #[error("`with` is only used by `action = \"replace\"`")]
    UnexpectedReplacement,

    #[error("`with` is not valid HTML")]
    Html(#[from] HtmlError),
}

impl RuleError {
    /// Rule field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptySelector | Self::InvalidSelector(_) => "match",
            Self::InvalidAttr(_) => "attr",
            Self::MissingReplacement | Self::UnexpectedReplacement | Self::Html(_) => "with",
        }
    }
}

impl Rule {
    pub fn new(selector: impl Into<String>, action: Action) -> Self {
        Self {
            selector: selector.into(),
            text: None,
            attr: None,
            action,
            with: None,
            name: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_attr(mut self, attr: impl Into<String>) -> Self {
        self.attr = Some(attr.into());
        self
    }

    pub fn with_replacement(mut self, html: impl Into<String>) -> Self {
        self.with = Some(html.into());
        self
    }

    /// Validate the rule and build its transform.
    pub fn compile(&self) -> Result<RuleTransform, RuleError> {
        let selector = self.selector.parse::<Selector>()?;
        let attr = self.attr.as_deref().map(str::parse::<AttrFilter>).transpose()?;

        let verdict = match (self.action, self.with.as_deref()) {
            (Action::Replace, Some(markup)) => Verdict::Replace(replacement(markup)?),
            (Action::Replace, None) => return Err(RuleError::MissingReplacement),
            (_, Some(_)) => return Err(RuleError::UnexpectedReplacement),
            (Action::Delete, None) => Verdict::Delete,
            (Action::Unwrap, None) => Verdict::Unwrap,
            (Action::Keep, None) => Verdict::Keep,
        };

        let name = self
            .name
            .clone()
            .unwrap_or_else(|| format!("{} {}", self.action, self.selector));

        Ok(RuleTransform {
            name,
            selector,
            text: self.text.clone(),
            attr,
            verdict,
        })
    }
}

/// Parse replacement markup: one node stays itself, several become a fragment.
fn replacement(markup: &str) -> Result<Node, HtmlError> {
    let mut nodes = html::parse_nodes(markup)?;
    Ok(if nodes.len() == 1 {
        nodes.remove(0)
    } else {
        Node::Fragment(nodes)
    })
}

// ============================================================================
// RuleTransform
// ============================================================================

/// Compiled [`Rule`].
#[derive(Debug, Clone)]
pub struct RuleTransform {
    name: String,
    selector: Selector,
    text: Option<String>,
    attr: Option<AttrFilter>,
    verdict: Verdict,
}

impl RuleTransform {
    pub fn matches(&self, node: NodeRef<'_>) -> bool {
        self.selector.matches(node)
            && self.attr.as_ref().is_none_or(|attr| attr.matches(node))
            && self
                .text
                .as_deref()
                .is_none_or(|text| node.text_content().trim() == text)
    }
}

impl Transform for RuleTransform {
    fn apply(&mut self, node: NodeRef<'_>) -> anyhow::Result<Verdict> {
        Ok(if self.matches(node) {
            self.verdict.clone()
        } else {
            Verdict::Pass
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
