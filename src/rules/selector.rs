//! Node selectors for rules.

use std::str::FromStr;

use crate::dom::NodeRef;

use super::RuleError;

/// Which nodes a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Elements with this (lowercase) tag name.
    Tag(String),
    /// Text nodes (`#text`).
    Text,
    /// Any element (`*`).
    AnyElement,
}

impl Selector {
    pub fn matches(&self, node: NodeRef<'_>) -> bool {
        match self {
            Self::Tag(tag) => node.is(tag),
            Self::Text => node.is_text(),
            Self::AnyElement => node.is_element(),
        }
    }
}

impl FromStr for Selector {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(RuleError::EmptySelector),
            "#text" => Ok(Self::Text),
            "*" => Ok(Self::AnyElement),
            tag if is_tag_name(tag) => Ok(Self::Tag(tag.to_ascii_lowercase())),
            other => Err(RuleError::InvalidSelector(other.to_string())),
        }
    }
}

fn is_tag_name(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_alphabetic())
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Attribute condition: presence, or exact value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrFilter {
    name: String,
    value: Option<String>,
}

impl AttrFilter {
    pub fn matches(&self, node: NodeRef<'_>) -> bool {
        match (&self.value, node.attr(&self.name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(expected), Some(actual)) => expected == actual,
        }
    }
}

impl FromStr for AttrFilter {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = match s.split_once('=') {
            Some((name, value)) => (name.trim(), Some(unquote(value.trim()).to_string())),
            None => (s.trim(), None),
        };
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(RuleError::InvalidAttr(s.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            value,
        })
    }
}

/// Strip one pair of matching quotes.
fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|s| s.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}
