//! Descendant-combinator selector subset.

use std::str::FromStr;

use super::{DomError, Element};

/// One selector step: `tag.class[attr]`, every part optional.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
    attrs: Vec<String>,
}

impl Compound {
    fn parse(text: &str) -> Option<Self> {
        let mut compound = Self::default();
        let mut rest = text;

        let tag_end = rest.find(['.', '[']).unwrap_or(rest.len());
        if tag_end > 0 {
            compound.tag = Some(rest[..tag_end].to_lowercase());
        }
        rest = &rest[tag_end..];

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('.') {
                let end = after.find(['.', '[']).unwrap_or(after.len());
                if end == 0 {
                    return None;
                }
                compound.classes.push(after[..end].to_string());
                rest = &after[end..];
            } else if let Some(after) = rest.strip_prefix('[') {
                let end = after.find(']')?;
                if end == 0 {
                    return None;
                }
                compound.attrs.push(after[..end].to_string());
                rest = &after[end + 1..];
            } else {
                return None;
            }
        }

        Some(compound)
    }

    fn matches(&self, element: &Element) -> bool {
        self.tag.as_ref().is_none_or(|tag| tag == element.name())
            && self.classes.iter().all(|class| element.has_class(class))
            && self.attrs.iter().all(|attr| element.has_attr(attr))
    }
}

/// Space separated compounds, each a descendant of the previous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    compounds: Vec<Compound>,
}

impl Selector {
    /// Parses selectors such as `nav a`, `.tag-filter .tag` or
    /// `[data-component]`.
    ///
    /// # Errors
    ///
    /// Returns error for an empty selector or an unsupported step.
    pub fn parse(text: &str) -> Result<Self, DomError> {
        let compounds = text
            .split_ascii_whitespace()
            .map(Compound::parse)
            .collect::<Option<Vec<_>>>()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| DomError::Selector(text.to_string()))?;
        Ok(Self { compounds })
    }

    /// Matches `element` given its ancestors, outermost first.
    pub fn matches(&self, element: &Element, ancestors: &[&Element]) -> bool {
        let Some((last, outer)) = self.compounds.split_last() else {
            return false;
        };
        if !last.matches(element) {
            return false;
        }

        // Nearest ancestor first; greedy is exact for descendant-only chains.
        let mut pending = outer.iter().rev().peekable();
        for ancestor in ancestors.iter().rev() {
            match pending.peek() {
                Some(compound) if compound.matches(ancestor) => {
                    pending.next();
                }
                Some(_) => {}
                None => break,
            }
        }
        pending.peek().is_none()
    }
}

impl FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
