//! Source-preserving HTML document model.
//!
//! Pages and fragments are parsed into nodes that remember their exact
//! source text. They can be queried with a small selector subset and mutated
//! in place (class lists, children). Serializing writes every untouched byte
//! back unchanged.

mod node;
mod parse;
mod select;

use thiserror::Error;

pub use node::{Attribute, Element, Node, render_nodes};
pub use parse::parse_fragment;
pub use select::Selector;

/// Errors raised while parsing selectors.
#[derive(Debug, Error)]
pub enum DomError {
    #[error("Invalid selector `{0}`")]
    Selector(String),
}

/// Child index path from the document root to an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Returns true if `self` lies strictly inside `ancestor`.
    pub fn is_inside(&self, ancestor: &NodePath) -> bool {
        self.0.len() > ancestor.0.len() && self.0.starts_with(&ancestor.0)
    }

    fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }
}

/// Parsed HTML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    children: Vec<Node>,
}

impl Document {
    /// Parses a complete HTML document.
    ///
    /// The doctype and anything else outside the root element is kept
    /// verbatim, so `Document::parse(html).to_html() == html`.
    pub fn parse(html: &str) -> Self {
        Self {
            children: parse_fragment(html),
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Serializes the document back to HTML.
    pub fn to_html(&self) -> String {
        render_nodes(&self.children)
    }

    pub fn element(&self, path: &NodePath) -> Option<&Element> {
        let (first, rest) = path.0.split_first()?;
        let mut current = self.children.get(*first)?.as_element()?;
        for index in rest {
            current = current.children().get(*index)?.as_element()?;
        }
        Some(current)
    }

    pub fn element_mut(&mut self, path: &NodePath) -> Option<&mut Element> {
        let (first, rest) = path.0.split_first()?;
        let mut current = self.children.get_mut(*first)?.as_element_mut()?;
        for index in rest {
            current = current.children_mut().get_mut(*index)?.as_element_mut()?;
        }
        Some(current)
    }

    /// Returns every element matching `selector`, in document order.
    pub fn select(&self, selector: &Selector) -> Vec<NodePath> {
        let mut found = Vec::new();
        let mut ancestors = Vec::new();
        collect(
            &self.children,
            &NodePath::default(),
            &mut ancestors,
            selector,
            &mut found,
        );
        found
    }

    /// Returns matches strictly inside `scope`, in document order.
    ///
    /// Ancestors above `scope` still satisfy descendant combinators, the same
    /// way `element.querySelectorAll` behaves in a browser.
    pub fn select_within(&self, scope: &NodePath, selector: &Selector) -> Vec<NodePath> {
        self.select(selector)
            .into_iter()
            .filter(|path| path.is_inside(scope))
            .collect()
    }
}

fn collect<'a>(
    nodes: &'a [Node],
    parent: &NodePath,
    ancestors: &mut Vec<&'a Element>,
    selector: &Selector,
    found: &mut Vec<NodePath>,
) {
    for (index, node) in nodes.iter().enumerate() {
        let Node::Element(element) = node else {
            continue;
        };
        let path = parent.child(index);
        if selector.matches(element, ancestors) {
            found.push(path.clone());
        }
        ancestors.push(element);
        collect(element.children(), &path, ancestors, selector, found);
        ancestors.pop();
    }
}
