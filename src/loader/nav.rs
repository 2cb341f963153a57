//! Current page detection and active navigation links.

use std::sync::LazyLock;

use crate::dom::{Document, NodePath, Selector};

/// Page name assumed when the location path ends in `/`.
pub const DEFAULT_PAGE: &str = "index.html";

/// Class added to navigation links that point at the current page.
pub const ACTIVE_CLASS: &str = "active";

static NAV_LINKS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("nav a").unwrap());

/// Location of the page being processed, as a URL path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    path: String,
}

impl PageLocation {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path segment, or [`DEFAULT_PAGE`] when it is empty.
    pub fn current_page(&self) -> &str {
        match self.path.rsplit('/').next() {
            Some(segment) if !segment.is_empty() => segment,
            _ => DEFAULT_PAGE,
        }
    }

    /// Current page with its first `.html` removed, used to match hrefs.
    pub fn match_key(&self) -> String {
        self.current_page().replacen(".html", "", 1)
    }
}

/// Marks `nav a` links inside `scope` whose href contains the page key.
///
/// Links without an href, or with an empty one, are never marked.
/// Returns the number of links marked.
pub fn mark_active_links(doc: &mut Document, scope: &NodePath, page: &PageLocation) -> usize {
    let key = page.match_key();
    let mut marked = 0;

    for path in doc.select_within(scope, &NAV_LINKS) {
        let Some(link) = doc.element_mut(&path) else {
            continue;
        };
        let matches = link
            .attr("href")
            .is_some_and(|href| !href.is_empty() && href.contains(&key));
        if matches {
            link.add_class(ACTIVE_CLASS);
            marked += 1;
        }
    }

    marked
}
