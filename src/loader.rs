//! Shared component loading.
//!
//! Pages mark placeholder elements with `data-component="<name>"` and an
//! optional `data-base-path`. The loader fetches
//! `<base path>components/<name>.html` for each placeholder, substitutes the
//! `{{BASE_PATH}}` token, injects the result as the placeholder's content and
//! highlights navigation links pointing at the current page.

mod nav;
mod source;

use rayon::prelude::*;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, warn};

use crate::dom::{self, Document, NodePath, Selector};

pub use nav::{ACTIVE_CLASS, DEFAULT_PAGE, PageLocation, mark_active_links};
pub use source::{DirSource, FetchError, FragmentSource, HttpSource, MemorySource};

/// Attribute naming the component to load.
pub const COMPONENT_ATTR: &str = "data-component";

/// Attribute carrying the relative path prefix for nested pages.
pub const BASE_PATH_ATTR: &str = "data-base-path";

/// Directory holding fragments, relative to the base path.
pub const COMPONENTS_DIR: &str = "components/";

/// Token in fragments replaced with the placeholder's base path.
pub const BASE_PATH_TOKEN: &str = "{{BASE_PATH}}";

static PLACEHOLDERS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(&format!("[{}]", COMPONENT_ATTR)).unwrap());

/// Why a single placeholder was left untouched.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Placeholder disappeared before its fragment was applied")]
    Detached,
}

/// Fragment request derived from one placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentRequest {
    pub path: NodePath,
    pub component: String,
    pub base_path: String,
}

impl FragmentRequest {
    /// Page-relative URL of the fragment.
    pub fn url(&self) -> String {
        format!("{}{}{}.html", self.base_path, COMPONENTS_DIR, self.component)
    }
}

/// Outcome of one placeholder.
#[derive(Debug)]
pub struct ComponentOutcome {
    pub request: FragmentRequest,
    /// Number of navigation links marked active on success.
    pub result: Result<usize, LoadError>,
}

/// Per-placeholder outcomes in document order.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub outcomes: Vec<ComponentOutcome>,
}

impl LoadReport {
    pub fn loaded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.loaded()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Splices shared fragments into component placeholders.
#[derive(Debug, Clone)]
pub struct ComponentLoader<S> {
    source: S,
}

impl<S: FragmentSource> ComponentLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Collects one request per placeholder present in `doc`.
    pub fn requests(&self, doc: &Document) -> Vec<FragmentRequest> {
        doc.select(&PLACEHOLDERS)
            .into_iter()
            .filter_map(|path| {
                let element = doc.element(&path)?;
                let component = element.attr(COMPONENT_ATTR)?.to_string();
                let base_path = element.attr(BASE_PATH_ATTR).unwrap_or("").to_string();
                Some(FragmentRequest {
                    path,
                    component,
                    base_path,
                })
            })
            .collect()
    }

    /// Loads every placeholder in `doc`.
    ///
    /// Fragments are fetched in parallel. Failures are logged and leave the
    /// placeholder as it was; they never abort the other placeholders. Only
    /// placeholder content and the class of links inside it change; every
    /// other byte of the page serializes as it was parsed.
    pub fn load(&self, doc: &mut Document, page: &PageLocation) -> LoadReport {
        let requests = self.requests(doc);

        let fetched: Vec<(FragmentRequest, Result<Vec<dom::Node>, LoadError>)> = requests
            .into_par_iter()
            .map(|request| {
                let fragment = self.fetch(&request);
                (request, fragment)
            })
            .collect();

        // Later placeholders first: a nested placeholder is then replaced by
        // its ancestor's content rather than invalidating the ancestor path.
        let mut outcomes: Vec<ComponentOutcome> = fetched
            .into_iter()
            .rev()
            .map(|(request, fragment)| {
                let result = fragment.and_then(|nodes| apply(doc, &request.path, nodes, page));
                if let Err(e) = &result {
                    warn!(component = %request.component, url = %request.url(), "Component load error: {e:#}");
                }
                ComponentOutcome { request, result }
            })
            .collect();
        outcomes.reverse();

        LoadReport { outcomes }
    }

    fn fetch(&self, request: &FragmentRequest) -> Result<Vec<dom::Node>, LoadError> {
        let url = request.url();
        debug!(component = %request.component, %url, "Fetching fragment");

        let body = self.source.fetch(&url)?;
        let html = body.replace(BASE_PATH_TOKEN, &request.base_path);
        Ok(dom::parse_fragment(&html))
    }
}

fn apply(
    doc: &mut Document,
    path: &NodePath,
    nodes: Vec<dom::Node>,
    page: &PageLocation,
) -> Result<usize, LoadError> {
    doc.element_mut(path)
        .ok_or(LoadError::Detached)?
        .set_children(nodes);
    Ok(mark_active_links(doc, path, page))
}
