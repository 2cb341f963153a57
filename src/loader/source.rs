//! Fragment retrieval backends.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

/// Fragment retrieval failure.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Component not found: {0}")]
    NotFound(String),

    #[error("Request for `{url}` returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to read `{0}`")]
    Io(PathBuf, #[source] io::Error),

    #[error("Request for `{0}` failed")]
    Http(String, #[source] reqwest::Error),

    #[error("Cannot resolve `{0}` against the page URL")]
    InvalidUrl(String, #[source] url::ParseError),
}

/// Retrieves fragment bodies by page-relative URL.
///
/// Implementations are shared across parallel requests and must not rely on
/// per-request mutable state.
pub trait FragmentSource: Send + Sync {
    /// Returns the body of the fragment at `url`.
    ///
    /// # Errors
    ///
    /// Returns error when the fragment is missing or cannot be retrieved.
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

impl<S: FragmentSource + ?Sized> FragmentSource for &S {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch(url)
    }
}

/// Reads fragments from disk relative to the page's directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FragmentSource for DirSource {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let path = self.dir.join(url);
        std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FetchError::NotFound(url.to_string()),
            _ => FetchError::Io(path, e),
        })
    }
}

/// Fetches fragments over HTTP relative to the page URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    page: Url,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    /// Creates a source resolving fragment URLs against `page`.
    ///
    /// # Errors
    ///
    /// Returns error if `page` is not an absolute URL or the HTTP client
    /// cannot be constructed.
    pub fn new(page: &str) -> Result<Self, FetchError> {
        let page = Url::parse(page).map_err(|e| FetchError::InvalidUrl(page.to_string(), e))?;
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("sitekit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Http(page.to_string(), e))?;
        Ok(Self { page, client })
    }

    pub fn page(&self) -> &Url {
        &self.page
    }
}

impl FragmentSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let target = self
            .page
            .join(url)
            .map_err(|e| FetchError::InvalidUrl(url.to_string(), e))?;

        let response = self
            .client
            .get(target.clone())
            .send()
            .map_err(|e| FetchError::Http(target.to_string(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: target.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .map_err(|e| FetchError::Http(target.to_string(), e))
    }
}

/// In-memory fragments keyed by exact request URL.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    fragments: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.fragments.insert(url.into(), body.into());
        self
    }
}

impl FragmentSource for MemorySource {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.fragments
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(url.to_string()))
    }
}
