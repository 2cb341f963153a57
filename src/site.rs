//! Whole-site build.
//!
//! Walks a site directory, splices components into every HTML page, turns
//! Markdown writeups into full pages and copies everything else verbatim.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::dom::Document;
use crate::layout::writeup_page;
use crate::loader::{ComponentLoader, DirSource, FragmentSource, LoadReport, PageLocation};
use crate::markdown::{document_title, markdown_to_html};
use crate::path::{base_path, page_depth, page_location};

/// Top level directory whose fragments are copied rather than processed.
const COMPONENTS_DIR: &str = "components";

/// Totals for one site build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub pages: usize,
    pub writeups: usize,
    pub copied: usize,
    pub components_loaded: usize,
    pub components_failed: usize,
}

impl BuildSummary {
    fn add(mut self, other: Self) -> Self {
        self.pages += other.pages;
        self.writeups += other.writeups;
        self.copied += other.copied;
        self.components_loaded += other.components_loaded;
        self.components_failed += other.components_failed;
        self
    }

    fn with_report(mut self, report: &LoadReport) -> Self {
        self.components_loaded += report.loaded();
        self.components_failed += report.failed();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SiteFile {
    Page,
    Writeup,
    Asset,
}

impl SiteFile {
    fn classify(relative: &Path) -> Self {
        let in_components = relative
            .components()
            .next()
            .is_some_and(|c| c.as_os_str() == OsStr::new(COMPONENTS_DIR));
        if in_components {
            return SiteFile::Asset;
        }

        match relative.extension().and_then(|e| e.to_str()) {
            Some("html") => SiteFile::Page,
            Some("md") => SiteFile::Writeup,
            _ => SiteFile::Asset,
        }
    }
}

/// Parses `html`, loads its components and serializes the result.
///
/// Component failures are reported, not returned. Markup outside the
/// loaded placeholders comes back byte for byte.
pub fn render_page<S: FragmentSource>(
    html: &str,
    source: S,
    page: &PageLocation,
) -> (String, LoadReport) {
    let mut doc = Document::parse(html);
    let report = ComponentLoader::new(source).load(&mut doc, page);
    (doc.to_html(), report)
}

/// Converts a Markdown writeup into a complete page with components loaded.
pub fn render_writeup<S: FragmentSource>(
    markdown: &str,
    fallback_title: &str,
    depth: usize,
    source: S,
    page: &PageLocation,
) -> (String, LoadReport) {
    let title = document_title(markdown).unwrap_or(fallback_title);
    let body = markdown_to_html(markdown);
    let wrapped = writeup_page(title, &base_path(depth), &body).into_string();
    render_page(&wrapped, source, page)
}

/// Builds the site at `site_root` into `output`.
///
/// # Errors
///
/// Returns error if the site cannot be walked, or any file fails to read,
/// parse or write. Missing components never fail the build.
pub fn build_site(site_root: &Path, output: &Path) -> Result<BuildSummary> {
    fs::create_dir_all(output).context("Failed to create output directory")?;
    let skip = output.canonicalize().ok();

    let mut files = Vec::new();
    collect_files(site_root, Path::new(""), skip.as_deref(), &mut files)
        .with_context(|| format!("Failed to walk site: {}", site_root.display()))?;
    debug!(count = files.len(), "Collected site files");

    let summaries = files
        .par_iter()
        .map(|relative| {
            build_file(site_root, relative, output)
                .with_context(|| format!("Failed to build {}", relative.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(summaries
        .into_iter()
        .fold(BuildSummary::default(), BuildSummary::add))
}

fn collect_files(
    root: &Path,
    relative: &Path,
    skip: Option<&Path>,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    let dir = root.join(relative);
    let mut entries = fs::read_dir(&dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        let child = relative.join(&name);

        if entry.file_type()?.is_dir() {
            if skip.is_some_and(|s| path.canonicalize().is_ok_and(|p| p.as_path() == s)) {
                continue;
            }
            collect_files(root, &child, skip, files)?;
        } else {
            files.push(child);
        }
    }

    Ok(())
}

fn build_file(site_root: &Path, relative: &Path, output: &Path) -> Result<BuildSummary> {
    let source_path = site_root.join(relative);
    let source_dir = source_path.parent().unwrap_or(site_root);

    match SiteFile::classify(relative) {
        SiteFile::Page => {
            let html = fs::read_to_string(&source_path).context("Failed to read page")?;
            let page = PageLocation::new(page_location(relative));
            let (rendered, report) = render_page(&html, DirSource::new(source_dir), &page);
            write_output(&output.join(relative), &rendered)?;
            Ok(BuildSummary {
                pages: 1,
                ..Default::default()
            }
            .with_report(&report))
        }
        SiteFile::Writeup => {
            let markdown = fs::read_to_string(&source_path).context("Failed to read writeup")?;
            let target = relative.with_extension("html");
            let stem = relative
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let page = PageLocation::new(page_location(&target));
            let (rendered, report) = render_writeup(
                &markdown,
                &stem,
                page_depth(relative),
                DirSource::new(source_dir),
                &page,
            );
            write_output(&output.join(&target), &rendered)?;
            Ok(BuildSummary {
                writeups: 1,
                ..Default::default()
            }
            .with_report(&report))
        }
        SiteFile::Asset => {
            let target = output.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).context("Failed to create output directory")?;
            }
            fs::copy(&source_path, &target).context("Failed to copy asset")?;
            Ok(BuildSummary {
                copied: 1,
                ..Default::default()
            })
        }
    }
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Generated: {}", path.display());
    Ok(())
}
