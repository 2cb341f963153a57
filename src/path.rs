//! Relative path helpers for pages at different site depths.

use std::path::{Component, Path};

/// Calculates how many directories separate a page from the site root.
///
/// # Arguments
///
/// * `relative`: Page path relative to the site root
///
/// # Returns
///
/// Number of `../` prefixes needed to reach the site root
pub fn page_depth(relative: &Path) -> usize {
    relative
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .count()
        })
        .unwrap_or(0)
}

/// Base path prefix for a page at `depth`, empty at the root.
pub fn base_path(depth: usize) -> String {
    "../".repeat(depth)
}

/// URL path for a page, rooted at `/` with forward slashes.
pub fn page_location(relative: &Path) -> String {
    let segments: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    format!("/{}", segments.join("/"))
}
