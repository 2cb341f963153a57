//! Component splicing, tag filtering and Markdown conversion for static sites.

mod config;
pub mod dom;
pub mod filter;
mod layout;
pub mod loader;
mod markdown;
pub mod path;
pub mod site;

pub use config::{Command, Config};
pub use dom::{Document, DomError, NodePath, Selector};
pub use filter::{FilterError, FilterState, TagFilter, Transition, Visibility};
pub use layout::writeup_page;
pub use loader::{
    ComponentLoader, DirSource, FetchError, FragmentSource, HttpSource, LoadError, LoadReport,
    MemorySource, PageLocation,
};
pub use markdown::{document_title, markdown_to_html};
pub use site::{BuildSummary, build_site, render_page, render_writeup};
