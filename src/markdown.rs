//! Markdown to HTML conversion for writeups.
//!
//! Conversion is a fixed sequence of regex substitutions over the whole
//! input rather than a parse tree, so output on malformed or nested input
//! follows the substitution order exactly.

mod convert;

pub use convert::{document_title, markdown_to_html};
