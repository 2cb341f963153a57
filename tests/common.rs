//! Shared test utilities for integration tests.
//!
//! Provides a small sample site with shared components, nested pages,
//! a Markdown writeup and a static asset.

#![allow(dead_code)]

use anyhow::Result;
use std::path::Path;
use tempfile::TempDir;

pub const HEADER: &str = r#"<header class="site-header">
<a href="{{BASE_PATH}}index.html" class="logo">ctf notes</a>
<nav>
<a href="{{BASE_PATH}}index.html">Home</a>
<a href="{{BASE_PATH}}writeups.html">Writeups</a>
<a href="{{BASE_PATH}}about.html">About</a>
</nav>
</header>"#;

pub const FOOTER: &str = r#"<footer><p>Built by hand. <a href="{{BASE_PATH}}about.html">Contact</a></p></footer>"#;

pub const WRITEUPS_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><title>Writeups</title></head>
<body>
<div data-component="header"></div>
<div class="tag-filter">
<button class="tag" data-tag="web">web</button>
<button class="tag" data-tag="pwn">pwn</button>
<button class="tag" data-tag="crypto">crypto</button>
</div>
<section class="writeup-section" id="picoctf">
<article class="writeup-item" data-tags="web,crypto"><a href="writeups/jwt.html">JWT</a></article>
<article class="writeup-item" data-tags="web"><a href="writeups/sqli.html">SQLi</a></article>
</section>
<section class="writeup-section" id="hackthebox">
<article class="writeup-item" data-tags="pwn"><a href="writeups/rop.html">ROP</a></article>
<article class="writeup-item" data-tags=""><a href="writeups/misc.html">Misc</a></article>
</section>
<div data-component="footer"></div>
</body>
</html>"#;

pub const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><title>Home</title></head>
<body>
<div data-component="header"></div>
<p>Welcome</p>
<div data-component="sidebar"><p>sidebar fallback</p></div>
<div data-component="footer"></div>
</body>
</html>"#;

/// Hand-written page with markup a browser accepts but a strict parser
/// would rewrite: unquoted and single-quoted attributes, self-closing void
/// tags, inline script and style, implied `p`/`li` ends, a stray end tag and
/// a commented-out placeholder.
pub const LOOSE_PAGE: &str = r#"<!doctype html>
<html lang=en>
<head>
<meta charset=utf-8>
<title>Notes &amp; links</title>
<link rel='stylesheet' href=css/style.css />
<style>nav > a { color: red } /* <div data-component="footer"> */</style>
<script>if (a < b && c > d) { x = '<div>'; }</script>
</head>
<body>
<div data-component=header></div>
<p>First paragraph<br/>with a break
<p>Second <img src=logo.png alt=''> paragraph
<ul><li>one<li>two</ul>
<div data-component='sidebar'><p>Loading<br/>please wait</p></div>
<textarea><b>not bold</b></textarea>
</p>
<!-- <div data-component="footer"></div> -->
</body>
</html>
"#;

pub const ROP_WRITEUP: &str = "# Return Oriented Programming\n\
Some **gadgets** and *notes*.\n\
```\npop rdi; ret\n```\n\
> chain them\n\
See [the binary](files/vuln).";

/// Creates a sample site in a temporary directory.
///
/// # Errors
///
/// Returns error if directory creation or file writes fail
pub fn create_test_site() -> Result<TempDir> {
    let dir = TempDir::new()?;
    let root = dir.path();

    write_file(root, "components/header.html", HEADER)?;
    write_file(root, "components/footer.html", FOOTER)?;
    write_file(root, "index.html", INDEX_PAGE)?;
    write_file(root, "writeups.html", WRITEUPS_PAGE)?;
    write_file(root, "writeups/rop.md", ROP_WRITEUP)?;
    write_file(root, "css/style.css", "body { margin: 0; }\n")?;

    Ok(dir)
}

/// Writes file below `root`, creating parent directories as needed.
///
/// # Errors
///
/// Returns error if directory creation or file write fails
pub fn write_file(root: &Path, path: &str, content: &str) -> Result<()> {
    let file_path = root.join(path);
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}
