//! Page wrapper for converted writeups

use maud::{DOCTYPE, Markup, PreEscaped, html};

/// Wraps converted Markdown in a complete page
///
/// The page carries header and footer component placeholders so the
/// component loader can splice in the shared site chrome. Both placeholders
/// and the stylesheet link use the same base path, which lets writeups live
/// at any depth below the site root.
///
/// # Arguments
///
/// * `title`: Page title text
/// * `base_path`: Relative prefix back to the site root (`""`, `"../"`, ...)
/// * `body_html`: Converted writeup HTML, inserted without escaping
///
/// # Returns
///
/// Complete HTML document
pub fn writeup_page(title: &str, base_path: &str, body_html: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="stylesheet" href=(format!("{}css/style.css", base_path));
            }
            body {
                (placeholder("header", base_path))
                main class="writeup" {
                    (PreEscaped(body_html))
                }
                (placeholder("footer", base_path))
            }
        }
    }
}

fn placeholder(component: &str, base_path: &str) -> Markup {
    html! {
        div data-component=(component) data-base-path=(base_path) {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writeup_page_structure() {
        // Arrange & Act
        let html = writeup_page("Heap Notes", "../", "<h1>Heap Notes</h1>").into_string();

        // Assert
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Heap Notes</title>"));
        assert!(html.contains(r#"href="../css/style.css""#));
        assert!(html.contains(r#"<main class="writeup"><h1>Heap Notes</h1></main>"#));
        assert!(html.contains(r#"<div data-component="header" data-base-path="../"></div>"#));
        assert!(html.contains(r#"<div data-component="footer" data-base-path="../"></div>"#));
    }

    #[test]
    fn test_writeup_page_escapes_title() {
        let html = writeup_page("<b>x</b>", "", "").into_string();

        assert!(html.contains("<title>&lt;b&gt;x&lt;/b&gt;</title>"));
        assert!(html.contains(r#"href="css/style.css""#));
    }
}
