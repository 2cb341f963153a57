//! Ordered-substitution Markdown converter.

use regex::Regex;
use std::sync::LazyLock;

/// Any character except a line terminator (`\n`, `\r`, U+2028, U+2029).
const DOT: &str = r"[^\n\r\x{2028}\x{2029}]";

/// Start of a line, capturing the U+2028/U+2029 separator it follows so the
/// replacement can put it back.
const LINE_START: &str = r"(?mR:(^|[\x{2028}\x{2029}]))";

/// Substitution rules, applied strictly in this order.
static RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (format!(r"{LINE_START}### ({DOT}*)"), "${1}<h3>${2}</h3>"),
        (format!(r"{LINE_START}## ({DOT}*)"), "${1}<h2>${2}</h2>"),
        (format!(r"{LINE_START}# ({DOT}*)"), "${1}<h1>${2}</h1>"),
        // Bold must run before italic or `**x**` degrades to nested <em>.
        (format!(r"\*\*({DOT}*)\*\*"), "<strong>${1}</strong>"),
        (format!(r"\*({DOT}*)\*"), "<em>${1}</em>"),
        (r"```([\s\S]*?)```".to_string(), "<pre><code>${1}</code></pre>"),
        (format!(r"`({DOT}*?)`"), "<code>${1}</code>"),
        (
            format!(r"\[({DOT}*?)\]\(({DOT}*?)\)"),
            r#"<a href="${2}">${1}</a>"#,
        ),
        (
            format!(r"!\[({DOT}*?)\]\(({DOT}*?)\)"),
            r#"<img src="${2}" alt="${1}">"#,
        ),
        (
            format!(r"{LINE_START}> ({DOT}*)"),
            "${1}<blockquote>${2}</blockquote>",
        ),
        (r"\n".to_string(), "<br>"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(&pattern).unwrap(), replacement))
    .collect()
});

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"{LINE_START}# ({DOT}*)")).unwrap());

/// Converts a Markdown subset to HTML.
///
/// Headings, emphasis, fenced and inline code, links, images and
/// blockquotes are rewritten by sequential regex substitution, then every
/// remaining newline becomes `<br>`. Input is not escaped and output is not
/// sanitized.
///
/// # Examples
///
/// ```
/// use sitekit::markdown_to_html;
///
/// assert_eq!(markdown_to_html("# Hello"), "<h1>Hello</h1>");
/// assert_eq!(markdown_to_html("line1\nline2"), "line1<br>line2");
/// ```
pub fn markdown_to_html(markdown: &str) -> String {
    RULES
        .iter()
        .fold(markdown.to_string(), |html, (pattern, replacement)| {
            pattern.replace_all(&html, *replacement).into_owned()
        })
}

/// Returns the text of the first level-1 heading, if any.
pub fn document_title(markdown: &str) -> Option<&str> {
    TITLE
        .captures(markdown)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str().trim())
        .filter(|title| !title.is_empty())
}
