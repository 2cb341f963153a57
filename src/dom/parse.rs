//! Lossless HTML tokenizer and tree builder.
//!
//! Every input byte lands in exactly one node, so an untouched tree
//! serializes back to its input. Tree shape follows the HTML rules a page
//! author relies on: void and self-closed tags, raw text in `script` and
//! `style`, and end tags the source leaves implied (`p`, `li`, table cells).

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

use super::node::{Attribute, Element, Node};

static START_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^<([A-Za-z][^\s/>]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#).unwrap()
});

static END_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^</([A-Za-z][^\s/>]*)[^>]*>").unwrap());

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^<[!?][^>]*>").unwrap());

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+)))?"#).unwrap()
});

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6})|(amp|lt|gt|quot|apos|nbsp));").unwrap()
});

/// Elements whose content is text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "script", "style", "textarea", "title", "xmp",
];

/// Start tags that close an open `p`.
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "dd", "details", "dialog", "dir", "div",
    "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hgroup", "hr", "li", "main", "menu", "nav", "ol", "p", "pre", "section",
    "summary", "table", "ul",
];

/// Elements an implied `p` end never reaches past.
const BUTTON_SCOPE: &[&str] = &[
    "applet", "button", "caption", "html", "marquee", "object", "table", "td", "template", "th",
];

const LIST_SCOPE: &[&str] = &[
    "applet", "button", "caption", "html", "marquee", "menu", "object", "ol", "table", "td",
    "template", "th", "ul",
];

const DEFINITION_SCOPE: &[&str] = &[
    "applet", "button", "caption", "dl", "html", "marquee", "object", "table", "td", "template",
    "th",
];

/// Parses an HTML fragment into nodes, like assigning `innerHTML`.
///
/// Parsing never fails: markup that is not a well formed tag is kept as
/// text.
pub fn parse_fragment(html: &str) -> Vec<Node> {
    let mut builder = TreeBuilder::default();
    let mut pos = 0;

    while pos < html.len() {
        let rest = &html[pos..];
        let consumed = if rest.starts_with("<!--") {
            let len = comment_len(rest);
            builder.push(Node::Comment(rest[..len].to_string()));
            len
        } else if let Some(caps) = START_TAG.captures(rest) {
            builder.start_tag(html, pos, &caps)
        } else if let Some(caps) = END_TAG.captures(rest) {
            let raw = &caps[0];
            builder.end_tag(&caps[1].to_ascii_lowercase(), raw);
            raw.len()
        } else if let Some(m) = DECLARATION.find(rest) {
            builder.push(Node::Markup(m.as_str().to_string()));
            m.len()
        } else {
            let skip = rest.chars().next().map_or(1, char::len_utf8);
            let len = rest[skip..].find('<').map_or(rest.len(), |i| i + skip);
            builder.push(Node::Text(rest[..len].to_string()));
            len
        };
        pos += consumed;
    }

    builder.finish()
}

/// Length of the comment at the start of `rest`, up to and including `-->`.
fn comment_len(rest: &str) -> usize {
    let body = &rest[4..];
    if body.starts_with('>') {
        5
    } else if body.starts_with("->") {
        6
    } else {
        body.find("-->").map_or(rest.len(), |i| 4 + i + 3)
    }
}

/// Finds the end tag closing a raw text element opened before `from`.
///
/// Returns where the text ends and the end tag, if the source has one.
fn raw_text_end<'a>(html: &'a str, from: usize, name: &str) -> (usize, Option<&'a str>) {
    for (index, _) in html[from..].match_indices("</") {
        let start = from + index;
        let name_end = start + 2 + name.len();
        let closes = html
            .get(start + 2..name_end)
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name))
            && html[name_end..]
                .chars()
                .next()
                .is_none_or(|c| c == '>' || c == '/' || c.is_ascii_whitespace());
        if closes {
            let tag_end = html[name_end..]
                .find('>')
                .map_or(html.len(), |i| name_end + i + 1);
            return (start, Some(&html[start..tag_end]));
        }
    }
    (html.len(), None)
}

fn parse_attribute(caps: &Captures, offset: usize) -> Option<Attribute> {
    let whole = caps.get(0)?;
    let (value, quote) = if let Some(v) = caps.get(2) {
        (Some(decode_entities(v.as_str()).into_owned()), Some('"'))
    } else if let Some(v) = caps.get(3) {
        (Some(decode_entities(v.as_str()).into_owned()), Some('\''))
    } else {
        (caps.get(4).map(|v| decode_entities(v.as_str()).into_owned()), None)
    };

    Some(Attribute {
        name: caps[1].to_ascii_lowercase(),
        value,
        span: offset + whole.start()..offset + whole.end(),
        quote,
    })
}

/// Decodes the character references that appear in attribute values.
pub(super) fn decode_entities(value: &str) -> Cow<'_, str> {
    ENTITY.replace_all(value, |caps: &Captures| {
        let code = if let Some(decimal) = caps.get(1) {
            decimal.as_str().parse().ok()
        } else if let Some(hex) = caps.get(2) {
            u32::from_str_radix(hex.as_str(), 16).ok()
        } else {
            match &caps[3] {
                "amp" => Some(0x26),
                "lt" => Some(0x3c),
                "gt" => Some(0x3e),
                "quot" => Some(0x22),
                "apos" => Some(0x27),
                _ => Some(0xa0),
            }
        };
        code.and_then(char::from_u32)
            .unwrap_or(char::REPLACEMENT_CHARACTER)
            .to_string()
    })
}

#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    open: Vec<Element>,
}

impl TreeBuilder {
    fn push(&mut self, node: Node) {
        let siblings = match self.open.last_mut() {
            Some(parent) => parent.children_mut(),
            None => &mut self.root,
        };
        if let (Node::Text(text), Some(Node::Text(last))) = (&node, siblings.last_mut()) {
            last.push_str(text);
            return;
        }
        siblings.push(node);
    }

    /// Pops the innermost open element into its parent.
    fn close(&mut self, end_tag: Option<&str>) {
        if let Some(mut element) = self.open.pop() {
            element.set_end_tag(end_tag.map(String::from));
            self.push(Node::Element(element));
        }
    }

    /// Implicitly closes the nearest open `targets` element, unless a
    /// `boundary` element is reached first.
    fn close_nearest(&mut self, targets: &[&str], boundaries: &[&str]) {
        for depth in (0..self.open.len()).rev() {
            let name = self.open[depth].name();
            if targets.contains(&name) {
                while self.open.len() > depth {
                    self.close(None);
                }
                return;
            }
            if boundaries.contains(&name) {
                return;
            }
        }
    }

    fn close_implied(&mut self, name: &str) {
        match name {
            "li" => self.close_nearest(&["li"], LIST_SCOPE),
            "dd" | "dt" => self.close_nearest(&["dd", "dt"], DEFINITION_SCOPE),
            "option" => self.close_nearest(&["option"], &["datalist", "optgroup", "select"]),
            "tr" => self.close_nearest(&["tr"], &["table", "tbody", "tfoot", "thead"]),
            "td" | "th" => self.close_nearest(&["td", "th"], &["table", "tr"]),
            "tbody" | "tfoot" | "thead" => {
                self.close_nearest(&["tbody", "tfoot", "thead"], &["table"])
            }
            _ => {}
        }
        if CLOSES_P.contains(&name) {
            self.close_nearest(&["p"], BUTTON_SCOPE);
        }
    }

    /// Handles the start tag matched at `pos`; returns the bytes consumed.
    fn start_tag(&mut self, html: &str, pos: usize, caps: &Captures) -> usize {
        let raw = &caps[0];
        let name = caps[1].to_ascii_lowercase();
        let (section, offset) = caps
            .get(2)
            .map_or(("", raw.len() - 1), |m| (m.as_str(), m.start()));

        let attrs: Vec<Attribute> = ATTRIBUTE
            .captures_iter(section)
            .filter_map(|attr| parse_attribute(&attr, offset))
            .collect();

        // A trailing `/` that is not part of an unquoted value.
        let trimmed = section.trim_end();
        let self_closing = trimmed.ends_with('/')
            && attrs
                .last()
                .is_none_or(|attr| attr.span.end < offset + trimmed.len());

        self.close_implied(&name);
        let mut element = Element::from_parts(name, raw.to_string(), attrs);

        if RAW_TEXT_ELEMENTS.contains(&element.name()) {
            let body_start = pos + raw.len();
            let (text_end, end_tag) = raw_text_end(html, body_start, element.name());
            if text_end > body_start {
                element
                    .children_mut()
                    .push(Node::Text(html[body_start..text_end].to_string()));
            }
            let end_len = end_tag.map_or(0, str::len);
            element.set_end_tag(end_tag.map(String::from));
            self.push(Node::Element(element));
            return text_end + end_len - pos;
        }

        if element.is_void() || self_closing {
            self.push(Node::Element(element));
        } else {
            self.open.push(element);
        }
        raw.len()
    }

    fn end_tag(&mut self, name: &str, raw: &str) {
        match self.open.iter().rposition(|element| element.name() == name) {
            Some(depth) => {
                while self.open.len() > depth + 1 {
                    self.close(None);
                }
                self.close(Some(raw));
            }
            None => self.push(Node::Markup(raw.to_string())),
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while !self.open.is_empty() {
            self.close(None);
        }
        self.root
    }
}
