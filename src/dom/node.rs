//! Document nodes and serialization.
//!
//! Nodes keep the exact source text they were parsed from. Serializing an
//! untouched node writes that text back; edits rewrite only the piece they
//! change (one attribute, or an element's children).

use std::ops::Range;

/// Elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Raw text as written in the source, entities included.
    Text(String),
    /// Comment including its `<!--` and `-->` delimiters.
    Comment(String),
    /// Doctype, processing instruction or stray end tag, kept verbatim.
    Markup(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// Attribute of a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// ASCII-lowercased name.
    pub name: String,
    /// Value with character references decoded; `None` for a bare name.
    pub value: Option<String>,
    /// Byte range of `name=value` within the raw start tag.
    pub(super) span: Range<usize>,
    /// Quote character used in the source, if the value was quoted.
    pub(super) quote: Option<char>,
}

/// HTML element with its source start and end tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    start_tag: String,
    attrs: Vec<Attribute>,
    children: Vec<Node>,
    /// `None` when the source omitted the end tag.
    end_tag: Option<String>,
}

impl Element {
    /// Creates an element with no attributes, written as `<name></name>`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into().to_ascii_lowercase();
        let start_tag = format!("<{}>", name);
        let mut element = Self::from_parts(name, start_tag, Vec::new());
        if !element.is_void() {
            element.end_tag = Some(format!("</{}>", element.name));
        }
        element
    }

    pub(super) fn from_parts(name: String, start_tag: String, attrs: Vec<Attribute>) -> Self {
        Self {
            name,
            start_tag,
            attrs,
            children: Vec::new(),
            end_tag: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_tag(&self) -> &str {
        &self.start_tag
    }

    pub fn end_tag(&self) -> Option<&str> {
        self.end_tag.as_deref()
    }

    pub(super) fn set_end_tag(&mut self, end_tag: Option<String>) {
        self.end_tag = end_tag;
    }

    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub(super) fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Returns attribute value; boolean attributes read as empty string.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
            .map(|attr| attr.value.as_deref().unwrap_or(""))
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs
            .iter()
            .any(|attr| attr.name.eq_ignore_ascii_case(name))
    }

    /// Sets an attribute, rewriting only that attribute in the start tag.
    ///
    /// An existing attribute keeps its spelling and quote style. A new one
    /// is appended after the last attribute.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();

        let Some(index) = self
            .attrs
            .iter()
            .position(|attr| attr.name.eq_ignore_ascii_case(name))
        else {
            let at = self
                .attrs
                .last()
                .map_or(1 + self.name.len(), |attr| attr.span.end);
            let text = format!(r#"{}="{}""#, name, escape_attr(&value, '"'));
            self.start_tag.insert_str(at, &format!(" {}", text));
            self.attrs.push(Attribute {
                name: name.to_ascii_lowercase(),
                value: Some(value),
                span: at + 1..at + 1 + text.len(),
                quote: Some('"'),
            });
            return;
        };

        let span = self.attrs[index].span.clone();
        let quote = self.attrs[index].quote.unwrap_or('"');
        let spelled = &self.start_tag[span.start..span.start + self.attrs[index].name.len()];
        let text = format!("{spelled}={quote}{}{quote}", escape_attr(&value, quote));
        self.start_tag.replace_range(span.clone(), &text);

        let end = span.start + text.len();
        for later in &mut self.attrs[index + 1..] {
            later.span = later.span.start - span.end + end..later.span.end - span.end + end;
        }
        let attr = &mut self.attrs[index];
        attr.span = span.start..end;
        attr.quote = Some(quote);
        attr.value = Some(value);
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Adds `class` unless already present.
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let mut list: Vec<&str> = self.classes().collect();
        list.push(class);
        let joined = list.join(" ");
        self.set_attr("class", joined);
    }

    /// Removes every occurrence of `class`.
    ///
    /// The `class` attribute is kept, possibly empty, once it exists.
    pub fn remove_class(&mut self, class: &str) {
        if !self.has_class(class) {
            return;
        }
        let joined = self
            .classes()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr("class", joined);
    }

    /// Sets class presence, mirroring `classList.toggle(class, on)`.
    pub fn set_class(&mut self, class: &str, on: bool) {
        if on {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }

    /// Replaces all children, like assigning `innerHTML`.
    pub fn set_children(&mut self, children: Vec<Node>) {
        self.children = children;
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }

    fn render_into(&self, out: &mut String) {
        out.push_str(&self.start_tag);
        render_into(&self.children, out);
        if let Some(end_tag) = &self.end_tag {
            out.push_str(end_tag);
        }
    }
}

fn escape_attr(value: &str, quote: char) -> String {
    let escaped = value.replace('&', "&amp;");
    match quote {
        '\'' => escaped.replace('\'', "&#39;"),
        _ => escaped.replace('"', "&quot;"),
    }
}

/// Serializes nodes to HTML.
pub fn render_nodes(nodes: &[Node]) -> String {
    let mut out = String::new();
    render_into(nodes, &mut out);
    out
}

fn render_into(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Element(element) => element.render_into(out),
            Node::Text(text) | Node::Comment(text) | Node::Markup(text) => out.push_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_fragment;

    fn first_element(html: &str) -> Element {
        parse_fragment(html)
            .into_iter()
            .find_map(|node| match node {
                Node::Element(element) => Some(element),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_add_class_no_duplicates() {
        let mut element = first_element(r#"<div class="tag"></div>"#);

        element.add_class("active");
        element.add_class("active");

        assert_eq!(element.attr("class"), Some("tag active"));
        assert_eq!(render_nodes(&[Node::Element(element)]), r#"<div class="tag active"></div>"#);
    }

    #[test]
    fn test_add_class_without_attribute() {
        // Arrange
        let mut element = first_element(r#"<a href='x.html' data-x=1 >Home</a>"#);

        // Act
        element.add_class("active");

        // Assert
        assert_eq!(element.attr("class"), Some("active"));
        assert_eq!(
            render_nodes(&[Node::Element(element)]),
            r#"<a href='x.html' data-x=1 class="active" >Home</a>"#
        );
    }

    #[test]
    fn test_add_class_to_bare_tag() {
        let mut element = Element::new("a");

        element.add_class("active");

        assert_eq!(element.start_tag(), r#"<a class="active">"#);
    }

    #[test]
    fn test_remove_class_all_occurrences() {
        let mut element = first_element(r#"<li class="hidden writeup-item hidden" id=x>"#);

        element.remove_class("hidden");

        assert_eq!(element.attr("class"), Some("writeup-item"));
        assert!(!element.has_class("hidden"));
        assert_eq!(element.start_tag(), r#"<li class="writeup-item" id=x>"#);
    }

    #[test]
    fn test_remove_absent_class_keeps_markup() {
        let mut element = first_element("<p  id=intro>");

        element.remove_class("hidden");

        assert!(!element.has_attr("class"));
        assert_eq!(element.start_tag(), "<p  id=intro>");
    }

    #[test]
    fn test_set_attr_keeps_quote_style_and_spelling() {
        // Arrange
        let mut element = first_element(r#"<SPAN CLASS='tag' data-tag="web">"#);

        // Act
        element.add_class("it's");
        element.set_attr("data-tag", "pwn");

        // Assert
        assert_eq!(
            element.start_tag(),
            r#"<SPAN CLASS='tag it&#39;s' data-tag="pwn">"#
        );
        assert_eq!(element.attr("class"), Some("tag it's"));
        assert_eq!(element.attr("data-tag"), Some("pwn"));
    }

    #[test]
    fn test_set_attr_quotes_unquoted_value() {
        let mut element = first_element("<div class=tag data-x=1>");

        element.add_class("active");
        element.set_attr("data-x", "2");

        assert_eq!(element.start_tag(), r#"<div class="tag active" data-x="2">"#);
    }

    #[test]
    fn test_new_void_element_has_no_end_tag() {
        let mut img = Element::new("IMG");
        img.set_attr("alt", r#"say "hi""#);

        assert_eq!(
            render_nodes(&[Node::Element(img)]),
            r#"<img alt="say &quot;hi&quot;">"#
        );
    }

    #[test]
    fn test_set_children_keeps_tags() {
        let mut element = first_element(r#"<div data-component="x"><p>old</p></div>"#);

        element.set_children(vec![Node::Text("new".to_string())]);

        assert_eq!(
            render_nodes(&[Node::Element(element)]),
            r#"<div data-component="x">new</div>"#
        );
    }
}
