//! Tag filtering for writeup listings.
//!
//! Buttons under `.tag-filter` carry a `data-tag` label; writeup items carry
//! a comma separated `data-tags` list; writeup sections group items. At most
//! one tag is active at a time. A button without `data-tag` can be selected
//! but matches no item. Item and section visibility are never stored:
//! they are recomputed from the active tag after every click and written back
//! as the `hidden` class.

use std::sync::LazyLock;

use thiserror::Error;
use tracing::debug;

use crate::dom::{Document, NodePath, Selector};

/// Class marking the selected tag button.
pub const ACTIVE_CLASS: &str = "active";

/// Class marking filtered out items and empty sections.
pub const HIDDEN_CLASS: &str = "hidden";

static TAG_BUTTONS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".tag-filter .tag").unwrap());
static WRITEUP_ITEMS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".writeup-item").unwrap());
static WRITEUP_SECTIONS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".writeup-section").unwrap());

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("No tag button with label `{0}`")]
    UnknownTag(String),

    #[error("Tag button {0} does not exist")]
    NoSuchButton(usize),
}

/// Result of clicking a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The clicked tag became active, replacing `previous` if any.
    Activated { previous: Option<Option<String>> },
    /// The clicked tag was already active and is now cleared.
    Deactivated,
}

/// Selected tag, if any.
///
/// The selection is itself optional: `Some(None)` means an unlabelled
/// button is active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    active: Option<Option<String>>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label of the active tag; `None` also when the active button is
    /// unlabelled.
    pub fn active(&self) -> Option<&str> {
        self.active.as_ref().and_then(|tag| tag.as_deref())
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn selection(&self) -> Option<Option<&str>> {
        self.active.as_ref().map(|tag| tag.as_deref())
    }

    /// Applies a click on a button labelled `tag`.
    pub fn click(&mut self, tag: Option<&str>) -> Transition {
        if self.selection() == Some(tag) {
            self.active = None;
            Transition::Deactivated
        } else {
            let previous = self.active.replace(tag.map(String::from));
            Transition::Activated { previous }
        }
    }
}

/// Splits a `data-tags` value on commas.
///
/// Entries are not trimmed. A missing or empty attribute has no tags.
pub fn parse_tags(attr: Option<&str>) -> Vec<&str> {
    match attr {
        Some(tags) if !tags.is_empty() => tags.split(',').collect(),
        _ => Vec::new(),
    }
}

/// Visibility of an item with `tags` under the `active` selection.
///
/// An active unlabelled button matches nothing.
pub fn is_visible<S: AsRef<str>>(active: Option<Option<&str>>, tags: &[S]) -> bool {
    match active {
        None => true,
        Some(None) => false,
        Some(Some(active)) => tags.iter().any(|tag| tag.as_ref() == active),
    }
}

#[derive(Debug, Clone)]
pub struct TagButton {
    pub path: NodePath,
    /// `data-tag` value, if the button has one.
    pub tag: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WriteupItem {
    pub path: NodePath,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct WriteupSection {
    pub path: NodePath,
    /// Indices into the bound items.
    pub items: Vec<usize>,
}

/// Derived visibility, index-aligned with the bound items and sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visibility {
    pub items: Vec<bool>,
    pub sections: Vec<bool>,
}

/// Tag filter bound to the buttons, items and sections of one document.
#[derive(Debug, Clone)]
pub struct TagFilter {
    buttons: Vec<TagButton>,
    items: Vec<WriteupItem>,
    sections: Vec<WriteupSection>,
    state: FilterState,
}

impl TagFilter {
    /// Captures filter targets from `doc` without modifying it.
    pub fn bind(doc: &Document) -> Self {
        let buttons = doc
            .select(&TAG_BUTTONS)
            .into_iter()
            .map(|path| {
                let tag = doc
                    .element(&path)
                    .and_then(|e| e.attr("data-tag"))
                    .map(String::from);
                TagButton { path, tag }
            })
            .collect();

        let items: Vec<WriteupItem> = doc
            .select(&WRITEUP_ITEMS)
            .into_iter()
            .map(|path| {
                let tags = parse_tags(doc.element(&path).and_then(|e| e.attr("data-tags")))
                    .into_iter()
                    .map(String::from)
                    .collect();
                WriteupItem { path, tags }
            })
            .collect();

        let sections = doc
            .select(&WRITEUP_SECTIONS)
            .into_iter()
            .map(|path| {
                let contained = items
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| item.path.is_inside(&path))
                    .map(|(index, _)| index)
                    .collect();
                WriteupSection {
                    path,
                    items: contained,
                }
            })
            .collect();

        Self {
            buttons,
            items,
            sections,
            state: FilterState::new(),
        }
    }

    pub fn buttons(&self) -> &[TagButton] {
        &self.buttons
    }

    pub fn items(&self) -> &[WriteupItem] {
        &self.items
    }

    pub fn sections(&self) -> &[WriteupSection] {
        &self.sections
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Recomputes visibility from the current state alone.
    pub fn visibility(&self) -> Visibility {
        let active = self.state.selection();
        let items: Vec<bool> = self
            .items
            .iter()
            .map(|item| is_visible(active, item.tags.as_slice()))
            .collect();
        let sections = self
            .sections
            .iter()
            .map(|section| section.items.iter().any(|&index| items[index]))
            .collect();
        Visibility { items, sections }
    }

    /// Clicks the button at `index` and updates `doc`.
    ///
    /// # Errors
    ///
    /// Returns error if no button has that index.
    pub fn click(&mut self, doc: &mut Document, index: usize) -> Result<Transition, FilterError> {
        let button = self
            .buttons
            .get(index)
            .ok_or(FilterError::NoSuchButton(index))?;
        let transition = self.state.click(button.tag.as_deref());
        debug!(tag = ?button.tag, ?transition, "Tag clicked");

        match transition {
            Transition::Deactivated => {
                if let Some(element) = doc.element_mut(&button.path) {
                    element.remove_class(ACTIVE_CLASS);
                }
            }
            Transition::Activated { .. } => {
                for other in &self.buttons {
                    if let Some(element) = doc.element_mut(&other.path) {
                        element.remove_class(ACTIVE_CLASS);
                    }
                }
                if let Some(element) = doc.element_mut(&button.path) {
                    element.add_class(ACTIVE_CLASS);
                }
            }
        }

        self.apply(doc);
        Ok(transition)
    }

    /// Clicks the first button labelled `tag`.
    ///
    /// # Errors
    ///
    /// Returns error if no button carries that label.
    pub fn click_tag(&mut self, doc: &mut Document, tag: &str) -> Result<Transition, FilterError> {
        let index = self
            .buttons
            .iter()
            .position(|button| button.tag.as_deref() == Some(tag))
            .ok_or_else(|| FilterError::UnknownTag(tag.to_string()))?;
        self.click(doc, index)
    }

    fn apply(&self, doc: &mut Document) {
        let visibility = self.visibility();
        for (item, visible) in self.items.iter().zip(&visibility.items) {
            if let Some(element) = doc.element_mut(&item.path) {
                element.set_class(HIDDEN_CLASS, !visible);
            }
        }
        for (section, visible) in self.sections.iter().zip(&visibility.sections) {
            if let Some(element) = doc.element_mut(&section.path) {
                element.set_class(HIDDEN_CLASS, !visible);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"<div class="tag-filter">
<button class="tag" data-tag="web">web</button>
<button class="tag" data-tag="pwn">pwn</button>
<button class="tag" data-tag="crypto">crypto</button>
</div>
<section class="writeup-section" id="ctf-a">
<article class="writeup-item" data-tags="web,pwn">A1</article>
<article class="writeup-item" data-tags="web">A2</article>
</section>
<section class="writeup-section" id="ctf-b">
<article class="writeup-item" data-tags="pwn">B1</article>
<article class="writeup-item" data-tags="">B2</article>
</section>"#;

    fn hidden_flags(doc: &Document, paths: impl Iterator<Item = NodePath>) -> Vec<bool> {
        paths
            .map(|p| doc.element(&p).unwrap().has_class(HIDDEN_CLASS))
            .collect()
    }

    fn item_hidden(filter: &TagFilter, doc: &Document) -> Vec<bool> {
        hidden_flags(doc, filter.items().iter().map(|i| i.path.clone()))
    }

    fn section_hidden(filter: &TagFilter, doc: &Document) -> Vec<bool> {
        hidden_flags(doc, filter.sections().iter().map(|s| s.path.clone()))
    }

    #[test]
    fn test_state_toggle() {
        let mut state = FilterState::new();

        assert_eq!(
            state.click(Some("web")),
            Transition::Activated { previous: None }
        );
        assert_eq!(
            state.click(Some("pwn")),
            Transition::Activated {
                previous: Some(Some("web".to_string()))
            }
        );
        assert_eq!(state.click(Some("pwn")), Transition::Deactivated);
        assert_eq!(state.active(), None);
        assert!(!state.is_active());
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags(Some("web,pwn")), vec!["web", "pwn"]);
        assert_eq!(parse_tags(Some("web, pwn")), vec!["web", " pwn"]);
        assert!(parse_tags(Some("")).is_empty());
        assert!(parse_tags(None).is_empty());
    }

    #[test]
    fn test_unlabelled_selection_toggles() {
        let mut state = FilterState::new();

        assert_eq!(state.click(None), Transition::Activated { previous: None });
        assert!(state.is_active());
        assert_eq!(state.active(), None);
        assert_eq!(state.selection(), Some(None));
        assert_eq!(state.click(None), Transition::Deactivated);
        assert!(!state.is_active());
    }

    #[test]
    fn test_is_visible() {
        assert!(is_visible::<&str>(None, &[]));
        assert!(is_visible(Some(Some("web")), &["pwn", "web"]));
        assert!(!is_visible(Some(Some("web")), &[" web"]));
        assert!(!is_visible::<&str>(Some(Some("web")), &[]));
        assert!(!is_visible(Some(None), &["a", "", "b"]));
        assert!(!is_visible::<&str>(Some(None), &[]));
    }

    #[test]
    fn test_bind_captures_targets() {
        // Arrange
        let doc = Document::parse(LISTING);

        // Act
        let filter = TagFilter::bind(&doc);

        // Assert
        let tags: Vec<_> = filter.buttons().iter().map(|b| b.tag.as_deref()).collect();
        assert_eq!(tags, vec![Some("web"), Some("pwn"), Some("crypto")]);
        assert_eq!(filter.items().len(), 4);
        assert_eq!(filter.sections()[0].items, vec![0, 1]);
        assert_eq!(filter.sections()[1].items, vec![2, 3]);
        assert_eq!(filter.items()[3].tags, Vec::<String>::new());
    }

    #[test]
    fn test_click_hides_non_matching_and_empty_sections() {
        // Arrange
        let mut doc = Document::parse(LISTING);
        let mut filter = TagFilter::bind(&doc);

        // Act
        filter.click_tag(&mut doc, "web").unwrap();

        // Assert
        assert_eq!(item_hidden(&filter, &doc), vec![false, false, true, true]);
        assert_eq!(section_hidden(&filter, &doc), vec![false, true]);
        let web = &filter.buttons()[0].path;
        assert!(doc.element(web).unwrap().has_class(ACTIVE_CLASS));
    }

    #[test]
    fn test_switching_tags_moves_active_class() {
        // Arrange
        let mut doc = Document::parse(LISTING);
        let mut filter = TagFilter::bind(&doc);

        // Act
        filter.click_tag(&mut doc, "web").unwrap();
        filter.click_tag(&mut doc, "pwn").unwrap();

        // Assert
        let active: Vec<bool> = filter
            .buttons()
            .iter()
            .map(|b| doc.element(&b.path).unwrap().has_class(ACTIVE_CLASS))
            .collect();
        assert_eq!(active, vec![false, true, false]);
        assert_eq!(item_hidden(&filter, &doc), vec![false, true, false, true]);
        assert_eq!(section_hidden(&filter, &doc), vec![false, false]);
    }

    #[test]
    fn test_second_click_restores_everything() {
        // Arrange
        let mut doc = Document::parse(LISTING);
        let mut filter = TagFilter::bind(&doc);

        // Act
        filter.click_tag(&mut doc, "crypto").unwrap();
        let hidden_after_first = item_hidden(&filter, &doc);
        let transition = filter.click_tag(&mut doc, "crypto").unwrap();

        // Assert
        assert_eq!(hidden_after_first, vec![true; 4]);
        assert_eq!(transition, Transition::Deactivated);
        assert_eq!(item_hidden(&filter, &doc), vec![false; 4]);
        assert_eq!(section_hidden(&filter, &doc), vec![false; 2]);
        assert!(filter.state().active().is_none());
        let crypto = &filter.buttons()[2].path;
        assert!(!doc.element(crypto).unwrap().has_class(ACTIVE_CLASS));
    }

    #[test]
    fn test_visibility_is_pure() {
        let doc = Document::parse(LISTING);
        let filter = TagFilter::bind(&doc);

        let visibility = filter.visibility();

        assert_eq!(visibility.items, vec![true; 4]);
        assert_eq!(visibility.sections, vec![true; 2]);
        assert!(!doc.to_html().contains(HIDDEN_CLASS));
    }

    #[test]
    fn test_unknown_tag_and_button() {
        let mut doc = Document::parse(LISTING);
        let mut filter = TagFilter::bind(&doc);

        assert!(matches!(
            filter.click_tag(&mut doc, "forensics"),
            Err(FilterError::UnknownTag(_))
        ));
        assert!(matches!(
            filter.click(&mut doc, 9),
            Err(FilterError::NoSuchButton(9))
        ));
        assert!(filter.state().active().is_none());
    }

    #[test]
    fn test_unlabelled_button_hides_every_item() {
        // Arrange
        let listing = concat!(
            r#"<div class="tag-filter"><button class="tag" data-tag="a">a</button>"#,
            r#"<button class="tag">all</button></div>"#,
            r#"<section class="writeup-section">"#,
            r#"<article class="writeup-item" data-tags="a,,b">1</article>"#,
            r#"<article class="writeup-item">2</article>"#,
            r#"</section>"#,
        );
        let mut doc = Document::parse(listing);
        let mut filter = TagFilter::bind(&doc);

        // Act
        let first = filter.click(&mut doc, 1).unwrap();
        let hidden_after_first = item_hidden(&filter, &doc);
        let second = filter.click(&mut doc, 1).unwrap();

        // Assert
        assert_eq!(filter.buttons()[1].tag, None);
        assert_eq!(first, Transition::Activated { previous: None });
        assert_eq!(hidden_after_first, vec![true, true]);
        assert_eq!(second, Transition::Deactivated);
        assert_eq!(item_hidden(&filter, &doc), vec![false, false]);
        assert_eq!(section_hidden(&filter, &doc), vec![false]);
    }
}
