//! Show/hide switch pairing a label with a content element.

use lutrabox_dom::Element;

use crate::markup::{self, DATA_TOGGLE, class};
use crate::patch::Patch;

/// Visibility state of one content element and its label glyph.
///
/// The toggle references both elements by id and owns neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggle {
    label_id: String,
    arrow_id: Option<String>,
    content_id: String,
    visible: bool,
}

impl Toggle {
    /// Create a toggle for `content_id` with the builder's derived ids.
    #[must_use]
    pub fn new(content_id: impl Into<String>, visible: bool) -> Self {
        let content_id = content_id.into();
        let label_id = markup::toggle_id(&content_id);
        Self {
            arrow_id: Some(markup::arrow_id(&label_id)),
            label_id,
            content_id,
            visible,
        }
    }

    /// Recover a toggle from a label element.
    ///
    /// `visible` is the current visibility of the content element, which the
    /// label itself does not record. Returns `None` for labels without an id
    /// or a `data-toggle` target.
    #[must_use]
    pub fn from_element(label: &Element, visible: bool) -> Option<Self> {
        let label_id = label.id()?.to_owned();
        let content_id = label.attr(DATA_TOGGLE)?.to_owned();
        let arrow_id = label
            .find(|e| e.is("span", class::ARROW))
            .and_then(Element::id)
            .map(str::to_owned);
        Some(Self {
            label_id,
            arrow_id,
            content_id,
            visible,
        })
    }

    #[must_use]
    pub fn label_id(&self) -> &str {
        &self.label_id
    }

    #[must_use]
    pub fn content_id(&self) -> &str {
        &self.content_id
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Flip visibility.
    pub fn toggle(&mut self) -> Vec<Patch> {
        self.visible = !self.visible;
        self.patches()
    }

    /// Make the content visible, whatever its current state.
    pub fn reveal(&mut self) -> Vec<Patch> {
        self.visible = true;
        self.patches()
    }

    /// Label markup: `<span class="toggle"><span class="arrow">▷</span> Output</span>`.
    #[must_use]
    pub fn render(&self, text: &str) -> Element {
        let mut arrow = Element::new("span")
            .with_attr("class", class::ARROW)
            .with_text(markup::glyph(self.visible))
            .with_tail(format!(" {text}"));
        if let Some(arrow_id) = &self.arrow_id {
            arrow.set_attr("id", arrow_id.clone());
        }

        Element::new("span")
            .with_attr("class", class::TOGGLE)
            .with_attr("id", self.label_id.clone())
            .with_attr(DATA_TOGGLE, self.content_id.clone())
            .with_child(arrow)
            .with_tail(" ")
    }

    fn patches(&self) -> Vec<Patch> {
        let mut patches = vec![Patch::SetVisible {
            id: self.content_id.clone(),
            visible: self.visible,
        }];
        if let Some(arrow_id) = &self.arrow_id {
            patches.push(Patch::SetText {
                id: arrow_id.clone(),
                text: markup::glyph(self.visible).to_owned(),
            });
        }
        patches
    }
}
