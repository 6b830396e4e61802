//! Popup selector bound to a hidden form field.
//!
//! # Markup
//!
//! ```html
//! <div class="popup inputFormat" id="lutra-0-inputFormat">[Format: <span id="lutra-0-inputFormat-current">stottr</span>]
//!   <ul class="list" id="lutra-0-inputFormat-list" style="display:none;">
//!     <li id="lutra-0-inputFormat-0" class="current">stottr</li>
//!     <li id="lutra-0-inputFormat-1">wottr</li>
//!   </ul>
//!   <input type="hidden" value="stottr" name="inputFormat" id="lutra-0-inputFormat-value">
//! </div>
//! ```

use lutrabox_dom::Element;
use tracing::debug;

use crate::error::WidgetError;
use crate::form::FieldName;
use crate::markup::{PopupSpec, class};
use crate::patch::Patch;

/// Dropdown state for one selector field.
///
/// The selected candidate is always one of `candidates`, and the hidden
/// field's value is always the selected candidate's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    id: String,
    label: String,
    field: FieldName,
    candidates: Vec<String>,
    selected: usize,
    open: bool,
}

impl Popup {
    /// Create a closed popup showing the first candidate.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::EmptyCandidates`] if `candidates` is empty.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        field: FieldName,
        candidates: &[&str],
    ) -> Result<Self, WidgetError> {
        if candidates.is_empty() {
            return Err(WidgetError::EmptyCandidates {
                field: field.to_string(),
            });
        }
        Ok(Self {
            id: id.into(),
            label: label.into(),
            field,
            candidates: candidates.iter().map(|c| (*c).to_owned()).collect(),
            selected: 0,
            open: false,
        })
    }

    /// Create a popup from one of the builder's fixed descriptions.
    pub(crate) fn from_spec(id: impl Into<String>, spec: &PopupSpec) -> Self {
        debug_assert!(
            !spec.candidates.is_empty(),
            "popup spec for {} has no candidates",
            spec.field
        );
        Self {
            id: id.into(),
            label: spec.label.to_owned(),
            field: spec.field,
            candidates: spec.candidates.iter().map(|c| (*c).to_owned()).collect(),
            selected: 0,
            open: false,
        }
    }

    /// Recover popup state from markup produced by [`render`](Self::render).
    ///
    /// Returns `None` if the element lacks an id, a hidden field with a known
    /// name, or candidates. A hidden value outside the candidate list falls
    /// back to the first candidate.
    #[must_use]
    pub fn from_element(element: &Element) -> Option<Self> {
        let id = element.id()?.to_owned();
        let hidden = element.find(|e| e.tag == "input" && e.attr("type") == Some("hidden"))?;
        let field: FieldName = hidden.attr("name")?.parse().ok()?;
        let list = element.find(|e| e.is("ul", class::LIST))?;
        let candidates: Vec<String> = list
            .children
            .iter()
            .filter(|li| li.tag == "li")
            .map(|li| li.text_content().trim().to_owned())
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let value = hidden.attr("value").unwrap_or("");
        let selected = candidates.iter().position(|c| c == value).unwrap_or(0);
        let label = element
            .text
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(':')
            .trim()
            .to_owned();

        Some(Self {
            id,
            label,
            field,
            candidates,
            selected,
            open: !list.is_hidden(),
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn field(&self) -> FieldName {
        self.field
    }

    #[must_use]
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Currently selected candidate, which is also the hidden field's value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.candidates[self.selected]
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Reveal the candidate list.
    pub fn open(&mut self) -> Vec<Patch> {
        self.open = true;
        vec![self.list_visibility()]
    }

    /// Close the list without committing, as on pointer leaving it.
    pub fn dismiss(&mut self) -> Vec<Patch> {
        if !self.open {
            return Vec::new();
        }
        self.open = false;
        vec![self.list_visibility()]
    }

    /// Commit `candidate` and close the list.
    ///
    /// Candidates outside the list are ignored and leave the popup untouched.
    pub fn select(&mut self, candidate: &str) -> Vec<Patch> {
        let Some(position) = self.candidates.iter().position(|c| c == candidate) else {
            debug!(popup = %self.id, candidate, "Ignoring selection outside candidate list");
            return Vec::new();
        };

        let previous = self.selected;
        self.selected = position;
        self.open = false;

        vec![
            Patch::SetText {
                id: self.current_id(),
                text: candidate.to_owned(),
            },
            Patch::SetValue {
                id: self.value_id(),
                value: candidate.to_owned(),
            },
            Patch::SetClass {
                id: self.option_id(previous),
                class: class::CURRENT.to_owned(),
                present: false,
            },
            Patch::SetClass {
                id: self.option_id(position),
                class: class::CURRENT.to_owned(),
                present: true,
            },
            self.list_visibility(),
        ]
    }

    /// Markup for the popup in its current state.
    #[must_use]
    pub fn render(&self) -> Element {
        let current = Element::new("span")
            .with_attr("id", self.current_id())
            .with_text(self.value())
            .with_tail("]");

        let options = self
            .candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| {
                let li = Element::new("li")
                    .with_attr("id", self.option_id(index))
                    .with_text(candidate.clone());
                if index == self.selected {
                    li.with_attr("class", class::CURRENT)
                } else {
                    li
                }
            })
            .collect();
        let mut list = Element::new("ul")
            .with_attr("class", class::LIST)
            .with_attr("id", self.list_id())
            .with_children(options);
        list.set_hidden(!self.open);

        let hidden = Element::new("input")
            .with_attr("type", "hidden")
            .with_attr("value", self.value())
            .with_attr("name", self.field.as_str())
            .with_attr("id", self.value_id());

        Element::new("div")
            .with_attr("class", format!("{} {}", class::POPUP, self.field))
            .with_attr("id", self.id.clone())
            .with_text(format!("[{}: ", self.label))
            .with_children(vec![current, list, hidden])
            .with_tail(" ")
    }

    fn current_id(&self) -> String {
        format!("{}-current", self.id)
    }

    fn list_id(&self) -> String {
        format!("{}-list", self.id)
    }

    fn value_id(&self) -> String {
        format!("{}-value", self.id)
    }

    fn option_id(&self, index: usize) -> String {
        format!("{}-{index}", self.id)
    }

    fn list_visibility(&self) -> Patch {
        Patch::SetVisible {
            id: self.list_id(),
            visible: self.open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::INPUT_FORMAT;
    use crate::patch::apply_patches;
    use lutrabox_dom::Document;
    use pretty_assertions::assert_eq;

    fn input_format() -> Popup {
        Popup::new("p", "Format", FieldName::InputFormat, &["stottr", "wottr", "bottr"]).unwrap()
    }

    fn rendered(popup: &Popup) -> Document {
        Document::from_children(vec![popup.render()])
    }

    fn hidden_value(doc: &Document) -> String {
        doc.root()
            .find_by_id("p-value")
            .and_then(|e| e.attr("value"))
            .unwrap_or_default()
            .to_owned()
    }

    fn current_label(doc: &Document) -> String {
        doc.root().find_by_id("p-current").unwrap().text_content()
    }

    #[test]
    fn test_new_defaults_to_first_candidate_closed() {
        let popup = input_format();
        assert_eq!(popup.value(), "stottr");
        assert!(!popup.is_open());
    }

    #[test]
    fn test_new_rejects_empty_candidates() {
        let err = Popup::new("p", "Format", FieldName::Mode, &[]).unwrap_err();
        assert_eq!(
            err,
            WidgetError::EmptyCandidates {
                field: "mode".to_owned()
            }
        );
    }

    #[test]
    fn test_builder_specs_match_checked_constructor() {
        use crate::markup::{LIBRARY_FORMAT, MODE, OUTPUT_FORMAT};

        for spec in [&INPUT_FORMAT, &LIBRARY_FORMAT, &OUTPUT_FORMAT, &MODE] {
            let checked = Popup::new("p", spec.label, spec.field, spec.candidates).unwrap();
            assert_eq!(Popup::from_spec("p", spec), checked);
        }
    }

    #[test]
    fn test_render_markup() {
        let popup = Popup::new("p", "Action", FieldName::Mode, &["expand", "lint"]).unwrap();
        assert_eq!(
            lutrabox_dom::element_to_html(&popup.render()),
            concat!(
                r#"<div class="popup mode" id="p">[Action: <span id="p-current">expand</span>]"#,
                r#"<ul class="list" id="p-list" style="display:none;">"#,
                r#"<li id="p-0" class="current">expand</li><li id="p-1">lint</li></ul>"#,
                r#"<input type="hidden" value="expand" name="mode" id="p-value"></div> "#,
            )
        );
    }

    #[test]
    fn test_open_then_dismiss_commits_nothing() {
        let mut popup = input_format();
        let mut doc = rendered(&popup);

        apply_patches(&mut doc, &popup.open());
        assert!(popup.is_open());
        assert!(!doc.root().find_by_id("p-list").unwrap().is_hidden());

        apply_patches(&mut doc, &popup.dismiss());
        assert!(!popup.is_open());
        assert!(doc.root().find_by_id("p-list").unwrap().is_hidden());
        assert_eq!(popup.value(), "stottr");
        assert_eq!(hidden_value(&doc), "stottr");
    }

    #[test]
    fn test_dismiss_when_closed_is_noop() {
        let mut popup = input_format();
        assert!(popup.dismiss().is_empty());
    }

    #[test]
    fn test_select_sequence_keeps_hidden_value_in_sync() {
        let mut popup = input_format();
        let mut doc = rendered(&popup);

        for candidate in ["wottr", "bottr"] {
            apply_patches(&mut doc, &popup.open());
            apply_patches(&mut doc, &popup.select(candidate));
        }

        assert_eq!(popup.value(), "bottr");
        assert_eq!(hidden_value(&doc), "bottr");
        assert_eq!(current_label(&doc), "bottr");
        assert!(!popup.is_open());
    }

    #[test]
    fn test_select_non_member_leaves_field_unchanged() {
        let mut popup = input_format();
        let mut doc = rendered(&popup);
        apply_patches(&mut doc, &popup.select("wottr"));

        apply_patches(&mut doc, &popup.open());
        let patches = popup.select("turtle");

        assert!(patches.is_empty());
        assert_eq!(popup.value(), "wottr");
        assert_eq!(hidden_value(&doc), "wottr");
        assert_eq!(current_label(&doc), "wottr");
    }

    #[test]
    fn test_exactly_one_candidate_marked_current() {
        let mut popup = input_format();
        let mut doc = rendered(&popup);
        apply_patches(&mut doc, &popup.select("bottr"));
        apply_patches(&mut doc, &popup.select("wottr"));

        let list = doc.root().find_by_id("p-list").unwrap();
        let current: Vec<String> = list
            .children
            .iter()
            .filter(|li| li.has_class(class::CURRENT))
            .map(Element::text_content)
            .collect();
        assert_eq!(current, vec!["wottr".to_owned()]);
    }

    #[test]
    fn test_invariant_over_many_sequences() {
        let inputs = ["stottr", "nope", "bottr", "", "wottr", "WOTTR", "bottr"];
        let mut popup = input_format();
        let mut doc = rendered(&popup);

        for (step, candidate) in inputs.iter().enumerate() {
            if step % 2 == 0 {
                apply_patches(&mut doc, &popup.open());
            }
            apply_patches(&mut doc, &popup.select(candidate));
            assert!(popup.candidates().iter().any(|c| c == popup.value()));
            assert_eq!(hidden_value(&doc), popup.value());
            assert_eq!(current_label(&doc), popup.value());
        }
    }

    #[test]
    fn test_from_element_recovers_state() {
        let mut popup = Popup::from_spec("lutra-0-inputFormat", &INPUT_FORMAT);
        popup.select("bottr");

        let recovered = Popup::from_element(&popup.render()).unwrap();
        assert_eq!(recovered, popup);
        assert_eq!(recovered.label(), "Format");
    }

    #[test]
    fn test_from_element_rejects_unknown_field() {
        let element = Element::new("div")
            .with_attr("class", "popup")
            .with_attr("id", "x")
            .with_children(vec![
                Element::new("ul")
                    .with_attr("class", "list")
                    .with_child(Element::new("li").with_text("true")),
                Element::new("input")
                    .with_attr("type", "hidden")
                    .with_attr("name", "fetchMissing"),
            ]);
        assert!(Popup::from_element(&element).is_none());
    }
}
