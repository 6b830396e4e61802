//! Runtime state for a built page and the event handlers driving it.
//!
//! [`Page::bind`] reads the markup produced by the builder back into one
//! [`Region`] per form. From then on [`Page::handle`] maps each
//! [`PageEvent`] to the effects that bring the page up to date.

use std::time::{Duration, Instant};

use lutrabox_dom::{Document, Element};
use tracing::{debug, info, warn};

use crate::event::{Effect, PageEvent, patch_effects};
use crate::form::{FieldName, FormPayload, PREFIXES_KEY};
use crate::markup::{DATA_NAME, DATA_TOGGLE, class};
use crate::patch::{Patch, apply_patches};
use crate::popup::Popup;
use crate::prefixes::harvest_prefixes;
use crate::submission::SubmissionController;
use crate::toggle::Toggle;

/// A named text area and its current content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    pub id: String,
    pub name: Option<String>,
    pub value: String,
}

/// Serialized field position within a form, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldSlot {
    Text(usize),
    Popup(usize),
}

/// Widgets of one form, keyed by the id of its output panel.
#[derive(Debug, Clone)]
pub struct Region {
    toggles: Vec<Toggle>,
    popups: Vec<Popup>,
    texts: Vec<TextField>,
    slots: Vec<FieldSlot>,
    submission: SubmissionController,
}

impl Region {
    fn bind(form: &Element, root: &Element) -> Option<Self> {
        let output = form.find(|e| e.is("pre", class::OUTPUT) && e.id().is_some())?;
        let output_id = output.id()?.to_owned();
        let run = form.find(|e| e.is("span", class::RUN) && e.id().is_some())?;
        let run_id = run.id()?.to_owned();

        let toggles = form
            .find_all(|e| e.is("span", class::TOGGLE))
            .into_iter()
            .filter_map(|label| {
                let visible = label
                    .attr(DATA_TOGGLE)
                    .and_then(|target| root.is_hidden_by_id(target))
                    .is_some_and(|hidden| !hidden);
                Toggle::from_element(label, visible)
            })
            .collect();

        let mut popups = Vec::new();
        let mut texts = Vec::new();
        let mut slots = Vec::new();
        for element in form.descendants() {
            if element.tag == "textarea" {
                let Some(id) = element.id() else { continue };
                texts.push(TextField {
                    id: id.to_owned(),
                    name: element.attr("name").map(str::to_owned),
                    value: element.text_content(),
                });
                slots.push(FieldSlot::Text(texts.len() - 1));
            } else if element.is("div", class::POPUP)
                && let Some(popup) = Popup::from_element(element)
            {
                popups.push(popup);
                slots.push(FieldSlot::Popup(popups.len() - 1));
            }
        }

        Some(Self {
            toggles,
            popups,
            texts,
            slots,
            submission: SubmissionController::new(output_id, run_id),
        })
    }

    /// Region id: the id of its output panel.
    #[must_use]
    pub fn id(&self) -> &str {
        self.submission.region_id()
    }

    #[must_use]
    pub fn toggles(&self) -> &[Toggle] {
        &self.toggles
    }

    #[must_use]
    pub fn popups(&self) -> &[Popup] {
        &self.popups
    }

    #[must_use]
    pub fn texts(&self) -> &[TextField] {
        &self.texts
    }

    /// Popup controlling `field`.
    #[must_use]
    pub fn popup(&self, field: FieldName) -> Option<&Popup> {
        self.popups.iter().find(|p| p.field() == field)
    }

    /// First text area sent under `field`.
    #[must_use]
    pub fn text(&self, field: FieldName) -> Option<&TextField> {
        self.texts
            .iter()
            .find(|t| t.name.as_deref() == Some(field.as_str()))
    }

    #[must_use]
    pub fn submission(&self) -> &SubmissionController {
        &self.submission
    }

    /// Named field values in document order, followed by `prefixes`.
    #[must_use]
    pub fn payload(&self, prefixes: &str) -> FormPayload {
        let mut payload = FormPayload::new();
        for slot in &self.slots {
            match *slot {
                FieldSlot::Text(index) => {
                    let text = &self.texts[index];
                    if let Some(name) = &text.name {
                        payload.push(name.clone(), text.value.clone());
                    }
                }
                FieldSlot::Popup(index) => {
                    let popup = &self.popups[index];
                    payload.push(popup.field().as_str(), popup.value());
                }
            }
        }
        payload.push(PREFIXES_KEY, prefixes);
        payload
    }

    fn popup_mut_by_id(&mut self, id: &str) -> Option<&mut Popup> {
        self.popups.iter_mut().find(|p| p.id() == id)
    }
}

/// All bound regions of a page plus the page-wide prefixes.
#[derive(Debug, Clone)]
pub struct Page {
    prefixes: String,
    cooldown: Duration,
    regions: Vec<Region>,
}

impl Page {
    /// Bind every built form on the page.
    ///
    /// Reads the prefixes once, recovers widget state from the markup and then
    /// applies authored `input.reset-value` selections to `document`. Forms
    /// without an output panel or run control are left unbound.
    pub fn bind(document: &mut Document, cooldown: Duration) -> Self {
        let root = document.root();
        let prefixes = harvest_prefixes(root);

        let mut regions = Vec::new();
        let mut resets = Vec::new();
        for form in root.find_all(|e| e.tag == "form") {
            if form.children_matching("div", class::REGION).next().is_none() {
                continue;
            }
            let Some(region) = Region::bind(form, root) else {
                warn!("Form without output panel or run control, leaving unbound");
                continue;
            };
            for reset in form.find_all(|e| e.is("input", class::RESET_VALUE)) {
                if let (Some(name), Some(value)) = (reset.attr(DATA_NAME), reset.attr("value")) {
                    resets.push((regions.len(), name.to_owned(), value.to_owned()));
                }
            }
            regions.push(region);
        }

        let mut page = Self {
            prefixes,
            cooldown,
            regions,
        };

        let mut patches = Vec::new();
        for (index, name, value) in resets {
            patches.extend(page.apply_reset(index, &name, &value));
        }
        apply_patches(document, &patches);

        info!(
            regions = page.regions.len(),
            prefixes = !page.prefixes.is_empty(),
            "Bound page"
        );
        page
    }

    fn apply_reset(&mut self, index: usize, name: &str, value: &str) -> Vec<Patch> {
        let Ok(field) = name.parse::<FieldName>() else {
            debug!(name, "Reset value for unknown field");
            return Vec::new();
        };
        let Some(popup) = self.regions[index]
            .popups
            .iter_mut()
            .find(|p| p.field() == field)
        else {
            debug!(%field, "Reset value without matching popup");
            return Vec::new();
        };
        popup.select(value)
    }

    #[must_use]
    pub fn prefixes(&self) -> &str {
        &self.prefixes
    }

    #[must_use]
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Region whose output panel has id `id`.
    #[must_use]
    pub fn region(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id() == id)
    }

    /// Payload a run in region `id` would send right now.
    #[must_use]
    pub fn payload(&self, id: &str) -> Option<FormPayload> {
        self.region(id).map(|r| r.payload(&self.prefixes))
    }

    /// React to one event. Events naming unknown elements produce no effects.
    pub fn handle(&mut self, event: PageEvent, now: Instant) -> Vec<Effect> {
        let effects = match event {
            PageEvent::ToggleClicked { id } => self.on_toggle(&id),
            PageEvent::PopupOpened { id } => self.with_popup(&id, Popup::open),
            PageEvent::PopupDismissed { id } => self.with_popup(&id, Popup::dismiss),
            PageEvent::CandidateClicked { id, candidate } => {
                self.with_popup(&id, |popup| popup.select(&candidate))
            }
            PageEvent::TextEdited { id, value } => self.on_text(&id, value),
            PageEvent::RunClicked { id } => self.on_run(&id),
            PageEvent::TransferCompleted { region, outcome } => {
                let cooldown = self.cooldown;
                self.with_region(&region, |r| r.submission.complete(outcome, now, cooldown))
            }
            PageEvent::CooldownElapsed { region } => {
                self.with_region(&region, |r| r.submission.cooldown_elapsed())
            }
        };
        effects.unwrap_or_else(|| {
            debug!("Event target not found on page");
            Vec::new()
        })
    }

    fn on_toggle(&mut self, id: &str) -> Option<Vec<Effect>> {
        let toggle = self
            .regions
            .iter_mut()
            .flat_map(|r| r.toggles.iter_mut())
            .find(|t| t.label_id() == id)?;
        Some(patch_effects(toggle.toggle()))
    }

    fn with_popup(
        &mut self,
        id: &str,
        action: impl FnOnce(&mut Popup) -> Vec<Patch>,
    ) -> Option<Vec<Effect>> {
        let popup = self
            .regions
            .iter_mut()
            .find_map(|r| r.popup_mut_by_id(id))?;
        Some(patch_effects(action(popup)))
    }

    fn on_text(&mut self, id: &str, value: String) -> Option<Vec<Effect>> {
        let text = self
            .regions
            .iter_mut()
            .flat_map(|r| r.texts.iter_mut())
            .find(|t| t.id == id)?;
        text.value.clone_from(&value);
        Some(vec![Effect::Patch(Patch::SetValue {
            id: id.to_owned(),
            value,
        })])
    }

    fn on_run(&mut self, run_id: &str) -> Option<Vec<Effect>> {
        let prefixes = &self.prefixes;
        let region = self
            .regions
            .iter_mut()
            .find(|r| r.submission.run_id() == run_id)?;

        let payload = region.payload(prefixes);
        let mut effects = region.submission.activate(payload);
        if effects.is_empty() {
            return Some(effects);
        }

        let output_id = region.submission.output_id().to_owned();
        if let Some(toggle) = region
            .toggles
            .iter_mut()
            .find(|t| t.content_id() == output_id)
        {
            effects.extend(patch_effects(toggle.reveal()));
        }
        Some(effects)
    }

    fn with_region(
        &mut self,
        id: &str,
        action: impl FnOnce(&mut Region) -> Vec<Effect>,
    ) -> Option<Vec<Effect>> {
        let region = self.regions.iter_mut().find(|r| r.id() == id)?;
        Some(action(region))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::WidgetBuilder;
    use crate::submission::{DEFAULT_COOLDOWN, SubmissionState};
    use crate::transport::TransferError;
    use pretty_assertions::assert_eq;

    const PAGE: &str = concat!(
        r#"<div id="text-prefixes"><pre class="example">@prefix ex: &lt;http://example.com/ns#&gt; .</pre></div>"#,
        r#"<div class="weblutra"><div class="input"><textarea>ex:T(ex:a) .</textarea></div>"#,
        r#"<div class="library"><textarea>ex:T[?x] :: { ex:x(?x) } .</textarea></div></div>"#,
        r#"<div class="weblutra"><div class="input"><textarea>second</textarea></div></div>"#,
    );

    fn bound(html: &str) -> (Document, Page) {
        let mut doc = Document::parse(html).unwrap();
        WidgetBuilder::new().build(&mut doc);
        let page = Page::bind(&mut doc, DEFAULT_COOLDOWN);
        (doc, page)
    }

    fn run(page: &mut Page, doc: &mut Document, run_id: &str, now: Instant) -> Vec<Effect> {
        let effects = page.handle(
            PageEvent::RunClicked {
                id: run_id.to_owned(),
            },
            now,
        );
        apply(doc, &effects);
        effects
    }

    fn apply(doc: &mut Document, effects: &[Effect]) {
        let patches: Vec<&Patch> = effects
            .iter()
            .filter_map(|e| match e {
                Effect::Patch(p) => Some(p),
                _ => None,
            })
            .collect();
        apply_patches(doc, patches);
    }

    fn transfers(effects: &[Effect]) -> Vec<&FormPayload> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Transfer { payload, .. } => Some(payload),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_bind_finds_regions_and_prefixes() {
        let (_, page) = bound(PAGE);

        assert_eq!(page.prefixes(), "@prefix ex: <http://example.com/ns#> .");
        let ids: Vec<&str> = page.regions().iter().map(Region::id).collect();
        assert_eq!(ids, vec!["lutra-2", "lutra-4"]);

        let first = &page.regions()[0];
        assert_eq!(first.toggles().len(), 3);
        assert_eq!(first.popups().len(), 4);
        assert_eq!(first.submission().run_id(), "lutra-2-run");
        assert_eq!(first.text(FieldName::Library).unwrap().id, "lutra-1");
    }

    #[test]
    fn test_payload_in_document_order_with_prefixes() {
        let (_, page) = bound(PAGE);
        let payload = page.payload("lutra-2").unwrap();

        let fields: Vec<(&str, &str)> = payload.iter().collect();
        assert_eq!(
            fields,
            vec![
                ("inputFormat", "stottr"),
                ("input", "ex:T(ex:a) ."),
                ("libraryFormat", "stottr"),
                ("library", "ex:T[?x] :: { ex:x(?x) } ."),
                ("outputFormat", "wottr"),
                ("mode", "expand"),
                ("prefixes", "@prefix ex: <http://example.com/ns#> ."),
            ]
        );
    }

    #[test]
    fn test_popup_events_reach_the_payload() {
        let (mut doc, mut page) = bound(PAGE);
        let now = Instant::now();
        let id = "lutra-0-inputFormat".to_owned();

        for candidate in ["wottr", "bottr", "turtle"] {
            let mut effects = page.handle(PageEvent::PopupOpened { id: id.clone() }, now);
            effects.extend(page.handle(
                PageEvent::CandidateClicked {
                    id: id.clone(),
                    candidate: candidate.to_owned(),
                },
                now,
            ));
            apply(&mut doc, &effects);
        }

        assert_eq!(
            page.payload("lutra-2").unwrap().get("inputFormat"),
            Some("bottr")
        );
        let hidden = doc.root().find_by_id("lutra-0-inputFormat-value").unwrap();
        assert_eq!(hidden.attr("value"), Some("bottr"));
        let label = doc.root().find_by_id("lutra-0-inputFormat-current").unwrap();
        assert_eq!(label.text_content(), "bottr");
    }

    #[test]
    fn test_text_edits_are_sent() {
        let (mut doc, mut page) = bound(PAGE);
        let effects = page.handle(
            PageEvent::TextEdited {
                id: "lutra-3".to_owned(),
                value: "ex:T(ex:b) .".to_owned(),
            },
            Instant::now(),
        );
        apply(&mut doc, &effects);

        assert_eq!(
            page.payload("lutra-4").unwrap().get("input"),
            Some("ex:T(ex:b) .")
        );
        assert_eq!(doc.root().find_by_id("lutra-3").unwrap().text, "ex:T(ex:b) .");
    }

    #[test]
    fn test_toggle_event_flips_output() {
        let (mut doc, mut page) = bound(PAGE);
        let now = Instant::now();
        let click = || PageEvent::ToggleClicked {
            id: "lutra-2-toggle".to_owned(),
        };

        let effects = page.handle(click(), now);
        apply(&mut doc, &effects);
        assert!(!doc.root().find_by_id("lutra-2").unwrap().is_hidden());

        let effects = page.handle(click(), now);
        apply(&mut doc, &effects);
        assert!(doc.root().find_by_id("lutra-2").unwrap().is_hidden());
    }

    #[test]
    fn test_toggle_in_hidden_panel_starts_collapsed() {
        let (mut doc, mut page) = bound(
            r#"<div class="weblutra"><div class="library" style="display:none;"><textarea>l</textarea></div></div>"#,
        );
        let toggle = &page.regions()[0].toggles()[0];
        assert_eq!(toggle.label_id(), "lutra-0-toggle");
        assert!(!toggle.is_visible());

        let effects = page.handle(
            PageEvent::ToggleClicked {
                id: "lutra-0-toggle".to_owned(),
            },
            Instant::now(),
        );
        apply(&mut doc, &effects);

        assert!(page.regions()[0].toggles()[0].is_visible());
        let arrow = doc.root().find_by_id("lutra-0-toggle-arrow").unwrap();
        assert_eq!(arrow.text, crate::markup::GLYPH_VISIBLE);
    }

    #[test]
    fn test_region_with_two_outputs_has_one_live_run_control() {
        let (mut doc, mut page) = bound(
            r#"<div class="weblutra"><div class="input"><textarea>i</textarea></div><pre class="example">a</pre><pre class="example">b</pre></div>"#,
        );
        let region = &page.regions()[0];
        assert_eq!(region.id(), "lutra-1");
        assert_eq!(region.submission().run_id(), "lutra-1-run");
        assert_eq!(
            doc.root().find_all(|e| e.is("span", class::RUN)).len(),
            1
        );

        let effects = run(&mut page, &mut doc, "lutra-1-run", Instant::now());
        assert_eq!(transfers(&effects).len(), 1);
    }

    #[test]
    fn test_run_reveals_output_and_sends_once() {
        let (mut doc, mut page) = bound(PAGE);
        let now = Instant::now();

        let effects = run(&mut page, &mut doc, "lutra-2-run", now);
        assert_eq!(transfers(&effects).len(), 1);

        let output = doc.root().find_by_id("lutra-2").unwrap();
        assert!(!output.is_hidden());
        assert_eq!(output.text_content(), "Loading...");
        let arrow = doc.root().find_by_id("lutra-2-toggle-arrow").unwrap();
        assert_eq!(arrow.text, crate::markup::GLYPH_VISIBLE);
        let control = doc.root().find_by_id("lutra-2-run").unwrap();
        assert_eq!(control.attr("disabled"), Some("true"));
        assert_eq!(control.style_property("color"), Some("#ccc"));

        assert!(transfers(&run(&mut page, &mut doc, "lutra-2-run", now)).is_empty());
    }

    #[test]
    fn test_regions_are_independent() {
        let (mut doc, mut page) = bound(PAGE);
        let now = Instant::now();

        run(&mut page, &mut doc, "lutra-2-run", now);
        let effects = run(&mut page, &mut doc, "lutra-4-run", now);
        let sent = transfers(&effects);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].get("input"), Some("second"));
        assert_eq!(sent[0].get("library"), None);
    }

    #[test]
    fn test_failure_then_cooldown() {
        let (mut doc, mut page) = bound(PAGE);
        let now = Instant::now();
        run(&mut page, &mut doc, "lutra-2-run", now);

        let effects = page.handle(
            PageEvent::TransferCompleted {
                region: "lutra-2".to_owned(),
                outcome: Err(TransferError::new(500, "Internal Error")),
            },
            now,
        );
        apply(&mut doc, &effects);
        assert_eq!(
            doc.root().find_by_id("lutra-2").unwrap().text_content(),
            "Error: 500\nInternal Error"
        );
        assert!(effects.contains(&Effect::ScheduleCooldown {
            region: "lutra-2".to_owned(),
            deadline: now + Duration::from_millis(3000),
        }));
        assert_eq!(
            page.region("lutra-2").unwrap().submission().state(),
            SubmissionState::CoolingDown
        );

        let effects = page.handle(
            PageEvent::CooldownElapsed {
                region: "lutra-2".to_owned(),
            },
            now + Duration::from_millis(3000),
        );
        apply(&mut doc, &effects);
        let control = doc.root().find_by_id("lutra-2-run").unwrap();
        assert!(!control.has_attr("disabled"));
        assert_eq!(control.style_property("color"), Some("#000"));
    }

    #[test]
    fn test_reset_values_select_popups() {
        let html = concat!(
            r#"<div class="weblutra"><div class="input"><textarea>x</textarea></div>"#,
            r#"<input class="reset-value" data-name="inputFormat" value="wottr">"#,
            r#"<input class="reset-value" data-name="mode" value="explode">"#,
            r#"<input class="reset-value" data-name="fetchMissing" value="true"></div>"#,
        );
        let (doc, page) = bound(html);
        let region = &page.regions()[0];

        assert_eq!(region.popup(FieldName::InputFormat).unwrap().value(), "wottr");
        assert_eq!(region.popup(FieldName::Mode).unwrap().value(), "expand");
        let hidden = doc.root().find_by_id("lutra-0-inputFormat-value").unwrap();
        assert_eq!(hidden.attr("value"), Some("wottr"));
    }

    #[test]
    fn test_unknown_targets_are_ignored() {
        let (_, mut page) = bound(PAGE);
        let now = Instant::now();
        for event in [
            PageEvent::ToggleClicked { id: "nope".to_owned() },
            PageEvent::RunClicked { id: "nope".to_owned() },
            PageEvent::CooldownElapsed {
                region: "nope".to_owned(),
            },
        ] {
            assert!(page.handle(event, now).is_empty());
        }
    }

    #[test]
    fn test_unbuilt_page_binds_nothing() {
        let mut doc = Document::parse(r#"<div class="weblutra"></div>"#).unwrap();
        let page = Page::bind(&mut doc, DEFAULT_COOLDOWN);
        assert!(page.regions().is_empty());
        assert_eq!(page.prefixes(), "");
    }
}
