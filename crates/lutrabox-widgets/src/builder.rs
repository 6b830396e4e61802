//! One-time transformation of authored regions into submittable forms.
//!
//! An authored region looks like
//!
//! ```html
//! <div class="weblutra">
//!   <div class="input"><textarea>...</textarea></div>
//!   <div class="library"><textarea>...</textarea></div>
//!   <pre class="example">...</pre>
//! </div>
//! ```
//!
//! where every panel is optional. The builder gives text areas and the
//! output panel ids, puts a menu bar before each of them and wraps the
//! region in a multipart form.

use lutrabox_dom::{Document, Element};
use tracing::{debug, info};

use crate::form::FieldName;
use crate::ids::IdGenerator;
use crate::markup::{
    self, INPUT_FORMAT, LIBRARY_FORMAT, MODE, OUTPUT_FORMAT, PopupSpec, RUN_LABEL, class,
};
use crate::popup::Popup;
use crate::toggle::Toggle;

/// Encoding declared on the wrapping form.
pub const FORM_ENCTYPE: &str = "multipart/form-data";

/// Which optional panels a region was authored with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionLayout {
    pub has_input: bool,
    pub has_library: bool,
    pub has_output: bool,
}

impl RegionLayout {
    /// Classify the direct children of `region`.
    #[must_use]
    pub fn classify(region: &Element) -> Self {
        let mut layout = Self::default();
        for child in &region.children {
            layout.has_input |= child.is("div", class::INPUT);
            layout.has_library |= child.is("div", class::LIBRARY);
            layout.has_output |= child.is("pre", class::OUTPUT);
        }
        layout
    }
}

/// What the builder did to one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltRegion {
    /// Panels found before synthesis.
    pub layout: RegionLayout,
    /// Ids given to text areas, in document order.
    pub field_ids: Vec<String>,
    /// Id given to the output panel.
    pub output_id: String,
}

/// Summary of one [`WidgetBuilder::build`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub regions: Vec<BuiltRegion>,
    /// Regions left alone because they already carry menus.
    pub skipped: usize,
}

/// Builds widget markup for every region on a page.
#[derive(Debug, Default)]
pub struct WidgetBuilder {
    ids: IdGenerator,
}

impl WidgetBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform every unbuilt region in document order.
    ///
    /// Never fails: missing panels just get no menu, and a region without any
    /// recognizable panel becomes a form holding an empty output panel.
    pub fn build(&mut self, document: &mut Document) -> BuildReport {
        self.ids
            .skip_existing(document.root().descendants().filter_map(Element::id));

        let mut report = BuildReport::default();
        self.build_within(document.root_mut(), &mut report);

        info!(
            regions = report.regions.len(),
            skipped = report.skipped,
            ids = self.ids.issued(),
            "Built widgets"
        );
        report
    }

    fn build_within(&mut self, parent: &mut Element, report: &mut BuildReport) {
        for index in 0..parent.children.len() {
            let child = &mut parent.children[index];
            if !child.is("div", class::REGION) {
                self.build_within(child, report);
                continue;
            }
            if is_built(child) {
                debug!("Region already built, skipping");
                report.skipped += 1;
                continue;
            }

            let built = self.build_region(child);
            debug!(
                output = %built.output_id,
                fields = built.field_ids.len(),
                "Built region"
            );
            report.regions.push(built);
            parent.wrap_child(index, Element::new("form").with_attr("enctype", FORM_ENCTYPE));
        }
    }

    fn build_region(&mut self, region: &mut Element) -> BuiltRegion {
        let layout = RegionLayout::classify(region);

        // The first authored `pre.example` is the output panel; any later one
        // stays as plain content.
        let authored = region
            .children
            .iter()
            .position(|c| c.is("pre", class::OUTPUT));
        let output_index = if let Some(index) = authored {
            index
        } else {
            region
                .children
                .push(Element::new("pre").with_attr("class", class::OUTPUT));
            region.children.len() - 1
        };
        region.children[output_index].set_hidden(true);

        let ids = &mut self.ids;
        let mut field_ids = Vec::new();
        region.visit_mut(&mut |e| {
            if e.tag == "textarea" {
                let id = ids.next_id();
                e.set_attr("id", id.clone());
                field_ids.push(id);
            }
        });
        let output_id = ids.next_id();
        region.children[output_index].set_attr("id", output_id.clone());

        for panel in &mut region.children {
            let (label, field, spec) = if panel.is("div", class::INPUT) {
                ("Input", FieldName::Input, &INPUT_FORMAT)
            } else if panel.is("div", class::LIBRARY) {
                ("Library", FieldName::Library, &LIBRARY_FORMAT)
            } else {
                continue;
            };
            let hidden = panel.is_hidden();
            insert_menus(panel, hidden, &|e: &mut Element, hidden: bool| {
                if e.tag != "textarea" {
                    return None;
                }
                let id = e.id()?.to_owned();
                e.set_attr("name", field.as_str());
                let visible = !hidden && !e.is_hidden();
                Some(field_menu(&id, label, visible, spec))
            });
        }
        region.insert_child(output_index, output_menu(&output_id));

        BuiltRegion {
            layout,
            field_ids,
            output_id,
        }
    }
}

/// A region counts as built once any menu bar exists inside it.
fn is_built(region: &Element) -> bool {
    region
        .descendants()
        .skip(1)
        .any(|e| e.is("div", class::MENU))
}

/// Walk `parent` and insert the node returned by `make` before each child it
/// accepts. `hidden` tracks whether an ancestor is hidden.
fn insert_menus(
    parent: &mut Element,
    hidden: bool,
    make: &impl Fn(&mut Element, bool) -> Option<Element>,
) {
    let mut index = 0;
    while index < parent.children.len() {
        let child = &mut parent.children[index];
        if let Some(menu) = make(child, hidden) {
            parent.insert_child(index, menu);
            index += 2;
            continue;
        }
        let child_hidden = hidden || child.is_hidden();
        insert_menus(child, child_hidden, make);
        index += 1;
    }
}

fn menu(children: Vec<Element>) -> Element {
    Element::new("div")
        .with_attr("class", class::MENU)
        .with_children(children)
}

fn popup_for(anchor_id: &str, spec: &PopupSpec) -> Element {
    Popup::from_spec(markup::popup_id(anchor_id, spec.field), spec).render()
}

fn field_menu(field_id: &str, label: &str, visible: bool, spec: &PopupSpec) -> Element {
    menu(vec![
        Toggle::new(field_id, visible).render(label),
        popup_for(field_id, spec),
    ])
}

fn output_menu(output_id: &str) -> Element {
    let run = Element::new("span")
        .with_attr("class", class::RUN)
        .with_attr("id", markup::run_id(output_id))
        .with_text(RUN_LABEL);
    menu(vec![
        Toggle::new(output_id, false).render("Output"),
        popup_for(output_id, &OUTPUT_FORMAT),
        popup_for(output_id, &MODE),
        run,
    ])
}
