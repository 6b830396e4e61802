//! Markup contract shared by the build and bind phases.
//!
//! The builder emits elements carrying these class names and derived ids;
//! the binder finds them again by the same constants. Nothing else couples
//! the two phases.

use crate::form::FieldName;

/// Class names recognized and produced on the page.
pub mod class {
    /// Container of one interactive example.
    pub const REGION: &str = "weblutra";
    /// Input panel (`div`).
    pub const INPUT: &str = "input";
    /// Library panel (`div`).
    pub const LIBRARY: &str = "library";
    /// Output panel (`pre`).
    pub const OUTPUT: &str = "example";
    /// Menu bar inserted before a field or the output panel.
    pub const MENU: &str = "menu";
    /// Toggle label.
    pub const TOGGLE: &str = "toggle";
    /// Glyph inside a toggle label.
    pub const ARROW: &str = "arrow";
    /// Popup selector container.
    pub const POPUP: &str = "popup";
    /// Candidate list inside a popup.
    pub const LIST: &str = "list";
    /// Marks the currently selected candidate.
    pub const CURRENT: &str = "current";
    /// Run control.
    pub const RUN: &str = "lutra-send";
    /// Authored element restoring a popup selection.
    pub const RESET_VALUE: &str = "reset-value";
}

/// Attribute on a toggle label naming the content element it controls.
pub const DATA_TOGGLE: &str = "data-toggle";
/// Attribute on a reset-value element naming the popup field it restores.
pub const DATA_NAME: &str = "data-name";

/// Toggle glyph for visible content.
pub const GLYPH_VISIBLE: &str = "\u{25bd}";
/// Toggle glyph for hidden content.
pub const GLYPH_HIDDEN: &str = "\u{25b7}";

/// Text of the run control.
pub const RUN_LABEL: &str = " Run \u{25b6} ";
/// Output text while a submission is pending.
pub const LOADING_TEXT: &str = "Loading...";
/// Run control colour while disabled.
pub const COLOR_DISABLED: &str = "#ccc";
/// Run control colour once re-enabled.
pub const COLOR_ENABLED: &str = "#000";

/// Glyph mirroring a visibility state.
#[must_use]
pub fn glyph(visible: bool) -> &'static str {
    if visible { GLYPH_VISIBLE } else { GLYPH_HIDDEN }
}

/// Id of the toggle label controlling `content_id`.
#[must_use]
pub fn toggle_id(content_id: &str) -> String {
    format!("{content_id}-toggle")
}

/// Id of the glyph inside a toggle label.
#[must_use]
pub fn arrow_id(toggle_id: &str) -> String {
    format!("{toggle_id}-arrow")
}

/// Id of the popup for `field`, anchored on the element its menu precedes.
#[must_use]
pub fn popup_id(anchor_id: &str, field: FieldName) -> String {
    format!("{anchor_id}-{field}")
}

/// Id of the run control for the output panel `output_id`.
#[must_use]
pub fn run_id(output_id: &str) -> String {
    format!("{output_id}-run")
}

/// Static description of a popup the builder synthesizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupSpec {
    pub label: &'static str,
    pub field: FieldName,
    pub candidates: &'static [&'static str],
}

pub const INPUT_FORMAT: PopupSpec = PopupSpec {
    label: "Format",
    field: FieldName::InputFormat,
    candidates: &["stottr", "wottr", "bottr"],
};

pub const LIBRARY_FORMAT: PopupSpec = PopupSpec {
    label: "Format",
    field: FieldName::LibraryFormat,
    candidates: &["stottr", "wottr"],
};

pub const OUTPUT_FORMAT: PopupSpec = PopupSpec {
    label: "Format",
    field: FieldName::OutputFormat,
    candidates: &["wottr", "stottr"],
};

pub const MODE: PopupSpec = PopupSpec {
    label: "Action",
    field: FieldName::Mode,
    candidates: &["expand", "format", "lint"],
};
