//! DOM patches emitted by widget state transitions.
//!
//! State objects never touch the page directly. Each transition returns the
//! patches that bring the markup in line with the new state; the host applies
//! them to whatever DOM it owns.

use lutrabox_dom::{Document, Element};
use tracing::debug;

/// One markup change, addressed by element id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    /// Replace the element's content with text.
    SetText { id: String, text: String },
    /// Show or hide the element.
    SetVisible { id: String, visible: bool },
    /// Set a form control's value (`value` attribute, or content for text areas).
    SetValue { id: String, value: String },
    /// Mark or clear the `disabled` attribute.
    SetDisabled { id: String, disabled: bool },
    /// Set the inline text colour.
    SetColor { id: String, color: String },
    /// Add or remove a class.
    SetClass {
        id: String,
        class: String,
        present: bool,
    },
}

impl Patch {
    /// Id of the element the patch targets.
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::SetText { id, .. }
            | Self::SetVisible { id, .. }
            | Self::SetValue { id, .. }
            | Self::SetDisabled { id, .. }
            | Self::SetColor { id, .. }
            | Self::SetClass { id, .. } => id,
        }
    }

    /// Apply to the tree under `root`.
    ///
    /// Returns `false` if no element carries the target id; the patch is then
    /// dropped.
    pub fn apply(&self, root: &mut Element) -> bool {
        let Some(element) = root.find_by_id_mut(self.target()) else {
            debug!(target_id = self.target(), "Patch target not found");
            return false;
        };

        match self {
            Self::SetText { text, .. } => element.set_text_content(text.clone()),
            Self::SetVisible { visible, .. } => element.set_hidden(!visible),
            Self::SetValue { value, .. } => {
                if element.tag == "textarea" {
                    element.set_text_content(value.clone());
                } else {
                    element.set_attr("value", value.clone());
                }
            }
            Self::SetDisabled { disabled, .. } => {
                if *disabled {
                    element.set_attr("disabled", "true");
                } else {
                    element.remove_attr("disabled");
                }
            }
            Self::SetColor { color, .. } => element.set_style_property("color", color),
            Self::SetClass { class, present, .. } => {
                if *present {
                    element.add_class(class);
                } else {
                    element.remove_class(class);
                }
            }
        }
        true
    }
}

/// Apply patches in order, returning how many found their target.
pub fn apply_patches<'a>(
    document: &mut Document,
    patches: impl IntoIterator<Item = &'a Patch>,
) -> usize {
    patches
        .into_iter()
        .filter(|patch| patch.apply(document.root_mut()))
        .count()
}
