//! Events fed into a page and the effects it asks the host to carry out.

use std::time::Instant;

use crate::form::FormPayload;
use crate::patch::Patch;
use crate::transport::TransferOutcome;

/// Something that happened on the page. Element ids identify targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// Click on a toggle label.
    ToggleClicked { id: String },
    /// Click on a popup's current value.
    PopupOpened { id: String },
    /// Pointer left an open popup list.
    PopupDismissed { id: String },
    /// Click on a candidate in a popup list.
    CandidateClicked { id: String, candidate: String },
    /// New content typed into a text area.
    TextEdited { id: String, value: String },
    /// Click on a run control.
    RunClicked { id: String },
    /// The transfer issued for `region` finished.
    TransferCompleted {
        region: String,
        outcome: TransferOutcome,
    },
    /// The cooldown scheduled for `region` ran out.
    CooldownElapsed { region: String },
}

/// Work requested by a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Update the markup.
    Patch(Patch),
    /// Send `payload` and report back with [`PageEvent::TransferCompleted`].
    Transfer {
        region: String,
        payload: FormPayload,
    },
    /// Report back with [`PageEvent::CooldownElapsed`] once `deadline` passes.
    ScheduleCooldown { region: String, deadline: Instant },
}

impl From<Patch> for Effect {
    fn from(patch: Patch) -> Self {
        Self::Patch(patch)
    }
}

/// Wrap a batch of patches as effects.
pub(crate) fn patch_effects(patches: Vec<Patch>) -> Vec<Effect> {
    patches.into_iter().map(Effect::from).collect()
}
