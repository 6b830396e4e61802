//! One-at-a-time request lifecycle for a region.
//!
//! ```text
//! Idle --run--> Pending --result--> CoolingDown --deadline--> Idle
//! ```
//!
//! The run control's disabled flag guards the whole Pending and CoolingDown
//! span: activations while disabled are dropped, never queued.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::event::Effect;
use crate::form::FormPayload;
use crate::markup::{COLOR_DISABLED, COLOR_ENABLED, LOADING_TEXT};
use crate::patch::Patch;
use crate::transport::{TransferError, TransferOutcome};

/// Delay after a result before the run control is enabled again.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(3000);

/// Observable phase of a region's submission cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Pending,
    CoolingDown,
}

/// Result shown for the current submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    Pending,
    Succeeded(String),
    Failed(TransferError),
}

impl SubmissionResult {
    /// Text for the output panel.
    #[must_use]
    pub fn display_text(&self) -> String {
        match self {
            Self::Pending => LOADING_TEXT.to_owned(),
            Self::Succeeded(body) => body.clone(),
            Self::Failed(err) => err.to_string(),
        }
    }
}

/// One run: what was sent, what came back, when the cooldown ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub payload: FormPayload,
    pub result: SubmissionResult,
    pub cooldown_until: Option<Instant>,
}

/// Drives the submission cycle for one region.
#[derive(Debug, Clone)]
pub struct SubmissionController {
    region_id: String,
    run_id: String,
    output_id: String,
    disabled: bool,
    current: Option<Submission>,
}

impl SubmissionController {
    /// Create an idle controller. The region is identified by its output panel id.
    #[must_use]
    pub fn new(output_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        let output_id = output_id.into();
        Self {
            region_id: output_id.clone(),
            run_id: run_id.into(),
            output_id,
            disabled: false,
            current: None,
        }
    }

    #[must_use]
    pub fn region_id(&self) -> &str {
        &self.region_id
    }

    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    #[must_use]
    pub fn output_id(&self) -> &str {
        &self.output_id
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    #[must_use]
    pub fn state(&self) -> SubmissionState {
        match &self.current {
            None => SubmissionState::Idle,
            Some(Submission {
                result: SubmissionResult::Pending,
                ..
            }) => SubmissionState::Pending,
            Some(_) => SubmissionState::CoolingDown,
        }
    }

    /// The submission in flight or cooling down, if any.
    #[must_use]
    pub fn current(&self) -> Option<&Submission> {
        self.current.as_ref()
    }

    /// Handle a run-control activation.
    ///
    /// Ignored while the run control is disabled. Otherwise disables and dims
    /// the control, shows `Loading...` in the output panel and requests one
    /// transfer of `payload`.
    pub fn activate(&mut self, payload: FormPayload) -> Vec<Effect> {
        if self.disabled {
            debug!(region = %self.region_id, "Run control disabled, ignoring activation");
            return Vec::new();
        }

        info!(region = %self.region_id, fields = payload.len(), "Submitting");
        self.disabled = true;
        self.current = Some(Submission {
            payload: payload.clone(),
            result: SubmissionResult::Pending,
            cooldown_until: None,
        });

        vec![
            Patch::SetDisabled {
                id: self.run_id.clone(),
                disabled: true,
            }
            .into(),
            Patch::SetColor {
                id: self.run_id.clone(),
                color: COLOR_DISABLED.to_owned(),
            }
            .into(),
            Patch::SetVisible {
                id: self.output_id.clone(),
                visible: true,
            }
            .into(),
            Patch::SetText {
                id: self.output_id.clone(),
                text: LOADING_TEXT.to_owned(),
            }
            .into(),
            Effect::Transfer {
                region: self.region_id.clone(),
                payload,
            },
        ]
    }

    /// Render a transfer result and start the cooldown.
    ///
    /// Results arriving while not pending are dropped.
    pub fn complete(
        &mut self,
        outcome: TransferOutcome,
        now: Instant,
        cooldown: Duration,
    ) -> Vec<Effect> {
        let Some(submission) = self
            .current
            .as_mut()
            .filter(|s| s.result == SubmissionResult::Pending)
        else {
            warn!(region = %self.region_id, "Transfer result without pending submission");
            return Vec::new();
        };

        submission.result = match outcome {
            Ok(body) => {
                info!(region = %self.region_id, bytes = body.len(), "Submission succeeded");
                SubmissionResult::Succeeded(body)
            }
            Err(err) => {
                warn!(region = %self.region_id, status = err.status, "Submission failed: {}", err.message);
                SubmissionResult::Failed(err)
            }
        };
        let deadline = now + cooldown;
        submission.cooldown_until = Some(deadline);

        vec![
            Patch::SetText {
                id: self.output_id.clone(),
                text: submission.result.display_text(),
            }
            .into(),
            Effect::ScheduleCooldown {
                region: self.region_id.clone(),
                deadline,
            },
        ]
    }

    /// End the cooldown: discard the submission and re-enable the run control.
    pub fn cooldown_elapsed(&mut self) -> Vec<Effect> {
        if self.state() != SubmissionState::CoolingDown {
            debug!(region = %self.region_id, "Cooldown elapsed outside cooldown, ignoring");
            return Vec::new();
        }

        self.current = None;
        self.disabled = false;

        vec![
            Patch::SetDisabled {
                id: self.run_id.clone(),
                disabled: false,
            }
            .into(),
            Patch::SetColor {
                id: self.run_id.clone(),
                color: COLOR_ENABLED.to_owned(),
            }
            .into(),
        ]
    }
}
