//! Immutable UI-state snapshots and the event reducer that advances them.

use std::collections::{BTreeMap, BTreeSet};

use shared::{
    domain::{InputRef, SectionId},
    protocol::ActionKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeFlags {
    /// Camera parameters come from an uploaded calibration file.
    pub calibration_mode: bool,
    /// A single 3D model replaces the two-image pair.
    pub model_mode: bool,
}

impl ModeFlags {
    pub fn section_visibility(self) -> [(SectionId, bool); 5] {
        [
            (SectionId::ManualCalibration, !self.calibration_mode),
            (SectionId::CameraParams, self.calibration_mode),
            (SectionId::ImageUpload, !self.model_mode),
            (SectionId::ModelUpload, self.model_mode),
            (SectionId::ModelUploadTitle, self.model_mode),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    DisplayingSuccess,
    DisplayingError,
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    CalibrationModeToggled(bool),
    ModelModeToggled(bool),
    ActionActivated(ActionKind),
    ValidationFinished {
        action: ActionKind,
        checked: Vec<InputRef>,
        missing: Vec<InputRef>,
    },
    SubmissionSucceeded(ActionKind),
    SubmissionFailed(ActionKind),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UiState {
    modes: ModeFlags,
    phases: BTreeMap<ActionKind, ActionPhase>,
    error_markers: BTreeSet<InputRef>,
}

impl UiState {
    pub fn new(modes: ModeFlags) -> Self {
        Self {
            modes,
            ..Self::default()
        }
    }

    pub fn modes(&self) -> ModeFlags {
        self.modes
    }

    pub fn phase(&self, action: ActionKind) -> ActionPhase {
        self.phases.get(&action).copied().unwrap_or_default()
    }

    /// An activation of `action` is underway and a repeat must be ignored.
    pub fn is_busy(&self, action: ActionKind) -> bool {
        matches!(
            self.phase(action),
            ActionPhase::Validating | ActionPhase::Submitting
        )
    }

    pub fn error_markers(&self) -> &BTreeSet<InputRef> {
        &self.error_markers
    }

    pub fn reduce(&self, event: &UiEvent) -> UiState {
        let mut next = self.clone();
        match event {
            UiEvent::CalibrationModeToggled(on) => next.modes.calibration_mode = *on,
            UiEvent::ModelModeToggled(on) => next.modes.model_mode = *on,
            UiEvent::ActionActivated(action) => {
                if !self.is_busy(*action) {
                    next.phases.insert(*action, ActionPhase::Validating);
                }
            }
            UiEvent::ValidationFinished {
                action,
                checked,
                missing,
            } => {
                if self.phase(*action) != ActionPhase::Validating {
                    return next;
                }
                for input in checked {
                    next.error_markers.remove(input);
                }
                next.error_markers.extend(missing.iter().copied());
                let phase = if missing.is_empty() {
                    ActionPhase::Submitting
                } else {
                    ActionPhase::Idle
                };
                next.phases.insert(*action, phase);
            }
            UiEvent::SubmissionSucceeded(action) => {
                if self.phase(*action) == ActionPhase::Submitting {
                    next.phases.insert(*action, ActionPhase::DisplayingSuccess);
                }
            }
            UiEvent::SubmissionFailed(action) => {
                if self.phase(*action) == ActionPhase::Submitting {
                    next.phases.insert(*action, ActionPhase::DisplayingError);
                }
            }
        }
        next
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
