//! Backend-to-UI events for the desktop GUI controller.

use client_core::UiState;
use shared::protocol::ActionKind;

pub enum UiEvent {
    Info(String),
    Error(String),
    StateChanged(UiState),
    ActionFinished {
        action: ActionKind,
        report: ActionReport,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionReport {
    /// The server replied; displays and alerts were reconciled in the registry.
    Completed,
    AlreadyInFlight,
    Failed(String),
}

impl ActionReport {
    pub fn status_line(&self, action: ActionKind) -> String {
        match self {
            ActionReport::Completed => format!("{}: done", action_label(action)),
            ActionReport::AlreadyInFlight => {
                format!("{}: already running", action_label(action))
            }
            ActionReport::Failed(message) => format!("{}: {message}", action_label(action)),
        }
    }
}

pub fn action_label(action: ActionKind) -> &'static str {
    match action {
        ActionKind::UploadCalibration => "Upload calibration file",
        ActionKind::UploadParams => "Upload parameters",
        ActionKind::UploadModel => "Upload 3D model",
        ActionKind::UploadAndProcess => "Upload images and process",
        ActionKind::Process => "Process",
    }
}
