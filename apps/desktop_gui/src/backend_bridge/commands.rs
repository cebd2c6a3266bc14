//! Backend commands queued from UI to backend worker.

use shared::{domain::FileInputId, protocol::ActionKind};
use std::path::PathBuf;

pub enum BackendCommand {
    SetCalibrationMode(bool),
    SetModelMode(bool),
    AttachFiles {
        input: FileInputId,
        paths: Vec<PathBuf>,
    },
    ClearFiles {
        input: FileInputId,
    },
    Activate(ActionKind),
    Cancel(ActionKind),
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::SetCalibrationMode(_) => "set_calibration_mode",
            BackendCommand::SetModelMode(_) => "set_model_mode",
            BackendCommand::AttachFiles { .. } => "attach_files",
            BackendCommand::ClearFiles { .. } => "clear_files",
            BackendCommand::Activate(_) => "activate",
            BackendCommand::Cancel(_) => "cancel",
        }
    }
}
