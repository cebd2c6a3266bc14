use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Multipart part names shared by client and server.
pub mod wire {
    pub const CALIBRATION_FILE: &str = "calibration_file";
    pub const CHESSBOARD_IMAGE1: &str = "chessboard_image1";
    pub const CHESSBOARD_IMAGE2: &str = "chessboard_image2";
    pub const IMAGE1: &str = "image1";
    pub const IMAGE2: &str = "image2";
    pub const MODEL_FILE: &str = "model_file";
    /// Model part name used by the unified `/upload/` endpoint.
    pub const MODEL: &str = "model";
    pub const IMAGES_COUNT: &str = "images_count";
    pub const RESULT: &str = "result";
    pub const ERROR: &str = "error";
}

/// User-triggered submissions. Each maps to exactly one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    UploadCalibration,
    UploadParams,
    UploadModel,
    UploadAndProcess,
    Process,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::UploadCalibration,
        ActionKind::UploadParams,
        ActionKind::UploadModel,
        ActionKind::UploadAndProcess,
        ActionKind::Process,
    ];

    pub fn endpoint(self) -> &'static str {
        match self {
            ActionKind::UploadCalibration => "/upload_calibration/",
            ActionKind::UploadParams => "/upload_params/",
            ActionKind::UploadModel => "/upload_model/",
            ActionKind::UploadAndProcess => "/upload_and_process/",
            ActionKind::Process => "/upload/",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ActionKind::UploadCalibration => "upload_calibration",
            ActionKind::UploadParams => "upload_params",
            ActionKind::UploadModel => "upload_model",
            ActionKind::UploadAndProcess => "upload_and_process",
            ActionKind::Process => "process",
        }
    }
}

/// JSON body of any endpoint reply. Fields other than `result`/`error`
/// are echoed form values keyed by wire name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub echoed: BTreeMap<String, Value>,
}

impl ServerReply {
    pub fn with_result(result: impl Into<String>) -> Self {
        Self {
            result: Some(result.into()),
            ..Self::default()
        }
    }

    pub fn echo(mut self, wire_name: &str, value: impl Into<String>) -> Self {
        self.echoed
            .insert(wire_name.to_string(), Value::String(value.into()));
        self
    }

    /// Echoed value rendered as display text. Non-string JSON values keep
    /// their JSON spelling; `null` counts as absent.
    pub fn echoed_text(&self, wire_name: &str) -> Option<String> {
        match self.echoed.get(wire_name)? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}
