//! Data-driven description of each submit action: what it requires in the
//! current mode and how replies are reconciled into the registry.

use std::collections::BTreeMap;

use shared::{
    domain::{DisplayId, FieldId, FileInputId, InputRef},
    protocol::{wire, ActionKind, ServerReply},
};

use crate::{error::describe_missing, reducer::ModeFlags, registry::ElementRegistry};

pub const PROCESS_FALLBACK_MESSAGE: &str = "An error occurred. Please try again.";
pub const UPLOAD_FALLBACK_MESSAGE: &str =
    "An error occurred while uploading data. Please try again.";
pub const PARAMS_UPLOADED_MESSAGE: &str = "Parameters uploaded successfully.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Text(FieldId),
    /// `parts` holds one wire name per expected file.
    File {
        input: FileInputId,
        parts: &'static [&'static str],
    },
}

impl Requirement {
    pub fn input(self) -> InputRef {
        match self {
            Requirement::Text(field) => InputRef::Field(field),
            Requirement::File { input, .. } => InputRef::File(input),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessPlan {
    /// Alert the server's `result` text.
    NotifyResult,
    /// Copy echoed fields into their displays, then alert `message`.
    EchoFields {
        fields: &'static [FieldId],
        message: &'static str,
    },
    /// Copy the given echoed fields into their displays and `result` into the action result.
    EchoFieldsAndResult { fields: &'static [FieldId] },
    /// Copy the values the user entered into their displays and `result` into the action result.
    MirrorEnteredAndResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePlan {
    /// Alert the server's message behind `prefix`.
    NotifyServerError { prefix: &'static str },
    Notify(&'static str),
    ActionResult(&'static str),
}

/// Registry writes computed from one reply, applied as a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub displays: Vec<(DisplayId, String)>,
    pub notification: Option<String>,
}

impl Reconciliation {
    pub fn apply<R: ElementRegistry + ?Sized>(&self, registry: &mut R) {
        for (display, text) in &self.displays {
            registry.set_display(*display, text);
        }
        if let Some(message) = &self.notification {
            registry.notify(message);
        }
    }
}

pub struct ActionDescriptor {
    pub kind: ActionKind,
    requirements: fn(ModeFlags) -> Vec<Requirement>,
    pub missing_message: &'static str,
    pub success: SuccessPlan,
    pub application_failure: FailurePlan,
    pub transport_failure: FailurePlan,
}

const CAMERA_PARAMS: &[FieldId] = &FieldId::CAMERA_PARAMS;

const PARAMS_ECHO: &[FieldId] = &[
    FieldId::FocalLength,
    FieldId::PixelSize,
    FieldId::SensorResolution,
    FieldId::SensorSize,
    FieldId::Distance,
    FieldId::NumTiles,
    FieldId::SquareSize,
];

const CALIBRATION_FILE: Requirement = Requirement::File {
    input: FileInputId::CalibrationFile,
    parts: &[wire::CALIBRATION_FILE],
};
const CHESSBOARD_PAIR: Requirement = Requirement::File {
    input: FileInputId::ChessboardPair,
    parts: &[wire::CHESSBOARD_IMAGE1, wire::CHESSBOARD_IMAGE2],
};
const IMAGE_PAIR: Requirement = Requirement::File {
    input: FileInputId::ImagePair,
    parts: &[wire::IMAGE1, wire::IMAGE2],
};

fn calibration_requirements(_modes: ModeFlags) -> Vec<Requirement> {
    vec![CALIBRATION_FILE]
}

fn params_requirements(_modes: ModeFlags) -> Vec<Requirement> {
    let mut required: Vec<Requirement> =
        CAMERA_PARAMS.iter().copied().map(Requirement::Text).collect();
    required.push(CHESSBOARD_PAIR);
    required.push(Requirement::Text(FieldId::NumTiles));
    required.push(Requirement::Text(FieldId::SquareSize));
    required
}

fn model_requirements(_modes: ModeFlags) -> Vec<Requirement> {
    vec![
        Requirement::Text(FieldId::ImagesCount),
        Requirement::File {
            input: FileInputId::ModelFile,
            parts: &[wire::MODEL_FILE],
        },
    ]
}

fn image_pair_requirements(_modes: ModeFlags) -> Vec<Requirement> {
    vec![IMAGE_PAIR]
}

fn process_requirements(modes: ModeFlags) -> Vec<Requirement> {
    let mut required: Vec<Requirement> =
        CAMERA_PARAMS.iter().copied().map(Requirement::Text).collect();
    if modes.model_mode {
        required.push(Requirement::Text(FieldId::ImagesCount));
        required.push(Requirement::File {
            input: FileInputId::ModelFile,
            parts: &[wire::MODEL],
        });
    } else {
        required.push(IMAGE_PAIR);
    }
    required
}

static DESCRIPTORS: [ActionDescriptor; 5] = [
    ActionDescriptor {
        kind: ActionKind::UploadCalibration,
        requirements: calibration_requirements,
        missing_message: "Please select a calibration file.",
        success: SuccessPlan::NotifyResult,
        application_failure: FailurePlan::NotifyServerError { prefix: "" },
        transport_failure: FailurePlan::Notify(UPLOAD_FALLBACK_MESSAGE),
    },
    ActionDescriptor {
        kind: ActionKind::UploadParams,
        requirements: params_requirements,
        missing_message: "Please fill in all fields and select both chessboard images.",
        success: SuccessPlan::EchoFields {
            fields: PARAMS_ECHO,
            message: PARAMS_UPLOADED_MESSAGE,
        },
        application_failure: FailurePlan::NotifyServerError { prefix: "Error: " },
        transport_failure: FailurePlan::Notify(UPLOAD_FALLBACK_MESSAGE),
    },
    ActionDescriptor {
        kind: ActionKind::UploadModel,
        requirements: model_requirements,
        missing_message: "Please enter the images count and select a model file.",
        success: SuccessPlan::EchoFieldsAndResult {
            fields: &[FieldId::ImagesCount],
        },
        application_failure: FailurePlan::NotifyServerError { prefix: "" },
        transport_failure: FailurePlan::Notify(UPLOAD_FALLBACK_MESSAGE),
    },
    ActionDescriptor {
        kind: ActionKind::UploadAndProcess,
        requirements: image_pair_requirements,
        missing_message: "Please select both images.",
        success: SuccessPlan::EchoFieldsAndResult { fields: &[] },
        application_failure: FailurePlan::NotifyServerError { prefix: "" },
        transport_failure: FailurePlan::Notify(UPLOAD_FALLBACK_MESSAGE),
    },
    ActionDescriptor {
        kind: ActionKind::Process,
        requirements: process_requirements,
        missing_message: "Please fill in all required fields and select the required files.",
        success: SuccessPlan::MirrorEnteredAndResult,
        application_failure: FailurePlan::ActionResult(PROCESS_FALLBACK_MESSAGE),
        transport_failure: FailurePlan::ActionResult(PROCESS_FALLBACK_MESSAGE),
    },
];

impl ActionDescriptor {
    pub fn for_kind(kind: ActionKind) -> &'static ActionDescriptor {
        match kind {
            ActionKind::UploadCalibration => &DESCRIPTORS[0],
            ActionKind::UploadParams => &DESCRIPTORS[1],
            ActionKind::UploadModel => &DESCRIPTORS[2],
            ActionKind::UploadAndProcess => &DESCRIPTORS[3],
            ActionKind::Process => &DESCRIPTORS[4],
        }
    }

    pub fn endpoint(&self) -> &'static str {
        self.kind.endpoint()
    }

    pub fn requirements(&self, modes: ModeFlags) -> Vec<Requirement> {
        (self.requirements)(modes)
    }

    pub fn missing_notice(&self, missing: &[InputRef]) -> String {
        format!(
            "{} Missing: {}.",
            self.missing_message,
            describe_missing(missing)
        )
    }

    pub fn on_success(
        &self,
        reply: &ServerReply,
        entered: &BTreeMap<FieldId, String>,
    ) -> Reconciliation {
        let mut plan = Reconciliation::default();
        match self.success {
            SuccessPlan::NotifyResult => {
                plan.notification = Some(reply.result.clone().unwrap_or_default());
            }
            SuccessPlan::EchoFields { fields, message } => {
                plan.displays = echoed_displays(reply, fields);
                plan.notification = Some(message.to_string());
            }
            SuccessPlan::EchoFieldsAndResult { fields } => {
                plan.displays = echoed_displays(reply, fields);
                if let Some(result) = &reply.result {
                    plan.displays.push((DisplayId::ActionResult, result.clone()));
                }
            }
            SuccessPlan::MirrorEnteredAndResult => {
                plan.displays = entered
                    .iter()
                    .map(|(field, value)| (field.display(), value.clone()))
                    .collect();
                if let Some(result) = &reply.result {
                    plan.displays.push((DisplayId::ActionResult, result.clone()));
                }
            }
        }
        plan
    }

    pub fn on_application_error(&self, message: &str) -> Reconciliation {
        failure_reconciliation(self.application_failure, message)
    }

    pub fn on_transport_error(&self) -> Reconciliation {
        failure_reconciliation(self.transport_failure, "")
    }
}

fn echoed_displays(reply: &ServerReply, fields: &[FieldId]) -> Vec<(DisplayId, String)> {
    fields
        .iter()
        .filter_map(|field| {
            reply
                .echoed_text(field.wire_name())
                .map(|text| (field.display(), text))
        })
        .collect()
}

fn failure_reconciliation(plan: FailurePlan, server_message: &str) -> Reconciliation {
    match plan {
        FailurePlan::NotifyServerError { prefix } => Reconciliation {
            displays: Vec::new(),
            notification: Some(format!("{prefix}{server_message}")),
        },
        FailurePlan::Notify(message) => Reconciliation {
            displays: Vec::new(),
            notification: Some(message.to_string()),
        },
        FailurePlan::ActionResult(message) => Reconciliation {
            displays: vec![(DisplayId::ActionResult, message.to_string())],
            notification: None,
        },
    }
}
