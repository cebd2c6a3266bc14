use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownElementId;

macro_rules! element_ids {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $id:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Identifier of the element this id addresses on the page.
            pub fn element_id(self) -> &'static str {
                match self {
                    $($name::$variant => $id),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownElementId;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.element_id() == raw)
                    .ok_or_else(|| UnknownElementId(raw.to_string()))
            }
        }
    };
}

element_ids!(
    /// Free-text inputs.
    FieldId {
        FocalLength => "focal_length",
        PixelSize => "pixel_size",
        SensorResolution => "sensor_resolution",
        SensorSize => "sensor_size",
        Distance => "distance",
        NumTiles => "tiles",
        SquareSize => "square_size",
        ImagesCount => "images_count",
    }
);

element_ids!(
    /// File inputs. The pair inputs hold two files each.
    FileInputId {
        CalibrationFile => "calibration_file",
        ChessboardPair => "chessboard_images",
        ImagePair => "images",
        ModelFile => "model_file",
    }
);

element_ids!(
    /// Read-only elements the orchestrator writes server results into.
    DisplayId {
        FocalLength => "focal_length_display",
        PixelSize => "pixel_size_display",
        SensorResolution => "sensor_resolution_display",
        SensorSize => "sensor_size_display",
        Distance => "distance_display",
        Tiles => "tiles_display",
        SquareSize => "square_size_display",
        ImagesCount => "images_count_display",
        ActionResult => "action_result",
    }
);

element_ids!(
    /// Containers whose visibility follows the mode flags.
    SectionId {
        ManualCalibration => "calibration-section",
        CameraParams => "camera-params-section",
        ImageUpload => "image-upload-section",
        ModelUpload => "model-upload-section",
        ModelUploadTitle => "model-upload-title",
    }
);

impl FieldId {
    /// Parameters every processing request carries.
    pub const CAMERA_PARAMS: [FieldId; 5] = [
        FieldId::FocalLength,
        FieldId::PixelSize,
        FieldId::SensorResolution,
        FieldId::SensorSize,
        FieldId::Distance,
    ];

    /// Multipart part name; differs from the element id for `num_tiles`.
    pub fn wire_name(self) -> &'static str {
        match self {
            FieldId::NumTiles => "num_tiles",
            other => other.element_id(),
        }
    }

    pub fn display(self) -> DisplayId {
        match self {
            FieldId::FocalLength => DisplayId::FocalLength,
            FieldId::PixelSize => DisplayId::PixelSize,
            FieldId::SensorResolution => DisplayId::SensorResolution,
            FieldId::SensorSize => DisplayId::SensorSize,
            FieldId::Distance => DisplayId::Distance,
            FieldId::NumTiles => DisplayId::Tiles,
            FieldId::SquareSize => DisplayId::SquareSize,
            FieldId::ImagesCount => DisplayId::ImagesCount,
        }
    }

    /// Accepts either the element id or the wire name.
    pub fn parse_any(raw: &str) -> Result<Self, UnknownElementId> {
        raw.parse::<FieldId>().or_else(|err| {
            Self::ALL
                .iter()
                .copied()
                .find(|field| field.wire_name() == raw)
                .ok_or(err)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileArity {
    Single,
    Pair,
}

impl FileInputId {
    pub fn arity(self) -> FileArity {
        match self {
            FileInputId::ChessboardPair | FileInputId::ImagePair => FileArity::Pair,
            FileInputId::CalibrationFile | FileInputId::ModelFile => FileArity::Single,
        }
    }
}

/// Anything validation can flag as missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum InputRef {
    Field(FieldId),
    File(FileInputId),
}

impl InputRef {
    pub fn element_id(self) -> &'static str {
        match self {
            InputRef::Field(field) => field.element_id(),
            InputRef::File(input) => input.element_id(),
        }
    }
}

impl From<FieldId> for InputRef {
    fn from(value: FieldId) -> Self {
        InputRef::Field(value)
    }
}

impl From<FileInputId> for InputRef {
    fn from(value: FileInputId) -> Self {
        InputRef::File(value)
    }
}
